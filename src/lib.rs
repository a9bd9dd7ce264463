//! # rinstruct
//!
//! rinstruct is a small interface for prompting quantized Llama chat models stored in
//! local GGUF files.
//!
//! It assembles an instruction-formatted prompt from a system message and a user message,
//! forwards it together with a [`GenerationRequest`] to [llama.cpp](https://github.com/ggerganov/llama.cpp)
//! and streams the produced text to a [`TokenSink`].
//!
//! ## Usage
//!
//! ```rust, no_run
//! use rinstruct::prelude::*;
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let model = InstructModel::load(&ModelSource::new("llama-2-7b-chat.Q2_K.gguf"))?;
//!     let prompt = format_prompt(
//!         &ChatMarkers::llama_2_chat(),
//!         "You are a helpful assistant",
//!         "Q: Name the planets in the solar system? A: ",
//!     );
//!     let request = GenerationRequest::default()
//!         .with_max_tokens(32)
//!         .with_stop_sequences(["Q:", "\n"]);
//!
//!     let mut sink = StdoutSink::new();
//!     let result = model.generate(&prompt, &request, &mut sink)?;
//!     println!("{}", result.extract_text()?);
//!     Ok(())
//! }
//! ```

#![warn(missing_docs)]

mod model;
mod prompt;
mod request;
mod sink;
mod source;
mod template;

pub use crate::model::{GenerationError, GenerationResult, InstructModel};
pub use crate::prompt::{format_prompt, ChatMarkers};
pub use crate::request::GenerationRequest;
pub use crate::sink::{CollectSink, NullSink, StdoutSink, TokenSink};
pub use crate::source::{ModelSource, SourceError, MODEL_PATH_VAR};
pub use crate::template::{PromptTemplate, TemplateError};

/// A prelude of commonly used items in rinstruct.
pub mod prelude {
    pub use crate::{
        format_prompt, ChatMarkers, GenerationRequest, InstructModel, ModelSource, PromptTemplate,
        StdoutSink, TokenSink,
    };
}
