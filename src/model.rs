use llama_cpp::standard_sampler::{SamplerStage, StandardSampler};
use llama_cpp::{LlamaModel, LlamaParams, SessionParams};

use crate::request::GenerationRequest;
use crate::sink::TokenSink;
use crate::source::{ModelSource, SourceError};

/// An error that can occur when running an [`InstructModel`].
#[derive(Debug, thiserror::Error)]
pub enum GenerationError {
    /// An error from llama.cpp while evaluating the prompt or sampling tokens.
    #[error("Llama context error: {0}")]
    Context(#[from] llama_cpp::LlamaContextError),
    /// The result carried no candidate text.
    #[error("No candidate text in generation result")]
    MalformedResult,
}

/// The result of a single generation call.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct GenerationResult {
    candidates: Vec<String>,
    tokens_generated: usize,
    stopped_on: Option<String>,
}

impl GenerationResult {
    /// Extract the primary candidate text.
    ///
    /// Repeated calls on the same result return the same text.
    pub fn extract_text(&self) -> Result<&str, GenerationError> {
        self.candidates
            .first()
            .map(String::as_str)
            .ok_or(GenerationError::MalformedResult)
    }

    /// The number of fragments the model produced.
    pub fn tokens_generated(&self) -> usize {
        self.tokens_generated
    }

    /// The stop sequence that halted generation, if any.
    pub fn stopped_on(&self) -> Option<&str> {
        self.stopped_on.as_deref()
    }
}

/// A quantized Llama chat model loaded from a local GGUF file.
///
/// The model handle is owned by the caller and released when it goes out of scope. Every
/// generation call is a single blocking pass: prompt in, fragments out, no retries.
pub struct InstructModel {
    model: LlamaModel,
}

impl InstructModel {
    /// Load the model file behind the given source.
    pub fn load(source: &ModelSource) -> Result<Self, SourceError> {
        let path = source.resolve()?;
        let model = LlamaModel::load_from_file(path, LlamaParams::default())?;
        Ok(Self { model })
    }

    /// Generate a completion for the prompt, forwarding each produced fragment to the
    /// sink.
    ///
    /// Generation halts after `max_tokens` fragments or as soon as one of the request's
    /// stop sequences appears in the produced text, whichever comes first. The returned
    /// candidate never includes the stop sequence, and the sink receives exactly the
    /// candidate text (without the echoed prompt when the request has `echo` set).
    pub fn generate(
        &self,
        prompt: &str,
        request: &GenerationRequest,
        sink: &mut dyn TokenSink,
    ) -> Result<GenerationResult, GenerationError> {
        let mut session = self.model.create_session(SessionParams {
            n_ctx: 2048,
            ..SessionParams::default()
        })?;
        session.advance_context(prompt)?;

        let sampler = StandardSampler::new_softmax(
            vec![
                SamplerStage::Temperature(request.temperature()),
                SamplerStage::TopP(request.top_p()),
            ],
            1,
        );
        let completions = session
            .start_completing_with(sampler, request.max_tokens() as usize)
            .into_strings();

        let mut buffer = StopBuffer::new(request.stop_sequences());
        let mut tokens_generated = 0;
        for fragment in completions {
            tracing::trace!("Generated fragment: {fragment}");
            tokens_generated += 1;
            if buffer.push(&fragment, sink) {
                break;
            }
        }
        let (completion, stopped_on) = buffer.finish(sink);

        let text = if request.echo() {
            format!("{prompt}{completion}")
        } else {
            completion
        };

        Ok(GenerationResult {
            candidates: vec![text],
            tokens_generated,
            stopped_on,
        })
    }
}

/// Accumulates produced fragments and forwards them to a sink, holding back the longest
/// prefix of any stop sequence so that text later revealed to be part of a stop sequence
/// is never emitted.
struct StopBuffer<'a> {
    stop_sequences: &'a [String],
    /// Bytes withheld from the sink: one less than the longest stop sequence.
    holdback: usize,
    text: String,
    /// Bytes of `text` already forwarded to the sink.
    emitted: usize,
    stopped_on: Option<&'a str>,
}

impl<'a> StopBuffer<'a> {
    fn new(stop_sequences: &'a [String]) -> Self {
        let holdback = stop_sequences
            .iter()
            .map(String::len)
            .max()
            .unwrap_or(0)
            .saturating_sub(1);
        Self {
            stop_sequences,
            holdback,
            text: String::new(),
            emitted: 0,
            stopped_on: None,
        }
    }

    /// Append a fragment, forwarding the prefix that can no longer be part of a stop
    /// sequence. Returns `true` once a stop sequence matched.
    fn push(&mut self, fragment: &str, sink: &mut dyn TokenSink) -> bool {
        self.text.push_str(fragment);
        if let Some((index, matched)) = find_stop(&self.text, self.stop_sequences) {
            if index > self.emitted {
                sink.push(&self.text[self.emitted..index]);
                self.emitted = index;
            }
            self.text.truncate(index);
            self.stopped_on = Some(matched);
            return true;
        }
        let mut safe = self.text.len().saturating_sub(self.holdback);
        while !self.text.is_char_boundary(safe) {
            safe -= 1;
        }
        if safe > self.emitted {
            sink.push(&self.text[self.emitted..safe]);
            self.emitted = safe;
        }
        false
    }

    /// Flush the held-back tail and return the final text together with the stop
    /// sequence that halted generation, if any.
    fn finish(self, sink: &mut dyn TokenSink) -> (String, Option<String>) {
        if self.text.len() > self.emitted {
            sink.push(&self.text[self.emitted..]);
        }
        (self.text, self.stopped_on.map(str::to_string))
    }
}

/// Find the earliest occurrence of any stop sequence in the produced text.
fn find_stop<'a>(text: &str, stop_sequences: &'a [String]) -> Option<(usize, &'a str)> {
    stop_sequences
        .iter()
        .filter_map(|stop| text.find(stop.as_str()).map(|index| (index, stop.as_str())))
        .min_by_key(|(index, _)| *index)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sink::CollectSink;
    use pretty_assertions::assert_eq;

    #[test]
    fn extract_text_returns_the_primary_candidate() {
        let result = GenerationResult {
            candidates: vec!["Mercury, Venus, Earth".to_string()],
            tokens_generated: 5,
            stopped_on: None,
        };

        let first = result.extract_text().unwrap();
        let second = result.extract_text().unwrap();
        assert_eq!(first, "Mercury, Venus, Earth");
        assert_eq!(first, second);
    }

    #[test]
    fn extract_text_fails_without_candidates() {
        let result = GenerationResult::default();
        assert!(matches!(
            result.extract_text(),
            Err(GenerationError::MalformedResult)
        ));
    }

    #[test]
    fn find_stop_picks_the_earliest_match() {
        let stops = vec!["Q:".to_string(), "\n".to_string()];
        assert_eq!(find_stop("Mercury\nQ: next", &stops), Some((7, "\n")));
        assert_eq!(find_stop("Q: immediately", &stops), Some((0, "Q:")));
        assert_eq!(find_stop("no stop here", &stops), None);
    }

    #[test]
    fn find_stop_with_no_sequences_matches_nothing() {
        assert_eq!(find_stop("anything at all", &[]), None);
    }

    #[test]
    fn stop_sequence_split_across_fragments_is_never_emitted() {
        let stops = vec!["Q:".to_string(), "\n".to_string()];
        let mut buffer = StopBuffer::new(&stops);
        let mut sink = CollectSink::new();

        assert!(!buffer.push("Mercury, Venus", &mut sink));
        // "Q" alone is not yet a stop sequence, so it must stay held back
        assert!(!buffer.push(" Q", &mut sink));
        assert!(buffer.push(":", &mut sink));
        let (text, stopped_on) = buffer.finish(&mut sink);

        assert_eq!(text, "Mercury, Venus ");
        assert_eq!(stopped_on.as_deref(), Some("Q:"));
        assert_eq!(sink.into_string(), "Mercury, Venus ");
    }

    #[test]
    fn held_back_tail_is_flushed_when_no_stop_matches() {
        let stops = vec!["Q:".to_string()];
        let mut buffer = StopBuffer::new(&stops);
        let mut sink = CollectSink::new();

        assert!(!buffer.push("The planets", &mut sink));
        assert!(!buffer.push(" orbit the sun.", &mut sink));
        let (text, stopped_on) = buffer.finish(&mut sink);

        assert_eq!(text, "The planets orbit the sun.");
        assert_eq!(stopped_on, None);
        assert_eq!(sink.into_string(), "The planets orbit the sun.");
    }

    #[test]
    fn without_stop_sequences_fragments_pass_straight_through() {
        let mut buffer = StopBuffer::new(&[]);
        let mut sink = CollectSink::new();

        assert!(!buffer.push("Hello", &mut sink));
        assert_eq!(sink.as_str(), "Hello");
        let (text, stopped_on) = buffer.finish(&mut sink);

        assert_eq!(text, "Hello");
        assert_eq!(stopped_on, None);
        assert_eq!(sink.into_string(), "Hello");
    }
}
