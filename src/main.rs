use std::io::{self, BufRead, Write};
use std::path::PathBuf;

use anyhow::Result;
use clap::Parser;
use rinstruct::{
    format_prompt, ChatMarkers, GenerationRequest, InstructModel, ModelSource, NullSink,
    PromptTemplate, StdoutSink,
};

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// The path to the GGUF model file. Defaults to the RINSTRUCT_MODEL environment
    /// variable.
    #[arg(short, long)]
    model: Option<PathBuf>,
}

/// The three demo modes.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Mode {
    Direct,
    Templated,
    Interactive,
}

impl Mode {
    /// Parse a menu choice. Anything other than 1, 2 or 3 is unrecognized.
    fn from_choice(choice: &str) -> Option<Self> {
        match choice.trim() {
            "1" => Some(Self::Direct),
            "2" => Some(Self::Templated),
            "3" => Some(Self::Interactive),
            _ => None,
        }
    }
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();
    let source = match cli.model {
        Some(path) => ModelSource::new(path),
        None => ModelSource::from_env()?,
    };

    println!("Local LLM demo using Llama 2 chat");
    println!("=================================");
    println!("1. Direct example (planets question)");
    println!("2. Templated example (solar system explanation)");
    println!("3. Interactive mode (ask your own question)");
    print!("\nSelect an option (1-3): ");
    io::stdout().flush()?;

    let mut choice = String::new();
    io::stdin().lock().read_line(&mut choice)?;

    match Mode::from_choice(&choice) {
        Some(Mode::Direct) => direct_example(&source),
        Some(Mode::Templated) => templated_example(&source),
        Some(Mode::Interactive) => interactive_mode(&source),
        None => {
            println!("Invalid choice. Exiting.");
            Ok(())
        }
    }
}

/// Ask the fixed planets question through a plain binding-level call.
fn direct_example(source: &ModelSource) -> Result<()> {
    let model = InstructModel::load(source)?;
    let prompt = format_prompt(
        &ChatMarkers::llama_2_chat(),
        "You are a helpful assistant",
        "Q: Name the planets in the solar system? A: ",
    );
    let request = GenerationRequest::default()
        .with_max_tokens(32)
        .with_stop_sequences(["Q:", "\n"])
        .with_echo(true);

    println!("Generating response...");
    let result = model.generate(&prompt, &request, &mut NullSink)?;

    println!("\nFull output:");
    println!("{result:?}");
    println!("\nGenerated text:");
    println!("{}", result.extract_text()?);
    Ok(())
}

/// Render a one-slot template and stream the response to stdout.
fn templated_example(source: &ModelSource) -> Result<()> {
    let template = PromptTemplate::new(
        "<s>[INST] <<SYS>>\nAct as an astronomer teaching high school students.\n<</SYS>>\n{{ text }} [/INST]",
    )?;
    let prompt = template.render("Explain what is the solar system in 2-3 sentences")?;
    println!("Formatted prompt:");
    println!("{prompt}");

    let model = InstructModel::load(source)?;
    let request = GenerationRequest::default()
        .with_max_tokens(500)
        .with_temperature(0.5)
        .with_top_p(1.0);

    println!("\nGenerating response...");
    let mut sink = StdoutSink::new();
    let result = model.generate(&prompt, &request, &mut sink)?;

    println!("\n\nFinal output:");
    println!("{}", result.extract_text()?);
    Ok(())
}

/// Read one question from the user and print one generated response.
fn interactive_mode(source: &ModelSource) -> Result<()> {
    let model = InstructModel::load(source)?;

    print!("Enter your question: ");
    io::stdout().flush()?;
    let mut input = String::new();
    io::stdin().lock().read_line(&mut input)?;

    let user_message = format!("Q: {} A: ", input.trim());
    let prompt = format_prompt(
        &ChatMarkers::llama_2_chat(),
        "You are a helpful assistant",
        &user_message,
    );
    let request = GenerationRequest::default()
        .with_max_tokens(500)
        .with_stop_sequences(["Q:", "\n"])
        .with_echo(true);

    println!("Generating response...");
    let result = model.generate(&prompt, &request, &mut NullSink)?;

    println!("\nGenerated text:");
    println!("{}", result.extract_text()?);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn menu_choices_map_to_modes() {
        assert_eq!(Mode::from_choice("1"), Some(Mode::Direct));
        assert_eq!(Mode::from_choice("2"), Some(Mode::Templated));
        assert_eq!(Mode::from_choice("3\n"), Some(Mode::Interactive));
    }

    #[test]
    fn unrecognized_choice_selects_no_mode() {
        assert_eq!(Mode::from_choice("9"), None);
        assert_eq!(Mode::from_choice(""), None);
        assert_eq!(Mode::from_choice("one"), None);
    }
}
