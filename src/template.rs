use std::fmt::Display;

use minijinja::{context, Environment};

/// An error that can occur when compiling or rendering a [`PromptTemplate`].
#[derive(Debug, thiserror::Error)]
pub enum TemplateError {
    /// The template failed to compile or render.
    #[error("Template error: {0}")]
    Template(#[from] minijinja::Error),
}

/// A prompt template with a single `{{ text }}` substitution slot.
///
/// ```rust
/// # use rinstruct::PromptTemplate;
/// let template = PromptTemplate::new("<s>[INST] {{ text }} [/INST]").unwrap();
/// let prompt = template.render("Explain gravity").unwrap();
/// assert_eq!(prompt, "<s>[INST] Explain gravity [/INST]");
/// ```
pub struct PromptTemplate {
    environment: Environment<'static>,
}

impl PromptTemplate {
    /// Compile a template. The template may reference the `text` variable.
    pub fn new(template: impl Display) -> Result<Self, TemplateError> {
        let template = template.to_string();
        let mut environment = Environment::new();
        environment.add_template_owned("prompt", template)?;
        Ok(Self { environment })
    }

    /// Render the template with the given substitution value.
    pub fn render(&self, text: &str) -> Result<String, TemplateError> {
        let template = self.environment.get_template("prompt")?;
        let rendered = template.render(context! { text })?;
        Ok(rendered)
    }
}
