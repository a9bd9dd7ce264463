/// Parameters to use when generating text.
///
/// A request is created per invocation and is not modified by the generation call. The
/// values are forwarded to the model as-is; in particular `max_tokens` is not clamped or
/// validated locally.
#[derive(Debug, Clone, PartialEq)]
pub struct GenerationRequest {
    pub(crate) max_tokens: u32,
    pub(crate) stop_sequences: Vec<String>,
    pub(crate) echo: bool,
    pub(crate) temperature: f32,
    pub(crate) top_p: f32,
}

impl Default for GenerationRequest {
    fn default() -> Self {
        Self {
            max_tokens: 128,
            stop_sequences: Vec::new(),
            echo: false,
            temperature: 0.8,
            top_p: 0.95,
        }
    }
}

impl GenerationRequest {
    /// Set the maximum number of tokens to generate.
    pub fn with_max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = max_tokens;
        self
    }

    /// Set the strings that halt further token production when they appear in the
    /// generated text.
    pub fn with_stop_sequences(
        mut self,
        stop_sequences: impl IntoIterator<Item = impl Into<String>>,
    ) -> Self {
        self.stop_sequences = stop_sequences.into_iter().map(Into::into).collect();
        self
    }

    /// Set whether the prompt is included at the start of the returned text. The echoed
    /// prefix is returned exactly as fed to the model; it is never stripped afterwards.
    pub fn with_echo(mut self, echo: bool) -> Self {
        self.echo = echo;
        self
    }

    /// Set the sampling temperature to use when generating text.
    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = temperature;
        self
    }

    /// Set the nucleus sampling probability to use when generating text.
    pub fn with_top_p(mut self, top_p: f32) -> Self {
        self.top_p = top_p;
        self
    }

    /// Get the maximum number of tokens to generate.
    pub fn max_tokens(&self) -> u32 {
        self.max_tokens
    }

    /// Get the strings that halt further token production.
    pub fn stop_sequences(&self) -> &[String] {
        &self.stop_sequences
    }

    /// Get whether the prompt is included at the start of the returned text.
    pub fn echo(&self) -> bool {
        self.echo
    }

    /// Get the sampling temperature to use when generating text.
    pub fn temperature(&self) -> f32 {
        self.temperature
    }

    /// Get the nucleus sampling probability to use when generating text.
    pub fn top_p(&self) -> f32 {
        self.top_p
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn builder_overrides_defaults() {
        let request = GenerationRequest::default()
            .with_max_tokens(32)
            .with_stop_sequences(["Q:", "\n"])
            .with_echo(true)
            .with_temperature(0.5)
            .with_top_p(1.0);

        assert_eq!(request.max_tokens(), 32);
        assert_eq!(request.stop_sequences(), ["Q:".to_string(), "\n".to_string()]);
        assert!(request.echo());
        assert_eq!(request.temperature(), 0.5);
        assert_eq!(request.top_p(), 1.0);
    }

    #[test]
    fn max_tokens_zero_is_passed_through() {
        let request = GenerationRequest::default().with_max_tokens(0);
        assert_eq!(request.max_tokens(), 0);
    }
}
