use std::io::Write;

/// A consumer for generated text, invoked once per produced fragment.
pub trait TokenSink {
    /// Receive the next fragment of generated text.
    fn push(&mut self, fragment: &str);
}

/// A sink that writes each fragment to stdout as it is produced.
#[derive(Default)]
pub struct StdoutSink {
    _private: (),
}

impl StdoutSink {
    /// Create a new stdout sink.
    pub fn new() -> Self {
        Self::default()
    }
}

impl TokenSink for StdoutSink {
    fn push(&mut self, fragment: &str) {
        print!("{fragment}");
        let _ = std::io::stdout().flush();
    }
}

/// A sink that accumulates fragments into a string.
#[derive(Default)]
pub struct CollectSink {
    collected: String,
}

impl CollectSink {
    /// Create a new collecting sink.
    pub fn new() -> Self {
        Self::default()
    }

    /// The text collected so far.
    pub fn as_str(&self) -> &str {
        &self.collected
    }

    /// Consume the sink and return the collected text.
    pub fn into_string(self) -> String {
        self.collected
    }
}

impl TokenSink for CollectSink {
    fn push(&mut self, fragment: &str) {
        self.collected.push_str(fragment);
    }
}

/// A sink that discards every fragment.
pub struct NullSink;

impl TokenSink for NullSink {
    fn push(&mut self, _fragment: &str) {}
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn collect_sink_concatenates_fragments_in_order() {
        let mut sink = CollectSink::new();
        sink.push("The ");
        sink.push("planets");
        sink.push(" orbit the sun.");
        assert_eq!(sink.as_str(), "The planets orbit the sun.");
        assert_eq!(sink.into_string(), "The planets orbit the sun.");
    }
}
