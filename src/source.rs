use std::path::{Path, PathBuf};

/// The environment variable consulted by [`ModelSource::from_env`].
pub const MODEL_PATH_VAR: &str = "RINSTRUCT_MODEL";

/// An error that can occur when locating or loading the model file.
#[derive(Debug, thiserror::Error)]
pub enum SourceError {
    /// The model file does not exist at the configured path.
    #[error("Model file not found: {0}")]
    ModelNotFound(PathBuf),
    /// No model path was configured.
    #[error("No model path configured: set the {MODEL_PATH_VAR} environment variable or pass a path")]
    ModelPathNotSet,
    /// llama.cpp failed to load the model file.
    #[error("Failed to load model: {0}")]
    Load(#[from] llama_cpp::LlamaLoadError),
}

/// The location of a quantized GGUF model file on the local filesystem.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ModelSource {
    path: PathBuf,
}

impl ModelSource {
    /// Create a source for the model file at the given path.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Create a source from the `RINSTRUCT_MODEL` environment variable.
    pub fn from_env() -> Result<Self, SourceError> {
        match std::env::var_os(MODEL_PATH_VAR) {
            Some(path) => Ok(Self::new(PathBuf::from(path))),
            None => Err(SourceError::ModelPathNotSet),
        }
    }

    /// Get the configured path without checking that it exists.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Resolve the source to an existing file.
    pub(crate) fn resolve(&self) -> Result<&Path, SourceError> {
        if self.path.is_file() {
            Ok(&self.path)
        } else {
            Err(SourceError::ModelNotFound(self.path.clone()))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn missing_file_resolves_to_model_not_found() {
        let source = ModelSource::new("/nonexistent/llama-2-7b-chat.Q2_K.gguf");
        match source.resolve() {
            Err(SourceError::ModelNotFound(path)) => {
                assert_eq!(path, source.path());
            }
            other => panic!("expected ModelNotFound, got {other:?}"),
        }
    }

    #[test]
    fn path_is_kept_verbatim() {
        let source = ModelSource::new("models/llama-2-7b-chat.Q2_K.gguf");
        assert_eq!(source.path(), Path::new("models/llama-2-7b-chat.Q2_K.gguf"));
    }
}
