use thiserror::Error;

/// Failures of the project blob store
#[derive(Error, Debug)]
pub enum StoreError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("File not found: {project}/{path}")]
    NotFound { project: String, path: String },

    #[error("Invalid path: {0}")]
    InvalidPath(String),

    #[error("File is not valid UTF-8: {0}")]
    NotText(String),
}

/// Failures of the external generation capability
#[derive(Error, Debug, Clone, PartialEq)]
pub enum GenerationError {
    #[error("Generation backend unavailable: {0}")]
    Unavailable(String),

    #[error("Generation request failed: {0}")]
    Failed(String),

    #[error("No scripted response left for prompt")]
    Exhausted,
}
