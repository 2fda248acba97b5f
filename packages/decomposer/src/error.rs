use sitegen_common::GenerationError;
use sitegen_tree::TreeError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum DecomposeError {
    #[error("HTML parse error: {0}")]
    Parse(#[from] std::io::Error),

    #[error("Tree error: {0}")]
    Tree(#[from] TreeError),
}

/// Why an assisted decomposition was discarded in favour of the fallback
#[derive(Error, Debug)]
pub enum AssistError {
    #[error("generation failed: {0}")]
    Generation(#[from] GenerationError),

    #[error("response contains no JSON object")]
    NoJson,

    #[error("response root is not a container with a children array")]
    NotContainerRoot,

    #[error("response does not match the node schema: {0}")]
    Schema(#[from] serde_json::Error),

    #[error("response contains duplicate or empty ids: {0:?}")]
    InvalidIds(Vec<String>),
}
