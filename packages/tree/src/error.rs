use crate::node::NodeKind;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum TreeError {
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Root node must be a container, found {0}")]
    InvalidRoot(NodeKind),

    #[error("Node not found: {0}")]
    NodeNotFound(String),
}

pub type TreeResult<T> = Result<T, TreeError>;
