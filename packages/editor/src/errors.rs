//! Error types for the editor

use crate::mutations::MutationError;
use sitegen_common::{GenerationError, StoreError};
use sitegen_compiler_html::CompileError;
use sitegen_decomposer::DecomposeError;
use sitegen_tree::TreeError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum EditorError {
    #[error("Mutation error: {0}")]
    Mutation(#[from] MutationError),

    #[error("Tree error: {0}")]
    Tree(#[from] TreeError),

    #[error("Store error: {0}")]
    Store(#[from] StoreError),

    #[error("Generation error: {0}")]
    Generation(#[from] GenerationError),

    #[error("Compile error: {0}")]
    Compile(#[from] CompileError),

    #[error("Decompose error: {0}")]
    Decompose(#[from] DecomposeError),

    #[error("Another generation flow is already running")]
    Busy,

    #[error("Tree changed while waiting for generation (started at version {started}, now {current})")]
    Stale { started: u64, current: u64 },

    #[error("Malformed generation response: {0}")]
    MalformedResponse(String),
}
