use crate::error::{GenerationError, StoreError};

/// Result of a store operation
pub type StoreResult<T> = Result<T, StoreError>;

/// Result of a generation call
pub type GenerationResult<T> = Result<T, GenerationError>;
