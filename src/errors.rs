//! Error types for the factory boundary

use thiserror::Error;

/// Failures at the resource factory boundary.
///
/// State transitions never produce these: a refused transition is a
/// normal lost race and is reported as a value, not an error. Only
/// manufacturing, validating, and destroying the underlying resource
/// can genuinely fail.
#[derive(Error, Debug, Clone)]
pub enum PoolError {
    #[error("failed to create a pooled resource: {0}")]
    Creation(String),

    #[error("pooled resource failed validation")]
    ValidationFailed,

    #[error("failed to destroy a pooled resource: {0}")]
    Destruction(String),
}

pub type PoolResult<T> = Result<T, PoolError>;
