use thiserror::Error;

/// Errors raised by repository implementations.
#[derive(Debug, Error)]
pub enum RepositoryError {
    #[error("database error: {0}")]
    Database(#[from] diesel::result::Error),
    #[error("connection pool error: {0}")]
    Pool(#[from] diesel::r2d2::PoolError),
    #[error("stored value is invalid: {0}")]
    ValidationError(String),
    #[error("failed to encode visa types: {0}")]
    Serialization(#[from] serde_json::Error),
    #[error("migration failed: {0}")]
    Migration(String),
    #[error("not found")]
    NotFound,
}

pub type RepositoryResult<T> = Result<T, RepositoryError>;
