use std::error::Error;
use thiserror::Error;
use uuid::Uuid;

/// Result alias for quiz storage operations.
pub type StorageResult<T> = Result<T, StorageError>;

/// Error raised by quiz stores regardless of the underlying database.
#[derive(Debug, Error)]
pub enum StorageError {
    /// The backend could not be reached or rejected the operation.
    #[error("storage unavailable: {message}")]
    Unavailable {
        /// Human readable description of the failing operation.
        message: String,
        /// Backend failure.
        #[source]
        source: Box<dyn Error + Send + Sync>,
    },
    /// A quiz or question with the same identifier is already stored.
    #[error("duplicate identifier `{id}`")]
    Duplicate {
        /// Conflicting identifier.
        id: Uuid,
    },
}

impl StorageError {
    /// Construct an unavailable error from any backend failure.
    pub fn unavailable(message: String, source: impl Error + Send + Sync + 'static) -> Self {
        StorageError::Unavailable {
            message,
            source: Box::new(source),
        }
    }
}
