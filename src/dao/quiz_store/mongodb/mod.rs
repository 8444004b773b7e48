mod config;
mod connection;
mod error;
mod models;
mod store;

pub use config::MongoConfig;
pub use error::MongoDaoError;
pub use store::MongoQuizStore;

use crate::dao::storage::StorageError;

impl From<MongoDaoError> for StorageError {
    fn from(err: MongoDaoError) -> Self {
        match err {
            MongoDaoError::DuplicateQuiz { id } => StorageError::Duplicate { id },
            other => StorageError::unavailable(other.to_string(), other),
        }
    }
}

#[cfg(test)]
mod tests {
    use uuid::Uuid;

    use super::*;
    use crate::error::{AppError, ServiceError};

    #[test]
    fn duplicate_quiz_is_a_conflict_like_in_memory() {
        let id = Uuid::new_v4();

        let storage = StorageError::from(MongoDaoError::DuplicateQuiz { id });
        assert!(matches!(storage, StorageError::Duplicate { id: dup } if dup == id));
        assert!(matches!(
            AppError::from(ServiceError::from(storage)),
            AppError::Conflict(_)
        ));
    }

    #[test]
    fn other_failures_stay_unavailable() {
        let storage = StorageError::from(MongoDaoError::MissingEnvVar { var: "MONGO_URI" });
        assert!(matches!(storage, StorageError::Unavailable { .. }));
    }
}
