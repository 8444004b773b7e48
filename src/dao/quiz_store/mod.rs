/// In-process store used for development and tests.
pub mod memory;
/// MongoDB backend.
#[cfg(feature = "mongo-store")]
pub mod mongodb;

use crate::dao::models::{QuestionEntity, QuizEntity};
use crate::dao::storage::StorageResult;
use futures::future::BoxFuture;
use uuid::Uuid;

/// Abstraction over the persistence layer for quizzes and their questions.
pub trait QuizStore: Send + Sync {
    /// Quiz to serve right now: latest date first, then most recently created.
    fn latest_quiz(
        &self,
        game_id: Option<String>,
    ) -> BoxFuture<'static, StorageResult<Option<QuizEntity>>>;
    /// Question with this id, in any stored quiz.
    fn find_question(&self, id: Uuid) -> BoxFuture<'static, StorageResult<Option<QuestionEntity>>>;
    /// Store a new quiz; identifiers already in use are rejected as duplicates.
    fn insert_quiz(&self, quiz: QuizEntity) -> BoxFuture<'static, StorageResult<()>>;
    /// Cheap round trip proving the backend is reachable.
    fn health_check(&self) -> BoxFuture<'static, StorageResult<()>>;
    /// Re-establish the backend connection in place.
    fn try_reconnect(&self) -> BoxFuture<'static, StorageResult<()>>;
}
