use std::sync::Arc;

use dashmap::DashMap;
use futures::future::BoxFuture;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::dao::{
    models::{QuestionEntity, QuizEntity},
    quiz_store::QuizStore,
    storage::{StorageError, StorageResult},
};

/// Quiz store keeping everything in process memory.
#[derive(Clone, Default)]
pub struct MemoryQuizStore {
    quizzes: Arc<RwLock<Vec<QuizEntity>>>,
    questions: Arc<DashMap<Uuid, QuestionEntity>>,
}

impl MemoryQuizStore {
    /// Empty store.
    pub fn new() -> Self {
        Self::default()
    }

    async fn latest_quiz(&self, game_id: Option<String>) -> Option<QuizEntity> {
        let quizzes = self.quizzes.read().await;
        quizzes
            .iter()
            .filter(|quiz| quiz.matches_game(game_id.as_deref()))
            .min_by(|a, b| QuizEntity::newest_first(a, b))
            .cloned()
    }

    async fn insert_quiz(&self, quiz: QuizEntity) -> StorageResult<()> {
        let mut quizzes = self.quizzes.write().await;

        if quizzes.iter().any(|existing| existing.id == quiz.id) {
            return Err(StorageError::Duplicate { id: quiz.id });
        }
        if let Some(question) = quiz
            .questions
            .iter()
            .find(|question| self.questions.contains_key(&question.id))
        {
            return Err(StorageError::Duplicate { id: question.id });
        }

        for question in &quiz.questions {
            self.questions.insert(question.id, question.clone());
        }
        quizzes.push(quiz);
        Ok(())
    }
}

impl QuizStore for MemoryQuizStore {
    fn latest_quiz(
        &self,
        game_id: Option<String>,
    ) -> BoxFuture<'static, StorageResult<Option<QuizEntity>>> {
        let store = self.clone();
        Box::pin(async move { Ok(store.latest_quiz(game_id).await) })
    }

    fn find_question(&self, id: Uuid) -> BoxFuture<'static, StorageResult<Option<QuestionEntity>>> {
        let found = self.questions.get(&id).map(|entry| entry.value().clone());
        Box::pin(async move { Ok(found) })
    }

    fn insert_quiz(&self, quiz: QuizEntity) -> BoxFuture<'static, StorageResult<()>> {
        let store = self.clone();
        Box::pin(async move { store.insert_quiz(quiz).await })
    }

    fn health_check(&self) -> BoxFuture<'static, StorageResult<()>> {
        Box::pin(async { Ok(()) })
    }

    fn try_reconnect(&self) -> BoxFuture<'static, StorageResult<()>> {
        Box::pin(async { Ok(()) })
    }
}

#[cfg(test)]
mod tests {
    use std::time::{Duration, SystemTime};

    use super::*;

    fn quiz(title: &str, date: Option<&str>, game_id: Option<&str>) -> QuizEntity {
        let id = Uuid::new_v4();
        QuizEntity {
            id,
            title: title.into(),
            date: date.map(Into::into),
            game_id: game_id.map(Into::into),
            created_at: SystemTime::now(),
            questions: vec![QuestionEntity {
                id: Uuid::new_v4(),
                quiz_id: id,
                text: "Who won the 2010 World Cup?".into(),
                options: vec!["Spain".into(), "Netherlands".into()],
                correct: "Spain".into(),
                explanation: None,
                difficulty: None,
                category: None,
            }],
        }
    }

    #[tokio::test]
    async fn latest_quiz_prefers_newest_date_then_creation() {
        let store = MemoryQuizStore::new();
        assert!(store.latest_quiz(None).await.is_none());

        store.insert_quiz(quiz("old", Some("2026-10-01"), None)).await.unwrap();
        let mut newest = quiz("today", Some("2026-10-18"), None);
        store.insert_quiz(newest.clone()).await.unwrap();
        newest.id = Uuid::new_v4();
        newest.title = "today again".into();
        newest.created_at += Duration::from_secs(60);
        newest.questions.clear();
        store.insert_quiz(newest).await.unwrap();

        let latest = QuizStore::latest_quiz(&store, None).await.unwrap().unwrap();
        assert_eq!(latest.title, "today again");
    }

    #[tokio::test]
    async fn latest_quiz_filters_by_game() {
        let store = MemoryQuizStore::new();
        store
            .insert_quiz(quiz("trivia", Some("2026-10-18"), Some("daily-trivia")))
            .await
            .unwrap();
        store
            .insert_quiz(quiz("players", Some("2026-10-17"), Some("player-guess")))
            .await
            .unwrap();

        let latest = store.latest_quiz(Some("player-guess".into())).await.unwrap();
        assert_eq!(latest.title, "players");
        assert!(store.latest_quiz(Some("club-quiz".into())).await.is_none());
    }

    #[tokio::test]
    async fn questions_are_indexed_and_duplicates_rejected() {
        let store = MemoryQuizStore::new();
        let entity = quiz("q", None, None);
        let question_id = entity.questions[0].id;
        store.insert_quiz(entity.clone()).await.unwrap();

        let found = QuizStore::find_question(&store, question_id).await.unwrap();
        assert_eq!(found.map(|q| q.correct), Some("Spain".to_string()));

        let err = store.insert_quiz(entity).await.unwrap_err();
        assert!(matches!(err, StorageError::Duplicate { .. }));
    }
}
