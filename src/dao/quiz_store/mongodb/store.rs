use std::sync::Arc;

use futures::future::BoxFuture;
use mongodb::{Client, Collection, Database, IndexModel, bson::doc, options::IndexOptions};
use tokio::sync::RwLock;
use uuid::Uuid;

use super::{
    config::MongoConfig,
    connection::establish_connection,
    error::{MongoDaoError, MongoResult, is_duplicate_key},
    models::{MongoQuizDocument, game_filter, question_filter},
};
use crate::dao::{
    models::{QuestionEntity, QuizEntity},
    quiz_store::QuizStore,
    storage::StorageResult,
};

const QUIZ_COLLECTION_NAME: &str = "quizzes";

/// MongoDB-backed [`QuizStore`].
#[derive(Clone)]
pub struct MongoQuizStore {
    inner: Arc<MongoInner>,
}

struct MongoInner {
    state: RwLock<MongoState>,
    config: MongoConfig,
}

struct MongoState {
    #[allow(dead_code)]
    client: Client,
    database: Database,
}

impl MongoInner {
    async fn ping(&self) -> MongoResult<()> {
        let database = {
            let guard = self.state.read().await;
            guard.database.clone()
        };

        database
            .run_command(doc! { "ping": 1 })
            .await
            .map_err(|source| MongoDaoError::HealthPing { source })?;
        Ok(())
    }

    async fn reconnect(&self) -> MongoResult<()> {
        let (client, database) =
            establish_connection(&self.config.options, &self.config.database_name).await?;
        let mut guard = self.state.write().await;
        guard.client = client;
        guard.database = database;
        Ok(())
    }
}

impl MongoQuizStore {
    /// Establish a connection to MongoDB and ensure indexes are present.
    pub async fn connect(config: MongoConfig) -> MongoResult<Self> {
        let (client, database) =
            establish_connection(&config.options, &config.database_name).await?;

        let inner = Arc::new(MongoInner {
            state: RwLock::new(MongoState { client, database }),
            config,
        });

        let store = Self { inner };
        store.ensure_indexes().await?;
        Ok(store)
    }

    async fn ensure_indexes(&self) -> MongoResult<()> {
        let collection = self.collection().await;

        let latest = IndexModel::builder()
            .keys(doc! {"game_id": 1, "date": -1, "created_at": -1})
            .options(
                IndexOptions::builder()
                    .name(Some("quiz_latest_idx".to_owned()))
                    .build(),
            )
            .build();
        collection
            .create_index(latest)
            .await
            .map_err(|source| MongoDaoError::EnsureIndex {
                collection: QUIZ_COLLECTION_NAME,
                index: "game_id,date,created_at",
                source,
            })?;

        let questions = IndexModel::builder()
            .keys(doc! {"questions.id": 1})
            .options(
                IndexOptions::builder()
                    .name(Some("quiz_question_idx".to_owned()))
                    .unique(Some(true))
                    .build(),
            )
            .build();
        collection
            .create_index(questions)
            .await
            .map_err(|source| MongoDaoError::EnsureIndex {
                collection: QUIZ_COLLECTION_NAME,
                index: "questions.id",
                source,
            })?;

        Ok(())
    }

    async fn collection(&self) -> Collection<MongoQuizDocument> {
        let guard = self.inner.state.read().await;
        guard
            .database
            .collection::<MongoQuizDocument>(QUIZ_COLLECTION_NAME)
    }

    async fn latest_quiz(&self, game_id: Option<String>) -> MongoResult<Option<QuizEntity>> {
        let collection = self.collection().await;

        let document = collection
            .find_one(game_filter(game_id.as_deref()))
            .sort(doc! {"date": -1, "created_at": -1})
            .await
            .map_err(|source| MongoDaoError::LatestQuiz { source })?;

        document.map(QuizEntity::try_from).transpose()
    }

    async fn find_question(&self, id: Uuid) -> MongoResult<Option<QuestionEntity>> {
        let collection = self.collection().await;

        let document = collection
            .find_one(question_filter(id))
            .await
            .map_err(|source| MongoDaoError::LoadQuestion { id, source })?;

        let Some(document) = document else {
            return Ok(None);
        };

        let quiz = QuizEntity::try_from(document)?;
        Ok(quiz.questions.into_iter().find(|question| question.id == id))
    }

    async fn insert_quiz(&self, quiz: QuizEntity) -> MongoResult<()> {
        let id = quiz.id;
        let document: MongoQuizDocument = quiz.into();
        let collection = self.collection().await;

        collection.insert_one(&document).await.map_err(|source| {
            if is_duplicate_key(&source) {
                MongoDaoError::DuplicateQuiz { id }
            } else {
                MongoDaoError::InsertQuiz { id, source }
            }
        })?;

        Ok(())
    }
}

impl QuizStore for MongoQuizStore {
    fn latest_quiz(
        &self,
        game_id: Option<String>,
    ) -> BoxFuture<'static, StorageResult<Option<QuizEntity>>> {
        let store = self.clone();
        Box::pin(async move { store.latest_quiz(game_id).await.map_err(Into::into) })
    }

    fn find_question(&self, id: Uuid) -> BoxFuture<'static, StorageResult<Option<QuestionEntity>>> {
        let store = self.clone();
        Box::pin(async move { store.find_question(id).await.map_err(Into::into) })
    }

    fn insert_quiz(&self, quiz: QuizEntity) -> BoxFuture<'static, StorageResult<()>> {
        let store = self.clone();
        Box::pin(async move { store.insert_quiz(quiz).await.map_err(Into::into) })
    }

    fn health_check(&self) -> BoxFuture<'static, StorageResult<()>> {
        let store = self.clone();
        Box::pin(async move { store.inner.ping().await.map_err(Into::into) })
    }

    fn try_reconnect(&self) -> BoxFuture<'static, StorageResult<()>> {
        let store = self.clone();
        Box::pin(async move { store.inner.reconnect().await.map_err(Into::into) })
    }
}
