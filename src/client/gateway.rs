//! HTTP boundary between a client session and the quiz server.

use std::time::Duration;

use futures::future::BoxFuture;
use reqwest::{Client, RequestBuilder, Response, StatusCode};
use serde::{Deserialize, de::DeserializeOwned};
use thiserror::Error;
use tracing::debug;

use crate::{
    client::machine::Notice,
    domain::{GameType, Quiz},
    dto::quiz::{AnswerRequest, AnswerResponse, QuizResponse},
};

const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// Failures talking to the quiz server.
#[derive(Debug, Error)]
pub enum GatewayError {
    /// The HTTP client could not be configured.
    #[error("failed to build HTTP client")]
    Client(#[source] reqwest::Error),
    /// The server answered 404.
    #[error("not found: {0}")]
    NotFound(String),
    /// The request never got an answer.
    #[error("request to the quiz server failed")]
    Network(#[source] reqwest::Error),
    /// Any other non-success status.
    #[error("quiz server answered {status}: {message}")]
    Status {
        /// HTTP status code.
        status: u16,
        /// `message` of the error body, or the status text.
        message: String,
    },
    /// The body was not the expected JSON.
    #[error("quiz server sent an unreadable response")]
    Decode(#[source] reqwest::Error),
    /// The body parsed but contradicts itself.
    #[error("quiz server sent inconsistent data: {0}")]
    Malformed(String),
}

impl GatewayError {
    /// User-facing notice for this failure.
    pub fn notice(&self) -> Notice {
        match self {
            GatewayError::NotFound(_) => Notice::NotFound("no quiz available right now".into()),
            GatewayError::Client(_) | GatewayError::Network(_) => {
                Notice::Network("could not reach the quiz server, please try again".into())
            }
            GatewayError::Status { status, .. } if *status >= 500 => {
                Notice::Network(format!("the quiz server is unavailable ({status})"))
            }
            GatewayError::Status { message, .. } => Notice::Malformed(message.clone()),
            GatewayError::Decode(_) | GatewayError::Malformed(_) => {
                Notice::Malformed("the quiz could not be read".into())
            }
        }
    }
}

/// Remote operations a client session depends on.
pub trait QuizGateway: Send + Sync {
    /// Quiz to play now, optionally for one catalog game.
    fn fetch_quiz(&self, game_id: Option<String>) -> BoxFuture<'static, Result<Quiz, GatewayError>>;
    /// Ask the server to grade `selected`. Advisory; the session grades locally.
    fn submit_answer(
        &self,
        question_id: String,
        selected: String,
    ) -> BoxFuture<'static, Result<bool, GatewayError>>;
    /// Game catalog served by the server.
    fn fetch_catalog(&self) -> BoxFuture<'static, Result<Vec<GameType>, GatewayError>>;
}

/// [`QuizGateway`] talking JSON to the quiz REST API.
#[derive(Debug, Clone)]
pub struct HttpQuizGateway {
    client: Client,
    base_url: String,
}

#[derive(Deserialize)]
struct ErrorBody {
    message: String,
}

impl HttpQuizGateway {
    /// Gateway with its own client and a request timeout.
    pub fn new(base_url: impl Into<String>) -> Result<Self, GatewayError> {
        let client = Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(GatewayError::Client)?;
        Ok(Self::with_client(client, base_url))
    }

    /// Gateway reusing `client`.
    pub fn with_client(client: Client, base_url: impl Into<String>) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_owned();
        Self { client, base_url }
    }

    /// Server root, without a trailing slash.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}{path}", self.base_url)
    }

    async fn fetch_quiz(&self, game_id: Option<String>) -> Result<Quiz, GatewayError> {
        let mut request = self.client.get(self.url("/quiz"));
        if let Some(game_id) = &game_id {
            request = request.query(&[("game", game_id)]);
        }

        let quiz: Quiz = send_json::<QuizResponse>(request).await?.into();
        check_quiz(&quiz)?;
        debug!(quiz_id = %quiz.id, questions = quiz.questions.len(), "fetched quiz");
        Ok(quiz)
    }

    async fn submit_answer(&self, question_id: String, selected: String) -> Result<bool, GatewayError> {
        let request = self.client.post(self.url("/quiz/answer")).json(&AnswerRequest {
            question_id,
            selected_option: selected,
        });
        let response: AnswerResponse = send_json(request).await?;
        Ok(response.correct)
    }

    async fn fetch_catalog(&self) -> Result<Vec<GameType>, GatewayError> {
        send_json(self.client.get(self.url("/games"))).await
    }
}

impl QuizGateway for HttpQuizGateway {
    fn fetch_quiz(&self, game_id: Option<String>) -> BoxFuture<'static, Result<Quiz, GatewayError>> {
        let gateway = self.clone();
        Box::pin(async move { gateway.fetch_quiz(game_id).await })
    }

    fn submit_answer(
        &self,
        question_id: String,
        selected: String,
    ) -> BoxFuture<'static, Result<bool, GatewayError>> {
        let gateway = self.clone();
        Box::pin(async move { gateway.submit_answer(question_id, selected).await })
    }

    fn fetch_catalog(&self) -> BoxFuture<'static, Result<Vec<GameType>, GatewayError>> {
        let gateway = self.clone();
        Box::pin(async move { gateway.fetch_catalog().await })
    }
}

async fn send_json<T: DeserializeOwned>(request: RequestBuilder) -> Result<T, GatewayError> {
    let response = request.send().await.map_err(GatewayError::Network)?;
    let status = response.status();

    if status == StatusCode::NOT_FOUND {
        return Err(GatewayError::NotFound(error_message(response).await));
    }
    if !status.is_success() {
        return Err(GatewayError::Status {
            status: status.as_u16(),
            message: error_message(response).await,
        });
    }

    response.json::<T>().await.map_err(|err| {
        if err.is_decode() {
            GatewayError::Decode(err)
        } else {
            GatewayError::Network(err)
        }
    })
}

async fn error_message(response: Response) -> String {
    let status = response.status();
    match response.json::<ErrorBody>().await {
        Ok(body) => body.message,
        Err(_) => status.to_string(),
    }
}

/// Every question must offer its own correct answer.
fn check_quiz(quiz: &Quiz) -> Result<(), GatewayError> {
    match quiz
        .questions
        .iter()
        .find(|question| !question.offers(&question.correct_answer))
    {
        Some(question) => Err(GatewayError::Malformed(format!(
            "question `{}` does not offer its correct answer",
            question.id
        ))),
        None => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::Question;

    #[test]
    fn base_url_is_normalized() {
        let gateway = HttpQuizGateway::new("http://localhost:8080/").unwrap();
        assert_eq!(gateway.base_url(), "http://localhost:8080");
        assert_eq!(gateway.url("/quiz"), "http://localhost:8080/quiz");
    }

    #[test]
    fn errors_map_to_notices() {
        assert!(matches!(
            GatewayError::NotFound("no quiz".into()).notice(),
            Notice::NotFound(_)
        ));
        let unavailable = GatewayError::Status {
            status: 503,
            message: "degraded".into(),
        };
        assert!(unavailable.notice().is_retryable());
        let rejected = GatewayError::Status {
            status: 400,
            message: "bad id".into(),
        };
        assert_eq!(rejected.notice(), Notice::Malformed("bad id".into()));
    }

    #[test]
    fn quiz_whose_answer_is_not_offered_is_malformed() {
        let quiz = Quiz {
            id: "q".into(),
            date: String::new(),
            title: String::new(),
            description: None,
            questions: vec![Question {
                id: "q1".into(),
                question: "?".into(),
                options: vec!["A".into()],
                correct_answer: "B".into(),
                explanation: None,
                difficulty: None,
                category: None,
            }],
        };
        assert!(matches!(check_quiz(&quiz), Err(GatewayError::Malformed(_))));
    }
}
