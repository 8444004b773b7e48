//! Runs a [`QuizSession`]: carries out its effects against the gateway, the completion
//! store and the countdown, and feeds their outcomes back as events.

use std::{sync::Arc, time::Duration};

use tokio::{sync::mpsc, task::JoinHandle};
use tracing::{debug, info, warn};

use crate::{
    client::{
        completion::CompletionStore,
        gateway::QuizGateway,
        machine::{Effect, InvalidTransition, QuizSession, SessionEvent},
        timer::{TickTag, TimerSettings, spawn_countdown},
    },
    domain::GameType,
};

/// One countdown unit.
pub const TICK_PERIOD: Duration = Duration::from_secs(1);

/// Player intents, as produced by a front end.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Play the catalog game with this id.
    Select(String),
    /// Highlight an option of the current question.
    Pick(String),
    /// Confirm the current question.
    Advance,
    /// Replay the completed game.
    PlayAgain,
    /// Return to the catalog.
    Back,
    /// Hide the current notice.
    DismissNotice,
}

/// Owns a [`QuizSession`] and everything its effects act on.
pub struct SessionDriver {
    session: QuizSession,
    gateway: Arc<dyn QuizGateway>,
    completions: CompletionStore,
    timer: TimerSettings,
    tick_period: Duration,
    events_tx: mpsc::UnboundedSender<SessionEvent>,
    events_rx: mpsc::UnboundedReceiver<SessionEvent>,
    ticks_tx: mpsc::UnboundedSender<TickTag>,
    ticks_rx: mpsc::UnboundedReceiver<TickTag>,
    countdown: Option<JoinHandle<()>>,
}

impl SessionDriver {
    /// Driver for `session`, counting down in [`TICK_PERIOD`] units.
    pub fn new(
        session: QuizSession,
        gateway: Arc<dyn QuizGateway>,
        completions: CompletionStore,
        timer: TimerSettings,
    ) -> Self {
        let (events_tx, events_rx) = mpsc::unbounded_channel();
        let (ticks_tx, ticks_rx) = mpsc::unbounded_channel();
        Self {
            session,
            gateway,
            completions,
            timer,
            tick_period: TICK_PERIOD,
            events_tx,
            events_rx,
            ticks_tx,
            ticks_rx,
            countdown: None,
        }
    }

    /// Override the countdown unit.
    pub fn with_tick_period(mut self, period: Duration) -> Self {
        self.tick_period = period;
        self
    }

    /// Session being driven.
    pub fn session(&self) -> &QuizSession {
        &self.session
    }

    /// Store completions are persisted to.
    pub fn completions(&self) -> &CompletionStore {
        &self.completions
    }

    /// Countdown settings applied to the next selected game.
    pub fn timer(&self) -> TimerSettings {
        self.timer
    }

    /// Change the countdown used by the next selected game.
    pub fn set_timer(&mut self, timer: TimerSettings) {
        self.timer = timer;
    }

    /// Load the catalog from the server, using `fallback` when it cannot be fetched.
    pub async fn load_catalog(&mut self, fallback: Vec<GameType>) -> Result<(), InvalidTransition> {
        let games = match self.gateway.fetch_catalog().await {
            Ok(games) if !games.is_empty() => games,
            Ok(_) => {
                warn!("server returned an empty catalog; using the configured one");
                fallback
            }
            Err(err) => {
                warn!(error = %err, "failed to fetch the game catalog; using the configured one");
                fallback
            }
        };
        self.dispatch(SessionEvent::CatalogLoaded(games)).await
    }

    /// Translate a player command into a session event and apply it.
    pub async fn handle(&mut self, command: Command) -> Result<(), InvalidTransition> {
        let event = match command {
            Command::Select(game_id) => {
                let completed_today = self.completions.today_completion(&game_id).await;
                SessionEvent::SelectGame {
                    game_id,
                    timer: self.timer,
                    completed_today,
                }
            }
            Command::Pick(option) => SessionEvent::SelectOption(option),
            Command::Advance => SessionEvent::Advance {
                index: self.session.index(),
            },
            Command::PlayAgain => SessionEvent::PlayAgain,
            Command::Back => SessionEvent::BackToSelection,
            Command::DismissNotice => SessionEvent::DismissNotice,
        };
        self.dispatch(event).await
    }

    /// Next outcome of a background activity. Quiz responses and telemetry take
    /// precedence over countdown ticks.
    pub async fn next_background(&mut self) -> SessionEvent {
        tokio::select! {
            biased;
            Some(event) = self.events_rx.recv() => event,
            Some(tag) = self.ticks_rx.recv() => SessionEvent::TimerTick(tag),
            else => futures::future::pending().await,
        }
    }

    /// Wait for one background outcome and apply it.
    pub async fn pump(&mut self) -> Result<(), InvalidTransition> {
        let event = self.next_background().await;
        self.dispatch(event).await
    }

    /// Apply `event` now and run the resulting effects.
    pub async fn dispatch(&mut self, event: SessionEvent) -> Result<(), InvalidTransition> {
        let name = event.name();
        let now = self.completions.clock().now();
        let effects = self.session.apply(event, now)?;
        debug!(event = name, phase = ?self.session.phase(), effects = effects.len(), "applied session event");
        for effect in effects {
            self.run(effect).await;
        }
        Ok(())
    }

    async fn run(&mut self, effect: Effect) {
        match effect {
            Effect::FetchQuiz { epoch, game_id } => {
                let gateway = self.gateway.clone();
                let events = self.events_tx.clone();
                tokio::spawn(async move {
                    let event = match gateway.fetch_quiz(Some(game_id.clone())).await {
                        Ok(quiz) => SessionEvent::QuizLoaded { epoch, quiz },
                        Err(err) => {
                            warn!(%game_id, error = %err, "failed to fetch quiz");
                            SessionEvent::QuizFailed {
                                epoch,
                                notice: err.notice(),
                            }
                        }
                    };
                    let _ = events.send(event);
                });
            }
            Effect::StartCountdown { tag, seconds } => {
                self.cancel_countdown();
                debug!(epoch = tag.epoch, index = tag.index, seconds, "starting countdown");
                self.countdown = Some(spawn_countdown(tag, self.tick_period, self.ticks_tx.clone()));
            }
            Effect::CancelCountdown => self.cancel_countdown(),
            Effect::SubmitAnswer {
                epoch,
                question_id,
                selected,
            } => {
                let gateway = self.gateway.clone();
                let events = self.events_tx.clone();
                tokio::spawn(async move {
                    match gateway.submit_answer(question_id.clone(), selected).await {
                        Ok(correct) => debug!(%question_id, correct, "server graded answer"),
                        Err(err) => {
                            warn!(%question_id, error = %err, "failed to report answer");
                            let _ = events.send(SessionEvent::AnswerReportFailed {
                                epoch,
                                notice: err.notice(),
                            });
                        }
                    }
                });
            }
            Effect::PersistCompletion(data) => {
                match self.completions.mark_completed(&data.game_id, &data).await {
                    Ok(()) => info!(
                        game_id = %data.game_id,
                        score = data.score,
                        total = data.total_questions,
                        "game completed"
                    ),
                    Err(err) => warn!(game_id = %data.game_id, error = %err, "failed to store completion"),
                }
            }
            Effect::ClearCompletion { game_id } => {
                if let Err(err) = self.completions.clear_completion(&game_id).await {
                    warn!(%game_id, error = %err, "failed to clear completion");
                }
            }
        }
    }

    fn cancel_countdown(&mut self) {
        if let Some(handle) = self.countdown.take() {
            handle.abort();
        }
    }
}

impl Drop for SessionDriver {
    fn drop(&mut self) {
        self.cancel_countdown();
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use futures::future::BoxFuture;
    use time::macros::datetime;

    use super::*;
    use crate::{
        client::{
            completion::FixedClock,
            gateway::GatewayError,
            machine::{Notice, SessionPhase},
        },
        domain::{CompletionData, Question, Quiz, default_catalog},
    };

    #[derive(Default)]
    struct FakeGateway {
        quiz: Option<Quiz>,
        delay: Duration,
        reject_answers: bool,
        fetches: AtomicUsize,
        submissions: AtomicUsize,
    }

    impl QuizGateway for FakeGateway {
        fn fetch_quiz(&self, _game_id: Option<String>) -> BoxFuture<'static, Result<Quiz, GatewayError>> {
            self.fetches.fetch_add(1, Ordering::SeqCst);
            let quiz = self.quiz.clone();
            let delay = self.delay;
            Box::pin(async move {
                tokio::time::sleep(delay).await;
                quiz.ok_or_else(|| GatewayError::NotFound("no quiz".into()))
            })
        }

        fn submit_answer(
            &self,
            _question_id: String,
            _selected: String,
        ) -> BoxFuture<'static, Result<bool, GatewayError>> {
            self.submissions.fetch_add(1, Ordering::SeqCst);
            let reject = self.reject_answers;
            Box::pin(async move {
                if reject {
                    Err(GatewayError::Status {
                        status: 503,
                        message: "degraded".into(),
                    })
                } else {
                    Ok(true)
                }
            })
        }

        fn fetch_catalog(&self) -> BoxFuture<'static, Result<Vec<GameType>, GatewayError>> {
            Box::pin(async { Err(GatewayError::NotFound("no catalog".into())) })
        }
    }

    fn quiz() -> Quiz {
        let question = |id: &str, options: [&str; 2], correct: &str| Question {
            id: id.into(),
            question: format!("question {id}"),
            options: options.iter().map(|o| o.to_string()).collect(),
            correct_answer: correct.into(),
            explanation: None,
            difficulty: None,
            category: None,
        };
        Quiz {
            id: "quiz".into(),
            date: "2026-10-18".into(),
            title: "Daily".into(),
            description: None,
            questions: vec![
                question("q1", ["A", "B"], "A"),
                question("q2", ["C", "D"], "D"),
            ],
        }
    }

    async fn driver(gateway: Arc<FakeGateway>, timer: TimerSettings) -> SessionDriver {
        let clock = Arc::new(FixedClock::new(datetime!(2026-10-18 20:00 UTC)));
        let completions = CompletionStore::in_memory(clock);
        let mut driver = SessionDriver::new(QuizSession::new(true), gateway, completions, timer);
        driver.load_catalog(default_catalog()).await.unwrap();
        driver
    }

    #[tokio::test]
    async fn catalog_falls_back_when_server_has_none() {
        let driver = driver(Arc::new(FakeGateway::default()), TimerSettings::disabled()).await;
        assert_eq!(driver.session().phase(), SessionPhase::Selection);
        assert_eq!(driver.session().catalog().len(), default_catalog().len());
    }

    #[tokio::test]
    async fn plays_through_and_persists_completion() {
        let gateway = Arc::new(FakeGateway {
            quiz: Some(quiz()),
            ..Default::default()
        });
        let mut driver = driver(gateway.clone(), TimerSettings::disabled()).await;

        driver.handle(Command::Select("daily-trivia".into())).await.unwrap();
        assert_eq!(driver.session().phase(), SessionPhase::Locked);
        driver.pump().await.unwrap();
        assert_eq!(driver.session().phase(), SessionPhase::Playing);

        driver.handle(Command::Pick("A".into())).await.unwrap();
        driver.handle(Command::Advance).await.unwrap();
        driver.handle(Command::Pick("C".into())).await.unwrap();
        driver.handle(Command::Advance).await.unwrap();

        assert_eq!(driver.session().phase(), SessionPhase::Completed);
        let stored = driver.completions().today_completion("daily-trivia").await.unwrap();
        assert_eq!(stored.score, 1);
        assert_eq!(stored.total_questions, 2);
        assert_eq!(stored.date, "2026-10-18");

        for _ in 0..3 {
            tokio::task::yield_now().await;
        }
        assert_eq!(gateway.submissions.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn completed_game_is_not_fetched_again() {
        let gateway = Arc::new(FakeGateway {
            quiz: Some(quiz()),
            ..Default::default()
        });
        let mut driver = driver(gateway.clone(), TimerSettings::disabled()).await;
        let record = CompletionData {
            game_id: "daily-trivia".into(),
            game_name: "Daily Trivia".into(),
            score: 2,
            total_questions: 2,
            completed_at: "2026-10-18T09:00:00Z".into(),
            date: "2026-10-18".into(),
            timer_used: false,
            timer_seconds: None,
        };
        driver
            .completions()
            .mark_completed("daily-trivia", &record)
            .await
            .unwrap();

        driver.handle(Command::Select("daily-trivia".into())).await.unwrap();
        assert_eq!(driver.session().phase(), SessionPhase::Completed);
        assert_eq!(driver.session().completion(), Some(&record));
        assert_eq!(gateway.fetches.load(Ordering::SeqCst), 0);

        driver.handle(Command::PlayAgain).await.unwrap();
        assert!(!driver.completions().has_completed_today("daily-trivia").await);
        driver.pump().await.unwrap();
        assert_eq!(gateway.fetches.load(Ordering::SeqCst), 1);
        assert_eq!(driver.session().phase(), SessionPhase::Playing);
    }

    #[tokio::test(start_paused = true)]
    async fn countdown_expires_unanswered_questions() {
        let gateway = Arc::new(FakeGateway {
            quiz: Some(quiz()),
            ..Default::default()
        });
        let mut driver = driver(gateway, TimerSettings::enabled(1)).await;

        driver.handle(Command::Select("daily-trivia".into())).await.unwrap();
        driver.pump().await.unwrap();
        assert_eq!(driver.session().remaining_seconds(), Some(1));

        driver.pump().await.unwrap();
        let session = driver.session();
        assert_eq!(session.index(), 1);
        assert_eq!(session.answers()[0].selected, "");
        assert_eq!(session.score(), 0);

        driver.handle(Command::Pick("D".into())).await.unwrap();
        driver.handle(Command::Advance).await.unwrap();
        assert_eq!(driver.session().phase(), SessionPhase::Completed);
        assert_eq!(driver.session().score(), 1);

        let stored = driver.completions().today_completion("daily-trivia").await.unwrap();
        assert!(stored.timer_used);
        assert_eq!(stored.timer_seconds, Some(1));
    }

    #[tokio::test(start_paused = true)]
    async fn countdown_follows_the_configured_tick_period() {
        let gateway = Arc::new(FakeGateway {
            quiz: Some(quiz()),
            ..Default::default()
        });
        let period = Duration::from_millis(250);
        let mut driver = driver(gateway, TimerSettings::enabled(2))
            .await
            .with_tick_period(period);

        driver.handle(Command::Select("daily-trivia".into())).await.unwrap();
        driver.pump().await.unwrap();
        let started = tokio::time::Instant::now();

        driver.pump().await.unwrap();
        assert_eq!(driver.session().remaining_seconds(), Some(1));
        assert!(started.elapsed() >= period);
        assert!(started.elapsed() < TICK_PERIOD);

        driver.pump().await.unwrap();
        assert_eq!(driver.session().index(), 1);
        assert!(started.elapsed() < TICK_PERIOD);
    }

    #[tokio::test(start_paused = true)]
    async fn quiz_arriving_after_going_back_is_discarded() {
        let gateway = Arc::new(FakeGateway {
            quiz: Some(quiz()),
            delay: Duration::from_secs(5),
            ..Default::default()
        });
        let mut driver = driver(gateway, TimerSettings::disabled()).await;

        driver.handle(Command::Select("daily-trivia".into())).await.unwrap();
        driver.handle(Command::Back).await.unwrap();
        assert_eq!(driver.session().phase(), SessionPhase::Selection);

        driver.pump().await.unwrap();
        assert_eq!(driver.session().phase(), SessionPhase::Selection);
        assert!(driver.session().quiz().is_none());
    }

    #[tokio::test]
    async fn missing_quiz_returns_to_selection_with_notice() {
        let mut driver = driver(Arc::new(FakeGateway::default()), TimerSettings::disabled()).await;

        driver.handle(Command::Select("daily-trivia".into())).await.unwrap();
        driver.pump().await.unwrap();

        assert_eq!(driver.session().phase(), SessionPhase::Selection);
        assert!(matches!(driver.session().notice(), Some(Notice::NotFound(_))));
    }

    #[tokio::test]
    async fn rejected_answer_report_only_raises_a_notice() {
        let gateway = Arc::new(FakeGateway {
            quiz: Some(quiz()),
            reject_answers: true,
            ..Default::default()
        });
        let mut driver = driver(gateway, TimerSettings::disabled()).await;

        driver.handle(Command::Select("daily-trivia".into())).await.unwrap();
        driver.pump().await.unwrap();
        driver.handle(Command::Pick("A".into())).await.unwrap();
        driver.handle(Command::Advance).await.unwrap();
        driver.pump().await.unwrap();

        let session = driver.session();
        assert_eq!(session.phase(), SessionPhase::Playing);
        assert_eq!(session.index(), 1);
        assert_eq!(session.score(), 1);
        assert!(session.notice().is_some_and(Notice::is_retryable));
    }
}
