use std::fmt;

use thiserror::Error;
use time::{OffsetDateTime, format_description::well_known::Rfc3339};
use tracing::debug;

use crate::{
    client::timer::{TickTag, TimerSettings},
    domain::{AnswerRecord, CompletionData, GameType, Question, Quiz, format_date},
};

/// Phases a quiz session can be in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionPhase {
    /// Waiting for the game catalog.
    Loading,
    /// Catalog shown; the player picks a game.
    Selection,
    /// A game was picked and its quiz request is outstanding.
    Locked,
    /// Questions are being answered one at a time.
    Playing,
    /// Today's result is shown, either just finished or loaded from the completion store.
    Completed,
}

/// User-visible message attached to the session after a recoverable failure.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Notice {
    /// No quiz (or question) exists for the request.
    NotFound(String),
    /// Transient transport failure; retrying may help.
    Network(String),
    /// A response or stored record could not be understood.
    Malformed(String),
    /// The selected game cannot be played.
    Unavailable(String),
}

impl Notice {
    /// Whether trying the same action again may succeed.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Notice::Network(_))
    }
}

impl fmt::Display for Notice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Notice::NotFound(message)
            | Notice::Network(message)
            | Notice::Malformed(message)
            | Notice::Unavailable(message) => f.write_str(message),
        }
    }
}

/// Events that can be applied to a [`QuizSession`].
#[derive(Debug, Clone, PartialEq)]
pub enum SessionEvent {
    /// The game catalog is available.
    CatalogLoaded(Vec<GameType>),
    /// The player picked a game. `completed_today` is the completion store lookup for it.
    SelectGame {
        /// Catalog identifier of the game.
        game_id: String,
        /// Countdown settings chosen for this run.
        timer: TimerSettings,
        /// Today's stored result for the game, if any.
        completed_today: Option<CompletionData>,
    },
    /// A quiz request issued under `epoch` succeeded.
    QuizLoaded {
        /// Epoch the request was issued under.
        epoch: u64,
        /// The fetched quiz.
        quiz: Quiz,
    },
    /// A quiz request issued under `epoch` failed.
    QuizFailed {
        /// Epoch the request was issued under.
        epoch: u64,
        /// What to tell the player.
        notice: Notice,
    },
    /// The player highlighted an option of the current question.
    SelectOption(String),
    /// The player confirmed question `index`.
    Advance {
        /// Question the confirmation was made on.
        index: usize,
    },
    /// One countdown unit elapsed for the tagged question.
    TimerTick(TickTag),
    /// Reporting an answer to the server failed. Advisory only.
    AnswerReportFailed {
        /// Epoch the report was sent under.
        epoch: u64,
        /// What to tell the player.
        notice: Notice,
    },
    /// Replay a finished game (development only).
    PlayAgain,
    /// Abandon the current game and return to the catalog.
    BackToSelection,
    /// Hide the current notice.
    DismissNotice,
}

impl SessionEvent {
    /// Short name used in logs and errors.
    pub fn name(&self) -> &'static str {
        match self {
            SessionEvent::CatalogLoaded(_) => "catalog_loaded",
            SessionEvent::SelectGame { .. } => "select_game",
            SessionEvent::QuizLoaded { .. } => "quiz_loaded",
            SessionEvent::QuizFailed { .. } => "quiz_failed",
            SessionEvent::SelectOption(_) => "select_option",
            SessionEvent::Advance { .. } => "advance",
            SessionEvent::TimerTick(_) => "timer_tick",
            SessionEvent::AnswerReportFailed { .. } => "answer_report_failed",
            SessionEvent::PlayAgain => "play_again",
            SessionEvent::BackToSelection => "back_to_selection",
            SessionEvent::DismissNotice => "dismiss_notice",
        }
    }
}

/// Side effects requested by a transition, executed by the session driver.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    /// Fetch the quiz for `game_id`; answer with `QuizLoaded`/`QuizFailed` tagged `epoch`.
    FetchQuiz {
        /// Epoch to tag the response with.
        epoch: u64,
        /// Game to fetch the quiz for.
        game_id: String,
    },
    /// Start a countdown emitting `TimerTick(tag)` once per second.
    StartCountdown {
        /// Identity carried by every tick.
        tag: TickTag,
        /// Units before the question expires.
        seconds: u32,
    },
    /// Stop the running countdown, if any.
    CancelCountdown,
    /// Report an answer to the server.
    SubmitAnswer {
        /// Epoch a failure notice is tagged with.
        epoch: u64,
        /// Graded question.
        question_id: String,
        /// Locked-in option, never empty.
        selected: String,
    },
    /// Durably record today's result.
    PersistCompletion(CompletionData),
    /// Forget today's result for a game.
    ClearCompletion {
        /// Game whose record is removed.
        game_id: String,
    },
}

/// Error returned when an event cannot be applied.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum InvalidTransition {
    /// The event is not accepted in the current phase.
    #[error("invalid transition: {event} cannot be applied while in {from:?}")]
    Phase {
        /// Phase the session was in when the event was received.
        from: SessionPhase,
        /// Name of the rejected event.
        event: &'static str,
    },
    /// The selected option is not one of the current question's options.
    #[error("option `{option}` is not offered by question {index}")]
    UnknownOption {
        /// Index of the current question.
        index: usize,
        /// The rejected option.
        option: String,
    },
}

/// Reducer owning the state of one player's quiz session.
///
/// Every change is a function of the current state, an event and the current time; the
/// returned [`Effect`]s are carried out by the caller.
#[derive(Debug, Clone)]
pub struct QuizSession {
    phase: SessionPhase,
    allow_replay: bool,
    catalog: Vec<GameType>,
    game: Option<GameType>,
    quiz: Option<Quiz>,
    timer: TimerSettings,
    index: usize,
    selected: Option<String>,
    score: u32,
    remaining: Option<u32>,
    answers: Vec<AnswerRecord>,
    completion: Option<CompletionData>,
    notice: Option<Notice>,
    epoch: u64,
}

impl QuizSession {
    /// Create a session in the loading phase.
    pub fn new(allow_replay: bool) -> Self {
        Self {
            phase: SessionPhase::Loading,
            allow_replay,
            catalog: Vec::new(),
            game: None,
            quiz: None,
            timer: TimerSettings::disabled(),
            index: 0,
            selected: None,
            score: 0,
            remaining: None,
            answers: Vec::new(),
            completion: None,
            notice: None,
            epoch: 0,
        }
    }

    /// Current phase.
    pub fn phase(&self) -> SessionPhase {
        self.phase
    }

    /// Whether a finished game may be played again.
    pub fn allow_replay(&self) -> bool {
        self.allow_replay
    }

    /// Games offered on the selection screen.
    pub fn catalog(&self) -> &[GameType] {
        &self.catalog
    }

    /// Game being played or shown as completed.
    pub fn game(&self) -> Option<&GameType> {
        self.game.as_ref()
    }

    /// Quiz being played.
    pub fn quiz(&self) -> Option<&Quiz> {
        self.quiz.as_ref()
    }

    /// Countdown settings of the current run.
    pub fn timer(&self) -> TimerSettings {
        self.timer
    }

    /// Zero-based index of the question being answered.
    pub fn index(&self) -> usize {
        self.index
    }

    /// Question being answered, while playing.
    pub fn current_question(&self) -> Option<&Question> {
        if self.phase != SessionPhase::Playing {
            return None;
        }
        self.quiz.as_ref()?.questions.get(self.index)
    }

    /// Option highlighted on the current question.
    pub fn selected(&self) -> Option<&str> {
        self.selected.as_deref()
    }

    /// Correct answers so far.
    pub fn score(&self) -> u32 {
        self.score
    }

    /// Seconds left on the current question's countdown.
    pub fn remaining_seconds(&self) -> Option<u32> {
        self.remaining
    }

    /// Graded questions in order.
    pub fn answers(&self) -> &[AnswerRecord] {
        &self.answers
    }

    /// Grading of the most recently confirmed question.
    pub fn last_answer(&self) -> Option<&AnswerRecord> {
        self.answers.last()
    }

    /// Today's result once the game is completed.
    pub fn completion(&self) -> Option<&CompletionData> {
        self.completion.as_ref()
    }

    /// Pending user-visible notice.
    pub fn notice(&self) -> Option<&Notice> {
        self.notice.as_ref()
    }

    /// Identity of the current session; bumped on every start and abandon.
    pub fn epoch(&self) -> u64 {
        self.epoch
    }

    /// Apply `event` at time `now`, returning the effects to run.
    ///
    /// Late quiz responses, countdown ticks and advances that no longer match the current
    /// epoch or question are ignored and produce no effects. Going back to the selection is
    /// accepted in every phase; while the catalog is still loading it changes nothing.
    pub fn apply(
        &mut self,
        event: SessionEvent,
        now: OffsetDateTime,
    ) -> Result<Vec<Effect>, InvalidTransition> {
        use SessionEvent as E;
        use SessionPhase as P;

        match (self.phase, event) {
            (P::Loading | P::Selection, E::CatalogLoaded(games)) => {
                self.catalog = games;
                self.phase = P::Selection;
                Ok(Vec::new())
            }
            (
                P::Selection,
                E::SelectGame {
                    game_id,
                    timer,
                    completed_today,
                },
            ) => Ok(self.select_game(game_id, timer, completed_today)),
            (P::Locked, E::QuizLoaded { epoch, quiz }) if epoch == self.epoch => {
                Ok(self.start_quiz(quiz))
            }
            (P::Locked, E::QuizFailed { epoch, notice }) if epoch == self.epoch => {
                self.reset_to_selection();
                self.notice = Some(notice);
                Ok(Vec::new())
            }
            (_, event @ (E::QuizLoaded { .. } | E::QuizFailed { .. })) => {
                debug!(event = event.name(), epoch = self.epoch, "ignoring stale quiz response");
                Ok(Vec::new())
            }
            (P::Playing, E::SelectOption(option)) => {
                let offered = self
                    .current_question()
                    .is_some_and(|question| question.offers(&option));
                if !offered {
                    return Err(InvalidTransition::UnknownOption {
                        index: self.index,
                        option,
                    });
                }
                self.selected = Some(option);
                Ok(Vec::new())
            }
            (P::Playing, E::Advance { index }) if index == self.index => Ok(self.advance(now)),
            (P::Playing | P::Completed, E::Advance { index }) => {
                debug!(index, current = self.index, "ignoring stale advance");
                Ok(Vec::new())
            }
            (P::Playing, E::TimerTick(tag))
                if self.remaining.is_some() && tag == self.tick_tag() =>
            {
                Ok(self.tick(now))
            }
            (_, E::TimerTick(_)) => Ok(Vec::new()),
            (_, E::AnswerReportFailed { epoch, notice }) => {
                if epoch == self.epoch {
                    self.notice = Some(notice);
                }
                Ok(Vec::new())
            }
            (P::Completed, E::PlayAgain) if self.allow_replay => self.play_again(),
            (P::Loading, E::BackToSelection) => Ok(Vec::new()),
            (P::Selection | P::Locked | P::Playing | P::Completed, E::BackToSelection) => {
                let mut effects = Vec::new();
                if self.remaining.is_some() {
                    effects.push(Effect::CancelCountdown);
                }
                self.reset_to_selection();
                Ok(effects)
            }
            (_, E::DismissNotice) => {
                self.notice = None;
                Ok(Vec::new())
            }
            (from, event) => Err(InvalidTransition::Phase {
                from,
                event: event.name(),
            }),
        }
    }

    fn tick_tag(&self) -> TickTag {
        TickTag {
            epoch: self.epoch,
            index: self.index,
        }
    }

    fn select_game(
        &mut self,
        game_id: String,
        timer: TimerSettings,
        completed_today: Option<CompletionData>,
    ) -> Vec<Effect> {
        let Some(game) = self.catalog.iter().find(|game| game.id == game_id).cloned() else {
            self.notice = Some(Notice::NotFound(format!("unknown game `{game_id}`")));
            return Vec::new();
        };
        if !game.available {
            self.notice = Some(Notice::Unavailable(format!("{} is coming soon", game.name)));
            return Vec::new();
        }

        self.notice = None;
        self.timer = timer;
        self.game = Some(game);

        if let Some(record) = completed_today {
            self.completion = Some(record);
            self.phase = SessionPhase::Completed;
            return Vec::new();
        }

        vec![self.request_quiz(game_id)]
    }

    fn request_quiz(&mut self, game_id: String) -> Effect {
        self.epoch += 1;
        self.phase = SessionPhase::Locked;
        Effect::FetchQuiz {
            epoch: self.epoch,
            game_id,
        }
    }

    fn start_quiz(&mut self, quiz: Quiz) -> Vec<Effect> {
        if quiz.questions.is_empty() {
            self.reset_to_selection();
            self.notice = Some(Notice::Malformed("the quiz has no questions".into()));
            return Vec::new();
        }

        self.quiz = Some(quiz);
        self.index = 0;
        self.score = 0;
        self.answers.clear();
        self.completion = None;
        self.phase = SessionPhase::Playing;
        self.enter_question().into_iter().collect()
    }

    /// Reset per-question state and arm the countdown when enabled.
    fn enter_question(&mut self) -> Option<Effect> {
        self.selected = None;
        self.remaining = self.timer.active_seconds();
        self.remaining.map(|seconds| Effect::StartCountdown {
            tag: self.tick_tag(),
            seconds,
        })
    }

    fn tick(&mut self, now: OffsetDateTime) -> Vec<Effect> {
        let remaining = self.remaining.unwrap_or(0).saturating_sub(1);
        self.remaining = Some(remaining);
        if remaining == 0 {
            self.advance(now)
        } else {
            Vec::new()
        }
    }

    /// Grade the current question and move on; the last question completes the session.
    fn advance(&mut self, now: OffsetDateTime) -> Vec<Effect> {
        let Some((question_id, correct, total)) = self.current_question().map(|question| {
            (
                question.id.clone(),
                question.correct_answer.clone(),
                self.quiz.as_ref().map_or(0, |quiz| quiz.questions.len()),
            )
        }) else {
            return Vec::new();
        };

        let record = AnswerRecord {
            question_id,
            selected: self.selected.take().unwrap_or_default(),
            correct,
        };

        let mut effects = Vec::new();
        if self.remaining.take().is_some() {
            effects.push(Effect::CancelCountdown);
        }
        if !record.selected.is_empty() {
            effects.push(Effect::SubmitAnswer {
                epoch: self.epoch,
                question_id: record.question_id.clone(),
                selected: record.selected.clone(),
            });
        }
        if record.is_correct() {
            self.score += 1;
        }
        self.answers.push(record);

        if self.index + 1 >= total {
            let completion = self.completion_record(total, now);
            self.completion = Some(completion.clone());
            self.phase = SessionPhase::Completed;
            effects.push(Effect::PersistCompletion(completion));
        } else {
            self.index += 1;
            effects.extend(self.enter_question());
        }

        effects
    }

    fn completion_record(&self, total: usize, now: OffsetDateTime) -> CompletionData {
        let (game_id, game_name) = self
            .game
            .as_ref()
            .map(|game| (game.id.clone(), game.name.clone()))
            .unwrap_or_default();

        CompletionData {
            game_id,
            game_name,
            score: self.score,
            total_questions: u32::try_from(total).unwrap_or(u32::MAX),
            completed_at: now
                .format(&Rfc3339)
                .unwrap_or_else(|_| now.unix_timestamp().to_string()),
            date: format_date(now.date()),
            timer_used: self.timer.enabled,
            timer_seconds: self.timer.active_seconds(),
        }
    }

    fn play_again(&mut self) -> Result<Vec<Effect>, InvalidTransition> {
        let Some(game_id) = self.game.as_ref().map(|game| game.id.clone()) else {
            return Err(InvalidTransition::Phase {
                from: self.phase,
                event: "play_again",
            });
        };

        self.completion = None;
        self.quiz = None;
        self.answers.clear();
        self.score = 0;
        self.index = 0;

        Ok(vec![
            Effect::ClearCompletion {
                game_id: game_id.clone(),
            },
            self.request_quiz(game_id),
        ])
    }

    fn reset_to_selection(&mut self) {
        self.epoch += 1;
        self.phase = SessionPhase::Selection;
        self.game = None;
        self.quiz = None;
        self.completion = None;
        self.index = 0;
        self.selected = None;
        self.score = 0;
        self.remaining = None;
        self.answers.clear();
        self.notice = None;
    }
}
