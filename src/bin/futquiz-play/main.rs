//! Terminal client playing the daily quiz against a futquiz server.

use std::{env, sync::Arc};

use anyhow::Context;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::warn;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use futquiz::{
    client::{
        completion::{CompletionStore, SystemClock},
        driver::{Command, SessionDriver},
        gateway::HttpQuizGateway,
        machine::{QuizSession, SessionPhase},
        render::skin_by_name,
        timer::TimerSettings,
    },
    config::AppConfig,
};

const DATA_DIR_ENV: &str = "FUTQUIZ_DATA_DIR";
const DEFAULT_DATA_DIR: &str = ".futquiz";

/// What a line typed by the player means in the current phase.
#[derive(Debug, PartialEq, Eq)]
enum Input {
    Command(Command),
    Timer(TimerSettings),
    Quit,
    Unknown,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_tracing();

    let config = AppConfig::load();
    let gateway = HttpQuizGateway::new(config.api_url()).context("building quiz gateway")?;
    let data_dir = env::var(DATA_DIR_ENV).unwrap_or_else(|_| DEFAULT_DATA_DIR.to_owned());
    let completions = CompletionStore::in_dir(data_dir, Arc::new(SystemClock));
    let skin = skin_by_name(config.skin());

    let mut driver = SessionDriver::new(
        QuizSession::new(config.allow_replay()),
        Arc::new(gateway),
        completions,
        config.timer(),
    );
    driver
        .load_catalog(config.games())
        .await
        .context("loading game catalog")?;

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        let now = driver.completions().clock().now();
        print!("{}", skin.render(driver.session(), now));
        if driver.session().phase() == SessionPhase::Selection {
            println!("{}", timer_hint(driver.timer()));
        }

        let outcome = tokio::select! {
            biased;
            line = lines.next_line() => {
                let Some(line) = line.context("reading stdin")? else {
                    break;
                };
                match parse_input(&line, driver.session(), driver.timer()) {
                    Input::Quit => break,
                    Input::Timer(timer) => {
                        driver.set_timer(timer);
                        Ok(())
                    }
                    Input::Command(command) => driver.handle(command).await,
                    Input::Unknown => {
                        println!("?");
                        Ok(())
                    }
                }
            }
            event = driver.next_background() => driver.dispatch(event).await,
        };

        if let Err(err) = outcome {
            warn!(error = %err, "ignored input");
        }
    }

    Ok(())
}

fn timer_hint(timer: TimerSettings) -> String {
    match timer.active_seconds() {
        Some(seconds) => format!("Timer: {seconds}s per question  (t) off  (t N) set seconds  (q) quit"),
        None => "Timer: off  (t) on  (q) quit".to_owned(),
    }
}

/// Interpret `line` for the phase `session` is in. Option and game numbers are 1-based.
fn parse_input(line: &str, session: &QuizSession, timer: TimerSettings) -> Input {
    let line = line.trim();
    match line {
        "q" | "quit" => return Input::Quit,
        "b" | "back" => return Input::Command(Command::Back),
        "d" | "dismiss" => return Input::Command(Command::DismissNotice),
        _ => {}
    }

    match session.phase() {
        SessionPhase::Selection => {
            if let Some(rest) = line.strip_prefix('t') {
                let rest = rest.trim();
                if rest.is_empty() {
                    return Input::Timer(if timer.enabled {
                        TimerSettings::disabled()
                    } else {
                        TimerSettings::enabled(timer.seconds)
                    });
                }
                return match rest.parse::<u32>() {
                    Ok(seconds) => Input::Timer(TimerSettings::enabled(seconds)),
                    Err(_) => Input::Unknown,
                };
            }
            let by_number = line
                .parse::<usize>()
                .ok()
                .and_then(|n| n.checked_sub(1))
                .and_then(|i| session.catalog().get(i));
            match by_number.or_else(|| session.catalog().iter().find(|game| game.id == line)) {
                Some(game) => Input::Command(Command::Select(game.id.clone())),
                None => Input::Unknown,
            }
        }
        SessionPhase::Playing => {
            if line.is_empty() || line == "n" {
                return Input::Command(Command::Advance);
            }
            let option = line
                .parse::<usize>()
                .ok()
                .and_then(|n| n.checked_sub(1))
                .and_then(|i| session.current_question()?.options.get(i).cloned());
            match option {
                Some(option) => Input::Command(Command::Pick(option)),
                None => Input::Unknown,
            }
        }
        SessionPhase::Completed if line == "r" => Input::Command(Command::PlayAgain),
        _ => Input::Unknown,
    }
}

fn init_tracing() {
    let env_filter =
        tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| "warn".into());
    tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

#[cfg(test)]
mod tests {
    use time::macros::datetime;

    use super::*;
    use futquiz::{
        client::machine::SessionEvent,
        domain::{Question, Quiz, default_catalog},
    };

    fn selection() -> QuizSession {
        let mut session = QuizSession::new(false);
        session
            .apply(SessionEvent::CatalogLoaded(default_catalog()), datetime!(2026-10-18 9:00 UTC))
            .unwrap();
        session
    }

    #[test]
    fn selection_accepts_numbers_ids_and_timer_toggles() {
        let session = selection();
        let timer = TimerSettings::disabled();
        assert_eq!(
            parse_input("2", &session, timer),
            Input::Command(Command::Select("player-guess".into()))
        );
        assert_eq!(
            parse_input("daily-trivia", &session, timer),
            Input::Command(Command::Select("daily-trivia".into()))
        );
        assert_eq!(parse_input("9", &session, timer), Input::Unknown);
        assert_eq!(
            parse_input("t", &session, timer),
            Input::Timer(TimerSettings::enabled(timer.seconds))
        );
        assert_eq!(
            parse_input("t 15", &session, timer),
            Input::Timer(TimerSettings::enabled(15))
        );
        assert_eq!(parse_input("q", &session, timer), Input::Quit);
    }

    #[test]
    fn playing_maps_numbers_to_options() {
        let now = datetime!(2026-10-18 9:00 UTC);
        let mut session = selection();
        session
            .apply(
                SessionEvent::SelectGame {
                    game_id: "daily-trivia".into(),
                    timer: TimerSettings::disabled(),
                    completed_today: None,
                },
                now,
            )
            .unwrap();
        let epoch = session.epoch();
        let quiz = Quiz {
            id: "quiz".into(),
            date: "2026-10-18".into(),
            title: "Daily".into(),
            description: None,
            questions: vec![Question {
                id: "q1".into(),
                question: "Who won the 2022 World Cup?".into(),
                options: vec!["France".into(), "Argentina".into()],
                correct_answer: "Argentina".into(),
                explanation: None,
                difficulty: None,
                category: None,
            }],
        };
        session.apply(SessionEvent::QuizLoaded { epoch, quiz }, now).unwrap();

        let timer = TimerSettings::disabled();
        assert_eq!(
            parse_input("2", &session, timer),
            Input::Command(Command::Pick("Argentina".into()))
        );
        assert_eq!(parse_input("", &session, timer), Input::Command(Command::Advance));
        assert_eq!(parse_input("3", &session, timer), Input::Unknown);
    }
}
