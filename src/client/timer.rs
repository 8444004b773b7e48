//! Per-question countdown settings and the background ticker driving them.

use std::time::Duration;

use tokio::{sync::mpsc, task::JoinHandle, time::MissedTickBehavior};

/// Countdown duration used when nothing else is configured.
pub const DEFAULT_TIMER_SECONDS: u32 = 30;

/// Durations offered on the selection screen.
pub const TIMER_PRESETS: [u32; 6] = [5, 10, 15, 30, 45, 60];

/// Whether a session runs a countdown and how long each question lasts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimerSettings {
    /// Whether questions expire.
    pub enabled: bool,
    /// Seconds per question.
    pub seconds: u32,
}

impl TimerSettings {
    /// No countdown.
    pub fn disabled() -> Self {
        Self {
            enabled: false,
            seconds: DEFAULT_TIMER_SECONDS,
        }
    }

    /// Countdown of `seconds` per question. Zero falls back to [`DEFAULT_TIMER_SECONDS`].
    pub fn enabled(seconds: u32) -> Self {
        Self {
            enabled: true,
            seconds: if seconds == 0 {
                DEFAULT_TIMER_SECONDS
            } else {
                seconds
            },
        }
    }

    /// Seconds to count down from, when the countdown is on.
    pub fn active_seconds(&self) -> Option<u32> {
        self.enabled.then_some(self.seconds)
    }
}

impl Default for TimerSettings {
    fn default() -> Self {
        Self::disabled()
    }
}

/// Identity of one countdown: the session epoch and the question it belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TickTag {
    /// Session epoch the countdown was started in.
    pub epoch: u64,
    /// Question index it counts down.
    pub index: usize,
}

/// Spawn a task sending `tag` every `period` until aborted or the receiver is dropped.
///
/// The first tick fires one full `period` after the call.
pub fn spawn_countdown(
    tag: TickTag,
    period: Duration,
    ticks: mpsc::UnboundedSender<TickTag>,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        let start = tokio::time::Instant::now() + period;
        let mut interval = tokio::time::interval_at(start, period);
        interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
        loop {
            interval.tick().await;
            if ticks.send(tag).is_err() {
                break;
            }
        }
    })
}
