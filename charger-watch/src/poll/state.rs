use std::fmt;

use serde::Serialize;

/// Phase of a poll session.
///
/// `Idle → Ranking → Polling ⇄ Waiting → Stopped`. `Stopped` is terminal
/// for a session; the monitor returns to `Idle` only when a new session
/// fails to start.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PollState {
    #[default]
    Idle,
    Ranking,
    Polling,
    Waiting,
    Stopped,
}

impl PollState {
    /// True while a session is ranking, polling or waiting.
    pub fn is_active(self) -> bool {
        matches!(self, PollState::Ranking | PollState::Polling | PollState::Waiting)
    }
}

impl fmt::Display for PollState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            PollState::Idle => "idle",
            PollState::Ranking => "ranking",
            PollState::Polling => "polling",
            PollState::Waiting => "waiting",
            PollState::Stopped => "stopped",
        };
        f.write_str(s)
    }
}
