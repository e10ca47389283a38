use serde::{Deserialize, Serialize};
use std::fmt;

use crate::settings::TimerSettings;

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "camelCase")]
pub enum Phase {
    #[default]
    Work,
    Break,
    LongBreak,
}

impl Phase {
    pub fn as_str(&self) -> &'static str {
        match self {
            Phase::Work => "work",
            Phase::Break => "break",
            Phase::LongBreak => "longBreak",
        }
    }

    pub fn is_work(&self) -> bool {
        matches!(self, Phase::Work)
    }

    pub fn minutes_in(&self, settings: &TimerSettings) -> u32 {
        match self {
            Phase::Work => settings.work_minutes,
            Phase::Break => settings.break_minutes,
            Phase::LongBreak => settings.long_break_minutes,
        }
    }
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct TimerState {
    pub remaining_seconds: u32,
    pub phase: Phase,
    pub is_running: bool,
    pub cycle_count: u32,
    pub phase_duration_seconds: u32,
}

impl TimerState {
    /// Idle at the start of a full work phase.
    pub fn initial(settings: &TimerSettings) -> Self {
        let duration = settings.work_minutes * 60;
        Self {
            remaining_seconds: duration,
            phase: Phase::Work,
            is_running: false,
            cycle_count: 0,
            phase_duration_seconds: duration,
        }
    }

    /// `MM:SS`, the way the countdown is shown to the user.
    pub fn clock(&self) -> String {
        format!(
            "{:02}:{:02}",
            self.remaining_seconds / 60,
            self.remaining_seconds % 60
        )
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AlertRequest {
    pub title: String,
    pub body: String,
}

impl AlertRequest {
    pub const TITLE: &'static str = "Timer Finished!";

    /// Alert for entering `next` after the previous phase ended.
    pub fn for_transition(next: Phase) -> Self {
        let body = match next {
            Phase::Work => "Back to work!",
            Phase::Break => "Time for a break!",
            Phase::LongBreak => "Time for a long break!",
        };
        Self {
            title: Self::TITLE.to_string(),
            body: body.to_string(),
        }
    }
}

/// Notifications for collaborators. The engine queues them; the host drains
/// and routes them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum TimerEvent {
    PhaseChanged { phase: Phase },
    RunningChanged { running: bool },
    /// Crossing between work and rest; drives video pause/resume.
    WorkBoundary { working: bool },
    Alert(AlertRequest),
    /// Periodic progress report emitted by the host ticker.
    #[serde(rename_all = "camelCase")]
    Heartbeat { phase: Phase, remaining_seconds: u32 },
}
