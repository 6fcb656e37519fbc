//! Session data types
//!
//! This module defines the activity signals, session state and report types that
//! flow through the scoring pipeline.

use crate::error::EngineError;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

/// Maximum number of scores kept in a session's history
pub const HISTORY_CAPACITY: usize = 10;

/// Lower bound for typing speed
pub const TYPING_FLOOR: f64 = 20.0;
/// Upper bound for idle time
pub const IDLE_CEILING: f64 = 30.0;
/// Upper bound for app switches
pub const APPS_CEILING: f64 = 15.0;
/// Lower bound for mouse activity
pub const MOUSE_FLOOR: f64 = 20.0;

/// Session mode, fixed for the lifetime of a session
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Mode {
    #[default]
    Study,
    Work,
    Creative,
}

impl Mode {
    /// Maximum per-tick random perturbation for this mode
    pub fn drift(self) -> f64 {
        match self {
            Mode::Study => 1.0,
            Mode::Work => 2.0,
            Mode::Creative => 0.5,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Mode::Study => "study",
            Mode::Work => "work",
            Mode::Creative => "creative",
        }
    }

    pub const ALL: [Mode; 3] = [Mode::Study, Mode::Work, Mode::Creative];
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Mode {
    type Err = EngineError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "study" => Ok(Mode::Study),
            "work" => Ok(Mode::Work),
            "creative" => Ok(Mode::Creative),
            other => Err(EngineError::UnknownMode(other.to_string())),
        }
    }
}

/// Raw activity signals advanced by the simulator each tick
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ActivitySignals {
    /// Typing speed, in [20, 100]
    pub typing: f64,
    /// Idle time, in [0, 30]
    pub idle: f64,
    /// App switch count, in [0, 15]
    pub apps: f64,
    /// Mouse activity, in [20, 100]
    pub mouse: f64,
}

impl Default for ActivitySignals {
    fn default() -> Self {
        Self {
            typing: 70.0,
            idle: 5.0,
            apps: 3.0,
            mouse: 85.0,
        }
    }
}

impl ActivitySignals {
    /// Feature vector in classifier order: typing, idle, apps, mouse
    pub fn features(&self) -> FeatureVector {
        [self.typing, self.idle, self.apps, self.mouse]
    }

    /// Whether every field sits inside the simulator's clamped range
    pub fn in_range(&self) -> bool {
        (TYPING_FLOOR..=100.0).contains(&self.typing)
            && (0.0..=IDLE_CEILING).contains(&self.idle)
            && (0.0..=APPS_CEILING).contains(&self.apps)
            && (MOUSE_FLOOR..=100.0).contains(&self.mouse)
    }
}

/// Classifier input: `[typing, idle, apps, mouse]`
pub type FeatureVector = [f64; 4];

/// Number of features the classifier consumes
pub const FEATURE_COUNT: usize = 4;

/// The single mutable session owned by the controller
#[derive(Debug, Clone, Serialize)]
pub struct SessionState {
    pub session_id: Uuid,
    pub mode: Mode,
    pub signals: ActivitySignals,
    /// Smoothed integer scores, most recent last
    pub history: VecDeque<u32>,
    /// Ticks applied to this session, including scores evicted from history
    pub ticks: u64,
    pub started_at: DateTime<Utc>,
}

impl SessionState {
    /// Fresh session with default signals and an empty history
    pub fn new(mode: Mode) -> Self {
        Self {
            session_id: Uuid::new_v4(),
            mode,
            signals: ActivitySignals::default(),
            history: VecDeque::with_capacity(HISTORY_CAPACITY),
            ticks: 0,
            started_at: Utc::now(),
        }
    }

    /// Append a score, evicting the oldest entries beyond capacity
    pub fn push_score(&mut self, score: u32) {
        self.history.push_back(score);
        while self.history.len() > HISTORY_CAPACITY {
            self.history.pop_front();
        }
    }

    /// Summarize this session for the archive, if it recorded any scores
    pub fn summarize(&self) -> Option<SessionSummary> {
        let length = self.history.len();
        if length == 0 {
            return None;
        }
        let sum: u64 = self.history.iter().map(|&s| u64::from(s)).sum();
        let peak = self.history.iter().copied().max().unwrap_or(0);

        Some(SessionSummary {
            session_id: self.session_id,
            mode: self.mode,
            avg: (sum / length as u64) as u32,
            peak,
            length,
            started_at: self.started_at,
            archived_at: Utc::now(),
        })
    }
}

/// Escape-room style gating signal derived from the score
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum LockState {
    Locked,
    Unlocking,
    Unlocked,
}

/// Coarse label summarizing engagement and stress
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum CognitiveState {
    Calm,
    Focused,
    Drifting,
    Overloaded,
    Critical,
}

/// Recovery pattern detected across recent history
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Recovery {
    Fast,
}

/// Archived summary of a finished session
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionSummary {
    pub session_id: Uuid,
    pub mode: Mode,
    /// Integer mean of the session's history
    pub avg: u32,
    pub peak: u32,
    /// Number of scores the average was taken over
    pub length: usize,
    pub started_at: DateTime<Utc>,
    pub archived_at: DateTime<Utc>,
}

/// Acknowledgement returned by a session start
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StartAck {
    pub status: String,
    pub mode: Mode,
}

/// Complete result of a single tick
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TickReport {
    pub score: u32,
    pub lock: LockState,
    pub history: Vec<u32>,
    pub reasons: Vec<String>,
    pub cognitive_state: CognitiveState,
    pub boredom: bool,
    pub drift: bool,
    pub recovery: Option<Recovery>,
    pub intervention: String,
}
