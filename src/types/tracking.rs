//! Commitment timer state definitions

use serde::{Deserialize, Serialize};
use crate::types::Direction;

/// The three phases of a round's commitment timer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TimerPhase {
    /// No direction held
    Idle,
    /// A direction is being held, dwell accumulating
    Tracking,
    /// Choice finalized for this round
    Committed,
}

impl TimerPhase {
    /// Get ANSI color name for terminal display
    pub fn color(&self) -> colored::Color {
        match self {
            TimerPhase::Idle => colored::Color::BrightBlack,
            TimerPhase::Tracking => colored::Color::Yellow,
            TimerPhase::Committed => colored::Color::Green,
        }
    }

    /// Get emoji for phase
    pub fn emoji(&self) -> &'static str {
        match self {
            TimerPhase::Idle => "⏳",
            TimerPhase::Tracking => "🔶",
            TimerPhase::Committed => "🔒",
        }
    }
}

impl std::fmt::Display for TimerPhase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            TimerPhase::Idle => "IDLE",
            TimerPhase::Tracking => "TRACKING",
            TimerPhase::Committed => "COMMITTED",
        };
        write!(f, "{}", name)
    }
}

/// Dwell bookkeeping owned by the commitment timer.
///
/// `held_duration_ms` equals `now - hold_start_ms` while a direction is
/// active and is exactly 0 otherwise. A manual override is the exception:
/// it reports the full stable duration, and `hold_start_ms` saturates at 0
/// when the override lands before that much time has passed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct TrackingState {
    pub active_direction: Option<Direction>,
    pub hold_start_ms: Option<u64>,
    pub held_duration_ms: u64,
}

impl TrackingState {
    /// Fresh hold on `direction` starting at `now_ms`
    pub fn start(direction: Direction, now_ms: u64) -> Self {
        Self {
            active_direction: Some(direction),
            hold_start_ms: Some(now_ms),
            held_duration_ms: 0,
        }
    }

    pub fn clear(&mut self) {
        *self = Self::default();
    }
}
