//! Reason codes for sample handling, timer transitions and funnel decisions

use serde::{Deserialize, Serialize};

/// Reason codes attached to every readout and round event
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[allow(non_camel_case_types)]
pub enum ReasonCode {
    // =========================================================================
    // R001: Timer phase
    // =========================================================================
    /// No direction held
    R001_STATE_IDLE,
    /// Direction held, dwell accumulating
    R001_STATE_TRACKING,
    /// Round already committed, sample ignored
    R001_STATE_COMMITTED,

    // =========================================================================
    // R002: Hold
    // =========================================================================
    /// New hold started from idle
    R002_HOLD_STARTED,
    /// Same direction again, dwell extended
    R002_HOLD_ACCUMULATING,
    /// Verdict went neutral, hold cleared
    R002_HOLD_RESET_NEUTRAL,
    /// Verdict flipped sides, hold restarted
    R002_HOLD_RESET_FLIP,
    /// Source went silent past the staleness ceiling, hold cleared
    R002_HOLD_RESET_STALE,

    // =========================================================================
    // R003: Commit
    // =========================================================================
    /// Dwell reached the stable duration
    R003_COMMIT_DWELL,
    /// Manual override forced the commit
    R003_COMMIT_MANUAL,

    // =========================================================================
    // R004: Funnel
    // =========================================================================
    /// Pool reduced, next round partitioned
    R004_ROUND_ADVANCED,
    /// One word left
    R004_SINGLE_SURVIVOR,
    /// Round cap reached with several words left
    R004_ROUND_CAP_REACHED,
    /// Nothing left to choose from
    R004_POOL_EMPTY,
}

impl ReasonCode {
    /// Get the code string (for logging)
    pub fn code(&self) -> &'static str {
        match self {
            Self::R001_STATE_IDLE => "R001_STATE_IDLE",
            Self::R001_STATE_TRACKING => "R001_STATE_TRACKING",
            Self::R001_STATE_COMMITTED => "R001_STATE_COMMITTED",
            Self::R002_HOLD_STARTED => "R002_HOLD_STARTED",
            Self::R002_HOLD_ACCUMULATING => "R002_HOLD_ACCUMULATING",
            Self::R002_HOLD_RESET_NEUTRAL => "R002_HOLD_RESET_NEUTRAL",
            Self::R002_HOLD_RESET_FLIP => "R002_HOLD_RESET_FLIP",
            Self::R002_HOLD_RESET_STALE => "R002_HOLD_RESET_STALE",
            Self::R003_COMMIT_DWELL => "R003_COMMIT_DWELL",
            Self::R003_COMMIT_MANUAL => "R003_COMMIT_MANUAL",
            Self::R004_ROUND_ADVANCED => "R004_ROUND_ADVANCED",
            Self::R004_SINGLE_SURVIVOR => "R004_SINGLE_SURVIVOR",
            Self::R004_ROUND_CAP_REACHED => "R004_ROUND_CAP_REACHED",
            Self::R004_POOL_EMPTY => "R004_POOL_EMPTY",
        }
    }

    /// Get human-readable description
    pub fn description(&self) -> &'static str {
        match self {
            Self::R001_STATE_IDLE => "Waiting for a direction",
            Self::R001_STATE_TRACKING => "Holding a direction",
            Self::R001_STATE_COMMITTED => "Choice already made",
            Self::R002_HOLD_STARTED => "Hold started",
            Self::R002_HOLD_ACCUMULATING => "Hold building",
            Self::R002_HOLD_RESET_NEUTRAL => "Back to center - hold cleared",
            Self::R002_HOLD_RESET_FLIP => "Switched sides - hold restarted",
            Self::R002_HOLD_RESET_STALE => "Signal lost - hold cleared",
            Self::R003_COMMIT_DWELL => "Direction held long enough",
            Self::R003_COMMIT_MANUAL => "Direction chosen manually",
            Self::R004_ROUND_ADVANCED => "Next round",
            Self::R004_SINGLE_SURVIVOR => "One word left",
            Self::R004_ROUND_CAP_REACHED => "Out of rounds - picking a survivor",
            Self::R004_POOL_EMPTY => "No words left",
        }
    }
}

impl std::fmt::Display for ReasonCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.code(), self.description())
    }
}
