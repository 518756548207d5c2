//! mindread: Directional intent engine
//!
//! Guesses the word a player is thinking of by narrowing a word pool through
//! repeated left/right choices read from involuntary head or gaze movement.
//!
//! Pipeline: Sample → Normalizer → Classifier → CommitmentTimer → EliminationFunnel

pub mod core;
pub mod types;

// =============================================================================
// CLASSIFIER THRESHOLDS [C]
// =============================================================================

/// |offset| needed to enter a direction
pub const ACTIVATION_THRESHOLD: f64 = 0.07;

/// |offset| needed to stay in the direction already being tracked
pub const MAINTAIN_THRESHOLD: f64 = 0.05;

/// Gaze offsets are in screen pixels; enter threshold for gaze sessions
pub const GAZE_ACTIVATION_PX: f64 = 40.0;

/// Stay threshold for gaze sessions (pixels)
pub const GAZE_MAINTAIN_PX: f64 = 25.0;

/// Smallest activation accepted for gaze; anything lower is ratio-scale
pub const GAZE_MIN_ACTIVATION_PX: f64 = 1.0;

// =============================================================================
// TIMING [C]
// =============================================================================

/// A direction must be held this long before it counts as the player's choice
pub const STABLE_DURATION_MS: u64 = 3000;

/// Samples arriving later than this after the previous one are stale
pub const MAX_SAMPLE_INTERVAL_MS: u64 = 500;

// =============================================================================
// FUNNEL [C]
// =============================================================================

/// Quadrant count per round; its length is the round cap
pub const QUADRANT_SCHEDULE: [u8; 4] = [4, 4, 4, 2];

/// Words drawn from a theme at the start of a game
pub const WORD_POOL_SIZE: usize = 16;

/// Head-pose offset divides by half the inner-eye distance
pub const HEAD_POSE_HALF_WIDTH_FACTOR: f64 = 0.5;

// =============================================================================
// WINDOWED POLICY DEFAULTS [C]
// =============================================================================

/// Trailing window length for the windowed classifier
pub const WINDOW_MS: u64 = 1000;

/// Minimum samples in the window before it gives a verdict
pub const WINDOW_MIN_SAMPLES: usize = 6;

/// Fraction of the window averaged at each end
pub const WINDOW_EDGE_FRACTION: f64 = 0.3;

// =============================================================================
// ERRORS
// =============================================================================

/// Result alias for fallible outer-surface operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors raised by configuration, replay parsing and session lookup.
///
/// The sample path itself never fails: bad samples are dropped.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Replay error on line {line}: {reason}")]
    Replay { line: usize, reason: String },

    #[error("Session error: {0}")]
    Session(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

// =============================================================================
// VERSION
// =============================================================================

pub const VERSION: &str = "1.0.0";
