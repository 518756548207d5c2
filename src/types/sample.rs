//! Raw samples from the signal source and the normalized offsets derived from them

use serde::{Deserialize, Serialize};

/// Position payload of one sample
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Position {
    /// Face landmark x coordinates (nose tip, inner eye corners)
    HeadPose {
        nose_x: f64,
        left_eye_x: f64,
        right_eye_x: f64,
    },
    /// Horizontal gaze or pointer coordinate
    Gaze { x: f64 },
    /// Already-normalized offset, passed through unchanged
    Offset { value: f64 },
}

impl Position {
    /// All coordinates are finite numbers
    pub fn is_finite(&self) -> bool {
        match *self {
            Position::HeadPose { nose_x, left_eye_x, right_eye_x } => {
                nose_x.is_finite() && left_eye_x.is_finite() && right_eye_x.is_finite()
            }
            Position::Gaze { x } => x.is_finite(),
            Position::Offset { value } => value.is_finite(),
        }
    }
}

/// One timestamped reading from the signal source
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Sample {
    /// Monotonic milliseconds
    pub timestamp_ms: u64,
    pub position: Position,
}

impl Sample {
    pub fn new(timestamp_ms: u64, position: Position) -> Self {
        Self { timestamp_ms, position }
    }

    pub fn head_pose(timestamp_ms: u64, nose_x: f64, left_eye_x: f64, right_eye_x: f64) -> Self {
        Self::new(timestamp_ms, Position::HeadPose { nose_x, left_eye_x, right_eye_x })
    }

    pub fn gaze(timestamp_ms: u64, x: f64) -> Self {
        Self::new(timestamp_ms, Position::Gaze { x })
    }

    pub fn offset(timestamp_ms: u64, value: f64) -> Self {
        Self::new(timestamp_ms, Position::Offset { value })
    }
}

/// Zero-centered horizontal deviation, one per accepted sample
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Offset {
    pub timestamp_ms: u64,
    pub value: f64,
}

impl Offset {
    pub fn new(timestamp_ms: u64, value: f64) -> Self {
        Self { timestamp_ms, value }
    }
}
