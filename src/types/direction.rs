//! Direction and per-sample verdict

use serde::{Deserialize, Serialize};

/// A committed or tracked horizontal direction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    Left,
    Right,
}

impl Direction {
    /// Direction for a signed offset.
    ///
    /// Negative is left, positive is right. Exactly zero resolves to right.
    pub fn from_sign(value: f64) -> Self {
        if value < 0.0 {
            Direction::Left
        } else {
            Direction::Right
        }
    }

    /// Parse "left"/"right" (case insensitive, single letters accepted)
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "left" | "l" => Some(Direction::Left),
            "right" | "r" => Some(Direction::Right),
            _ => None,
        }
    }

    /// Arrow for terminal display
    pub fn arrow(&self) -> &'static str {
        match self {
            Direction::Left => "←",
            Direction::Right => "→",
        }
    }
}

impl std::fmt::Display for Direction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Direction::Left => "left",
            Direction::Right => "right",
        };
        write!(f, "{}", name)
    }
}

/// Classifier output for one offset
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Verdict {
    Left,
    Right,
    Neutral,
}

impl Verdict {
    /// The direction this verdict points at, if any
    pub fn direction(&self) -> Option<Direction> {
        match self {
            Verdict::Left => Some(Direction::Left),
            Verdict::Right => Some(Direction::Right),
            Verdict::Neutral => None,
        }
    }

    pub fn is_neutral(&self) -> bool {
        *self == Verdict::Neutral
    }
}

impl From<Direction> for Verdict {
    fn from(direction: Direction) -> Self {
        match direction {
            Direction::Left => Verdict::Left,
            Direction::Right => Verdict::Right,
        }
    }
}

impl std::fmt::Display for Verdict {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.direction() {
            Some(d) => write!(f, "{}", d),
            None => write!(f, "neutral"),
        }
    }
}
