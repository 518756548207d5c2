//! Round model for the elimination funnel
//!
//! - Partition = 2 or 4 contiguous groups covering the pool in order
//! - RoundState = one round's pool and its partition
//! - FunnelOutcome = what a committed direction leads to

use serde::{Deserialize, Serialize};
use crate::types::ReasonCode;

/// Number of spatial groups the pool is split into for one round
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub enum QuadrantCount {
    Two,
    Four,
}

impl QuadrantCount {
    pub fn get(&self) -> usize {
        match self {
            QuadrantCount::Two => 2,
            QuadrantCount::Four => 4,
        }
    }
}

impl TryFrom<u8> for QuadrantCount {
    type Error = String;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            2 => Ok(QuadrantCount::Two),
            4 => Ok(QuadrantCount::Four),
            other => Err(format!("quadrant count must be 2 or 4, got {}", other)),
        }
    }
}

impl From<QuadrantCount> for u8 {
    fn from(q: QuadrantCount) -> Self {
        q.get() as u8
    }
}

impl std::fmt::Display for QuadrantCount {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.get())
    }
}

/// Disjoint ordered groups of the current pool
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Partition {
    groups: Vec<Vec<String>>,
}

impl Partition {
    pub fn new(groups: Vec<Vec<String>>) -> Self {
        Self { groups }
    }

    pub fn groups(&self) -> &[Vec<String>] {
        &self.groups
    }

    pub fn group(&self, index: usize) -> Option<&[String]> {
        self.groups.get(index).map(|g| g.as_slice())
    }

    pub fn len(&self) -> usize {
        self.groups.len()
    }

    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }

    /// Total words across all groups
    pub fn word_count(&self) -> usize {
        self.groups.iter().map(|g| g.len()).sum()
    }

    /// Groups concatenated in order
    pub fn flatten(&self) -> Vec<String> {
        self.groups.iter().flatten().cloned().collect()
    }
}

/// One round of the funnel
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoundState {
    /// Zero-based round number
    pub round_index: usize,
    pub quadrant_count: QuadrantCount,
    pub pool: Vec<String>,
    pub partition: Partition,
}

/// Result of starting a round or applying a committed direction
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum FunnelOutcome {
    /// Another round is needed
    Continue(RoundState),
    /// Funnel terminated
    Done {
        /// Winning word, empty when nothing survived
        word: String,
        /// Round cap hit with more than one survivor
        forced: bool,
        /// Everything that survived the last round
        survivors: Vec<String>,
    },
}

impl FunnelOutcome {
    pub fn is_done(&self) -> bool {
        matches!(self, FunnelOutcome::Done { .. })
    }

    pub fn word(&self) -> Option<&str> {
        match self {
            FunnelOutcome::Done { word, .. } => Some(word.as_str()),
            FunnelOutcome::Continue(_) => None,
        }
    }

    pub fn next_round(&self) -> Option<&RoundState> {
        match self {
            FunnelOutcome::Continue(round) => Some(round),
            FunnelOutcome::Done { .. } => None,
        }
    }

    /// Reason code describing how the funnel got here
    pub fn reason(&self) -> ReasonCode {
        match self {
            FunnelOutcome::Continue(_) => ReasonCode::R004_ROUND_ADVANCED,
            FunnelOutcome::Done { forced: true, .. } => ReasonCode::R004_ROUND_CAP_REACHED,
            FunnelOutcome::Done { survivors, .. } if survivors.is_empty() => ReasonCode::R004_POOL_EMPTY,
            FunnelOutcome::Done { .. } => ReasonCode::R004_SINGLE_SURVIVOR,
        }
    }
}
