//! Directional Classifier: offset → {left, right, neutral}
//!
//! Two-threshold hysteresis:
//! - |v| >= activation → sign(v), whatever was tracked before
//! - tracking d, |v| >= maintain, sign(v) == d → d
//! - otherwise → neutral
//!
//! sign(0) is right. Policies are pluggable; the windowed policy feeds the
//! drift across a trailing window through the same band.

use std::collections::VecDeque;
use crate::types::{Direction, Offset, PolicyKind, Thresholds, Verdict};

/// Maps one offset (plus whatever history the policy keeps) to a verdict
pub trait ClassificationPolicy: std::fmt::Debug + Send + Sync {
    fn classify(&mut self, offset: &Offset, active: Option<Direction>) -> Verdict;

    /// Forget any history
    fn reset(&mut self) {}
}

/// Build the policy selected by configuration
pub fn build_policy(kind: PolicyKind, thresholds: Thresholds) -> Box<dyn ClassificationPolicy> {
    match kind {
        PolicyKind::Hysteresis => Box::new(HysteresisPolicy::new(thresholds)),
        PolicyKind::Windowed { window_ms, min_samples, edge_fraction } => Box::new(
            WindowedPolicy::new(thresholds, window_ms, min_samples, edge_fraction),
        ),
    }
}

/// Apply the hysteresis band to a single value
pub fn classify_with_band(value: f64, active: Option<Direction>, thresholds: &Thresholds) -> Verdict {
    let magnitude = value.abs();
    if magnitude >= thresholds.activation {
        return Direction::from_sign(value).into();
    }
    match active {
        Some(d) if magnitude >= thresholds.maintain && Direction::from_sign(value) == d => d.into(),
        _ => Verdict::Neutral,
    }
}

// =============================================================================
// SINGLE-OFFSET HYSTERESIS
// =============================================================================

/// Stateless policy over the latest offset
#[derive(Debug, Clone, Default)]
pub struct HysteresisPolicy {
    thresholds: Thresholds,
}

impl HysteresisPolicy {
    pub fn new(thresholds: Thresholds) -> Self {
        Self { thresholds }
    }

    pub fn thresholds(&self) -> &Thresholds {
        &self.thresholds
    }
}

impl ClassificationPolicy for HysteresisPolicy {
    fn classify(&mut self, offset: &Offset, active: Option<Direction>) -> Verdict {
        classify_with_band(offset.value, active, &self.thresholds)
    }
}

// =============================================================================
// TRAILING WINDOW
// =============================================================================

/// Compares the mean of the oldest slice of a trailing window with the newest
#[derive(Debug, Clone)]
pub struct WindowedPolicy {
    thresholds: Thresholds,
    window_ms: u64,
    min_samples: usize,
    edge_fraction: f64,
    buffer: VecDeque<Offset>,
}

impl WindowedPolicy {
    pub fn new(thresholds: Thresholds, window_ms: u64, min_samples: usize, edge_fraction: f64) -> Self {
        Self {
            thresholds,
            window_ms,
            min_samples: min_samples.max(2),
            edge_fraction: edge_fraction.clamp(f64::EPSILON, 0.5),
            buffer: VecDeque::new(),
        }
    }

    /// Offsets currently inside the window
    pub fn len(&self) -> usize {
        self.buffer.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buffer.is_empty()
    }

    /// Newest-slice mean minus oldest-slice mean, once enough samples are in
    pub fn drift(&self) -> Option<f64> {
        let n = self.buffer.len();
        if n < self.min_samples {
            return None;
        }
        let k = ((n as f64 * self.edge_fraction).floor() as usize).clamp(1, n / 2);
        let first: f64 = self.buffer.iter().take(k).map(|o| o.value).sum::<f64>() / k as f64;
        let last: f64 = self.buffer.iter().skip(n - k).map(|o| o.value).sum::<f64>() / k as f64;
        Some(last - first)
    }

    fn prune(&mut self, now_ms: u64) {
        let horizon = now_ms.saturating_sub(self.window_ms);
        while let Some(front) = self.buffer.front() {
            if front.timestamp_ms < horizon {
                self.buffer.pop_front();
            } else {
                break;
            }
        }
    }
}

impl ClassificationPolicy for WindowedPolicy {
    fn classify(&mut self, offset: &Offset, active: Option<Direction>) -> Verdict {
        if !offset.value.is_finite() {
            return Verdict::Neutral;
        }
        self.buffer.push_back(*offset);
        self.prune(offset.timestamp_ms);
        match self.drift() {
            Some(drift) => classify_with_band(drift, active, &self.thresholds),
            None => Verdict::Neutral,
        }
    }

    fn reset(&mut self) {
        self.buffer.clear();
    }
}

// =============================================================================
// TESTS
// =============================================================================
