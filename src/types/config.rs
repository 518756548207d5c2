//! Engine configuration

use serde::{Deserialize, Serialize};
use crate::types::QuadrantCount;
use crate::{
    ACTIVATION_THRESHOLD, MAINTAIN_THRESHOLD, GAZE_ACTIVATION_PX, GAZE_MAINTAIN_PX,
    GAZE_MIN_ACTIVATION_PX, STABLE_DURATION_MS, MAX_SAMPLE_INTERVAL_MS,
    QUADRANT_SCHEDULE, WORD_POOL_SIZE, WINDOW_MS, WINDOW_MIN_SAMPLES, WINDOW_EDGE_FRACTION,
};

/// Which normalizer turns raw samples into offsets
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NormalizerKind {
    /// Fixed geometric ratio from face landmarks
    #[default]
    HeadPose,
    /// Running-mean baseline over gaze x
    Gaze,
}

/// Which classification policy maps offsets to verdicts
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum PolicyKind {
    /// Two-threshold hysteresis on the latest offset
    #[default]
    Hysteresis,
    /// Hysteresis on the drift between the oldest and newest slices of a trailing window
    Windowed {
        window_ms: u64,
        min_samples: usize,
        edge_fraction: f64,
    },
}

impl PolicyKind {
    /// Windowed policy with the reference window parameters
    pub fn windowed() -> Self {
        PolicyKind::Windowed {
            window_ms: WINDOW_MS,
            min_samples: WINDOW_MIN_SAMPLES,
            edge_fraction: WINDOW_EDGE_FRACTION,
        }
    }
}

/// Enter/stay thresholds of the hysteresis band
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Thresholds {
    pub activation: f64,
    pub maintain: f64,
}

impl Default for Thresholds {
    fn default() -> Self {
        Self {
            activation: ACTIVATION_THRESHOLD,
            maintain: MAINTAIN_THRESHOLD,
        }
    }
}

impl Thresholds {
    /// Reference band for the scale `kind` produces offsets in
    pub fn for_normalizer(kind: NormalizerKind) -> Self {
        match kind {
            NormalizerKind::HeadPose => Self::default(),
            NormalizerKind::Gaze => Self {
                activation: GAZE_ACTIVATION_PX,
                maintain: GAZE_MAINTAIN_PX,
            },
        }
    }
}

/// Main configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// |offset| needed to enter a direction
    pub activation_threshold: f64,
    /// |offset| needed to stay in the tracked direction
    pub maintain_threshold: f64,
    /// Hold needed to commit (ms)
    pub stable_duration_ms: u64,
    /// Samples further apart than this are stale (ms)
    pub max_sample_interval_ms: u64,
    /// Quadrant count per round; length is the round cap
    pub quadrant_schedule: Vec<QuadrantCount>,
    /// Words drawn from a theme per game
    pub word_pool_size: usize,
    pub normalizer: NormalizerKind,
    pub policy: PolicyKind,
}

impl Default for EngineConfig {
    fn default() -> Self {
        let quadrant_schedule = QUADRANT_SCHEDULE
            .iter()
            .filter_map(|&q| QuadrantCount::try_from(q).ok())
            .collect();
        Self {
            activation_threshold: ACTIVATION_THRESHOLD,
            maintain_threshold: MAINTAIN_THRESHOLD,
            stable_duration_ms: STABLE_DURATION_MS,
            max_sample_interval_ms: MAX_SAMPLE_INTERVAL_MS,
            quadrant_schedule,
            word_pool_size: WORD_POOL_SIZE,
            normalizer: NormalizerKind::default(),
            policy: PolicyKind::default(),
        }
    }
}

impl EngineConfig {
    /// Gaze normalizer with the pixel-scale band.
    ///
    /// The defaults are head-pose ratios; gaze configs must bring their own band.
    pub fn gaze() -> Self {
        let band = Thresholds::for_normalizer(NormalizerKind::Gaze);
        Self {
            activation_threshold: band.activation,
            maintain_threshold: band.maintain,
            normalizer: NormalizerKind::Gaze,
            ..Self::default()
        }
    }

    pub fn thresholds(&self) -> Thresholds {
        Thresholds {
            activation: self.activation_threshold,
            maintain: self.maintain_threshold,
        }
    }

    /// Round cap implied by the schedule
    pub fn max_rounds(&self) -> usize {
        self.quadrant_schedule.len()
    }

    /// Load from a JSON file; missing fields keep their defaults
    pub fn from_json_file(path: impl AsRef<std::path::Path>) -> crate::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: EngineConfig = serde_json::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    /// Validate config values are within acceptable ranges.
    /// Returns Err with a description of the first invalid field.
    pub fn validate(&self) -> crate::Result<()> {
        let t = self.thresholds();
        if !t.activation.is_finite() || t.activation < 0.0 {
            return Err(crate::Error::Config(format!(
                "activation_threshold must be a finite value >= 0, got {}", t.activation
            )));
        }
        if !t.maintain.is_finite() || t.maintain < 0.0 {
            return Err(crate::Error::Config(format!(
                "maintain_threshold must be a finite value >= 0, got {}", t.maintain
            )));
        }
        if t.maintain > t.activation {
            return Err(crate::Error::Config(format!(
                "maintain_threshold ({}) must not exceed activation_threshold ({})",
                t.maintain, t.activation
            )));
        }
        if self.normalizer == NormalizerKind::Gaze && t.activation < GAZE_MIN_ACTIVATION_PX {
            return Err(crate::Error::Config(format!(
                "gaze offsets are in pixels; activation_threshold {} is below {} px (try {})",
                t.activation, GAZE_MIN_ACTIVATION_PX, GAZE_ACTIVATION_PX
            )));
        }
        if self.max_sample_interval_ms == 0 {
            return Err(crate::Error::Config("max_sample_interval_ms must be > 0".to_string()));
        }
        if self.quadrant_schedule.is_empty() {
            return Err(crate::Error::Config("quadrant_schedule must not be empty".to_string()));
        }
        if self.word_pool_size == 0 {
            return Err(crate::Error::Config("word_pool_size must be > 0".to_string()));
        }
        if let PolicyKind::Windowed { window_ms, min_samples, edge_fraction } = self.policy {
            if window_ms == 0 {
                return Err(crate::Error::Config("window_ms must be > 0".to_string()));
            }
            if min_samples < 2 {
                return Err(crate::Error::Config(format!(
                    "min_samples must be >= 2, got {}", min_samples
                )));
            }
            if !(edge_fraction > 0.0 && edge_fraction <= 0.5) {
                return Err(crate::Error::Config(format!(
                    "edge_fraction must be in (0, 0.5], got {}", edge_fraction
                )));
            }
        }
        Ok(())
    }
}
