//! Sample Normalizer: raw signal-source samples → zero-centered offsets
//!
//! - Head pose: (nose - eye midpoint) / (half inner-eye distance), no running state
//! - Gaze: midpoint(previous x, current x) - running mean of every x this session
//!
//! Both share a staleness gate: a sample whose elapsed time since the previous
//! accepted sample is non-positive is dropped outright; one whose gap exceeds
//! the ceiling re-seeds the timing reference but yields no offset.

use tracing::debug;
use crate::types::{NormalizerKind, Offset, Position, Sample};
use crate::HEAD_POSE_HALF_WIDTH_FACTOR;

/// Turns samples into offsets. `None` means "no offset this tick".
pub trait Normalizer: std::fmt::Debug + Send + Sync {
    fn normalize(&mut self, sample: &Sample) -> Option<Offset>;

    /// Admission of the most recent sample that reached the staleness gate
    fn last_admission(&self) -> Option<Admission>;

    /// Forget all running state
    fn reset(&mut self);
}

/// Build the normalizer selected by configuration
pub fn build_normalizer(kind: NormalizerKind, max_interval_ms: u64) -> Box<dyn Normalizer> {
    match kind {
        NormalizerKind::HeadPose => Box::new(HeadPoseNormalizer::new(max_interval_ms)),
        NormalizerKind::Gaze => Box::new(GazeNormalizer::new(max_interval_ms)),
    }
}

// =============================================================================
// STALENESS GATE
// =============================================================================

/// How a timestamp relates to the previous accepted one
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Admission {
    /// No previous sample
    First,
    /// 0 < elapsed <= ceiling
    Fresh,
    /// elapsed > ceiling; timing reference re-seeded
    Stale,
    /// elapsed <= 0; nothing changed
    Rejected,
}

/// Tracks elapsed time between consecutive samples
#[derive(Debug, Clone)]
pub struct SampleGate {
    max_interval_ms: u64,
    last_ms: Option<u64>,
    last_admission: Option<Admission>,
}

impl SampleGate {
    pub fn new(max_interval_ms: u64) -> Self {
        Self { max_interval_ms, last_ms: None, last_admission: None }
    }

    pub fn admit(&mut self, timestamp_ms: u64) -> Admission {
        let admission = self.classify(timestamp_ms);
        self.last_admission = Some(admission);
        admission
    }

    fn classify(&mut self, timestamp_ms: u64) -> Admission {
        match self.last_ms {
            None => {
                self.last_ms = Some(timestamp_ms);
                Admission::First
            }
            Some(last) if timestamp_ms <= last => Admission::Rejected,
            Some(last) => {
                self.last_ms = Some(timestamp_ms);
                if timestamp_ms - last > self.max_interval_ms {
                    Admission::Stale
                } else {
                    Admission::Fresh
                }
            }
        }
    }

    pub fn last_ms(&self) -> Option<u64> {
        self.last_ms
    }

    pub fn last_admission(&self) -> Option<Admission> {
        self.last_admission
    }

    pub fn reset(&mut self) {
        self.last_ms = None;
        self.last_admission = None;
    }
}

// =============================================================================
// HEAD POSE
// =============================================================================

/// Rotation ratio of the nose tip against the inner eye corners
pub fn head_rotation_ratio(nose_x: f64, left_eye_x: f64, right_eye_x: f64) -> Option<f64> {
    let center = (left_eye_x + right_eye_x) / 2.0;
    let half_width = (right_eye_x - left_eye_x).abs() * HEAD_POSE_HALF_WIDTH_FACTOR;
    if half_width <= f64::EPSILON {
        return None;
    }
    let ratio = (nose_x - center) / half_width;
    ratio.is_finite().then_some(ratio)
}

/// Stateless head-pose normalizer (apart from the staleness gate)
#[derive(Debug, Clone)]
pub struct HeadPoseNormalizer {
    gate: SampleGate,
}

impl HeadPoseNormalizer {
    pub fn new(max_interval_ms: u64) -> Self {
        Self { gate: SampleGate::new(max_interval_ms) }
    }
}

impl Normalizer for HeadPoseNormalizer {
    fn normalize(&mut self, sample: &Sample) -> Option<Offset> {
        if !sample.position.is_finite() {
            debug!(t = sample.timestamp_ms, "non-finite head sample dropped");
            return None;
        }
        let value = match sample.position {
            Position::HeadPose { nose_x, left_eye_x, right_eye_x } => {
                head_rotation_ratio(nose_x, left_eye_x, right_eye_x)?
            }
            Position::Offset { value } => value,
            Position::Gaze { .. } => {
                debug!(t = sample.timestamp_ms, "gaze sample given to head-pose normalizer");
                return None;
            }
        };

        match self.gate.admit(sample.timestamp_ms) {
            Admission::First | Admission::Fresh => Some(Offset::new(sample.timestamp_ms, value)),
            admission => {
                debug!(t = sample.timestamp_ms, ?admission, "head sample discarded");
                None
            }
        }
    }

    fn last_admission(&self) -> Option<Admission> {
        self.gate.last_admission()
    }

    fn reset(&mut self) {
        self.gate.reset();
    }
}

// =============================================================================
// GAZE
// =============================================================================

/// Running-mean baseline normalizer for gaze x coordinates
#[derive(Debug, Clone)]
pub struct GazeNormalizer {
    gate: SampleGate,
    sum: f64,
    count: u64,
    prev_x: Option<f64>,
}

impl GazeNormalizer {
    pub fn new(max_interval_ms: u64) -> Self {
        Self {
            gate: SampleGate::new(max_interval_ms),
            sum: 0.0,
            count: 0,
            prev_x: None,
        }
    }

    /// Mean of all x folded in so far
    pub fn baseline(&self) -> Option<f64> {
        (self.count > 0).then(|| self.sum / self.count as f64)
    }

    pub fn sample_count(&self) -> u64 {
        self.count
    }
}

impl Normalizer for GazeNormalizer {
    fn normalize(&mut self, sample: &Sample) -> Option<Offset> {
        if !sample.position.is_finite() {
            debug!(t = sample.timestamp_ms, "non-finite gaze sample dropped");
            return None;
        }
        let x = match sample.position {
            Position::Gaze { x } => x,
            Position::Offset { value } => {
                return match self.gate.admit(sample.timestamp_ms) {
                    Admission::First | Admission::Fresh => Some(Offset::new(sample.timestamp_ms, value)),
                    _ => None,
                };
            }
            Position::HeadPose { .. } => {
                debug!(t = sample.timestamp_ms, "head sample given to gaze normalizer");
                return None;
            }
        };

        match self.gate.admit(sample.timestamp_ms) {
            Admission::First => {
                self.sum += x;
                self.count += 1;
                self.prev_x = Some(x);
                None
            }
            Admission::Stale => {
                // x is discarded; the next fresh sample re-seeds the midpoint
                debug!(t = sample.timestamp_ms, "gaze gap exceeded, discarding");
                self.prev_x = None;
                None
            }
            Admission::Rejected => {
                debug!(t = sample.timestamp_ms, "gaze sample out of order, dropped");
                None
            }
            Admission::Fresh => {
                self.sum += x;
                self.count += 1;
                let mean = self.sum / self.count as f64;
                let prev = self.prev_x.replace(x)?;
                Some(Offset::new(sample.timestamp_ms, (prev + x) / 2.0 - mean))
            }
        }
    }

    fn last_admission(&self) -> Option<Admission> {
        self.gate.last_admission()
    }

    fn reset(&mut self) {
        self.gate.reset();
        self.sum = 0.0;
        self.count = 0;
        self.prev_x = None;
    }
}

// =============================================================================
// TESTS
// =============================================================================
