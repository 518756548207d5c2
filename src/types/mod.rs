//! Core types for mindread

mod direction;
mod sample;
mod tracking;
mod round;
mod reason;
mod output;
mod config;
mod theme;

pub use direction::{Direction, Verdict};
pub use sample::{Sample, Position, Offset};
pub use tracking::{TrackingState, TimerPhase};
pub use round::{QuadrantCount, Partition, RoundState, FunnelOutcome};
pub use reason::ReasonCode;
pub use output::{Readout, SessionEvent};
pub use config::{EngineConfig, NormalizerKind, PolicyKind, Thresholds};
pub use theme::Theme;
