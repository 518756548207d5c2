//! Core modules for mindread

pub mod normalizer;
pub mod classifier;
pub mod timer;
pub mod funnel;
pub mod session;
pub mod replay;
pub mod api;

pub use normalizer::{build_normalizer, head_rotation_ratio, Admission, GazeNormalizer, HeadPoseNormalizer, Normalizer, SampleGate};
pub use classifier::{build_policy, classify_with_band, ClassificationPolicy, HysteresisPolicy, WindowedPolicy};
pub use timer::{CommitmentTimer, TimerUpdate};
pub use funnel::{partition, surviving_groups, survivors, EliminationFunnel, FirstCandidate, RandomCandidate, TieBreak};
pub use session::GameSession;
pub use replay::{parse_line, parse_trace, replay, TraceEvent};
pub use api::{create_router, run_server};
