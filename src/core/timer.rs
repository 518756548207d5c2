//! Commitment Timer: a direction must be held continuously before it counts
//!
//! State transitions:
//! - IDLE → TRACKING: verdict left/right (hold starts at 0)
//! - TRACKING → TRACKING: same verdict (held = now - start)
//! - TRACKING → TRACKING: opposite verdict (hold restarts at 0, no partial credit)
//! - TRACKING → IDLE: verdict neutral (hold cleared)
//! - TRACKING → IDLE: stale gap in the source (hold cleared)
//! - TRACKING → COMMITTED: held >= stable duration (one Commit, then inert)
//!
//! Time only advances through sample timestamps. A stall longer than the
//! staleness ceiling clears the hold; silence never commits.

use tracing::{debug, info};
use crate::types::{Direction, ReasonCode, Readout, TimerPhase, TrackingState, Verdict};

/// Result of feeding one verdict (or an override) to the timer
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimerUpdate {
    /// Phase after the update
    pub phase: TimerPhase,
    /// Direction currently held or committed
    pub direction: Option<Direction>,
    /// Hold duration after the update (milliseconds)
    pub held_ms: u64,
    /// Set exactly once per round, on the update that commits
    pub committed: Option<Direction>,
    pub reason: ReasonCode,
}

impl TimerUpdate {
    /// Presentation readout for this update
    pub fn readout(&self, stable_ms: u64) -> Readout {
        Readout::new(self.phase, self.direction, self.held_ms, stable_ms, self.reason)
    }
}

/// Dwell timer for one round
#[derive(Debug, Clone)]
pub struct CommitmentTimer {
    /// Hold needed to commit
    stable_duration_ms: u64,
    /// Current phase
    phase: TimerPhase,
    /// Active direction and hold bookkeeping
    tracking: TrackingState,
    /// Direction finalized this round
    committed: Option<Direction>,
    /// Whether the commit came from the manual override
    manual: bool,
    /// Number of verdicts processed
    update_count: u64,
}

impl CommitmentTimer {
    /// Create new timer
    pub fn new(stable_duration_ms: u64) -> Self {
        Self {
            stable_duration_ms,
            phase: TimerPhase::Idle,
            tracking: TrackingState::default(),
            committed: None,
            manual: false,
            update_count: 0,
        }
    }

    /// Feed one verdict observed at `now_ms`
    pub fn update(&mut self, verdict: Verdict, now_ms: u64) -> TimerUpdate {
        if self.phase == TimerPhase::Committed {
            return self.snapshot(None, ReasonCode::R001_STATE_COMMITTED);
        }
        self.update_count += 1;

        let reason = match (self.tracking.active_direction, verdict.direction()) {
            (None, None) => ReasonCode::R001_STATE_IDLE,
            (Some(_), None) => {
                debug!(t = now_ms, "hold cleared on neutral");
                self.tracking.clear();
                ReasonCode::R002_HOLD_RESET_NEUTRAL
            }
            (None, Some(d)) => {
                debug!(t = now_ms, direction = %d, "hold started");
                self.tracking = TrackingState::start(d, now_ms);
                ReasonCode::R002_HOLD_STARTED
            }
            (Some(active), Some(d)) if active == d => {
                let start = self.tracking.hold_start_ms.unwrap_or(now_ms);
                self.tracking.held_duration_ms = now_ms.saturating_sub(start);
                ReasonCode::R002_HOLD_ACCUMULATING
            }
            (Some(active), Some(d)) => {
                debug!(t = now_ms, from = %active, to = %d, "hold restarted on flip");
                self.tracking = TrackingState::start(d, now_ms);
                ReasonCode::R002_HOLD_RESET_FLIP
            }
        };

        self.phase = if self.tracking.active_direction.is_some() {
            TimerPhase::Tracking
        } else {
            TimerPhase::Idle
        };

        if let Some(d) = self.tracking.active_direction {
            if self.tracking.held_duration_ms >= self.stable_duration_ms {
                info!(direction = %d, held_ms = self.tracking.held_duration_ms, "direction committed");
                self.phase = TimerPhase::Committed;
                self.committed = Some(d);
                return self.snapshot(Some(d), ReasonCode::R003_COMMIT_DWELL);
            }
        }

        self.snapshot(None, reason)
    }

    /// The signal source stalled: drop any hold in progress.
    ///
    /// Returns `None` when there was nothing to clear.
    pub fn interrupt(&mut self, now_ms: u64) -> Option<TimerUpdate> {
        if self.phase != TimerPhase::Tracking {
            return None;
        }
        debug!(t = now_ms, "hold cleared on stale gap");
        self.tracking.clear();
        self.phase = TimerPhase::Idle;
        Some(self.snapshot(None, ReasonCode::R002_HOLD_RESET_STALE))
    }

    /// Manual override: commit `direction` immediately.
    ///
    /// Returns `None` when the round is already committed.
    pub fn force(&mut self, direction: Direction, now_ms: u64) -> Option<TimerUpdate> {
        if self.phase == TimerPhase::Committed {
            debug!(direction = %direction, "override ignored, round already committed");
            return None;
        }
        info!(direction = %direction, "direction chosen manually");
        self.tracking = TrackingState {
            active_direction: Some(direction),
            hold_start_ms: Some(now_ms.saturating_sub(self.stable_duration_ms)),
            held_duration_ms: self.stable_duration_ms,
        };
        self.phase = TimerPhase::Committed;
        self.committed = Some(direction);
        self.manual = true;
        Some(self.snapshot(Some(direction), ReasonCode::R003_COMMIT_MANUAL))
    }

    fn snapshot(&self, committed: Option<Direction>, reason: ReasonCode) -> TimerUpdate {
        TimerUpdate {
            phase: self.phase,
            direction: self.tracking.active_direction,
            held_ms: self.tracking.held_duration_ms,
            committed,
            reason,
        }
    }

    /// Get current phase
    pub fn phase(&self) -> TimerPhase {
        self.phase
    }

    /// Get tracking bookkeeping
    pub fn tracking(&self) -> &TrackingState {
        &self.tracking
    }

    /// Get hold duration in milliseconds
    pub fn held_ms(&self) -> u64 {
        self.tracking.held_duration_ms
    }

    /// Direction being held, if any
    pub fn active_direction(&self) -> Option<Direction> {
        self.tracking.active_direction
    }

    /// Direction committed this round, if any
    pub fn committed(&self) -> Option<Direction> {
        self.committed
    }

    /// Was the commit forced by the override?
    pub fn was_manual(&self) -> bool {
        self.manual
    }

    pub fn stable_duration_ms(&self) -> u64 {
        self.stable_duration_ms
    }

    /// Get update count
    pub fn update_count(&self) -> u64 {
        self.update_count
    }

    /// Current readout without updating
    pub fn current_readout(&self) -> Readout {
        let reason = match self.phase {
            TimerPhase::Idle => ReasonCode::R001_STATE_IDLE,
            TimerPhase::Tracking => ReasonCode::R001_STATE_TRACKING,
            TimerPhase::Committed => ReasonCode::R001_STATE_COMMITTED,
        };
        self.snapshot(None, reason).readout(self.stable_duration_ms)
    }

    /// Reset timer for a new round
    pub fn reset(&mut self) {
        *self = Self::new(self.stable_duration_ms);
    }
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::STABLE_DURATION_MS;

    #[test]
    fn test_initial_phase_is_idle() {
        let timer = CommitmentTimer::new(STABLE_DURATION_MS);
        assert_eq!(timer.phase(), TimerPhase::Idle);
        assert_eq!(timer.held_ms(), 0);
    }

    #[test]
    fn test_idle_to_tracking() {
        let mut timer = CommitmentTimer::new(3000);
        let u = timer.update(Verdict::Left, 100);
        assert_eq!(u.phase, TimerPhase::Tracking);
        assert_eq!(u.held_ms, 0);
        assert_eq!(u.reason, ReasonCode::R002_HOLD_STARTED);
        assert_eq!(timer.tracking().hold_start_ms, Some(100));
    }

    #[test]
    fn test_hold_accumulates() {
        let mut timer = CommitmentTimer::new(3000);
        timer.update(Verdict::Right, 1000);
        let u = timer.update(Verdict::Right, 2500);
        assert_eq!(u.held_ms, 1500);
        assert_eq!(u.committed, None);
    }

    #[test]
    fn test_neutral_clears_hold() {
        let mut timer = CommitmentTimer::new(3000);
        timer.update(Verdict::Right, 0);
        timer.update(Verdict::Right, 2000);
        let u = timer.update(Verdict::Neutral, 2100);
        assert_eq!(u.phase, TimerPhase::Idle);
        assert_eq!(u.held_ms, 0);
        assert_eq!(*timer.tracking(), TrackingState::default());
    }

    #[test]
    fn test_flip_restarts_hold() {
        let mut timer = CommitmentTimer::new(3000);
        timer.update(Verdict::Right, 0);
        timer.update(Verdict::Right, 2900);
        let u = timer.update(Verdict::Left, 2950);
        assert_eq!(u.phase, TimerPhase::Tracking);
        assert_eq!(u.held_ms, 0);
        assert_eq!(u.direction, Some(Direction::Left));
        assert_eq!(u.reason, ReasonCode::R002_HOLD_RESET_FLIP);
        // no carried credit
        let u = timer.update(Verdict::Left, 3100);
        assert_eq!(u.held_ms, 150);
        assert_eq!(u.committed, None);
    }

    #[test]
    fn test_commit_fires_once() {
        let mut timer = CommitmentTimer::new(3000);
        timer.update(Verdict::Left, 0);
        let u = timer.update(Verdict::Left, 3000);
        assert_eq!(u.committed, Some(Direction::Left));
        assert_eq!(u.phase, TimerPhase::Committed);
        assert_eq!(u.reason, ReasonCode::R003_COMMIT_DWELL);

        let again = timer.update(Verdict::Left, 3100);
        assert_eq!(again.committed, None);
        assert_eq!(again.reason, ReasonCode::R001_STATE_COMMITTED);
        let other = timer.update(Verdict::Right, 3200);
        assert_eq!(other.committed, None);
        assert_eq!(timer.committed(), Some(Direction::Left));
    }

    #[test]
    fn test_zero_duration_commits_on_entry() {
        let mut timer = CommitmentTimer::new(0);
        let u = timer.update(Verdict::Right, 10);
        assert_eq!(u.committed, Some(Direction::Right));
    }

    #[test]
    fn test_stall_never_commits() {
        let mut timer = CommitmentTimer::new(3000);
        timer.update(Verdict::Left, 0);
        timer.update(Verdict::Left, 1000);
        // no samples for a long time; nothing advances on its own
        assert_eq!(timer.held_ms(), 1000);
        assert_eq!(timer.phase(), TimerPhase::Tracking);
        assert_eq!(timer.committed(), None);
    }

    #[test]
    fn test_interrupt_clears_hold() {
        let mut timer = CommitmentTimer::new(3000);
        assert!(timer.interrupt(0).is_none());
        timer.update(Verdict::Left, 0);
        timer.update(Verdict::Left, 100);
        let u = timer.interrupt(10_100).unwrap();
        assert_eq!(u.phase, TimerPhase::Idle);
        assert_eq!(u.held_ms, 0);
        assert_eq!(u.reason, ReasonCode::R002_HOLD_RESET_STALE);
        // the hold is measured from the first sample after the gap
        let u = timer.update(Verdict::Left, 10_150);
        assert_eq!(u.held_ms, 0);
        assert_eq!(u.committed, None);
    }

    #[test]
    fn test_interrupt_after_commit_is_noop() {
        let mut timer = CommitmentTimer::new(0);
        timer.update(Verdict::Right, 0);
        assert!(timer.interrupt(5000).is_none());
        assert_eq!(timer.phase(), TimerPhase::Committed);
    }

    #[test]
    fn test_force_commits_with_full_hold() {
        let mut timer = CommitmentTimer::new(3000);
        let u = timer.force(Direction::Right, 0).unwrap();
        assert_eq!(u.committed, Some(Direction::Right));
        assert_eq!(u.held_ms, 3000);
        assert_eq!(u.reason, ReasonCode::R003_COMMIT_MANUAL);
        assert!(timer.was_manual());
    }

    #[test]
    fn test_early_force_saturates_start() {
        let mut timer = CommitmentTimer::new(3000);
        timer.force(Direction::Left, 1200);
        assert_eq!(timer.tracking().hold_start_ms, Some(0));
        assert_eq!(timer.held_ms(), 3000);
    }

    #[test]
    fn test_force_after_commit_is_noop() {
        let mut timer = CommitmentTimer::new(3000);
        timer.force(Direction::Left, 0);
        assert!(timer.force(Direction::Right, 10).is_none());
        assert_eq!(timer.committed(), Some(Direction::Left));
    }

    #[test]
    fn test_reset_keeps_duration() {
        let mut timer = CommitmentTimer::new(1234);
        timer.force(Direction::Left, 0);
        timer.reset();
        assert_eq!(timer.phase(), TimerPhase::Idle);
        assert_eq!(timer.stable_duration_ms(), 1234);
        assert_eq!(timer.committed(), None);
    }
}
