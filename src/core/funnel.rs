//! Elimination Funnel: shrink the word pool round by round
//!
//! Each round splits the pool into 2 or 4 contiguous groups (ceiling of the
//! remaining words over the remaining groups), keeps the groups on the
//! committed side and either terminates or partitions the survivors again.
//!
//! Termination, checked in order after each round:
//! 1. <= 1 survivor → that word (or "" when nothing survived)
//! 2. schedule exhausted → tie-break among the survivors (forced)
//! 3. otherwise → next round with the next quadrant count

use rand::Rng;
use tracing::{debug, info, warn};
use crate::types::{Direction, FunnelOutcome, Partition, QuadrantCount, RoundState};

// =============================================================================
// PARTITION + SURVIVOR TABLE
// =============================================================================

/// Split `pool` into `quadrants` contiguous groups covering it in order.
///
/// Group `i` takes ceil(remaining / groups_left) words, so earlier groups may
/// be one larger than later ones; trailing groups are empty only when the pool
/// runs out first.
pub fn partition(pool: &[String], quadrants: QuadrantCount) -> Partition {
    let q = quadrants.get();
    let mut groups = Vec::with_capacity(q);
    let mut start = 0;
    for g in 0..q {
        let remaining = pool.len() - start;
        let groups_left = q - g;
        let size = (remaining + groups_left - 1) / groups_left;
        groups.push(pool[start..start + size].to_vec());
        start += size;
    }
    Partition::new(groups)
}

/// Group indices kept for a committed direction.
///
/// Four groups are laid out as a 2×2 grid (0 top-left, 1 top-right,
/// 2 bottom-left, 3 bottom-right); two groups side by side.
pub fn surviving_groups(quadrants: QuadrantCount, direction: Direction) -> &'static [usize] {
    match (quadrants, direction) {
        (QuadrantCount::Four, Direction::Left) => &[0, 2],
        (QuadrantCount::Four, Direction::Right) => &[1, 3],
        (QuadrantCount::Two, Direction::Left) => &[0],
        (QuadrantCount::Two, Direction::Right) => &[1],
    }
}

/// Words kept from `partition` for `direction`, group order preserved
pub fn survivors(partition: &Partition, quadrants: QuadrantCount, direction: Direction) -> Vec<String> {
    surviving_groups(quadrants, direction)
        .iter()
        .filter_map(|&i| partition.group(i))
        .flatten()
        .filter(|w| !w.is_empty())
        .cloned()
        .collect()
}

// =============================================================================
// TIE-BREAK
// =============================================================================

/// Picks the winner when the round cap is hit with several survivors
pub trait TieBreak: std::fmt::Debug + Send + Sync {
    /// Index into `candidates` (never called with an empty slice)
    fn pick(&mut self, candidates: &[String]) -> usize;
}

/// Deterministic: the first survivor in pool order
#[derive(Debug, Clone, Copy, Default)]
pub struct FirstCandidate;

impl TieBreak for FirstCandidate {
    fn pick(&mut self, _candidates: &[String]) -> usize {
        0
    }
}

/// Uniformly random survivor, for orchestration layers that want it
#[derive(Debug, Clone)]
pub struct RandomCandidate<R> {
    rng: R,
}

impl<R: Rng> RandomCandidate<R> {
    pub fn new(rng: R) -> Self {
        Self { rng }
    }
}

impl<R: Rng + std::fmt::Debug + Send + Sync> TieBreak for RandomCandidate<R> {
    fn pick(&mut self, candidates: &[String]) -> usize {
        self.rng.gen_range(0..candidates.len())
    }
}

// =============================================================================
// FUNNEL
// =============================================================================

/// Round schedule plus the tie-break used on forced termination
#[derive(Debug)]
pub struct EliminationFunnel {
    schedule: Vec<QuadrantCount>,
    tie_break: Box<dyn TieBreak>,
}

impl EliminationFunnel {
    /// Create funnel with the deterministic first-candidate tie-break
    pub fn new(schedule: Vec<QuadrantCount>) -> Self {
        Self::with_tie_break(schedule, Box::new(FirstCandidate))
    }

    pub fn with_tie_break(schedule: Vec<QuadrantCount>, tie_break: Box<dyn TieBreak>) -> Self {
        Self { schedule, tie_break }
    }

    /// Round cap
    pub fn max_rounds(&self) -> usize {
        self.schedule.len()
    }

    pub fn schedule(&self) -> &[QuadrantCount] {
        &self.schedule
    }

    /// Start a game on `pool`.
    ///
    /// An empty or single-word pool terminates immediately.
    pub fn start_round(&mut self, pool: Vec<String>) -> FunnelOutcome {
        let pool: Vec<String> = pool.into_iter().filter(|w| !w.is_empty()).collect();
        if pool.len() <= 1 {
            debug!(size = pool.len(), "pool too small to partition");
            return Self::settled(pool);
        }
        if self.schedule.is_empty() {
            warn!("empty quadrant schedule, terminating without a round");
            return self.forced(pool);
        }
        FunnelOutcome::Continue(self.round_at(0, pool))
    }

    /// Apply the committed direction to `round`
    pub fn apply_direction(&mut self, round: &RoundState, direction: Direction) -> FunnelOutcome {
        let kept = survivors(&round.partition, round.quadrant_count, direction);
        debug!(
            round = round.round_index,
            direction = %direction,
            before = round.pool.len(),
            after = kept.len(),
            "pool reduced"
        );

        if kept.len() <= 1 {
            return Self::settled(kept);
        }

        let next_index = round.round_index + 1;
        if next_index >= self.schedule.len() {
            return self.forced(kept);
        }

        FunnelOutcome::Continue(self.round_at(next_index, kept))
    }

    fn round_at(&self, round_index: usize, pool: Vec<String>) -> RoundState {
        let quadrant_count = self.schedule[round_index];
        let partition = partition(&pool, quadrant_count);
        RoundState { round_index, quadrant_count, pool, partition }
    }

    fn settled(survivors: Vec<String>) -> FunnelOutcome {
        let word = survivors.first().cloned().unwrap_or_default();
        info!(word = %word, "funnel settled");
        FunnelOutcome::Done { word, forced: false, survivors }
    }

    fn forced(&mut self, survivors: Vec<String>) -> FunnelOutcome {
        let index = self.tie_break.pick(&survivors).min(survivors.len().saturating_sub(1));
        let word = survivors.get(index).cloned().unwrap_or_default();
        warn!(word = %word, remaining = survivors.len(), "round cap reached, tie-break applied");
        FunnelOutcome::Done { word, forced: true, survivors }
    }
}

// =============================================================================
// TESTS
// =============================================================================
