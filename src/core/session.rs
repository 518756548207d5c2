//! Game session: Normalizer → Classifier → CommitmentTimer → EliminationFunnel
//!
//! One session owns one sample stream. Every call runs to completion before
//! the next is accepted, and a round change swaps the whole `RoundState` in a
//! single assignment. After `teardown` nothing is emitted any more.

use tracing::{debug, info};
use crate::core::classifier::{build_policy, ClassificationPolicy};
use crate::core::funnel::{EliminationFunnel, FirstCandidate, TieBreak};
use crate::core::normalizer::{build_normalizer, Admission, Normalizer};
use crate::core::timer::CommitmentTimer;
use crate::types::{
    Direction, EngineConfig, FunnelOutcome, Readout, RoundState, Sample, SessionEvent, TimerPhase,
};

/// Where the game is
#[derive(Debug, Clone, PartialEq, Eq)]
enum GameState {
    Playing(RoundState),
    Finished {
        word: String,
        forced: bool,
        survivors: Vec<String>,
    },
}

/// One player's game, from first partition to selected word
#[derive(Debug)]
pub struct GameSession {
    config: EngineConfig,
    normalizer: Box<dyn Normalizer>,
    policy: Box<dyn ClassificationPolicy>,
    timer: CommitmentTimer,
    funnel: EliminationFunnel,
    state: GameState,
    last_readout: Readout,
    closed: bool,
}

impl GameSession {
    /// Create a session on `pool` with the deterministic tie-break
    pub fn new(config: EngineConfig, pool: Vec<String>) -> crate::Result<Self> {
        Self::with_tie_break(config, pool, Box::new(FirstCandidate))
    }

    /// Create a session with a caller-supplied tie-break for forced endings
    pub fn with_tie_break(
        config: EngineConfig,
        pool: Vec<String>,
        tie_break: Box<dyn TieBreak>,
    ) -> crate::Result<Self> {
        config.validate()?;
        let normalizer = build_normalizer(config.normalizer, config.max_sample_interval_ms);
        let policy = build_policy(config.policy, config.thresholds());
        let timer = CommitmentTimer::new(config.stable_duration_ms);
        let mut funnel = EliminationFunnel::with_tie_break(config.quadrant_schedule.clone(), tie_break);
        let state = Self::state_for(funnel.start_round(pool));
        let last_readout = timer.current_readout();

        info!(
            normalizer = ?config.normalizer,
            rounds = funnel.max_rounds(),
            stable_ms = config.stable_duration_ms,
            "session created"
        );

        Ok(Self {
            config,
            normalizer,
            policy,
            timer,
            funnel,
            state,
            last_readout,
            closed: false,
        })
    }

    fn state_for(outcome: FunnelOutcome) -> GameState {
        match outcome {
            FunnelOutcome::Continue(round) => GameState::Playing(round),
            FunnelOutcome::Done { word, forced, survivors } => GameState::Finished { word, forced, survivors },
        }
    }

    /// Event describing the current state: the live round, or the final word
    pub fn announce(&self) -> Vec<SessionEvent> {
        if self.closed {
            return Vec::new();
        }
        match &self.state {
            GameState::Playing(round) => vec![SessionEvent::NextRound {
                round_index: round.round_index,
                partition: round.partition.clone(),
            }],
            GameState::Finished { word, forced, survivors } => {
                let outcome = FunnelOutcome::Done {
                    word: word.clone(),
                    forced: *forced,
                    survivors: survivors.clone(),
                };
                vec![SessionEvent::WordSelected {
                    word: word.clone(),
                    forced: *forced,
                    survivors: survivors.clone(),
                    reason: outcome.reason(),
                }]
            }
        }
    }

    /// Feed one payload from the signal source. Absent payloads are ignored.
    pub fn on_sample(&mut self, sample: Option<Sample>) -> Vec<SessionEvent> {
        if self.closed || !matches!(self.state, GameState::Playing(_)) {
            return Vec::new();
        }
        let Some(sample) = sample else {
            return Vec::new();
        };
        let Some(offset) = self.normalizer.normalize(&sample) else {
            return self.on_dropped_sample(sample.timestamp_ms);
        };

        let verdict = self.policy.classify(&offset, self.timer.active_direction());
        let update = self.timer.update(verdict, offset.timestamp_ms);
        debug!(t = offset.timestamp_ms, value = offset.value, verdict = %verdict, held_ms = update.held_ms, "sample processed");

        let readout = update.readout(self.config.stable_duration_ms);
        self.last_readout = readout.clone();

        let mut events = vec![SessionEvent::Readout(readout)];
        if let Some(direction) = update.committed {
            events.extend(self.finish_round(direction, false));
        }
        events
    }

    /// A stale gap breaks the hold; other drops leave it alone.
    fn on_dropped_sample(&mut self, timestamp_ms: u64) -> Vec<SessionEvent> {
        if self.normalizer.last_admission() != Some(Admission::Stale) {
            return Vec::new();
        }
        match self.timer.interrupt(timestamp_ms) {
            Some(update) => {
                let readout = update.readout(self.config.stable_duration_ms);
                self.last_readout = readout.clone();
                vec![SessionEvent::Readout(readout)]
            }
            None => Vec::new(),
        }
    }

    /// Manual override: commit `direction` now, bypassing the sensor.
    ///
    /// No-op once the round is committed, the game is over or the session closed.
    pub fn choose_direction(&mut self, direction: Direction, now_ms: u64) -> Vec<SessionEvent> {
        if self.closed || !matches!(self.state, GameState::Playing(_)) {
            return Vec::new();
        }
        let Some(update) = self.timer.force(direction, now_ms) else {
            return Vec::new();
        };

        let readout = update.readout(self.config.stable_duration_ms);
        self.last_readout = readout.clone();

        let mut events = vec![SessionEvent::Readout(readout)];
        events.extend(self.finish_round(direction, true));
        events
    }

    fn finish_round(&mut self, direction: Direction, manual: bool) -> Vec<SessionEvent> {
        let (round_index, outcome) = match &self.state {
            GameState::Playing(round) => (round.round_index, self.funnel.apply_direction(round, direction)),
            GameState::Finished { .. } => return Vec::new(),
        };

        let committed = SessionEvent::RoundCommitted { round_index, direction, manual };
        let reason = outcome.reason();
        let next = match &outcome {
            FunnelOutcome::Continue(round) => SessionEvent::NextRound {
                round_index: round.round_index,
                partition: round.partition.clone(),
            },
            FunnelOutcome::Done { word, forced, survivors } => {
                info!(word = %word, forced = *forced, "word selected");
                SessionEvent::WordSelected {
                    word: word.clone(),
                    forced: *forced,
                    survivors: survivors.clone(),
                    reason,
                }
            }
        };

        self.state = Self::state_for(outcome);
        self.reset_round_inputs();
        vec![committed, next]
    }

    fn reset_round_inputs(&mut self) {
        self.timer.reset();
        self.normalizer.reset();
        self.policy.reset();
        self.last_readout = self.timer.current_readout();
    }

    /// Stop consuming samples; nothing is emitted afterwards
    pub fn teardown(&mut self) {
        if !self.closed {
            info!("session torn down");
        }
        self.closed = true;
        self.reset_round_inputs();
    }

    /// Start a fresh game on `pool` with the same configuration
    pub fn restart(&mut self, pool: Vec<String>) -> Vec<SessionEvent> {
        self.closed = false;
        self.reset_round_inputs();
        self.state = Self::state_for(self.funnel.start_round(pool));
        info!("session restarted");
        self.announce()
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Live round, if the game is still running
    pub fn round(&self) -> Option<&RoundState> {
        match &self.state {
            GameState::Playing(round) => Some(round),
            GameState::Finished { .. } => None,
        }
    }

    pub fn phase(&self) -> TimerPhase {
        self.timer.phase()
    }

    /// Latest continuous readout
    pub fn readout(&self) -> &Readout {
        &self.last_readout
    }

    pub fn winning_word(&self) -> Option<&str> {
        match &self.state {
            GameState::Finished { word, .. } => Some(word.as_str()),
            GameState::Playing(_) => None,
        }
    }

    pub fn is_finished(&self) -> bool {
        matches!(self.state, GameState::Finished { .. })
    }

    pub fn is_closed(&self) -> bool {
        self.closed
    }
}

// =============================================================================
// TESTS
// =============================================================================
