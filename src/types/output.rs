//! Outbound readouts and session events

use serde::{Deserialize, Serialize};
use chrono::{DateTime, Utc};
use colored::Colorize;
use crate::types::{Direction, Partition, ReasonCode, TimerPhase};

/// Continuous feedback for rendering while a round is live
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Readout {
    /// Wall-clock time the readout was produced
    pub timestamp: DateTime<Utc>,
    /// Timer phase after this update
    pub phase: TimerPhase,
    /// Direction currently held, if any
    pub highlighted: Option<Direction>,
    /// How long held (milliseconds)
    pub held_ms: u64,
    /// Hold needed to commit (milliseconds)
    pub stable_ms: u64,
    /// Why the timer is where it is
    pub reason: ReasonCode,
}

impl Readout {
    pub fn new(
        phase: TimerPhase,
        highlighted: Option<Direction>,
        held_ms: u64,
        stable_ms: u64,
        reason: ReasonCode,
    ) -> Self {
        Self {
            timestamp: Utc::now(),
            phase,
            highlighted,
            held_ms,
            stable_ms,
            reason,
        }
    }

    /// Whole seconds left before commit, as the countdown shows it
    pub fn seconds_remaining(&self) -> u64 {
        let remaining = self.stable_ms.saturating_sub(self.held_ms);
        (remaining + 999) / 1000
    }

    /// Format for terminal display (with colors)
    pub fn to_terminal_string(&self) -> String {
        let side = self.highlighted.map(|d| d.arrow()).unwrap_or("·");
        format!(
            "{} {} {} | held={:.1}s | left={}s | {}",
            self.phase.emoji(),
            side,
            self.phase,
            self.held_ms as f64 / 1000.0,
            self.seconds_remaining(),
            self.reason.code()
        )
        .color(self.phase.color())
        .to_string()
    }

    /// Format for parseable output (no colors)
    pub fn to_parseable_string(&self) -> String {
        format!(
            "phase={} | dir={} | held={:.1}s | reason={}",
            self.phase,
            self.highlighted.map(|d| d.to_string()).unwrap_or_else(|| "none".to_string()),
            self.held_ms as f64 / 1000.0,
            self.reason.code()
        )
    }
}

/// Everything a session tells the presentation layer
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum SessionEvent {
    /// Per-sample feedback
    Readout(Readout),
    /// The round's choice is final
    RoundCommitted {
        round_index: usize,
        direction: Direction,
        manual: bool,
    },
    /// A new round is ready to display
    NextRound {
        round_index: usize,
        partition: Partition,
    },
    /// The funnel finished
    WordSelected {
        word: String,
        forced: bool,
        survivors: Vec<String>,
        reason: ReasonCode,
    },
}

impl SessionEvent {
    /// Format for terminal display
    pub fn to_terminal_string(&self) -> String {
        match self {
            SessionEvent::Readout(r) => r.to_terminal_string(),
            SessionEvent::RoundCommitted { round_index, direction, manual } => {
                let how = if *manual { "manual" } else { "dwell" };
                format!("✓ round {} committed {} {} ({})", round_index + 1, direction.arrow(), direction, how)
                    .green()
                    .bold()
                    .to_string()
            }
            SessionEvent::NextRound { round_index, partition } => {
                let mut out = format!("▶ round {} - {} words", round_index + 1, partition.word_count())
                    .cyan()
                    .bold()
                    .to_string();
                for (i, group) in partition.groups().iter().enumerate() {
                    let words = if group.is_empty() { "-".to_string() } else { group.join(", ") };
                    out.push_str(&format!("\n  [{}] {}", i, words.dimmed()));
                }
                out
            }
            SessionEvent::WordSelected { word, forced, survivors, .. } => {
                let shown = if word.is_empty() { "(nothing)" } else { word.as_str() };
                let mut out = format!("🜂 You were thinking of: {}", shown).magenta().bold().to_string();
                if *forced {
                    out.push_str(&format!("\n  {} {}", "⚠ out of rounds, survivors:".yellow(), survivors.join(", ")));
                }
                out
            }
        }
    }

    /// Format for parseable output (no colors)
    pub fn to_parseable_string(&self) -> String {
        match self {
            SessionEvent::Readout(r) => r.to_parseable_string(),
            SessionEvent::RoundCommitted { round_index, direction, manual } => {
                format!("committed round={} dir={} manual={}", round_index + 1, direction, manual)
            }
            SessionEvent::NextRound { round_index, partition } => {
                let groups: Vec<String> = partition.groups().iter().map(|g| g.join(",")).collect();
                format!("round={} groups=[{}]", round_index + 1, groups.join(" | "))
            }
            SessionEvent::WordSelected { word, forced, reason, .. } => {
                format!("word={} forced={} reason={}", word, forced, reason.code())
            }
        }
    }
}
