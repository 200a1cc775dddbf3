use serde::Serialize;

use crate::models::pattern::{AbcPattern, RetraceRatios};
use crate::models::swing::{Fractal, Swing, SwingId, SwingRef};

/// Signals for downstream consumers holding overlays tied to a dominant swing.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SwingEvent {
    /// A different swing took over dominance.
    DominantSwingChanged { old: SwingRef, new: SwingRef },
    /// The held dominant swing's start was broken; no swing is dominant.
    DominanceRevoked { old: SwingRef, by: SwingRef },
    /// A new ABC structure formed after the dominant swing.
    PatternFormed {
        dominant_id: SwingId,
        legs: [SwingId; 3],
        is_valid: bool,
        ratios: Option<RetraceRatios>,
    },
}

impl SwingEvent {
    pub fn pattern_formed(pattern: &AbcPattern) -> Self {
        SwingEvent::PatternFormed {
            dominant_id: pattern.dominant_id,
            legs: [pattern.leg_a.id, pattern.leg_b.id, pattern.leg_c.id],
            is_valid: pattern.is_valid,
            ratios: pattern.ratios,
        }
    }

    /// True for events that invalidate anything derived from the previous
    /// dominant swing.
    pub fn resets_dominance(&self) -> bool {
        matches!(
            self,
            SwingEvent::DominantSwingChanged { .. } | SwingEvent::DominanceRevoked { .. }
        )
    }
}

/// Outcome of comparing a re-evaluation candidate with committed state.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Reconciliation {
    /// Pass did not run on this bar.
    Skipped,
    /// Candidate matches committed state; nothing written.
    Consistent,
    /// Committed state was empty and had never been set by arrival; the
    /// candidate was taken as the starting value.
    Adopted(SwingRef),
    /// Candidate disagrees with committed state; committed state kept.
    Conflict {
        committed: Option<SwingRef>,
        candidate: Option<SwingRef>,
    },
}

/// Everything one bar produced.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BarUpdate {
    pub open_time: u64,
    pub fractals: Vec<Fractal>,
    /// Swings closed on this bar in order, already appended to the engine's
    /// history. An outside bar can close two.
    pub closed_swings: Vec<Swing>,
    /// Open leg, never dominant.
    pub current_leg: Option<Swing>,
    pub dominant: Option<Swing>,
    pub pattern: Option<AbcPattern>,
    pub events: Vec<SwingEvent>,
    pub reconciliation: Reconciliation,
}
