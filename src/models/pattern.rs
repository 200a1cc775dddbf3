use serde::Serialize;

use crate::models::swing::{Swing, SwingId};

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct RetraceRatios {
    /// B.points / A.points
    pub ab_retrace: f64,
    /// C.points / B.points
    pub bc_retrace: f64,
}

/// Three legs following a dominant swing. Only meaningful relative to
/// `dominant_id`; discarded when dominance changes.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AbcPattern {
    pub dominant_id: SwingId,
    pub leg_a: Swing,
    pub leg_b: Swing,
    pub leg_c: Swing,
    pub is_valid: bool,
    /// `None` until the pattern has been through validation.
    pub ratios: Option<RetraceRatios>,
}

impl AbcPattern {
    pub fn legs(&self) -> [&Swing; 3] {
        [&self.leg_a, &self.leg_b, &self.leg_c]
    }

    /// Same legs relative to the same dominant swing.
    pub fn same_structure(&self, other: &AbcPattern) -> bool {
        self.dominant_id == other.dominant_id
            && self.leg_a.id == other.leg_a.id
            && self.leg_b.id == other.leg_b.id
            && self.leg_c.id == other.leg_c.id
    }
}
