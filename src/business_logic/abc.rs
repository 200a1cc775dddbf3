use crate::business_logic::config::SwingConfig;
use crate::models::pattern::{AbcPattern, RetraceRatios};
use crate::models::swing::Swing;

/// Finds the three legs that follow the dominant swing.
#[derive(Debug, Clone, Copy, Default)]
pub struct AbcPatternDetector;

impl AbcPatternDetector {
    pub fn new() -> Self {
        Self
    }

    /// A runs against the dominant swing, B with it, C against it again.
    pub fn scan(&self, swings: &[Swing], dominant: Option<&Swing>) -> Option<AbcPattern> {
        let dominant = dominant?;
        let position = swings
            .iter()
            .rposition(|s| s.id == dominant.id)
            .or_else(|| swings.iter().rposition(|s| s.same_origin(dominant)))?;

        let mut legs = swings[position + 1..].iter();
        let (leg_a, leg_b, leg_c) = (legs.next()?, legs.next()?, legs.next()?);

        let against = dominant.direction.opposite();
        if leg_a.direction != against
            || leg_b.direction != dominant.direction
            || leg_c.direction != against
        {
            tracing::debug!(
                "Legs after dominant swing {} do not alternate: {:?} {:?} {:?}",
                dominant.id,
                leg_a.direction,
                leg_b.direction,
                leg_c.direction
            );
            return None;
        }

        Some(AbcPattern {
            dominant_id: dominant.id,
            leg_a: leg_a.clone(),
            leg_b: leg_b.clone(),
            leg_c: leg_c.clone(),
            is_valid: false,
            ratios: None,
        })
    }
}

/// Retracement checks for a candidate ABC structure. Bounds are inclusive.
#[derive(Debug, Clone, Copy)]
pub struct AbcPatternValidator {
    ab_min: f64,
    ab_max: f64,
    bc_min: f64,
}

impl Default for AbcPatternValidator {
    fn default() -> Self {
        Self::from_config(&SwingConfig::default())
    }
}

impl AbcPatternValidator {
    pub fn from_config(config: &SwingConfig) -> Self {
        Self {
            ab_min: config.ab_retrace_min,
            ab_max: config.ab_retrace_max,
            bc_min: config.bc_retrace_min,
        }
    }

    /// Out-of-range geometry is reported through `is_valid`, never as an
    /// error.
    pub fn validate(&self, candidate: AbcPattern) -> AbcPattern {
        let ratios = RetraceRatios {
            ab_retrace: ratio(candidate.leg_b.points, candidate.leg_a.points),
            bc_retrace: ratio(candidate.leg_c.points, candidate.leg_b.points),
        };
        let is_valid = (self.ab_min..=self.ab_max).contains(&ratios.ab_retrace)
            && ratios.bc_retrace >= self.bc_min;

        AbcPattern {
            is_valid,
            ratios: Some(ratios),
            ..candidate
        }
    }
}

fn ratio(numerator: f64, denominator: f64) -> f64 {
    if denominator > 0.0 {
        numerator / denominator
    } else {
        f64::INFINITY
    }
}
