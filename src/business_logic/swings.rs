use crate::models::swing::{Direction, Fractal, Swing, SwingId};

/// Turns a fractal stream into closed swings.
///
/// The open leg lives here until an opposite fractal reverses it; only then is
/// it classified and appended to the caller's history.
#[derive(Debug, Clone, Default)]
pub struct SwingBuilder {
    anchor: Option<Fractal>,
    leg: Option<Swing>,
    next_id: SwingId,
}

impl SwingBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Continues numbering after a restored history.
    pub fn resume_after(swings: &[Swing]) -> Self {
        let last = swings.last();
        Self {
            anchor: last.map(|s| s.end),
            leg: None,
            next_id: swings.iter().map(|s| s.id + 1).max().unwrap_or(0),
        }
    }

    /// Open (provisional) leg, if any. Never dominant.
    pub fn current_leg(&self) -> Option<&Swing> {
        self.leg.as_ref()
    }

    /// Feed one fractal. Returns the swing closed by it, which has already
    /// been appended to `swings`.
    pub fn extend(&mut self, swings: &mut Vec<Swing>, fractal: Fractal) -> Option<Swing> {
        let Some(mut leg) = self.leg.take() else {
            self.start_first_leg(fractal);
            return None;
        };

        if fractal.kind == leg.end.kind {
            if fractal.exceeds(&leg.end) {
                leg.end = fractal;
                leg.points = (leg.end.price - leg.start.price).abs();
                tracing::debug!(
                    "Swing {} extended to {} ({:.4} points)",
                    leg.id,
                    fractal.price,
                    leg.points
                );
            }
            self.leg = Some(leg);
            return None;
        }

        let next_id = self.next_id;
        let Some(next_leg) = Swing::between(next_id, leg.end, fractal) else {
            // Opposite pivot that does not reverse the leg
            self.leg = Some(leg);
            return None;
        };
        self.next_id += 1;

        let closed = classify(swings, leg);
        tracing::debug!(
            "Swing {} closed: {:?} {} -> {} ({:.4} points, dominant: {}, revokes: {})",
            closed.id,
            closed.direction,
            closed.start.price,
            closed.end.price,
            closed.points,
            closed.is_dominant,
            closed.revokes_dominance
        );
        swings.push(closed.clone());
        self.anchor = Some(closed.end);
        self.leg = Some(next_leg);

        Some(closed)
    }

    fn start_first_leg(&mut self, fractal: Fractal) {
        let Some(anchor) = self.anchor else {
            self.anchor = Some(fractal);
            return;
        };

        if fractal.kind == anchor.kind {
            if fractal.exceeds(&anchor) {
                self.anchor = Some(fractal);
            }
            return;
        }

        if let Some(leg) = Swing::between(self.next_id, anchor, fractal) {
            self.next_id += 1;
            self.leg = Some(leg);
        }
    }
}

/// Latest swing that set or reset dominance, if it set it.
///
/// A revoking swing ends the search: dominance was reset there.
pub fn prior_dominant(swings: &[Swing]) -> Option<&Swing> {
    swings
        .iter()
        .rev()
        .find(|s| s.is_dominant || s.revokes_dominance)
        .filter(|s| s.is_dominant)
}

/// The single dominance rule, applied once when a leg closes.
fn classify(swings: &[Swing], mut swing: Swing) -> Swing {
    let (is_dominant, revokes_dominance) = match prior_dominant(swings) {
        None => (true, false),
        Some(prior) => {
            let (low, high) = swing.price_range();
            let breached = match prior.direction {
                Direction::Up => low < prior.start.price,
                Direction::Down => high > prior.start.price,
            };
            if breached {
                (false, true)
            } else {
                (swing.points > prior.points, false)
            }
        }
    };

    swing.is_dominant = is_dominant;
    swing.revokes_dominance = revokes_dominance;
    swing
}
