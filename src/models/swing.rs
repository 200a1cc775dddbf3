use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum FractalKind {
    High,
    Low,
}

/// Confirmed price pivot
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Fractal {
    /// Open time of the pivot bar (epoch ms)
    pub timestamp: u64,
    pub price: f64,
    pub kind: FractalKind,
}

impl Fractal {
    /// True if `self` is a more extreme pivot of the same kind than `other`.
    pub fn exceeds(&self, other: &Fractal) -> bool {
        self.kind == other.kind
            && match self.kind {
                FractalKind::High => self.price > other.price,
                FractalKind::Low => self.price < other.price,
            }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Direction {
    Up,
    Down,
}

impl Direction {
    pub fn opposite(self) -> Self {
        match self {
            Direction::Up => Direction::Down,
            Direction::Down => Direction::Up,
        }
    }
}

pub type SwingId = u64;

/// Directional leg between two opposite fractals.
///
/// `is_dominant` and `revokes_dominance` are fixed when the swing closes and
/// never change afterwards.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Swing {
    pub id: SwingId,
    pub direction: Direction,
    pub start: Fractal,
    pub end: Fractal,
    pub points: f64,
    pub is_dominant: bool,
    pub revokes_dominance: bool,
}

impl Swing {
    /// Builds an unclassified leg. Returns `None` unless the pivots are of
    /// opposite kinds, in time order, and the move is non-zero in the
    /// direction they imply.
    pub fn between(id: SwingId, start: Fractal, end: Fractal) -> Option<Self> {
        if start.kind == end.kind || end.timestamp < start.timestamp {
            return None;
        }

        let direction = match start.kind {
            FractalKind::Low => Direction::Up,
            FractalKind::High => Direction::Down,
        };
        let moved = match direction {
            Direction::Up => end.price > start.price,
            Direction::Down => end.price < start.price,
        };
        if !moved {
            return None;
        }

        Some(Self {
            id,
            direction,
            start,
            end,
            points: (end.price - start.price).abs(),
            is_dominant: false,
            revokes_dominance: false,
        })
    }

    /// Lowest and highest price touched by the leg.
    pub fn price_range(&self) -> (f64, f64) {
        (
            self.start.price.min(self.end.price),
            self.start.price.max(self.end.price),
        )
    }

    /// Identity used for dominance comparisons.
    pub fn start_timestamp(&self) -> u64 {
        self.start.timestamp
    }

    /// Same start pivot. The kind disambiguates an outside bar that is both
    /// a High and a Low pivot.
    pub fn same_origin(&self, other: &Swing) -> bool {
        self.start.timestamp == other.start.timestamp && self.start.kind == other.start.kind
    }

    pub fn reference(&self) -> SwingRef {
        SwingRef {
            id: self.id,
            start_timestamp: self.start.timestamp,
            direction: self.direction,
        }
    }
}

/// Compact identity of a swing carried by events.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct SwingRef {
    pub id: SwingId,
    pub start_timestamp: u64,
    pub direction: Direction,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fractal(timestamp: u64, price: f64, kind: FractalKind) -> Fractal {
        Fractal {
            timestamp,
            price,
            kind,
        }
    }

    #[test]
    fn test_between_sets_direction_and_points() {
        let swing = Swing::between(
            1,
            fractal(1, 100.0, FractalKind::Low),
            fractal(5, 112.5, FractalKind::High),
        )
        .unwrap();
        assert_eq!(swing.direction, Direction::Up);
        assert!((swing.points - 12.5).abs() < 1e-9);
        assert!(!swing.is_dominant);
    }

    #[test]
    fn test_between_rejects_non_moves() {
        // Same kind
        assert!(Swing::between(
            1,
            fractal(1, 100.0, FractalKind::Low),
            fractal(2, 90.0, FractalKind::Low)
        )
        .is_none());
        // High below the starting low
        assert!(Swing::between(
            1,
            fractal(1, 100.0, FractalKind::Low),
            fractal(2, 99.0, FractalKind::High)
        )
        .is_none());
        // Zero length
        assert!(Swing::between(
            1,
            fractal(1, 100.0, FractalKind::High),
            fractal(2, 100.0, FractalKind::Low)
        )
        .is_none());
    }

    #[test]
    fn test_exceeds() {
        let high = fractal(1, 100.0, FractalKind::High);
        assert!(fractal(2, 101.0, FractalKind::High).exceeds(&high));
        assert!(!fractal(2, 100.0, FractalKind::High).exceeds(&high));
        assert!(!fractal(2, 90.0, FractalKind::Low).exceeds(&high));
    }
}
