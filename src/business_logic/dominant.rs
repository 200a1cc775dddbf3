use crate::business_logic::swings::prior_dominant;
use crate::errors::EngineError;
use crate::models::events::{Reconciliation, SwingEvent};
use crate::models::swing::Swing;

/// Dominant swing state
#[derive(Debug, Clone, PartialEq)]
pub enum DominantSwingState {
    /// No dominant swing yet, or dominance was revoked
    Empty,
    /// One dominant swing held
    Tracking(Swing),
}

impl DominantSwingState {
    pub fn current(&self) -> Option<&Swing> {
        match self {
            DominantSwingState::Empty => None,
            DominantSwingState::Tracking(swing) => Some(swing),
        }
    }
}

/// What an arriving swing did to the state.
#[derive(Debug, Clone, PartialEq)]
pub enum Transition {
    /// `Empty -> Tracking`
    Established,
    /// `Tracking(S) -> Tracking(S')` with a different start pivot
    Changed(SwingEvent),
    /// Same start pivot announced again
    Reannounced,
    /// `Tracking -> Empty`
    Revoked(SwingEvent),
    /// Nothing changed
    Held,
}

impl Transition {
    pub fn into_event(self) -> Option<SwingEvent> {
        match self {
            Transition::Changed(event) | Transition::Revoked(event) => Some(event),
            _ => None,
        }
    }
}

/// Sole writer of the dominant swing for one engine.
///
/// Two paths feed it. Arrival (`on_swing`) commits first on every bar;
/// re-evaluation (`reevaluate`) runs afterwards, compares by start-pivot
/// timestamp and never overwrites a value committed by arrival.
#[derive(Debug, Clone)]
pub struct DominantSwingManager {
    state: DominantSwingState,
    arrivals: usize,
}

impl Default for DominantSwingManager {
    fn default() -> Self {
        Self::new()
    }
}

impl DominantSwingManager {
    pub fn new() -> Self {
        Self {
            state: DominantSwingState::Empty,
            arrivals: 0,
        }
    }

    pub fn state(&self) -> &DominantSwingState {
        &self.state
    }

    pub fn current(&self) -> Option<&Swing> {
        self.state.current()
    }

    /// Apply a newly closed swing.
    pub fn on_swing(&mut self, swing: &Swing) -> Transition {
        self.arrivals += 1;

        if swing.is_dominant {
            return self.on_dominant(swing);
        }

        match &self.state {
            DominantSwingState::Tracking(held) if swing.revokes_dominance => {
                let event = SwingEvent::DominanceRevoked {
                    old: held.reference(),
                    by: swing.reference(),
                };
                tracing::info!(
                    "Dominance revoked: swing {} broke start of swing {} at {}",
                    swing.id,
                    held.id,
                    held.start.price
                );
                self.state = DominantSwingState::Empty;
                Transition::Revoked(event)
            }
            _ => Transition::Held,
        }
    }

    fn on_dominant(&mut self, swing: &Swing) -> Transition {
        match &self.state {
            DominantSwingState::Empty => {
                tracing::info!(
                    "Dominant swing established: {} {:?} from {}",
                    swing.id,
                    swing.direction,
                    swing.start.timestamp
                );
                self.state = DominantSwingState::Tracking(swing.clone());
                Transition::Established
            }
            DominantSwingState::Tracking(held) if held.same_origin(swing) => {
                tracing::debug!(
                    "Dominant swing {} re-announced (start {})",
                    swing.id,
                    swing.start.timestamp
                );
                if held != swing {
                    self.state = DominantSwingState::Tracking(swing.clone());
                }
                Transition::Reannounced
            }
            DominantSwingState::Tracking(held) => {
                let event = SwingEvent::DominantSwingChanged {
                    old: held.reference(),
                    new: swing.reference(),
                };
                tracing::info!(
                    "Dominant swing changed: {} (start {}) -> {} (start {})",
                    held.id,
                    held.start.timestamp,
                    swing.id,
                    swing.start.timestamp
                );
                self.state = DominantSwingState::Tracking(swing.clone());
                Transition::Changed(event)
            }
        }
    }

    /// Compare the dominance implied by the full history with committed
    /// state. Pure read.
    pub fn reconcile(&self, swings: &[Swing]) -> Reconciliation {
        let candidate = prior_dominant(swings);
        let committed = self.current();

        match (committed, candidate) {
            (None, None) => Reconciliation::Consistent,
            (Some(held), Some(found)) if held.same_origin(found) => Reconciliation::Consistent,
            (None, Some(found)) if self.arrivals == 0 => Reconciliation::Adopted(found.reference()),
            _ => Reconciliation::Conflict {
                committed: committed.map(Swing::reference),
                candidate: candidate.map(Swing::reference),
            },
        }
    }

    /// Re-evaluation pass. Writes only when committed state was never set by
    /// arrival; any other disagreement is reported and left alone.
    pub fn reevaluate(&mut self, swings: &[Swing]) -> Reconciliation {
        let outcome = self.reconcile(swings);

        match &outcome {
            Reconciliation::Adopted(found) => {
                if let Some(swing) = swings.iter().rev().find(|s| s.id == found.id) {
                    tracing::info!(
                        "Dominant swing adopted from history: {} (start {})",
                        swing.id,
                        swing.start.timestamp
                    );
                    self.state = DominantSwingState::Tracking(swing.clone());
                }
            }
            Reconciliation::Conflict {
                committed,
                candidate,
            } => {
                tracing::warn!(
                    "Dominance reconciliation conflict: committed {:?}, re-evaluation {:?}; keeping committed",
                    committed,
                    candidate
                );
            }
            Reconciliation::Consistent | Reconciliation::Skipped => {}
        }

        outcome
    }

    /// Committed dominant swing must be in the history and flagged dominant.
    pub fn verify(&self, swings: &[Swing]) -> Result<(), EngineError> {
        let Some(held) = self.current() else {
            return Ok(());
        };

        match swings.iter().rev().find(|s| s.id == held.id) {
            Some(found) if found.is_dominant && found.same_origin(held) => Ok(()),
            Some(_) => Err(EngineError::InvariantViolation(format!(
                "committed dominant swing {} is not flagged dominant in history",
                held.id
            ))),
            None => Err(EngineError::InvariantViolation(format!(
                "committed dominant swing {} missing from history",
                held.id
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::swing::{Direction, Fractal, FractalKind};
    use proptest::prelude::*;

    fn make_swing(id: u64, direction: Direction, start: (u64, f64), end: (u64, f64)) -> Swing {
        let (start_kind, end_kind) = match direction {
            Direction::Up => (FractalKind::Low, FractalKind::High),
            Direction::Down => (FractalKind::High, FractalKind::Low),
        };
        Swing {
            id,
            direction,
            start: Fractal {
                timestamp: start.0,
                price: start.1,
                kind: start_kind,
            },
            end: Fractal {
                timestamp: end.0,
                price: end.1,
                kind: end_kind,
            },
            points: (end.1 - start.1).abs(),
            is_dominant: false,
            revokes_dominance: false,
        }
    }

    fn dominant(mut swing: Swing) -> Swing {
        swing.is_dominant = true;
        swing
    }

    fn revoking(mut swing: Swing) -> Swing {
        swing.revokes_dominance = true;
        swing
    }

    /// swing1 (Up, dominant) -> swing2 (Down) -> swing3 (Up, dominant)
    fn fixture() -> [Swing; 3] {
        [
            dominant(make_swing(1, Direction::Up, (1, 100.0), (2, 120.0))),
            make_swing(2, Direction::Down, (2, 120.0), (3, 110.0)),
            dominant(make_swing(3, Direction::Up, (3, 110.0), (4, 135.0))),
        ]
    }

    #[test]
    fn test_initial_state() {
        let manager = DominantSwingManager::new();
        assert_eq!(manager.state(), &DominantSwingState::Empty);
        assert!(manager.verify(&[]).is_ok());
    }

    #[test]
    fn test_end_to_end_state_sequence() {
        let [swing1, swing2, swing3] = fixture();
        let mut manager = DominantSwingManager::new();
        let mut history = Vec::new();
        let mut states = vec![manager.state().clone()];
        let mut events = Vec::new();

        for swing in [&swing1, &swing2, &swing3] {
            history.push(swing.clone());
            if let Some(event) = manager.on_swing(swing).into_event() {
                events.push(event);
            }
            assert_eq!(manager.reevaluate(&history), Reconciliation::Consistent);
            states.push(manager.state().clone());
        }

        assert_eq!(
            states,
            vec![
                DominantSwingState::Empty,
                DominantSwingState::Tracking(swing1.clone()),
                DominantSwingState::Tracking(swing1.clone()),
                DominantSwingState::Tracking(swing3.clone()),
            ]
        );
        assert_eq!(
            events,
            vec![SwingEvent::DominantSwingChanged {
                old: swing1.reference(),
                new: swing3.reference(),
            }]
        );
    }

    #[test]
    fn test_ordering_with_repeated_reevaluation() {
        let [swing1, swing2, swing3] = fixture();
        let mut manager = DominantSwingManager::new();
        let mut history = Vec::new();

        for swing in [&swing1, &swing2, &swing3] {
            for _ in 0..3 {
                manager.reevaluate(&history);
            }
            history.push(swing.clone());
            manager.on_swing(swing);
            for _ in 0..5 {
                manager.reevaluate(&history);
            }
        }

        assert_eq!(manager.current(), Some(&swing3));
    }

    #[test]
    fn test_non_dominant_does_not_clear() {
        let [swing1, swing2, _] = fixture();
        let mut manager = DominantSwingManager::new();
        manager.on_swing(&swing1);

        assert_eq!(manager.on_swing(&swing2), Transition::Held);
        assert_eq!(manager.current(), Some(&swing1));
    }

    #[test]
    fn test_revoking_swing_clears() {
        let [swing1, ..] = fixture();
        let breaker = revoking(make_swing(2, Direction::Down, (2, 120.0), (3, 95.0)));
        let mut manager = DominantSwingManager::new();
        manager.on_swing(&swing1);

        let transition = manager.on_swing(&breaker);
        assert_eq!(
            transition,
            Transition::Revoked(SwingEvent::DominanceRevoked {
                old: swing1.reference(),
                by: breaker.reference(),
            })
        );
        assert_eq!(manager.state(), &DominantSwingState::Empty);
    }

    #[test]
    fn test_reannouncement_emits_nothing() {
        let [swing1, ..] = fixture();
        let mut manager = DominantSwingManager::new();
        assert_eq!(manager.on_swing(&swing1), Transition::Established);
        assert_eq!(manager.on_swing(&swing1), Transition::Reannounced);

        // Same start pivot, later end: still the same dominant leg
        let widened = dominant(make_swing(9, Direction::Up, (1, 100.0), (5, 130.0)));
        assert_eq!(manager.on_swing(&widened), Transition::Reannounced);
        assert_eq!(manager.current(), Some(&widened));
    }

    #[test]
    fn test_conflict_keeps_committed_state() {
        let [swing1, swing2, swing3] = fixture();
        let mut manager = DominantSwingManager::new();
        manager.on_swing(&swing3);

        // History says swing1 is the latest dominant swing
        let history = vec![swing1.clone(), swing2];
        let outcome = manager.reevaluate(&history);
        assert_eq!(
            outcome,
            Reconciliation::Conflict {
                committed: Some(swing3.reference()),
                candidate: Some(swing1.reference()),
            }
        );
        assert_eq!(manager.current(), Some(&swing3));
    }

    #[test]
    fn test_reconcile_is_pure_read() {
        let [swing1, ..] = fixture();
        let mut manager = DominantSwingManager::new();
        manager.on_swing(&swing1);
        let before = manager.state().clone();

        let history = vec![swing1];
        assert_eq!(manager.reconcile(&history), Reconciliation::Consistent);
        assert_eq!(manager.reevaluate(&history), Reconciliation::Consistent);
        assert_eq!(manager.state(), &before);
    }

    #[test]
    fn test_adopts_from_restored_history() {
        let history = fixture().to_vec();
        let mut manager = DominantSwingManager::new();

        let outcome = manager.reevaluate(&history);
        assert_eq!(outcome, Reconciliation::Adopted(history[2].reference()));
        assert_eq!(manager.current(), Some(&history[2]));
        assert_eq!(manager.reevaluate(&history), Reconciliation::Consistent);
    }

    #[test]
    fn test_empty_after_arrival_is_not_overwritten() {
        let [swing1, swing2, _] = fixture();
        let mut manager = DominantSwingManager::new();
        manager.on_swing(&swing2);

        let history = vec![swing1, swing2];
        assert!(matches!(
            manager.reevaluate(&history),
            Reconciliation::Conflict { committed: None, .. }
        ));
        assert_eq!(manager.current(), None);
    }

    #[test]
    fn test_verify_detects_missing_swing() {
        let [swing1, swing2, _] = fixture();
        let mut manager = DominantSwingManager::new();
        manager.on_swing(&swing1);

        assert!(manager.verify(&[swing1.clone()]).is_ok());
        assert!(matches!(
            manager.verify(&[swing2]),
            Err(EngineError::InvariantViolation(_))
        ));
        let mut unflagged = swing1;
        unflagged.is_dominant = false;
        assert!(manager.verify(&[unflagged]).is_err());
    }

    fn arb_swing() -> impl Strategy<Value = (bool, bool, f64)> {
        (any::<bool>(), any::<bool>(), 1.0f64..50.0)
    }

    proptest! {
        #[test]
        fn prop_reevaluation_is_idempotent(
            flags in proptest::collection::vec(arb_swing(), 1..40),
            passes in 1usize..6,
        ) {
            let mut manager = DominantSwingManager::new();
            let mut history: Vec<Swing> = Vec::new();
            let mut price = 100.0;

            for (i, (is_dominant, revokes, size)) in flags.into_iter().enumerate() {
                let direction = if i % 2 == 0 { Direction::Up } else { Direction::Down };
                let end = match direction {
                    Direction::Up => price + size,
                    Direction::Down => price - size,
                };
                let mut swing = make_swing(i as u64, direction, (i as u64, price), (i as u64 + 1, end));
                swing.is_dominant = is_dominant;
                swing.revokes_dominance = revokes && !is_dominant;
                price = end;

                history.push(swing.clone());
                manager.on_swing(&swing);
                let committed = manager.state().clone();

                for _ in 0..passes {
                    manager.reevaluate(&history);
                    prop_assert_eq!(manager.state(), &committed);
                }
                prop_assert!(manager.verify(&history).is_ok());
            }
        }

        #[test]
        fn prop_change_events_only_on_new_origin(
            starts in proptest::collection::vec(0u64..5, 1..30),
        ) {
            let mut manager = DominantSwingManager::new();
            let mut last_start: Option<u64> = None;

            for (i, start) in starts.into_iter().enumerate() {
                let swing = dominant(make_swing(
                    i as u64,
                    Direction::Up,
                    (start, 100.0),
                    (start + 10, 110.0),
                ));
                let transition = manager.on_swing(&swing);
                let changed = matches!(transition, Transition::Changed(_));
                prop_assert_eq!(changed, last_start.is_some_and(|s| s != start));
                last_start = Some(start);
            }
        }
    }
}
