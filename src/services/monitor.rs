use std::collections::BTreeMap;

use crate::business_logic::config::SwingConfig;
use crate::business_logic::dominant::DominantSwingState;
use crate::business_logic::engine::SwingEngine;
use crate::errors::EngineError;
use crate::models::candle::Candle;
use crate::models::events::SwingEvent;
use crate::models::status::{DominantSummary, StatusSnapshot, SymbolStatus};
use crate::models::swing::{Direction, Swing};

#[derive(Debug)]
struct SymbolSlot {
    engine: SwingEngine,
    bars_skipped: usize,
    halted: bool,
    events: Vec<SwingEvent>,
}

/// Runs one independent swing engine per symbol
pub struct MonitorService {
    slots: BTreeMap<String, SymbolSlot>,
}

impl MonitorService {
    pub fn new(symbols: Vec<String>, config: SwingConfig) -> Result<Self, EngineError> {
        let mut slots = BTreeMap::new();
        for symbol in symbols {
            slots.insert(
                symbol.clone(),
                SymbolSlot {
                    engine: SwingEngine::new(symbol, config.clone())?,
                    bars_skipped: 0,
                    halted: false,
                    events: Vec::new(),
                },
            );
        }

        Ok(Self { slots })
    }

    /// Feed bars for one symbol in order. Malformed bars are counted and
    /// skipped; an invariant violation halts only this symbol.
    pub fn replay(&mut self, symbol: &str, candles: &[Candle]) -> usize {
        let Some(slot) = self.slots.get_mut(symbol) else {
            tracing::warn!("Ignoring bars for unknown symbol {}", symbol);
            return 0;
        };

        let mut processed = 0;
        for candle in candles {
            if slot.halted {
                break;
            }

            match slot.engine.process_bar(candle) {
                Ok(update) => {
                    for event in &update.events {
                        log_event(symbol, event);
                    }
                    slot.events.extend(update.events);
                    processed += 1;
                }
                Err(EngineError::MalformedBar(_)) => {
                    slot.bars_skipped += 1;
                }
                Err(e @ (EngineError::InvariantViolation(_) | EngineError::InvalidConfig(_))) => {
                    tracing::error!("[{}] Halting symbol: {}", symbol, e);
                    slot.halted = true;
                }
            }
        }

        tracing::info!(
            "Replayed {} bars for {} (state: {})",
            processed,
            symbol,
            String::from(slot.engine.dominant_state())
        );
        processed
    }

    /// Count records rejected before they reached the engine
    pub fn record_rejected(&mut self, symbol: &str, count: usize) {
        if let Some(slot) = self.slots.get_mut(symbol) {
            slot.bars_skipped += count;
        }
    }

    pub fn engine(&self, symbol: &str) -> Option<&SwingEngine> {
        self.slots.get(symbol).map(|slot| &slot.engine)
    }

    pub fn events(&self, symbol: &str) -> &[SwingEvent] {
        self.slots
            .get(symbol)
            .map(|slot| slot.events.as_slice())
            .unwrap_or(&[])
    }

    pub fn snapshot(&self) -> StatusSnapshot {
        let symbols = self
            .slots
            .iter()
            .map(|(symbol, slot)| {
                let engine = &slot.engine;
                let pattern = engine.pattern();
                SymbolStatus {
                    symbol: symbol.clone(),
                    state: engine.dominant_state().into(),
                    dominant: engine.dominant().map(DominantSummary::from),
                    swing_count: engine.swings().len(),
                    bars_processed: engine.candle_count(),
                    bars_skipped: slot.bars_skipped,
                    pattern_valid: pattern.map(|p| p.is_valid),
                    pattern_ratios: pattern.and_then(|p| p.ratios),
                    halted: slot.halted,
                    is_warmed_up: engine.is_warmed_up(),
                    summary: build_summary(symbol, engine, slot.halted),
                }
            })
            .collect();

        StatusSnapshot {
            as_of_ms: chrono::Utc::now().timestamp_millis().max(0) as u64,
            symbols,
        }
    }
}

fn log_event(symbol: &str, event: &SwingEvent) {
    match event {
        SwingEvent::DominantSwingChanged { old, new } => {
            tracing::info!(
                "DOMINANT CHANGED on {}: swing {} ({:?}) -> swing {} ({:?}); drop overlays tied to the old leg",
                symbol,
                old.id,
                old.direction,
                new.id,
                new.direction
            );
        }
        SwingEvent::DominanceRevoked { old, by } => {
            tracing::info!(
                "DOMINANCE REVOKED on {}: swing {} broke the start of swing {}",
                symbol,
                by.id,
                old.id
            );
        }
        SwingEvent::PatternFormed {
            dominant_id,
            is_valid,
            ratios,
            ..
        } => match ratios {
            Some(r) => tracing::info!(
                "ABC on {} after swing {}: valid {} (AB {:.3}, BC {:.3})",
                symbol,
                dominant_id,
                is_valid,
                r.ab_retrace,
                r.bc_retrace
            ),
            None => tracing::info!(
                "ABC on {} after swing {}: valid {}",
                symbol,
                dominant_id,
                is_valid
            ),
        },
    }
}

fn build_summary(symbol: &str, engine: &SwingEngine, halted: bool) -> String {
    if halted {
        return format!("{symbol}: halted after an internal consistency error.");
    }
    if !engine.is_warmed_up() {
        return format!("{symbol}: warming up, collecting bars before the first pivot.");
    }

    match engine.dominant_state() {
        DominantSwingState::Empty => match engine.current_leg() {
            Some(leg) => format!(
                "{symbol}: no dominant swing; open {} leg of {} points.",
                direction_word(leg),
                format_price(leg.points)
            ),
            None => format!("{symbol}: no dominant swing yet."),
        },
        DominantSwingState::Tracking(dominant) => match engine.pattern() {
            Some(pattern) if pattern.is_valid => format!(
                "{symbol}: valid ABC after {} leg from ${} to ${}.",
                direction_word(dominant),
                format_price(dominant.start.price),
                format_price(dominant.end.price)
            ),
            Some(_) => format!(
                "{symbol}: ABC outside retracement bounds after {} leg from ${}.",
                direction_word(dominant),
                format_price(dominant.start.price)
            ),
            None => format!(
                "{symbol}: tracking {} leg from ${} to ${}.",
                direction_word(dominant),
                format_price(dominant.start.price),
                format_price(dominant.end.price)
            ),
        },
    }
}

fn direction_word(swing: &Swing) -> &'static str {
    match swing.direction {
        Direction::Up => "up",
        Direction::Down => "down",
    }
}

fn format_price(price: f64) -> String {
    format!("{:.2}", price)
}
