use std::collections::VecDeque;

use validator::Validate;

use crate::business_logic::abc::{AbcPatternDetector, AbcPatternValidator};
use crate::business_logic::config::SwingConfig;
use crate::business_logic::dominant::{DominantSwingManager, DominantSwingState};
use crate::business_logic::fractals::FractalDetector;
use crate::business_logic::swings::SwingBuilder;
use crate::errors::EngineError;
use crate::models::candle::Candle;
use crate::models::events::{BarUpdate, Reconciliation, SwingEvent};
use crate::models::pattern::AbcPattern;
use crate::models::swing::{Fractal, Swing};

/// Swing, dominance and ABC tracking for a single symbol.
#[derive(Debug)]
pub struct SwingEngine {
    symbol: String,
    config: SwingConfig,
    fractals: FractalDetector,
    builder: SwingBuilder,
    dominance: DominantSwingManager,
    detector: AbcPatternDetector,
    validator: AbcPatternValidator,
    candles: VecDeque<Candle>,
    swings: Vec<Swing>,
    pattern: Option<AbcPattern>,
    candle_count: usize,
    last_open_time: Option<u64>,
}

impl SwingEngine {
    pub fn new(symbol: String, config: SwingConfig) -> Result<Self, EngineError> {
        config.validate()?;

        Ok(Self {
            fractals: FractalDetector::new(config.fractal_window),
            builder: SwingBuilder::new(),
            dominance: DominantSwingManager::new(),
            detector: AbcPatternDetector::new(),
            validator: AbcPatternValidator::from_config(&config),
            candles: VecDeque::with_capacity(config.fractal_window),
            swings: Vec::new(),
            pattern: None,
            candle_count: 0,
            last_open_time: None,
            symbol,
            config,
        })
    }

    /// Resume from a restored swing history. Dominance is seeded by the
    /// re-evaluation pass since no swing has arrived yet.
    pub fn with_history(
        symbol: String,
        config: SwingConfig,
        swings: Vec<Swing>,
    ) -> Result<Self, EngineError> {
        let mut engine = Self::new(symbol, config)?;
        engine.builder = SwingBuilder::resume_after(&swings);
        engine.last_open_time = swings.last().map(|s| s.end.timestamp);
        engine.swings = swings;

        engine.dominance.reevaluate(&engine.swings);
        engine.dominance.verify(&engine.swings)?;
        engine.pattern = engine.scan_pattern();

        tracing::info!(
            "[{}] Resumed with {} swings (dominant: {:?})",
            engine.symbol,
            engine.swings.len(),
            engine.dominance.current().map(|s| s.id)
        );
        Ok(engine)
    }

    /// Process one bar as a single step. A rejected bar leaves every piece
    /// of state untouched.
    pub fn process_bar(&mut self, candle: &Candle) -> Result<BarUpdate, EngineError> {
        if let Err(e) = candle.validate(self.last_open_time) {
            tracing::warn!("[{}] Skipping malformed bar: {}", self.symbol, e);
            return Err(e.into());
        }

        self.candle_count += 1;
        self.last_open_time = Some(candle.open_time);

        // Maintain rolling window
        self.candles.push_back(candle.clone());
        if self.candles.len() > self.config.fractal_window {
            self.candles.pop_front();
        }

        let fractals = self.new_fractals();
        let mut events = Vec::new();
        let mut closed_swings = Vec::new();

        // Arrival commits before any re-evaluation
        for fractal in &fractals {
            tracing::debug!(
                "[{}] {:?} fractal at {} ({})",
                self.symbol,
                fractal.kind,
                fractal.price,
                fractal.timestamp
            );
            if let Some(swing) = self.builder.extend(&mut self.swings, *fractal) {
                if let Some(event) = self.dominance.on_swing(&swing).into_event() {
                    events.push(event);
                }
                closed_swings.push(swing);
            }
        }

        let reconciliation = if self.candle_count % self.config.reevaluate_every == 0 {
            self.dominance.reevaluate(&self.swings)
        } else {
            Reconciliation::Skipped
        };

        self.trim_history();
        if let Err(e) = self.dominance.verify(&self.swings) {
            tracing::error!("[{}] {}", self.symbol, e);
            return Err(e);
        }

        if events.iter().any(SwingEvent::resets_dominance) {
            if let Some(stale) = self.pattern.take() {
                tracing::debug!(
                    "[{}] Discarding ABC candidate tied to dominant swing {}",
                    self.symbol,
                    stale.dominant_id
                );
            }
        }

        if let Some(pattern) = self.scan_pattern() {
            let is_new = self
                .pattern
                .as_ref()
                .map_or(true, |held| !held.same_structure(&pattern));
            if is_new {
                tracing::info!(
                    "[{}] ABC pattern after dominant swing {}: valid {} ({:?})",
                    self.symbol,
                    pattern.dominant_id,
                    pattern.is_valid,
                    pattern.ratios
                );
                events.push(SwingEvent::pattern_formed(&pattern));
            }
            self.pattern = Some(pattern);
        }

        Ok(BarUpdate {
            open_time: candle.open_time,
            fractals,
            closed_swings,
            current_leg: self.builder.current_leg().cloned(),
            dominant: self.dominance.current().cloned(),
            pattern: self.pattern.clone(),
            events,
            reconciliation,
        })
    }

    /// Only the centre bar of a full window can become a new pivot.
    fn new_fractals(&mut self) -> Vec<Fractal> {
        if self.candles.len() < self.config.fractal_window {
            return Vec::new();
        }

        let centre = self.config.half_window();
        let window = self.candles.make_contiguous();
        self.fractals.detect(window, centre).collect()
    }

    fn scan_pattern(&self) -> Option<AbcPattern> {
        self.detector
            .scan(&self.swings, self.dominance.current())
            .map(|candidate| self.validator.validate(candidate))
    }

    /// Drops the oldest swings past `max_swings`, never the committed
    /// dominant swing or anything after it.
    fn trim_history(&mut self) {
        let excess = self.swings.len().saturating_sub(self.config.max_swings);
        if excess == 0 {
            return;
        }

        let keep_from = self
            .dominance
            .current()
            .and_then(|held| self.swings.iter().position(|s| s.id == held.id))
            .unwrap_or(usize::MAX);
        let drop = excess.min(keep_from);
        if drop > 0 {
            self.swings.drain(..drop);
        }
    }

    pub fn symbol(&self) -> &str {
        &self.symbol
    }

    /// Closed swings, oldest first
    pub fn swings(&self) -> &[Swing] {
        &self.swings
    }

    pub fn current_leg(&self) -> Option<&Swing> {
        self.builder.current_leg()
    }

    pub fn dominant_state(&self) -> &DominantSwingState {
        self.dominance.state()
    }

    pub fn dominant(&self) -> Option<&Swing> {
        self.dominance.current()
    }

    pub fn pattern(&self) -> Option<&AbcPattern> {
        self.pattern.as_ref()
    }

    pub fn candle_count(&self) -> usize {
        self.candle_count
    }

    /// A full fractal window has been seen
    pub fn is_warmed_up(&self) -> bool {
        self.candle_count >= self.config.fractal_window
    }
}
