use serde::Serialize;

use crate::business_logic::dominant::DominantSwingState;
use crate::models::pattern::RetraceRatios;
use crate::models::swing::{Direction, Swing};

#[derive(Debug, Clone, Serialize)]
pub struct DominantSummary {
    pub id: u64,
    pub direction: Direction,
    pub start_time: Option<String>,
    pub start_price: f64,
    pub end_price: f64,
    pub points: f64,
}

impl From<&Swing> for DominantSummary {
    fn from(swing: &Swing) -> Self {
        Self {
            id: swing.id,
            direction: swing.direction,
            start_time: format_time(swing.start_timestamp()),
            start_price: swing.start.price,
            end_price: swing.end.price,
            points: swing.points,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct SymbolStatus {
    pub symbol: String,
    pub state: String,
    pub dominant: Option<DominantSummary>,
    pub swing_count: usize,
    pub bars_processed: usize,
    pub bars_skipped: usize,
    pub pattern_valid: Option<bool>,
    pub pattern_ratios: Option<RetraceRatios>,
    pub halted: bool,
    pub is_warmed_up: bool,
    pub summary: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct StatusSnapshot {
    pub as_of_ms: u64,
    pub symbols: Vec<SymbolStatus>,
}

impl From<&DominantSwingState> for String {
    fn from(state: &DominantSwingState) -> Self {
        match state {
            DominantSwingState::Empty => "EMPTY".to_string(),
            DominantSwingState::Tracking(_) => "TRACKING".to_string(),
        }
    }
}

/// RFC 3339 rendering of an epoch-ms timestamp
pub fn format_time(epoch_ms: u64) -> Option<String> {
    let ms = i64::try_from(epoch_ms).ok()?;
    chrono::DateTime::from_timestamp_millis(ms).map(|t| t.to_rfc3339())
}
