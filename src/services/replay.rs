use std::collections::BTreeMap;
use std::path::Path;

use anyhow::Context;
use serde_json::Value;
use validator::Validate;

use crate::business_logic::config::SwingConfig;
use crate::errors::BarError;
use crate::models::candle::Candle;

/// Bars for one symbol, plus the records that could not be read.
#[derive(Debug, Default)]
pub struct SymbolBars {
    pub candles: Vec<Candle>,
    pub rejected: Vec<(usize, BarError)>,
}

/// Parse `{ "<symbol>": [candle, ...] }`. Unreadable records are kept as
/// rejections so the rest of the file still replays.
pub fn parse_bars(json: &str) -> anyhow::Result<BTreeMap<String, SymbolBars>> {
    let root: BTreeMap<String, Vec<Value>> =
        serde_json::from_str(json).context("bar file must map symbols to candle arrays")?;

    let mut result = BTreeMap::new();
    for (symbol, records) in root {
        let mut bars = SymbolBars::default();
        for (index, record) in records.into_iter().enumerate() {
            match serde_json::from_value::<Candle>(record) {
                Ok(candle) => bars.candles.push(candle),
                Err(e) => bars.rejected.push((index, BarError::Missing(e.to_string()))),
            }
        }
        result.insert(symbol, bars);
    }

    Ok(result)
}

pub fn load_bars(path: &Path) -> anyhow::Result<BTreeMap<String, SymbolBars>> {
    let json = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read bar file {}", path.display()))?;
    parse_bars(&json).with_context(|| format!("failed to parse {}", path.display()))
}

/// Config file with any subset of fields; missing ones take defaults.
pub fn load_config(path: Option<&Path>) -> anyhow::Result<SwingConfig> {
    let config = match path {
        Some(path) => {
            let json = std::fs::read_to_string(path)
                .with_context(|| format!("failed to read config {}", path.display()))?;
            serde_json::from_str::<SwingConfig>(&json)
                .with_context(|| format!("failed to parse config {}", path.display()))?
        }
        None => SwingConfig::default(),
    };

    config.validate().context("invalid swing config")?;
    Ok(config)
}
