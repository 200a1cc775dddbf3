use serde::{Deserialize, Serialize};

use crate::errors::BarError;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Candle {
    /// Candle open time (epoch ms, UTC)
    #[serde(rename = "t")]
    pub open_time: u64,
    /// Candle close time (epoch ms, UTC)
    #[serde(rename = "T", default)]
    pub close_time: Option<u64>,
    /// Open price
    #[serde(rename = "o", deserialize_with = "deserialize_price")]
    pub open: f64,
    /// High price
    #[serde(rename = "h", deserialize_with = "deserialize_price")]
    pub high: f64,
    /// Low price
    #[serde(rename = "l", deserialize_with = "deserialize_price")]
    pub low: f64,
    /// Close price
    #[serde(rename = "c", deserialize_with = "deserialize_price")]
    pub close: f64,
    /// Volume (optional if upstream omits it)
    #[serde(rename = "v", default, deserialize_with = "deserialize_optional_price")]
    pub volume: Option<f64>,
    /// Number of trades
    #[serde(rename = "n", default)]
    pub num_trades: Option<u64>,
    /// Candle interval (optional if upstream omits it)
    #[serde(rename = "i", default)]
    pub interval: Option<String>,
    /// Candle symbol (optional if upstream omits it)
    #[serde(rename = "s", default)]
    pub symbol: Option<String>,
}

impl Candle {
    pub fn new(open_time: u64, open: f64, high: f64, low: f64, close: f64) -> Self {
        Self {
            open_time,
            close_time: None,
            open,
            high,
            low,
            close,
            volume: None,
            num_trades: None,
            interval: None,
            symbol: None,
        }
    }

    /// Checks the bar on its own and against the previously accepted bar time.
    pub fn validate(&self, previous_open_time: Option<u64>) -> Result<(), BarError> {
        for (field, value) in [
            ("open", self.open),
            ("high", self.high),
            ("low", self.low),
            ("close", self.close),
        ] {
            if !value.is_finite() {
                return Err(BarError::NonFinite {
                    open_time: self.open_time,
                    field,
                });
            }
        }

        if self.high < self.low {
            return Err(BarError::InvertedRange {
                open_time: self.open_time,
                high: self.high,
                low: self.low,
            });
        }

        if let Some(previous) = previous_open_time {
            if self.open_time <= previous {
                return Err(BarError::NonMonotonicTimestamp {
                    previous,
                    current: self.open_time,
                });
            }
        }

        Ok(())
    }

    pub fn is_bullish(&self) -> bool {
        self.close >= self.open
    }
}

/// Prices arrive either as JSON numbers or as numeric strings.
#[derive(Deserialize)]
#[serde(untagged)]
enum RawPrice {
    Number(f64),
    Text(String),
}

impl RawPrice {
    fn into_f64<E: serde::de::Error>(self) -> Result<f64, E> {
        match self {
            RawPrice::Number(value) => Ok(value),
            RawPrice::Text(s) => s.trim().parse::<f64>().map_err(E::custom),
        }
    }
}

fn deserialize_price<'de, D>(deserializer: D) -> Result<f64, D::Error>
where
    D: serde::Deserializer<'de>,
{
    RawPrice::deserialize(deserializer)?.into_f64()
}

fn deserialize_optional_price<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    Option::<RawPrice>::deserialize(deserializer)?
        .map(RawPrice::into_f64::<D::Error>)
        .transpose()
}
