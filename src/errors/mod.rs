use thiserror::Error;

/// Reasons a bar is rejected at the input boundary.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum BarError {
    #[error("non-monotonic timestamp: {current} does not follow {previous}")]
    NonMonotonicTimestamp { previous: u64, current: u64 },
    #[error("inverted range at {open_time}: high {high} < low {low}")]
    InvertedRange { open_time: u64, high: f64, low: f64 },
    #[error("non-finite {field} at {open_time}")]
    NonFinite { open_time: u64, field: &'static str },
    #[error("missing or unreadable field: {0}")]
    Missing(String),
}

#[derive(Debug, Error)]
pub enum EngineError {
    /// Bar skipped; accumulated state is untouched.
    #[error("malformed bar: {0}")]
    MalformedBar(#[from] BarError),
    #[error("invalid swing config: {0}")]
    InvalidConfig(#[from] validator::ValidationErrors),
    /// The engine's own invariants no longer hold.
    #[error("invariant violation: {0}")]
    InvariantViolation(String),
}

impl EngineError {
    pub fn is_recoverable(&self) -> bool {
        matches!(self, EngineError::MalformedBar(_))
    }
}
