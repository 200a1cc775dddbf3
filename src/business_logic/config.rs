use serde::Deserialize;
use validator::{Validate, ValidationError};

/// Configuration parameters for swing and ABC detection
#[derive(Debug, Clone, PartialEq, Deserialize, Validate)]
#[serde(default)]
#[validate(schema(function = "validate_ratio_bounds"))]
pub struct SwingConfig {
    /// Bars in the fractal window (odd, centre bar plus k on each side)
    #[validate(range(min = 3))]
    #[validate(custom(function = "validate_odd"))]
    pub fractal_window: usize,
    /// Lowest accepted B/A retracement
    #[validate(range(min = 0.0))]
    pub ab_retrace_min: f64,
    /// Highest accepted B/A retracement
    #[validate(range(min = 0.0))]
    pub ab_retrace_max: f64,
    /// Lowest accepted C/B extension
    #[validate(range(min = 0.0))]
    pub bc_retrace_min: f64,
    /// Closed swings kept in history
    #[validate(range(min = 4))]
    pub max_swings: usize,
    /// Run the dominance re-evaluation pass every N bars
    #[validate(range(min = 1))]
    pub reevaluate_every: usize,
}

impl SwingConfig {
    /// Bars needed on each side of a pivot
    pub fn half_window(&self) -> usize {
        (self.fractal_window - 1) / 2
    }
}

impl Default for SwingConfig {
    fn default() -> Self {
        Self {
            fractal_window: 5,
            ab_retrace_min: 0.382,
            ab_retrace_max: 0.786,
            bc_retrace_min: 1.0,
            max_swings: 500,
            reevaluate_every: 1,
        }
    }
}

fn validate_odd(value: usize) -> Result<(), ValidationError> {
    if value % 2 == 1 {
        return Ok(());
    }

    let mut error = ValidationError::new("even_window");
    error.message = Some(format!("fractal window must be odd, got {value}").into());
    Err(error)
}

fn validate_ratio_bounds(config: &SwingConfig) -> Result<(), ValidationError> {
    if config.ab_retrace_min <= config.ab_retrace_max {
        return Ok(());
    }

    let mut error = ValidationError::new("ab_bounds");
    error.message = Some(
        format!(
            "ab_retrace_min {} exceeds ab_retrace_max {}",
            config.ab_retrace_min, config.ab_retrace_max
        )
        .into(),
    );
    Err(error)
}
