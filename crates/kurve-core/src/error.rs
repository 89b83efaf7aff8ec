use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum KurveError {
    /// Invalid construction input: sample counts, knot vectors, weights,
    /// boundary conditions. Never recoverable by retrying.
    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("Singular system: zero pivot at row {row}")]
    SingularSystem { row: usize },

    #[error("Parameter {value} out of range [{min}, {max}]")]
    OutOfRange { value: f64, min: f64, max: f64 },
}

impl KurveError {
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Configuration(msg.into())
    }

    /// Check `value` against the closed interval `[min, max]`.
    ///
    /// NaN is always out of range.
    pub fn check_range(value: f64, min: f64, max: f64) -> Result<f64> {
        if value >= min && value <= max {
            Ok(value)
        } else {
            Err(Self::OutOfRange { value, min, max })
        }
    }
}

pub type Result<T> = std::result::Result<T, KurveError>;
