// src/error.rs
use thiserror::Error;

/// Error types for the group-draw library
#[derive(Debug, Error)]
pub enum DrawError {
    /// Invalid configuration value
    #[error("Invalid configuration for '{field}': {reason}")]
    InvalidConfiguration { field: String, reason: String },

    /// Roster totals or structure do not match what the draw requires
    #[error("Roster integrity check failed: {reason}")]
    RosterIntegrity { reason: String },

    /// A team, category or bin name that the roster does not define
    #[error("Unknown {kind} '{name}'")]
    UnknownName { kind: String, name: String },

    /// Retry caps exhausted without completing a trial
    #[error("Trial {trial} could not be completed after {restarts} full restarts")]
    Infeasible { trial: usize, restarts: usize },

    /// Invalid numeric parameter
    #[error("Invalid parameter '{parameter}' = {value}: {constraint}")]
    InvalidParameters {
        parameter: String,
        value: f64,
        constraint: String,
    },

    /// Not enough observations for a statistic or fit
    #[error("Insufficient data: need at least {needed} values, got {got}")]
    InsufficientData { needed: usize, got: usize },

    /// Malformed input line
    #[error("Parse error on line {line}: {reason}")]
    Parse { line: usize, reason: String },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Roster file error: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Result type alias for group-draw operations
pub type DrawResult<T> = Result<T, DrawError>;

/// Validation utilities
pub mod validation {
    use super::{DrawError, DrawResult};

    /// Upper bound on a single run's trial count
    pub const MAX_TRIALS: usize = 100_000_000;

    /// Validate that a parameter is positive
    pub fn validate_positive(name: &str, value: f64) -> DrawResult<()> {
        if value <= 0.0 {
            Err(DrawError::InvalidParameters {
                parameter: name.to_string(),
                value,
                constraint: "must be positive (> 0)".to_string(),
            })
        } else {
            Ok(())
        }
    }

    /// Validate that a value is finite and not NaN
    pub fn validate_finite(name: &str, value: f64) -> DrawResult<()> {
        if !value.is_finite() {
            Err(DrawError::InvalidParameters {
                parameter: name.to_string(),
                value,
                constraint: "must be finite (not NaN or infinite)".to_string(),
            })
        } else {
            Ok(())
        }
    }

    /// Validate that an interval is ordered
    pub fn validate_interval(name: &str, lower: f64, upper: f64) -> DrawResult<()> {
        validate_finite(name, lower)?;
        validate_finite(name, upper)?;
        if upper <= lower {
            Err(DrawError::InvalidParameters {
                parameter: name.to_string(),
                value: upper,
                constraint: format!("upper bound must exceed lower bound ({})", lower),
            })
        } else {
            Ok(())
        }
    }

    /// Validate trial count
    pub fn validate_trials(trials: usize) -> DrawResult<()> {
        if trials == 0 {
            Err(DrawError::InvalidConfiguration {
                field: "trials".to_string(),
                reason: "must be greater than 0".to_string(),
            })
        } else if trials > MAX_TRIALS {
            Err(DrawError::InvalidConfiguration {
                field: "trials".to_string(),
                reason: format!("exceeds maximum allowed ({})", MAX_TRIALS),
            })
        } else {
            Ok(())
        }
    }

    /// Validate that a sample holds at least `needed` values
    pub fn validate_len(needed: usize, got: usize) -> DrawResult<()> {
        if got < needed {
            Err(DrawError::InsufficientData { needed, got })
        } else {
            Ok(())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::validation::*;
    use super::*;

    #[test]
    fn test_validate_positive() {
        assert!(validate_positive("sigma", 0.2).is_ok());
        assert!(validate_positive("sigma", 0.0).is_err());
        assert!(validate_positive("sigma", -0.1).is_err());
    }

    #[test]
    fn test_validate_finite() {
        assert!(validate_finite("value", 1.0).is_ok());
        assert!(validate_finite("value", f64::NAN).is_err());
        assert!(validate_finite("value", f64::INFINITY).is_err());
        assert!(validate_finite("value", f64::NEG_INFINITY).is_err());
    }

    #[test]
    fn test_validate_trials() {
        assert!(validate_trials(1).is_ok());
        assert!(validate_trials(0).is_err());
        assert!(validate_trials(MAX_TRIALS + 1).is_err());
    }

    #[test]
    fn test_validate_interval() {
        assert!(validate_interval("ci", 1.0, 2.0).is_ok());
        assert!(validate_interval("ci", 2.0, 2.0).is_err());
        assert!(validate_interval("ci", f64::NAN, 2.0).is_err());
    }

    #[test]
    fn test_error_display() {
        let error = DrawError::InvalidParameters {
            parameter: "sigma".to_string(),
            value: -0.1,
            constraint: "must be positive".to_string(),
        };

        let display = format!("{}", error);
        assert!(display.contains("sigma"));
        assert!(display.contains("-0.1"));
        assert!(display.contains("positive"));
    }

    #[test]
    fn test_infeasible_display() {
        let error = DrawError::Infeasible {
            trial: 17,
            restarts: 1000,
        };

        let display = format!("{}", error);
        assert!(display.contains("17"));
        assert!(display.contains("1000"));
    }
}
