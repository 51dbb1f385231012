use thiserror::Error;

use super::types::{ResultType, Tier};

/// Why a preview configuration was rejected.
///
/// Only configuration can fail; once a preview is running every effect
/// degrades to "nothing shown" instead of erroring.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("{field} must be a positive finite number, got {value}")]
    NotPositive { field: &'static str, value: f32 },

    #[error("{field} must be finite, got {value}")]
    NotFinite { field: &'static str, value: f32 },

    #[error("{field} must be within [{min}, {max}], got {value}")]
    OutOfRange {
        field: &'static str,
        value: f32,
        min: f32,
        max: f32,
    },

    #[error("grid needs at least one reel and one row (got {reels}x{rows})")]
    EmptyGrid { reels: u32, rows: u32 },

    #[error("payline {line} cell (reel {reel}, row {row}) is outside the {reels}x{rows} grid")]
    PaylineOutOfGrid {
        line: usize,
        reel: u32,
        row: u32,
        reels: u32,
        rows: u32,
    },

    #[error("outcome {result:?} lists {got} reels but the grid has {expected}")]
    OutcomeShape {
        result: ResultType,
        got: usize,
        expected: usize,
    },

    #[error("outcome {result:?} references payline {line}, only {available} defined")]
    UnknownPayline {
        result: ResultType,
        line: usize,
        available: usize,
    },

    #[error("tier {0:?} is configured more than once")]
    DuplicateTier(Tier),

    #[error("surface tag must not be empty")]
    EmptySurfaceTag,

    #[error("invalid preview config JSON: {0}")]
    Json(#[from] serde_json::Error),
}

impl ConfigError {
    pub fn check_positive(field: &'static str, value: f32) -> Result<(), ConfigError> {
        if value.is_finite() && value > 0.0 {
            Ok(())
        } else {
            Err(ConfigError::NotPositive { field, value })
        }
    }

    /// Zero allowed.
    pub fn check_non_negative(field: &'static str, value: f32) -> Result<(), ConfigError> {
        if value.is_finite() && value >= 0.0 {
            Ok(())
        } else {
            Err(ConfigError::OutOfRange { field, value, min: 0.0, max: f32::INFINITY })
        }
    }

    pub fn check_finite(field: &'static str, value: f32) -> Result<(), ConfigError> {
        if value.is_finite() {
            Ok(())
        } else {
            Err(ConfigError::NotFinite { field, value })
        }
    }

    pub fn check_range(field: &'static str, value: f32, min: f32, max: f32) -> Result<(), ConfigError> {
        if value.is_finite() && (min..=max).contains(&value) {
            Ok(())
        } else {
            Err(ConfigError::OutOfRange { field, value, min, max })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn checks() {
        assert!(ConfigError::check_positive("x", 1.0).is_ok());
        assert!(ConfigError::check_positive("x", 0.0).is_err());
        assert!(ConfigError::check_positive("x", f32::INFINITY).is_err());
        assert!(ConfigError::check_non_negative("x", 0.0).is_ok());
        assert!(ConfigError::check_finite("x", f32::NAN).is_err());
        assert!(ConfigError::check_range("x", 1.0, 0.0, 1.0).is_ok());
        assert!(ConfigError::check_range("x", -0.1, 0.0, 1.0).is_err());
    }

    #[test]
    fn messages_name_the_field() {
        let err = ConfigError::check_positive("fountain.speed_multiplier", -2.0).unwrap_err();
        assert_eq!(
            err.to_string(),
            "fountain.speed_multiplier must be a positive finite number, got -2"
        );
    }
}
