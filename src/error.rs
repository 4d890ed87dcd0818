//! Unified error handling for the gradepace library.
//!
//! The pacing core never fails: missing data falls back to flat pacing and
//! division guards return neutral values. This error type is only produced at
//! the boundary, where plans, waypoints, smoothing overrides and track input
//! are checked before they reach the engine.

use std::fmt;

/// Unified error type for boundary validation.
#[derive(Debug, Clone, PartialEq)]
pub enum PacingError {
    /// Plan fields are inconsistent or out of range
    InvalidPlan { field: String, message: String },
    /// Waypoint set violates an ordering or distance invariant
    InvalidWaypoints { message: String },
    /// Smoothing override is negative or non-finite
    InvalidSmoothing { parameter: String, value: f64 },
    /// Track input could not be decoded
    TrackParse { message: String },
}

impl fmt::Display for PacingError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PacingError::InvalidPlan { field, message } => {
                write!(f, "Invalid plan field '{}': {}", field, message)
            }
            PacingError::InvalidWaypoints { message } => {
                write!(f, "Invalid waypoints: {}", message)
            }
            PacingError::InvalidSmoothing { parameter, value } => {
                write!(
                    f,
                    "Invalid smoothing parameter '{}': {} (must be finite and >= 0)",
                    parameter, value
                )
            }
            PacingError::TrackParse { message } => {
                write!(f, "Track parse error: {}", message)
            }
        }
    }
}

impl std::error::Error for PacingError {}

impl From<serde_json::Error> for PacingError {
    fn from(err: serde_json::Error) -> Self {
        PacingError::TrackParse {
            message: err.to_string(),
        }
    }
}

/// Result type alias for gradepace boundary operations.
pub type Result<T> = std::result::Result<T, PacingError>;

/// Extension trait for converting Option to PacingError.
pub trait OptionExt<T> {
    /// Convert Option to Result with an invalid plan error for `field`.
    fn ok_or_invalid_plan(self, field: &str, message: &str) -> Result<T>;
}

impl<T> OptionExt<T> for Option<T> {
    fn ok_or_invalid_plan(self, field: &str, message: &str) -> Result<T> {
        self.ok_or_else(|| PacingError::InvalidPlan {
            field: field.to_string(),
            message: message.to_string(),
        })
    }
}
