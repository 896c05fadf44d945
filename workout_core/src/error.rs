//! Error types for the workout_core library.

use chrono::{NaiveDate, Weekday};
use std::io;

/// Result type alias using our Error type
pub type Result<T> = std::result::Result<T, Error>;

/// Core error type for workout_core operations
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// IO error occurred
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    /// JSON serialization/deserialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// CSV error
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// TOML parsing error
    #[error("TOML error: {0}")]
    Toml(#[from] toml::de::Error),

    /// Configuration validation error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Malformed catalog or plan input
    #[error("Invalid input: {0}")]
    Validation(String),

    /// Weekday already belongs to another plan
    #[error("{0} is already assigned to another plan")]
    WeekdayTaken(Weekday),

    /// No exercise reachable from the selected muscle groups
    #[error("No exercises available for the selected muscle groups")]
    EmptyCatalog,

    /// Target duration must be positive
    #[error("Target duration must be greater than zero (got {0}s)")]
    InvalidDuration(i64),

    /// Generator ran but accepted nothing
    #[error("Could not build a workout for the requested duration")]
    GenerationFailed,

    /// Session started on a day the plan is not scheduled for
    #[error("This plan is not scheduled for {0}")]
    WrongDay(Weekday),

    /// A visible history entry already exists for this plan today
    #[error("This plan was already completed on {0}")]
    AlreadyDoneToday(NaiveDate),

    /// Attempted transition outside the session state graph
    #[error("Cannot {action} while {state}")]
    GuardViolation {
        action: &'static str,
        state: &'static str,
    },

    /// Referenced record does not exist
    #[error("Not found: {0}")]
    NotFound(String),
}

impl Error {
    pub(crate) fn guard(action: &'static str, state: &'static str) -> Self {
        Error::GuardViolation { action, state }
    }
}
