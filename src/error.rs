//! Error types for the rating service
//!
//! This module defines all error types using anyhow for consistent error handling
//! throughout the application.

/// Result type alias for convenience
pub type Result<T> = anyhow::Result<T>;

/// Custom error types for specific ingestion, inference and query scenarios
#[derive(Debug, thiserror::Error)]
pub enum RatingError {
    #[error("Missing \"{column}\" column")]
    MissingColumn { column: String },

    #[error("Malformed score {value:?} in column \"{column}\" at row {row}")]
    MalformedScore {
        row: u64,
        column: String,
        value: String,
    },

    #[error("Schedule contains no games")]
    EmptySchedule,

    #[error("Team not found: {name}")]
    TeamNotFound { name: String },

    #[error("Invalid search pattern {pattern:?}: {reason}")]
    InvalidSearchPattern { pattern: String, reason: String },

    #[error("Invalid posterior for team {team}: {reason}")]
    InvalidPosterior { team: String, reason: String },

    #[error("Configuration error: {message}")]
    ConfigurationError { message: String },

    #[error("Internal service error: {message}")]
    InternalError { message: String },
}
