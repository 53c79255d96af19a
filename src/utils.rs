//! Utility functions for the rating service

use chrono::{DateTime, Utc};

/// Get the current UTC timestamp
pub fn current_timestamp() -> DateTime<Utc> {
    Utc::now()
}

/// Net rating: expected points scored minus expected points conceded
pub fn net_rating(mean_for: f64, mean_against: f64) -> f64 {
    mean_for - mean_against
}

/// Standard deviation for a precision (`sqrt(1/precision)`)
pub fn sd_from_precision(precision: f64) -> f64 {
    (1.0 / precision).sqrt()
}

/// Whether a precision can be reported as a finite, non-zero standard deviation
pub fn is_valid_precision(precision: f64) -> bool {
    precision.is_finite() && precision > 0.0
}

/// Whether a loaded standard deviation is finite and strictly positive
pub fn is_valid_sd(sd: f64) -> bool {
    sd.is_finite() && sd > 0.0
}
