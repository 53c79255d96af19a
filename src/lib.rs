//! Scorecast - offense/defense team ratings from game scores
//!
//! This crate infers per-team offensive and defensive posteriors from a
//! schedule of scored games, ranks teams by net rating, predicts matchups,
//! and serves the persisted table over HTTP.

pub mod api;
pub mod config;
pub mod error;
pub mod metrics;
pub mod rating;
pub mod schedule;
pub mod service;
pub mod types;
pub mod utils;

// Re-export commonly used types and traits
pub use error::{RatingError, Result};
pub use types::*;

// Re-export key components
pub use rating::{infer, predict, InferenceReport, MatchupPrediction, RatingEngine};
pub use schedule::{ScheduleBuilder, ScheduleGraph};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
