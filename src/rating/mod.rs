//! Rating inference, ranking and matchup prediction
//!
//! This module provides the iterative offense/defense rating engine, the
//! ranking aggregator with its persisted table format, the matchup predictor
//! and the storage interface used by the query surface.

pub mod engine;
pub mod predictor;
pub mod ranking;
pub mod storage;

// Re-export commonly used types
pub use engine::{infer, InferenceReport, RatingEngine};
pub use predictor::{predict, MatchupPrediction};
pub use ranking::{rank, ranked_records, read_table_file, write_table_file};
pub use storage::{InMemoryPosteriorStorage, PosteriorStorage};
