//! Schedule graph ingestion
//!
//! This module turns tabular game records into the team/game graph consumed
//! by the rating engine.

pub mod builder;
pub mod ingest;

pub use builder::{ScheduleBuilder, ScheduleGraph};
pub use ingest::{read_games, read_games_file};
