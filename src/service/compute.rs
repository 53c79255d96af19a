//! Batch compute pipeline
//!
//! Ingest a game table, run inference, rank and persist the posterior table.

use crate::config::AppConfig;
use crate::error::Result;
use crate::metrics::MetricsCollector;
use crate::rating::engine::{InferenceReport, RatingEngine};
use crate::rating::ranking::{ranked_records, summary_line, write_table_file};
use crate::schedule::read_games_file;
use crate::types::PosteriorRecord;
use std::path::Path;
use tracing::info;

/// Result of a compute run
#[derive(Debug, Clone)]
pub struct ComputeOutcome {
    /// Records in ranked order, as written
    pub records: Vec<PosteriorRecord>,
    pub report: InferenceReport,
}

impl ComputeOutcome {
    /// Summary lines for the first `n` ranked teams
    pub fn top(&self, n: usize) -> Vec<String> {
        self.records.iter().take(n).map(summary_line).collect()
    }
}

/// Run the full pipeline from `input` games to the `output` table
pub fn run_compute(
    config: &AppConfig,
    metrics: &MetricsCollector,
    input: &Path,
    output: &Path,
) -> Result<ComputeOutcome> {
    let engine = RatingEngine::new(config.inference.clone())?;

    let mut graph = read_games_file(input, &config.ingestion)?;
    let report = engine.infer(&mut graph)?;
    metrics.record_inference(&report);

    let records = ranked_records(graph.teams())?;
    write_table_file(&records, output)?;
    metrics.set_teams_loaded(records.len());

    info!(
        "Computed ratings for {} teams from {} games",
        report.teams, report.games
    );

    Ok(ComputeOutcome { records, report })
}
