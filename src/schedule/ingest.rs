//! Game table ingestion
//!
//! Reads a CSV game table into a [`ScheduleGraph`]. Columns are resolved by
//! header name, so their order in the file does not matter. Any missing column
//! or malformed score aborts the whole read.

use crate::config::IngestionConfig;
use crate::error::{RatingError, Result};
use crate::schedule::builder::{ScheduleBuilder, ScheduleGraph};
use anyhow::Context;
use std::fs::File;
use std::io::Read;
use std::path::Path;
use tracing::{debug, info};

/// Positions of the required columns in the header row
#[derive(Debug, Clone, Copy)]
struct ColumnIndices {
    team: usize,
    opponent: usize,
    team_score: usize,
    opponent_score: usize,
}

impl ColumnIndices {
    fn resolve(headers: &csv::StringRecord, config: &IngestionConfig) -> Result<Self> {
        let find = |column: &str| -> Result<usize> {
            headers
                .iter()
                .position(|h| h == column)
                .ok_or_else(|| {
                    RatingError::MissingColumn {
                        column: column.to_string(),
                    }
                    .into()
                })
        };

        Ok(Self {
            team: find(&config.team_column)?,
            opponent: find(&config.opponent_column)?,
            team_score: find(&config.team_score_column)?,
            opponent_score: find(&config.opponent_score_column)?,
        })
    }
}

fn parse_score(record: &csv::StringRecord, index: usize, column: &str) -> Result<u32> {
    let row = record.position().map(|p| p.line()).unwrap_or_default();
    let value = record.get(index).unwrap_or_default();

    value.trim().parse::<u32>().map_err(|_| {
        RatingError::MalformedScore {
            row,
            column: column.to_string(),
            value: value.to_string(),
        }
        .into()
    })
}

/// Read a game table from any reader
pub fn read_games<R: Read>(reader: R, config: &IngestionConfig) -> Result<ScheduleGraph> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .from_reader(reader);

    let headers = reader.headers().context("Failed to read header row")?.clone();
    let columns = ColumnIndices::resolve(&headers, config)?;
    debug!("Resolved game table columns: {:?}", columns);

    let mut builder = ScheduleBuilder::new();
    let mut skipped = 0usize;

    for record in reader.records() {
        let record = record.context("Failed to read game record")?;

        let team = record.get(columns.team).unwrap_or_default();
        let opponent = record.get(columns.opponent).unwrap_or_default();
        let team_score = parse_score(&record, columns.team_score, &config.team_score_column)?;
        let opponent_score = parse_score(
            &record,
            columns.opponent_score,
            &config.opponent_score_column,
        )?;

        if config.skip_mirrored_rows
            && builder.last_game() == Some((opponent, team, opponent_score, team_score))
        {
            skipped += 1;
            continue;
        }

        builder.add_game(team, opponent, team_score, opponent_score);
    }

    if skipped > 0 {
        debug!("Skipped {} mirrored rows", skipped);
    }

    Ok(builder.build())
}

/// Read a game table from a CSV file
pub fn read_games_file(path: &Path, config: &IngestionConfig) -> Result<ScheduleGraph> {
    let file = File::open(path)
        .with_context(|| format!("Failed to open game table {}", path.display()))?;
    let graph = read_games(file, config)?;

    info!(
        "Loaded {} games between {} teams from {}",
        graph.game_count(),
        graph.team_count(),
        path.display()
    );

    Ok(graph)
}
