//! Ranking aggregation and the persisted posterior table
//!
//! Teams are ordered by descending net rating with a stable sort, so teams
//! with equal net ratings keep their insertion order. The persisted table is
//! a headerless CSV with columns
//! `name, wins, losses, mean_for, sd_for, mean_against, sd_against`.

use crate::error::{RatingError, Result};
use crate::types::{PosteriorRecord, Team};
use crate::utils::{is_valid_precision, is_valid_sd, sd_from_precision};
use anyhow::Context;
use std::cmp::Ordering;
use std::fs::File;
use std::io::{Read, Write};
use std::path::Path;
use tracing::{error, info};

fn by_descending_net(a: f64, b: f64) -> Ordering {
    b.partial_cmp(&a).unwrap_or(Ordering::Equal)
}

/// Order teams by descending net rating
pub fn rank(teams: &[Team]) -> Vec<&Team> {
    let mut ranked: Vec<&Team> = teams.iter().collect();
    ranked.sort_by(|a, b| by_descending_net(a.net_rating(), b.net_rating()));
    ranked
}

/// Re-rank already materialized records in place
pub fn rank_records(records: &mut [PosteriorRecord]) {
    records.sort_by(|a, b| by_descending_net(a.net_rating(), b.net_rating()));
}

/// Convert a team into its persisted record.
///
/// A precision that is not finite and strictly positive means the engine
/// produced an invalid state; it is refused rather than written as ∞ or NaN.
pub fn to_record(team: &Team) -> Result<PosteriorRecord> {
    for (direction, precision) in [("for", team.prec_for), ("against", team.prec_against)] {
        if !is_valid_precision(precision) {
            error!(
                "Refusing to serialize team '{}': precision {} = {}",
                team.name, direction, precision
            );
            return Err(RatingError::InvalidPosterior {
                team: team.name.clone(),
                reason: format!("precision {} is {}", direction, precision),
            }
            .into());
        }
    }

    Ok(PosteriorRecord {
        name: team.name.clone(),
        wins: team.wins,
        losses: team.losses,
        mean_for: team.mean_for,
        sd_for: sd_from_precision(team.prec_for),
        mean_against: team.mean_against,
        sd_against: sd_from_precision(team.prec_against),
    })
}

/// Rank teams and convert them into persisted records
pub fn ranked_records(teams: &[Team]) -> Result<Vec<PosteriorRecord>> {
    rank(teams).into_iter().map(to_record).collect()
}

/// One-line human readable summary: `name [W-L]: net (for-against)`
pub fn summary_line(record: &PosteriorRecord) -> String {
    format!(
        "{} [{}-{}]: {:.2} ({:.1}-{:.1})",
        record.name,
        record.wins,
        record.losses,
        record.net_rating(),
        record.mean_for,
        record.mean_against
    )
}

/// Write records to any writer as a headerless CSV table
pub fn write_table<W: Write>(records: &[PosteriorRecord], writer: W) -> Result<()> {
    let mut writer = csv::WriterBuilder::new()
        .has_headers(false)
        .from_writer(writer);

    for record in records {
        writer
            .serialize(record)
            .with_context(|| format!("Failed to write record for {}", record.name))?;
    }
    writer.flush().context("Failed to flush posterior table")?;
    Ok(())
}

/// Write records to a file, replacing any existing table
pub fn write_table_file(records: &[PosteriorRecord], path: &Path) -> Result<()> {
    let file = File::create(path)
        .with_context(|| format!("Failed to create posterior table {}", path.display()))?;
    write_table(records, file)?;

    info!("Wrote {} teams to {}", records.len(), path.display());
    Ok(())
}

/// Read a headerless posterior table, preserving row order
///
/// Rows whose standard deviations are not finite and strictly positive are
/// refused with [`RatingError::InvalidPosterior`].
pub fn read_table<R: Read>(reader: R) -> Result<Vec<PosteriorRecord>> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .from_reader(reader);

    let mut records = Vec::new();
    for row in reader.deserialize() {
        let record: PosteriorRecord = row.context("Malformed posterior table row")?;
        check_loaded(&record)?;
        records.push(record);
    }
    Ok(records)
}

fn check_loaded(record: &PosteriorRecord) -> Result<()> {
    for (direction, sd) in [("for", record.sd_for), ("against", record.sd_against)] {
        if !is_valid_sd(sd) {
            error!(
                "Refusing to load team '{}': sd {} = {}",
                record.name, direction, sd
            );
            return Err(RatingError::InvalidPosterior {
                team: record.name.clone(),
                reason: format!("sd {} is {}", direction, sd),
            }
            .into());
        }
    }
    Ok(())
}

/// Read a posterior table from a file
pub fn read_table_file(path: &Path) -> Result<Vec<PosteriorRecord>> {
    let file = File::open(path)
        .with_context(|| format!("Failed to open posterior table {}", path.display()))?;
    let records = read_table(file)?;

    info!("Loaded {} teams from {}", records.len(), path.display());
    Ok(records)
}
