//! Posterior table storage
//!
//! This module defines the read interface the query surface uses to look up
//! persisted posteriors, with an in-memory implementation that keeps the
//! table in ranked order.

use crate::error::{RatingError, Result};
use crate::types::PosteriorRecord;
use regex::RegexBuilder;
use std::collections::HashMap;
use std::sync::RwLock;

/// Trait for posterior table storage operations
pub trait PosteriorStorage: Send + Sync {
    /// Get a team's record by exact name
    fn get(&self, name: &str) -> Result<Option<PosteriorRecord>>;

    /// Get all records in ranked order
    fn all(&self) -> Result<Vec<PosteriorRecord>>;

    /// Names matching a case-insensitive pattern, in ranked order, at most `limit`
    fn search(&self, pattern: &str, limit: usize) -> Result<Vec<String>>;

    /// Replace the whole table
    fn replace_all(&self, records: Vec<PosteriorRecord>) -> Result<()>;

    /// Get total number of teams
    fn team_count(&self) -> Result<usize>;
}

#[derive(Debug, Default)]
struct Table {
    records: Vec<PosteriorRecord>,
    index: HashMap<String, usize>,
}

impl Table {
    fn new(records: Vec<PosteriorRecord>) -> Self {
        let index = records
            .iter()
            .enumerate()
            .map(|(i, r)| (r.name.clone(), i))
            .collect();
        Self { records, index }
    }
}

/// In-memory posterior table
#[derive(Debug, Default)]
pub struct InMemoryPosteriorStorage {
    table: RwLock<Table>,
}

impl InMemoryPosteriorStorage {
    /// Create a new in-memory table from records already in ranked order
    pub fn new(records: Vec<PosteriorRecord>) -> Self {
        Self {
            table: RwLock::new(Table::new(records)),
        }
    }

    fn read_table(&self) -> Result<std::sync::RwLockReadGuard<'_, Table>> {
        self.table.read().map_err(|_| {
            RatingError::InternalError {
                message: "Failed to acquire posterior table read lock".to_string(),
            }
            .into()
        })
    }
}

impl PosteriorStorage for InMemoryPosteriorStorage {
    fn get(&self, name: &str) -> Result<Option<PosteriorRecord>> {
        let table = self.read_table()?;
        Ok(table.index.get(name).map(|&i| table.records[i].clone()))
    }

    fn all(&self) -> Result<Vec<PosteriorRecord>> {
        Ok(self.read_table()?.records.clone())
    }

    fn search(&self, pattern: &str, limit: usize) -> Result<Vec<String>> {
        let regex = RegexBuilder::new(pattern)
            .case_insensitive(true)
            .build()
            .map_err(|e| RatingError::InvalidSearchPattern {
                pattern: pattern.to_string(),
                reason: e.to_string(),
            })?;

        let table = self.read_table()?;
        Ok(table
            .records
            .iter()
            .filter(|r| regex.is_match(&r.name))
            .take(limit)
            .map(|r| r.name.clone())
            .collect())
    }

    fn replace_all(&self, records: Vec<PosteriorRecord>) -> Result<()> {
        let mut table = self.table.write().map_err(|_| RatingError::InternalError {
            message: "Failed to acquire posterior table write lock".to_string(),
        })?;

        *table = Table::new(records);
        Ok(())
    }

    fn team_count(&self) -> Result<usize> {
        Ok(self.read_table()?.records.len())
    }
}
