//! Game table ingestion configuration

use serde::{Deserialize, Serialize};

/// Header names resolved when reading a game table
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct IngestionConfig {
    pub team_column: String,
    pub opponent_column: String,
    pub team_score_column: String,
    pub opponent_score_column: String,
    /// Drop a row that mirrors the previously accepted row
    pub skip_mirrored_rows: bool,
}

impl Default for IngestionConfig {
    fn default() -> Self {
        Self {
            team_column: "Team".to_string(),
            opponent_column: "Opponent".to_string(),
            team_score_column: "Team Score".to_string(),
            opponent_score_column: "Opponent Score".to_string(),
            skip_mirrored_rows: false,
        }
    }
}
