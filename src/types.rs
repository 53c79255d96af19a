//! Common types used throughout the rating service

use serde::{Deserialize, Serialize};

/// Index of a team inside a [`ScheduleGraph`](crate::schedule::ScheduleGraph)
pub type TeamId = usize;

/// Index of a game inside a [`ScheduleGraph`](crate::schedule::ScheduleGraph)
pub type GameId = usize;

/// A team node of the schedule graph together with its running posterior
#[derive(Debug, Clone, PartialEq)]
pub struct Team {
    pub name: String,
    /// Posterior mean of points scored
    pub mean_for: f64,
    /// Posterior precision of points scored
    pub prec_for: f64,
    /// Posterior mean of points conceded
    pub mean_against: f64,
    /// Posterior precision of points conceded
    pub prec_against: f64,
    pub wins: u32,
    pub losses: u32,
    /// Every game this team took part in, on either side
    pub games: Vec<GameId>,
}

impl Team {
    /// Create a team with no games and a zeroed posterior
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            mean_for: 0.0,
            prec_for: 0.0,
            mean_against: 0.0,
            prec_against: 0.0,
            wins: 0,
            losses: 0,
            games: Vec::new(),
        }
    }

    /// Number of games played
    pub fn games_played(&self) -> usize {
        self.games.len()
    }

    /// Net rating (`mean_for - mean_against`)
    pub fn net_rating(&self) -> f64 {
        crate::utils::net_rating(self.mean_for, self.mean_against)
    }
}

/// A scored game between two teams.
///
/// The `team_a`/`team_b` orientation carries no home/away meaning.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Game {
    pub team_a: TeamId,
    pub team_b: TeamId,
    pub team_a_score: u32,
    pub team_b_score: u32,
}

impl Game {
    /// Orient the game from `team`'s perspective.
    ///
    /// Returns `(opponent, score_for, score_against)`.
    pub fn oriented(&self, team: TeamId) -> (TeamId, f64, f64) {
        if self.team_a == team {
            (
                self.team_b,
                f64::from(self.team_a_score),
                f64::from(self.team_b_score),
            )
        } else {
            (
                self.team_a,
                f64::from(self.team_b_score),
                f64::from(self.team_a_score),
            )
        }
    }
}

/// One row of the persisted posterior table.
///
/// Field order matches the on-disk column order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PosteriorRecord {
    pub name: String,
    pub wins: u32,
    pub losses: u32,
    pub mean_for: f64,
    pub sd_for: f64,
    pub mean_against: f64,
    pub sd_against: f64,
}

impl PosteriorRecord {
    /// Net rating (`mean_for - mean_against`)
    pub fn net_rating(&self) -> f64 {
        crate::utils::net_rating(self.mean_for, self.mean_against)
    }
}
