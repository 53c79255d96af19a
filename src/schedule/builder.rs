//! Schedule graph construction
//!
//! A [`ScheduleBuilder`] owns the name → team lookup for a single ingestion
//! run and produces an immutable-topology [`ScheduleGraph`].

use crate::types::{Game, GameId, Team, TeamId};
use std::collections::HashMap;

/// Teams connected by scored games.
///
/// The graph owns its teams and games; cloning it yields an independent copy
/// that a separate inference run may mutate.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ScheduleGraph {
    teams: Vec<Team>,
    games: Vec<Game>,
}

impl ScheduleGraph {
    /// All teams in insertion order
    pub fn teams(&self) -> &[Team] {
        &self.teams
    }

    /// Mutable access to team posteriors; the game topology stays fixed
    pub fn teams_mut(&mut self) -> &mut [Team] {
        &mut self.teams
    }

    /// All games in insertion order
    pub fn games(&self) -> &[Game] {
        &self.games
    }

    pub fn team(&self, id: TeamId) -> &Team {
        &self.teams[id]
    }

    pub fn game(&self, id: GameId) -> &Game {
        &self.games[id]
    }

    /// Look up a team by exact name
    pub fn team_by_name(&self, name: &str) -> Option<&Team> {
        self.teams.iter().find(|t| t.name == name)
    }

    pub fn team_count(&self) -> usize {
        self.teams.len()
    }

    pub fn game_count(&self) -> usize {
        self.games.len()
    }

    pub fn is_empty(&self) -> bool {
        self.teams.is_empty()
    }
}

/// Builds a [`ScheduleGraph`], deduplicating teams by name
#[derive(Debug, Default)]
pub struct ScheduleBuilder {
    teams: Vec<Team>,
    games: Vec<Game>,
    index: HashMap<String, TeamId>,
}

impl ScheduleBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Get or create the team with this name
    pub fn team(&mut self, name: &str) -> TeamId {
        if let Some(&id) = self.index.get(name) {
            return id;
        }

        let id = self.teams.len();
        self.teams.push(Team::new(name));
        self.index.insert(name.to_string(), id);
        id
    }

    /// Record a game and tally the result.
    ///
    /// Ties and self-play rows count toward neither wins nor losses.
    pub fn add_game(
        &mut self,
        team_name: &str,
        opponent_name: &str,
        team_score: u32,
        opponent_score: u32,
    ) -> GameId {
        let team_a = self.team(team_name);
        let team_b = self.team(opponent_name);

        if team_a != team_b {
            if team_score > opponent_score {
                self.teams[team_a].wins += 1;
                self.teams[team_b].losses += 1;
            } else if team_score < opponent_score {
                self.teams[team_a].losses += 1;
                self.teams[team_b].wins += 1;
            }
        }

        let id = self.games.len();
        self.games.push(Game {
            team_a,
            team_b,
            team_a_score: team_score,
            team_b_score: opponent_score,
        });
        self.teams[team_a].games.push(id);
        if team_b != team_a {
            self.teams[team_b].games.push(id);
        }
        id
    }

    pub fn game_count(&self) -> usize {
        self.games.len()
    }

    /// The most recently added game, resolved to names and scores
    pub fn last_game(&self) -> Option<(&str, &str, u32, u32)> {
        self.games.last().map(|g| {
            (
                self.teams[g.team_a].name.as_str(),
                self.teams[g.team_b].name.as_str(),
                g.team_a_score,
                g.team_b_score,
            )
        })
    }

    pub fn build(self) -> ScheduleGraph {
        ScheduleGraph {
            teams: self.teams,
            games: self.games,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_teams_deduplicated_by_name() {
        let mut builder = ScheduleBuilder::new();
        builder.add_game("A", "B", 100, 80);
        builder.add_game("B", "A", 90, 95);
        builder.add_game("C", "A", 60, 61);

        let graph = builder.build();
        assert_eq!(graph.team_count(), 3);
        assert_eq!(graph.game_count(), 3);

        let a = graph.team_by_name("A").unwrap();
        assert_eq!(a.games_played(), 3);
        assert_eq!(a.wins, 3);
        assert_eq!(a.losses, 0);

        let b = graph.team_by_name("B").unwrap();
        assert_eq!(b.games_played(), 2);
        assert_eq!(b.losses, 2);
    }

    #[test]
    fn test_ties_are_not_tallied() {
        let mut builder = ScheduleBuilder::new();
        builder.add_game("A", "B", 70, 70);

        let graph = builder.build();
        for team in graph.teams() {
            assert_eq!(team.wins, 0);
            assert_eq!(team.losses, 0);
            assert_eq!(team.games_played(), 1);
        }
    }

    #[test]
    fn test_self_play_is_not_tallied() {
        let mut builder = ScheduleBuilder::new();
        builder.add_game("A", "A", 80, 70);

        let graph = builder.build();
        let a = graph.team_by_name("A").unwrap();
        assert_eq!(graph.team_count(), 1);
        assert_eq!((a.wins, a.losses), (0, 0));
        assert_eq!(a.games_played(), 1);
    }

    #[test]
    fn test_isolated_team() {
        let mut builder = ScheduleBuilder::new();
        let lonely = builder.team("Lonely");
        builder.add_game("A", "B", 1, 0);

        let graph = builder.build();
        assert_eq!(graph.team(lonely).games_played(), 0);
        assert_eq!(graph.team_count(), 3);
    }

    #[test]
    fn test_last_game() {
        let mut builder = ScheduleBuilder::new();
        assert!(builder.last_game().is_none());

        builder.add_game("A", "B", 3, 2);
        assert_eq!(builder.last_game(), Some(("A", "B", 3, 2)));
    }
}
