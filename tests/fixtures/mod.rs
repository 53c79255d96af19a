//! Shared game tables and posterior records for integration testing

#![allow(dead_code)]

use scorecast::types::PosteriorRecord;
use std::path::{Path, PathBuf};

pub const HEADER: &str = "Team,Opponent,Team Score,Opponent Score";

/// Two games between A and B, both won by A
pub const TWO_TEAM_GAMES: &[(&str, &str, u32, u32)] = &[("A", "B", 100, 80), ("B", "A", 90, 95)];

/// Home-and-away round robin between three teams
pub const THREE_TEAM_GAMES: &[(&str, &str, u32, u32)] = &[
    ("A", "B", 80, 70),
    ("B", "A", 75, 72),
    ("A", "C", 90, 60),
    ("C", "A", 66, 64),
    ("B", "C", 85, 79),
    ("C", "B", 70, 81),
];

/// Render games as a CSV game table with the default header
pub fn games_csv(games: &[(&str, &str, u32, u32)]) -> String {
    let mut csv = format!("{}\n", HEADER);
    for (team, opponent, team_score, opponent_score) in games {
        csv.push_str(&format!(
            "{},{},{},{}\n",
            team, opponent, team_score, opponent_score
        ));
    }
    csv
}

/// Same games with every row seen from the other side
pub fn flipped<'a>(games: &[(&'a str, &'a str, u32, u32)]) -> Vec<(&'a str, &'a str, u32, u32)> {
    games
        .iter()
        .map(|&(team, opponent, team_score, opponent_score)| {
            (opponent, team, opponent_score, team_score)
        })
        .collect()
}

/// Deterministic single round robin between `teams` teams
pub fn round_robin_csv(teams: usize) -> String {
    let mut csv = format!("{}\n", HEADER);
    for i in 0..teams {
        for j in (i + 1)..teams {
            let (si, sj) = synthetic_scores(i, j);
            csv.push_str(&format!("Team {},Team {},{},{}\n", i, j, si, sj));
        }
    }
    csv
}

fn synthetic_scores(i: usize, j: usize) -> (u32, u32) {
    let offense = |t: usize| 60 + ((t * 7) % 23) as u32;
    let defense = |t: usize| ((t * 11) % 17) as u32;
    (
        offense(i) + defense(j) / 2 + ((i + j) % 5) as u32,
        offense(j) + defense(i) / 2 + ((i * j) % 3) as u32,
    )
}

/// Write `contents` to `name` inside `dir`
pub fn write_file(dir: &Path, name: &str, contents: &str) -> PathBuf {
    let path = dir.join(name);
    std::fs::write(&path, contents).expect("Failed to write fixture file");
    path
}

pub fn record(name: &str, mean_for: f64, mean_against: f64) -> PosteriorRecord {
    PosteriorRecord {
        name: name.to_string(),
        wins: 10,
        losses: 5,
        mean_for,
        sd_for: 6.0,
        mean_against,
        sd_against: 6.0,
    }
}
