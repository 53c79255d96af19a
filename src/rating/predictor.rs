//! Matchup prediction from two posterior records
//!
//! The favorite is the side with the higher net rating. Each side's expected
//! score averages its offense with the opponent's defense, and the margin is
//! modeled as `Normal(margin_mean, margin_sd^2)`; the favorite's win
//! probability is `P(margin > 0)`.

use crate::types::PosteriorRecord;
use serde::{Deserialize, Serialize};
use statrs::function::erf::erf;
use std::f64::consts::SQRT_2;

/// Predicted outcome of a hypothetical game
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MatchupPrediction {
    pub favorite: PosteriorRecord,
    pub underdog: PosteriorRecord,
    pub favorite_expected_score: f64,
    pub underdog_expected_score: f64,
    pub margin_mean: f64,
    pub margin_sd: f64,
    /// In `[0.5, 1.0]` whenever `margin_sd > 0`
    pub favorite_win_probability: f64,
}

impl MatchupPrediction {
    pub fn underdog_win_probability(&self) -> f64 {
        1.0 - self.favorite_win_probability
    }
}

/// `P(X > 0)` for `X ~ Normal(mean, sd^2)`.
///
/// A degenerate `sd == 0` yields a step at zero (0.5 exactly at `mean == 0`).
pub fn probability_positive(mean: f64, sd: f64) -> f64 {
    if sd == 0.0 {
        return match mean.partial_cmp(&0.0) {
            Some(std::cmp::Ordering::Greater) => 1.0,
            Some(std::cmp::Ordering::Less) => 0.0,
            _ => 0.5,
        };
    }
    0.5 * (1.0 + erf(mean / (sd * SQRT_2)))
}

/// Expected score of `offense` against `defense`
pub fn expected_score(offense: &PosteriorRecord, defense: &PosteriorRecord) -> f64 {
    (offense.mean_for + defense.mean_against) / 2.0
}

/// Standard deviation of the score margin between two teams
pub fn margin_sd(a: &PosteriorRecord, b: &PosteriorRecord) -> f64 {
    ((a.sd_for.powi(2) + a.sd_against.powi(2) + b.sd_for.powi(2) + b.sd_against.powi(2)) / 4.0)
        .sqrt()
}

/// Predict a matchup.
///
/// The second operand is the favorite when net ratings are equal.
pub fn predict(first: &PosteriorRecord, second: &PosteriorRecord) -> MatchupPrediction {
    let (favorite, underdog) = if first.net_rating() > second.net_rating() {
        (first, second)
    } else {
        (second, first)
    };

    let favorite_expected_score = expected_score(favorite, underdog);
    let underdog_expected_score = expected_score(underdog, favorite);
    let margin_mean = favorite_expected_score - underdog_expected_score;
    let margin_sd = margin_sd(favorite, underdog);

    MatchupPrediction {
        favorite: favorite.clone(),
        underdog: underdog.clone(),
        favorite_expected_score,
        underdog_expected_score,
        margin_mean,
        margin_sd,
        favorite_win_probability: probability_positive(margin_mean, margin_sd),
    }
}
