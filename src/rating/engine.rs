//! Iterative MAP rating inference
//!
//! Each team carries a Normal posterior over points scored and points
//! conceded, with a Gamma prior on each precision. One sweep is two passes
//! over every team:
//!
//! 1. **Means.** For team `t` and each game against `o`, the score is treated
//!    as the average of `t`'s offense and `o`'s defense, so the message to
//!    `t.mean_for` is `2 * score_for - o.mean_against` with variance
//!    `1/t.prec_for + 1/o.prec_against` (and symmetrically for defense).
//!    Messages are combined with the `N(mu, 1/tau)` prior.
//! 2. **Precisions.** Squared residuals against the averaged means update the
//!    Gamma posterior; the precision is set to its mode
//!    `(alpha + n/2 - 1) / (beta + sum(r^2)/2)`.
//!
//! Both passes are synchronous: every team's update reads only the state that
//! existed when the pass began, and results are committed after the whole
//! pass has been computed. The sweep count is fixed and there is no
//! convergence check.

use crate::config::Hyperparameters;
use crate::error::{RatingError, Result};
use crate::schedule::ScheduleGraph;
use crate::types::TeamId;
use std::time::Instant;
use tracing::{debug, info};

/// Posterior mean pair computed in the mean pass
#[derive(Debug, Clone, Copy)]
struct MeanUpdate {
    mean_for: f64,
    mean_against: f64,
}

/// Posterior precision pair computed in the precision pass
#[derive(Debug, Clone, Copy)]
struct PrecisionUpdate {
    prec_for: f64,
    prec_against: f64,
}

/// Summary of a completed inference run
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct InferenceReport {
    pub teams: usize,
    pub games: usize,
    pub iterations: u32,
    pub duration_seconds: f64,
}

/// Rating inference engine over a schedule graph
#[derive(Debug, Clone)]
pub struct RatingEngine {
    hyper: Hyperparameters,
}

impl RatingEngine {
    /// Create a new engine; hyperparameters are validated up front
    pub fn new(hyper: Hyperparameters) -> Result<Self> {
        hyper.validate()?;
        Ok(Self { hyper })
    }

    /// Precision assigned to a team with no games.
    ///
    /// For `alpha > 1` this is the Gamma prior mode `(alpha - 1) / beta`. At
    /// `alpha == 1` the mode is zero, so the team keeps its initial precision
    /// `alpha / beta` instead.
    pub fn isolated_precision(&self) -> f64 {
        let Hyperparameters { alpha, beta, .. } = self.hyper;
        if alpha > 1.0 {
            (alpha - 1.0) / beta
        } else {
            alpha / beta
        }
    }

    /// Run the fixed number of sweeps, overwriting every team's posterior.
    ///
    /// Deterministic for a given graph and hyperparameters.
    pub fn infer(&self, graph: &mut ScheduleGraph) -> Result<InferenceReport> {
        if graph.is_empty() {
            return Err(RatingError::EmptySchedule.into());
        }

        let start = Instant::now();
        debug!(
            "Starting inference: {} teams, {} games, {:?}",
            graph.team_count(),
            graph.game_count(),
            self.hyper
        );

        self.initialize(graph);

        let mut means = Vec::with_capacity(graph.team_count());
        let mut precisions = Vec::with_capacity(graph.team_count());

        for _ in 0..self.hyper.iterations {
            means.clear();
            means.extend((0..graph.team_count()).map(|id| self.mean_update(graph, id)));
            for (team, update) in graph.teams_mut().iter_mut().zip(&means) {
                team.mean_for = update.mean_for;
                team.mean_against = update.mean_against;
            }

            precisions.clear();
            precisions.extend((0..graph.team_count()).map(|id| self.precision_update(graph, id)));
            for (team, update) in graph.teams_mut().iter_mut().zip(&precisions) {
                team.prec_for = update.prec_for;
                team.prec_against = update.prec_against;
            }
        }

        let report = InferenceReport {
            teams: graph.team_count(),
            games: graph.game_count(),
            iterations: self.hyper.iterations,
            duration_seconds: start.elapsed().as_secs_f64(),
        };

        info!(
            "Inference completed: {} teams, {} games, {} iterations in {:.2}ms",
            report.teams,
            report.games,
            report.iterations,
            report.duration_seconds * 1000.0
        );

        Ok(report)
    }

    fn initialize(&self, graph: &mut ScheduleGraph) {
        let Hyperparameters {
            mu, alpha, beta, ..
        } = self.hyper;

        for team in graph.teams_mut() {
            team.mean_for = mu;
            team.mean_against = mu;
            team.prec_for = alpha / beta;
            team.prec_against = alpha / beta;
        }
    }

    fn mean_update(&self, graph: &ScheduleGraph, id: TeamId) -> MeanUpdate {
        let Hyperparameters { mu, tau, .. } = self.hyper;
        let team = graph.team(id);

        if team.games.is_empty() {
            return MeanUpdate {
                mean_for: mu,
                mean_against: mu,
            };
        }

        let mut prec_for_tilde = tau;
        let mut prec_against_tilde = tau;
        let mut mean_for_inner = mu * tau;
        let mut mean_against_inner = mu * tau;

        for &game_id in &team.games {
            let (other_id, score_for, score_against) = graph.game(game_id).oriented(id);
            let other = graph.team(other_id);

            let denom_for = 1.0 / team.prec_for + 1.0 / other.prec_against;
            let denom_against = 1.0 / team.prec_against + 1.0 / other.prec_for;

            prec_for_tilde += 1.0 / denom_for;
            prec_against_tilde += 1.0 / denom_against;
            mean_for_inner += (2.0 * score_for - other.mean_against) / denom_for;
            mean_against_inner += (2.0 * score_against - other.mean_for) / denom_against;
        }

        // The combined precisions only normalize the means; the precision pass
        // recomputes precisions from residuals.
        MeanUpdate {
            mean_for: mean_for_inner / prec_for_tilde,
            mean_against: mean_against_inner / prec_against_tilde,
        }
    }

    fn precision_update(&self, graph: &ScheduleGraph, id: TeamId) -> PrecisionUpdate {
        let Hyperparameters { alpha, beta, .. } = self.hyper;
        let team = graph.team(id);

        if team.games.is_empty() {
            let precision = self.isolated_precision();
            return PrecisionUpdate {
                prec_for: precision,
                prec_against: precision,
            };
        }

        let alpha_tilde = alpha + team.games_played() as f64 / 2.0;
        let mut beta_for_tilde = beta;
        let mut beta_against_tilde = beta;

        for &game_id in &team.games {
            let (other_id, score_for, score_against) = graph.game(game_id).oriented(id);
            let other = graph.team(other_id);

            let for_residual = score_for - (team.mean_for + other.mean_against) / 2.0;
            let against_residual = score_against - (team.mean_against + other.mean_for) / 2.0;

            beta_for_tilde += for_residual * for_residual / 2.0;
            beta_against_tilde += against_residual * against_residual / 2.0;
        }

        PrecisionUpdate {
            prec_for: (alpha_tilde - 1.0) / beta_for_tilde,
            prec_against: (alpha_tilde - 1.0) / beta_against_tilde,
        }
    }
}

/// Run inference with the given hyperparameters
pub fn infer(graph: &mut ScheduleGraph, hyper: Hyperparameters) -> Result<InferenceReport> {
    RatingEngine::new(hyper)?.infer(graph)
}
