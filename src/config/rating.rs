//! Inference hyperparameters

use crate::error::RatingError;
use serde::{Deserialize, Serialize};

/// Fixed prior constants for the rating engine
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Hyperparameters {
    /// Prior mean points
    pub mu: f64,
    /// Prior precision of the mean (shrinkage toward `mu`)
    pub tau: f64,
    /// Shape of the Gamma prior on precision
    pub alpha: f64,
    /// Rate of the Gamma prior on precision
    pub beta: f64,
    /// Number of sweeps; there is no convergence check
    pub iterations: u32,
}

impl Default for Hyperparameters {
    fn default() -> Self {
        Self {
            mu: 70.0,
            tau: 0.1,
            alpha: 1.0,
            beta: 1.0,
            iterations: 100,
        }
    }
}

impl Hyperparameters {
    /// Validate hyperparameters.
    ///
    /// `alpha >= 1` keeps `(alpha + n/2 - 1) / beta` strictly positive for every
    /// team with at least one game.
    pub fn validate(&self) -> crate::error::Result<()> {
        let finite = [self.mu, self.tau, self.alpha, self.beta]
            .iter()
            .all(|v| v.is_finite());
        if !finite {
            return Err(RatingError::ConfigurationError {
                message: "Hyperparameters must be finite".to_string(),
            }
            .into());
        }

        if self.tau <= 0.0 {
            return Err(RatingError::ConfigurationError {
                message: "Prior precision (tau) must be positive".to_string(),
            }
            .into());
        }

        if self.beta <= 0.0 {
            return Err(RatingError::ConfigurationError {
                message: "Precision rate (beta) must be positive".to_string(),
            }
            .into());
        }

        if self.alpha < 1.0 {
            return Err(RatingError::ConfigurationError {
                message: "Precision shape (alpha) must be at least 1".to_string(),
            }
            .into());
        }

        if self.iterations == 0 {
            return Err(RatingError::ConfigurationError {
                message: "Iterations must be greater than 0".to_string(),
            }
            .into());
        }

        Ok(())
    }
}
