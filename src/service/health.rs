//! Health checks for the query service
//!
//! Liveness follows the running flag; readiness additionally requires a
//! non-empty posterior table.

use crate::api::handlers::ServerState;
use crate::utils::current_timestamp;
use serde::{Deserialize, Serialize};
use std::time::Instant;
use tracing::{debug, error};

/// Health check status
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum HealthStatus {
    Healthy,
    Degraded,
    Unhealthy,
}

impl HealthStatus {
    /// Gauge encoding (0=unhealthy, 1=degraded, 2=healthy)
    pub fn as_gauge(self) -> u8 {
        match self {
            HealthStatus::Unhealthy => 0,
            HealthStatus::Degraded => 1,
            HealthStatus::Healthy => 2,
        }
    }

    fn worst(self, other: HealthStatus) -> HealthStatus {
        if other.as_gauge() < self.as_gauge() {
            other
        } else {
            self
        }
    }
}

impl std::fmt::Display for HealthStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            HealthStatus::Healthy => write!(f, "healthy"),
            HealthStatus::Degraded => write!(f, "degraded"),
            HealthStatus::Unhealthy => write!(f, "unhealthy"),
        }
    }
}

/// Health check response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthCheck {
    /// Overall service status
    pub status: HealthStatus,
    pub service: String,
    pub version: String,
    pub timestamp: chrono::DateTime<chrono::Utc>,
    /// Detailed component checks
    pub checks: Vec<ComponentCheck>,
    pub stats: ServiceStats,
}

/// Individual component health check
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ComponentCheck {
    pub name: String,
    pub status: HealthStatus,
    /// Set when the component is not healthy
    pub message: Option<String>,
    pub duration_ms: u64,
}

/// Service statistics for health reporting
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ServiceStats {
    pub teams_loaded: usize,
    /// Name of the first-ranked team, if any
    pub top_team: Option<String>,
    pub matchups_served: u64,
    pub searches_served: u64,
}

impl HealthCheck {
    /// Perform a full health check and publish the result to the health gauge
    pub async fn check(state: &ServerState) -> Self {
        let service_check = Self::check_service_running(state).await;
        let table_check = Self::check_posterior_table(state);

        let status = service_check.status.worst(table_check.status);
        state.metrics.update_health_status(status.as_gauge());

        HealthCheck {
            status,
            service: state.service_name.clone(),
            version: env!("CARGO_PKG_VERSION").to_string(),
            timestamp: current_timestamp(),
            checks: vec![service_check, table_check],
            stats: Self::gather_service_stats(state),
        }
    }

    /// Running and serving a non-empty table is healthy; running with no
    /// teams is degraded
    pub async fn liveness_check(state: &ServerState) -> HealthStatus {
        if !*state.is_running.read().await {
            return HealthStatus::Unhealthy;
        }
        match state.storage.team_count() {
            Ok(0) => HealthStatus::Degraded,
            Ok(_) => HealthStatus::Healthy,
            Err(e) => {
                error!("Posterior table unavailable: {}", e);
                HealthStatus::Degraded
            }
        }
    }

    /// Readiness check - verify the table can answer queries
    pub async fn readiness_check(state: &ServerState) -> HealthStatus {
        if !*state.is_running.read().await {
            return HealthStatus::Unhealthy;
        }
        Self::check_posterior_table(state).status
    }

    async fn check_service_running(state: &ServerState) -> ComponentCheck {
        let start = Instant::now();

        let (status, message) = if *state.is_running.read().await {
            (HealthStatus::Healthy, None)
        } else {
            (
                HealthStatus::Unhealthy,
                Some("Service is not running".to_string()),
            )
        };

        ComponentCheck {
            name: "service_running".to_string(),
            status,
            message,
            duration_ms: start.elapsed().as_millis() as u64,
        }
    }

    fn check_posterior_table(state: &ServerState) -> ComponentCheck {
        let start = Instant::now();

        let (status, message) = match state.storage.team_count() {
            Ok(0) => (
                HealthStatus::Degraded,
                Some("No teams loaded".to_string()),
            ),
            Ok(_) => (HealthStatus::Healthy, None),
            Err(e) => {
                error!("Posterior table check failed: {}", e);
                (
                    HealthStatus::Unhealthy,
                    Some(format!("Cannot read posterior table: {}", e)),
                )
            }
        };

        ComponentCheck {
            name: "posterior_table".to_string(),
            status,
            message,
            duration_ms: start.elapsed().as_millis() as u64,
        }
    }

    fn gather_service_stats(state: &ServerState) -> ServiceStats {
        let records = match state.storage.all() {
            Ok(records) => records,
            Err(e) => {
                debug!("Failed to read posterior table for health check: {}", e);
                Vec::new()
            }
        };

        ServiceStats {
            teams_loaded: records.len(),
            top_team: records.first().map(|r| r.name.clone()),
            matchups_served: state.metrics.query().matchup_predictions_total.get(),
            searches_served: state.metrics.query().search_queries_total.get(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::metrics::MetricsCollector;
    use crate::rating::storage::InMemoryPosteriorStorage;
    use crate::types::PosteriorRecord;
    use std::sync::Arc;
    use tokio::sync::RwLock;

    fn state(teams: usize, running: bool) -> ServerState {
        let records = (0..teams)
            .map(|i| PosteriorRecord {
                name: format!("Team {}", i),
                wins: 1,
                losses: 0,
                mean_for: 80.0 - i as f64,
                sd_for: 5.0,
                mean_against: 70.0,
                sd_against: 5.0,
            })
            .collect();

        ServerState {
            service_name: "scorecast".to_string(),
            storage: Arc::new(InMemoryPosteriorStorage::new(records)),
            metrics: Arc::new(MetricsCollector::new().unwrap()),
            search_limit: 10,
            is_running: Arc::new(RwLock::new(running)),
        }
    }

    #[tokio::test]
    async fn test_healthy_with_teams() {
        let state = state(3, true);
        let health = HealthCheck::check(&state).await;

        assert_eq!(health.status, HealthStatus::Healthy);
        assert_eq!(health.stats.teams_loaded, 3);
        assert_eq!(health.stats.top_team.as_deref(), Some("Team 0"));
        assert_eq!(state.metrics.service().health_status.get(), 2);
        assert_eq!(HealthCheck::readiness_check(&state).await, HealthStatus::Healthy);
    }

    #[tokio::test]
    async fn test_degraded_without_teams() {
        let state = state(0, true);
        let health = HealthCheck::check(&state).await;

        assert_eq!(health.status, HealthStatus::Degraded);
        assert!(health.stats.top_team.is_none());
        assert_eq!(HealthCheck::liveness_check(&state).await, HealthStatus::Degraded);
        assert_eq!(state.metrics.service().health_status.get(), 1);
    }

    #[tokio::test]
    async fn test_unhealthy_when_stopped() {
        let state = state(3, false);
        let health = HealthCheck::check(&state).await;

        assert_eq!(health.status, HealthStatus::Unhealthy);
        assert_eq!(HealthCheck::liveness_check(&state).await, HealthStatus::Unhealthy);
        assert_eq!(HealthCheck::readiness_check(&state).await, HealthStatus::Unhealthy);
    }

    #[tokio::test]
    async fn test_health_json() {
        let health = HealthCheck::check(&state(1, true)).await;
        let json = serde_json::to_string_pretty(&health).unwrap();

        assert!(json.contains("\"status\": \"healthy\""));
        assert!(json.contains("posterior_table"));
        assert_eq!(HealthStatus::Degraded.to_string(), "degraded");
    }
}
