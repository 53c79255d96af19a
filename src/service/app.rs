//! Query service state and lifecycle
//!
//! `AppState` owns the loaded posterior table, the metrics collector, the
//! HTTP server and its background tasks.

use crate::api::handlers::ServerState;
use crate::api::server::{RatingServer, RatingServerConfig};
use crate::config::AppConfig;
use crate::metrics::MetricsCollector;
use crate::rating::ranking::{rank_records, read_table_file};
use crate::rating::storage::{InMemoryPosteriorStorage, PosteriorStorage};
use crate::service::health::HealthCheck;
use crate::types::PosteriorRecord;
use std::sync::Arc;
use thiserror::Error;
use tokio::sync::RwLock;
use tokio::task::JoinHandle;
use tokio::time::Duration;
use tracing::{debug, error, info, warn};

/// Interval between background health gauge refreshes
const HEALTH_REFRESH_INTERVAL: Duration = Duration::from_secs(15);

/// Service-level errors
#[derive(Error, Debug)]
pub enum ServiceError {
    #[error("Configuration error: {message}")]
    Configuration { message: String },

    #[error("Service initialization error: {message}")]
    Initialization { message: String },

    #[error("Background task error: {message}")]
    BackgroundTask { message: String },
}

/// Main application state for serve mode
pub struct AppState {
    config: AppConfig,
    storage: Arc<InMemoryPosteriorStorage>,
    metrics: Arc<MetricsCollector>,
    server: Arc<RatingServer>,
    server_task: Option<JoinHandle<()>>,
    background_tasks: Vec<JoinHandle<()>>,
    is_running: Arc<RwLock<bool>>,
}

impl AppState {
    /// Load the persisted table named by `config.query.rankings_path`
    pub async fn new(config: AppConfig) -> Result<Self, ServiceError> {
        let path = config.query.rankings_path.clone();
        info!("Loading posterior table from {}", path.display());

        let records = read_table_file(&path).map_err(|e| ServiceError::Initialization {
            message: format!("Failed to load {}: {:#}", path.display(), e),
        })?;

        Self::with_records(config, records)
    }

    /// Build the service around an in-memory table
    pub fn with_records(
        config: AppConfig,
        mut records: Vec<PosteriorRecord>,
    ) -> Result<Self, ServiceError> {
        if config.query.search_limit == 0 {
            return Err(ServiceError::Configuration {
                message: "search_limit must be greater than zero".to_string(),
            });
        }

        let metrics = Arc::new(MetricsCollector::new().map_err(|e| {
            ServiceError::Initialization {
                message: format!("Failed to create metrics collector: {}", e),
            }
        })?);

        rank_records(&mut records);
        info!("Serving {} teams", records.len());
        metrics.set_teams_loaded(records.len());

        let storage = Arc::new(InMemoryPosteriorStorage::new(records));
        let is_running = Arc::new(RwLock::new(false));

        let server_state = server_state(&config, &storage, &metrics, &is_running);
        let server_config = RatingServerConfig {
            port: config.service.http_port,
            host: config.service.http_host.clone(),
            static_dir: config.query.static_dir.clone(),
        };
        let server = Arc::new(RatingServer::new(server_config, server_state));

        Ok(Self {
            config,
            storage,
            metrics,
            server,
            server_task: None,
            background_tasks: Vec::new(),
            is_running,
        })
    }

    /// Bind the HTTP server, then start serving and the background tasks
    ///
    /// A bind failure is returned and leaves the service stopped.
    pub async fn start(&mut self) -> Result<(), ServiceError> {
        info!("Starting {}", self.config.service.name);

        let listener = self
            .server
            .bind()
            .await
            .map_err(|e| ServiceError::Initialization {
                message: format!("Failed to bind query server: {:#}", e),
            })?;

        *self.is_running.write().await = true;

        let server = self.server.clone();
        self.server_task = Some(tokio::spawn(async move {
            if let Err(e) = server.serve(listener).await {
                error!("Query server failed: {:#}", e);
            }
        }));

        let state = self.server_state();
        let health_task = tokio::spawn(async move {
            let mut interval = tokio::time::interval(HEALTH_REFRESH_INTERVAL);
            loop {
                interval.tick().await;
                let health = HealthCheck::check(&state).await;
                debug!("Health refreshed: {}", health.status);
            }
        });
        self.background_tasks.push(health_task);

        info!(
            "{} started on http://{}:{}",
            self.config.service.name, self.config.service.http_host, self.config.service.http_port
        );
        Ok(())
    }

    /// Stop serving, letting in-flight requests finish
    pub async fn shutdown(&mut self) -> Result<(), ServiceError> {
        info!("Starting graceful shutdown of {}", self.config.service.name);

        *self.is_running.write().await = false;
        self.server.stop();

        let task_count = self.background_tasks.len();
        for (i, task) in self.background_tasks.drain(..).enumerate() {
            debug!("Aborting background task {}/{}", i + 1, task_count);
            task.abort();
        }

        if let Some(task) = self.server_task.take() {
            match tokio::time::timeout(self.config.shutdown_timeout(), task).await {
                Ok(Ok(())) => debug!("Query server task finished"),
                Ok(Err(e)) => {
                    return Err(ServiceError::BackgroundTask {
                        message: format!("Query server task panicked: {}", e),
                    })
                }
                Err(_) => warn!("Query server did not stop before the shutdown timeout"),
            }
        }

        info!(
            "Served {} matchups and {} searches",
            self.metrics.query().matchup_predictions_total.get(),
            self.metrics.query().search_queries_total.get()
        );
        info!("{} shutdown completed", self.config.service.name);
        Ok(())
    }

    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    /// Check if service is running
    pub async fn is_running(&self) -> bool {
        *self.is_running.read().await
    }

    pub fn storage(&self) -> Arc<InMemoryPosteriorStorage> {
        self.storage.clone()
    }

    pub fn metrics(&self) -> Arc<MetricsCollector> {
        self.metrics.clone()
    }

    /// Replace the served table, e.g. after a fresh compute run
    pub fn reload(&self, mut records: Vec<PosteriorRecord>) -> Result<(), ServiceError> {
        rank_records(&mut records);
        let count = records.len();
        self.storage
            .replace_all(records)
            .map_err(|e| ServiceError::BackgroundTask {
                message: format!("Failed to replace posterior table: {}", e),
            })?;
        self.metrics.set_teams_loaded(count);
        info!("Reloaded posterior table with {} teams", count);
        Ok(())
    }

    /// Handler state shared with the HTTP server
    pub fn server_state(&self) -> ServerState {
        server_state(&self.config, &self.storage, &self.metrics, &self.is_running)
    }
}

fn server_state(
    config: &AppConfig,
    storage: &Arc<InMemoryPosteriorStorage>,
    metrics: &Arc<MetricsCollector>,
    is_running: &Arc<RwLock<bool>>,
) -> ServerState {
    ServerState {
        service_name: config.service.name.clone(),
        storage: storage.clone(),
        metrics: metrics.clone(),
        search_limit: config.query.search_limit,
        is_running: is_running.clone(),
    }
}
