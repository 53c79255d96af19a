//! Metrics collection using Prometheus
//!
//! This module provides metrics collection for inference runs and the query
//! surface using Prometheus metrics.

use crate::rating::InferenceReport;
use anyhow::Result;
use prometheus::{
    Histogram, HistogramOpts, IntCounter, IntCounterVec, IntGauge, Opts, Registry,
};
use std::sync::Arc;
use std::time::{Duration, Instant};

/// Main metrics collector for the rating service
#[derive(Clone)]
pub struct MetricsCollector {
    /// Prometheus registry
    registry: Arc<Registry>,

    /// Service-level metrics
    service_metrics: ServiceMetrics,

    /// Query surface metrics
    query_metrics: QueryMetrics,

    /// Inference metrics
    inference_metrics: InferenceMetrics,
}

/// Service-level metrics
#[derive(Clone)]
pub struct ServiceMetrics {
    /// Health check status (0=unhealthy, 1=degraded, 2=healthy)
    pub health_status: IntGauge,

    /// Teams currently loaded in the posterior table
    pub teams_loaded: IntGauge,
}

/// Query surface metrics
#[derive(Clone)]
pub struct QueryMetrics {
    /// HTTP requests by endpoint and status class
    pub http_requests_total: IntCounterVec,

    /// Matchup predictions served
    pub matchup_predictions_total: IntCounter,

    /// Search queries served
    pub search_queries_total: IntCounter,

    /// Lookups of unknown team names
    pub unknown_team_total: IntCounter,

    /// Query handling time
    pub request_duration: Histogram,
}

/// Inference metrics
#[derive(Clone)]
pub struct InferenceMetrics {
    /// Completed inference runs
    pub runs_total: IntCounter,

    /// Games ingested across runs
    pub games_ingested_total: IntCounter,

    /// Wall time of an inference run
    pub inference_duration: Histogram,
}

impl MetricsCollector {
    /// Create a new metrics collector with default registry
    pub fn new() -> Result<Self> {
        let registry = Arc::new(Registry::new());
        Self::with_registry(registry)
    }

    /// Create a new metrics collector with custom registry
    pub fn with_registry(registry: Arc<Registry>) -> Result<Self> {
        let service_metrics = ServiceMetrics::new(&registry)?;
        let query_metrics = QueryMetrics::new(&registry)?;
        let inference_metrics = InferenceMetrics::new(&registry)?;

        Ok(Self {
            registry,
            service_metrics,
            query_metrics,
            inference_metrics,
        })
    }

    /// Get the Prometheus registry
    pub fn registry(&self) -> Arc<Registry> {
        self.registry.clone()
    }

    pub fn service(&self) -> &ServiceMetrics {
        &self.service_metrics
    }

    pub fn query(&self) -> &QueryMetrics {
        &self.query_metrics
    }

    pub fn inference(&self) -> &InferenceMetrics {
        &self.inference_metrics
    }

    /// Record an HTTP request outcome
    pub fn record_request(&self, endpoint: &str, status: u16, duration: Duration) {
        let class = match status {
            200..=299 => "2xx",
            400..=499 => "4xx",
            500..=599 => "5xx",
            _ => "other",
        };

        self.query_metrics
            .http_requests_total
            .with_label_values(&[endpoint, class])
            .inc();

        self.query_metrics
            .request_duration
            .observe(duration.as_secs_f64());
    }

    pub fn record_matchup(&self) {
        self.query_metrics.matchup_predictions_total.inc();
    }

    pub fn record_search(&self) {
        self.query_metrics.search_queries_total.inc();
    }

    pub fn record_unknown_team(&self) {
        self.query_metrics.unknown_team_total.inc();
    }

    /// Record a completed inference run
    pub fn record_inference(&self, report: &InferenceReport) {
        self.inference_metrics.runs_total.inc();
        self.inference_metrics
            .games_ingested_total
            .inc_by(report.games as u64);
        self.inference_metrics
            .inference_duration
            .observe(report.duration_seconds);
    }

    pub fn set_teams_loaded(&self, count: usize) {
        self.service_metrics.teams_loaded.set(count as i64);
    }

    /// Update health status
    pub fn update_health_status(&self, status: u8) {
        self.service_metrics.health_status.set(status as i64);
    }

    /// Create a timer for measuring operation duration
    pub fn start_timer(&self) -> MetricsTimer {
        MetricsTimer::new()
    }
}

/// Timer for measuring operation durations
pub struct MetricsTimer {
    start: Instant,
}

impl MetricsTimer {
    fn new() -> Self {
        Self {
            start: Instant::now(),
        }
    }

    /// Get the elapsed duration
    pub fn elapsed(&self) -> Duration {
        self.start.elapsed()
    }

    /// Stop the timer and return the duration
    pub fn stop(self) -> Duration {
        self.elapsed()
    }
}

impl ServiceMetrics {
    fn new(registry: &Registry) -> Result<Self> {
        let health_status = IntGauge::new(
            "scorecast_health_status",
            "Health status (0=unhealthy, 1=degraded, 2=healthy)",
        )?;
        registry.register(Box::new(health_status.clone()))?;

        let teams_loaded = IntGauge::new(
            "scorecast_teams_loaded",
            "Teams in the loaded posterior table",
        )?;
        registry.register(Box::new(teams_loaded.clone()))?;

        Ok(Self {
            health_status,
            teams_loaded,
        })
    }
}

impl QueryMetrics {
    fn new(registry: &Registry) -> Result<Self> {
        let http_requests_total = IntCounterVec::new(
            Opts::new("scorecast_http_requests_total", "Total HTTP requests"),
            &["endpoint", "status"],
        )?;
        registry.register(Box::new(http_requests_total.clone()))?;

        let matchup_predictions_total = IntCounter::new(
            "scorecast_matchup_predictions_total",
            "Total matchup predictions served",
        )?;
        registry.register(Box::new(matchup_predictions_total.clone()))?;

        let search_queries_total = IntCounter::new(
            "scorecast_search_queries_total",
            "Total team name searches served",
        )?;
        registry.register(Box::new(search_queries_total.clone()))?;

        let unknown_team_total = IntCounter::new(
            "scorecast_unknown_team_total",
            "Total lookups of unknown team names",
        )?;
        registry.register(Box::new(unknown_team_total.clone()))?;

        let request_duration = Histogram::with_opts(
            HistogramOpts::new(
                "scorecast_request_duration_seconds",
                "Time spent handling a query",
            )
            .buckets(vec![0.0001, 0.0005, 0.001, 0.005, 0.01, 0.05, 0.1]),
        )?;
        registry.register(Box::new(request_duration.clone()))?;

        Ok(Self {
            http_requests_total,
            matchup_predictions_total,
            search_queries_total,
            unknown_team_total,
            request_duration,
        })
    }
}

impl InferenceMetrics {
    fn new(registry: &Registry) -> Result<Self> {
        let runs_total = IntCounter::new(
            "scorecast_inference_runs_total",
            "Total completed inference runs",
        )?;
        registry.register(Box::new(runs_total.clone()))?;

        let games_ingested_total = IntCounter::new(
            "scorecast_games_ingested_total",
            "Total games fed to inference",
        )?;
        registry.register(Box::new(games_ingested_total.clone()))?;

        let inference_duration = Histogram::with_opts(
            HistogramOpts::new(
                "scorecast_inference_duration_seconds",
                "Wall time of an inference run",
            )
            .buckets(vec![0.001, 0.01, 0.1, 0.5, 1.0, 5.0, 30.0]),
        )?;
        registry.register(Box::new(inference_duration.clone()))?;

        Ok(Self {
            runs_total,
            games_ingested_total,
            inference_duration,
        })
    }
}
