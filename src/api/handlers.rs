//! HTTP handlers for the query surface
//!
//! Rankings, team search and matchup prediction over the loaded posterior
//! table, plus health and Prometheus endpoints.

use crate::error::RatingError;
use crate::metrics::collector::{MetricsCollector, MetricsTimer};
use crate::rating::predictor::predict;
use crate::rating::storage::PosteriorStorage;
use crate::service::health::{HealthCheck, HealthStatus};
use axum::{
    extract::{Query, State},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use prometheus::{Encoder, TextEncoder};
use serde::Deserialize;
use serde_json::json;
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::{debug, error, warn};

/// Shared state for all handlers
#[derive(Clone)]
pub struct ServerState {
    pub service_name: String,
    pub storage: Arc<dyn PosteriorStorage>,
    pub metrics: Arc<MetricsCollector>,
    pub search_limit: usize,
    pub is_running: Arc<RwLock<bool>>,
}

/// Error returned by query handlers
#[derive(Debug)]
pub enum ApiError {
    BadRequest(String),
    NotFound(String),
    Internal(String),
}

impl ApiError {
    fn status(&self) -> StatusCode {
        match self {
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<anyhow::Error> for ApiError {
    fn from(err: anyhow::Error) -> Self {
        match err.downcast_ref::<RatingError>() {
            Some(RatingError::TeamNotFound { .. }) => ApiError::NotFound(err.to_string()),
            Some(RatingError::InvalidSearchPattern { .. }) => ApiError::BadRequest(err.to_string()),
            _ => ApiError::Internal(err.to_string()),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let message = match self {
            ApiError::BadRequest(m) | ApiError::NotFound(m) | ApiError::Internal(m) => m,
        };
        (status, Json(json!({ "error": message }))).into_response()
    }
}

/// Record metrics for a finished request and produce the response
fn finish(
    state: &ServerState,
    endpoint: &str,
    timer: MetricsTimer,
    result: Result<Response, ApiError>,
) -> Response {
    let response = match result {
        Ok(response) => response,
        Err(err) => {
            match &err {
                ApiError::Internal(message) => error!("{} failed: {}", endpoint, message),
                ApiError::BadRequest(message) | ApiError::NotFound(message) => {
                    warn!("{} rejected: {}", endpoint, message)
                }
            }
            err.into_response()
        }
    };

    state
        .metrics
        .record_request(endpoint, response.status().as_u16(), timer.stop());
    response
}

/// Look up a team, counting misses
fn lookup(state: &ServerState, name: &str) -> Result<crate::types::PosteriorRecord, ApiError> {
    match state.storage.get(name)? {
        Some(record) => Ok(record),
        None => {
            state.metrics.record_unknown_team();
            Err(RatingError::TeamNotFound {
                name: name.to_string(),
            }
            .into())
        }
    }
}

impl From<RatingError> for ApiError {
    fn from(err: RatingError) -> Self {
        ApiError::from(anyhow::Error::from(err))
    }
}

#[derive(Debug, Deserialize)]
pub struct SearchParams {
    pub name: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct MatchupParams {
    pub home: Option<String>,
    pub away: Option<String>,
}

fn required(value: Option<String>, parameter: &str) -> Result<String, ApiError> {
    value.ok_or_else(|| ApiError::BadRequest(format!("Missing query parameter: {}", parameter)))
}

/// Root endpoint handler - shows service information
pub async fn root_handler(State(state): State<ServerState>) -> impl IntoResponse {
    Json(json!({
        "service": state.service_name,
        "version": env!("CARGO_PKG_VERSION"),
        "endpoints": [
            "/rankings",
            "/search?name=",
            "/matchup?home=&away=",
            "/health",
            "/ready",
            "/alive",
            "/metrics",
            "/stats"
        ]
    }))
}

/// All posterior records in ranked order
pub async fn rankings_handler(State(state): State<ServerState>) -> Response {
    let timer = state.metrics.start_timer();
    let result = state
        .storage
        .all()
        .map(|records| Json(records).into_response())
        .map_err(ApiError::from);

    finish(&state, "/rankings", timer, result)
}

fn search(state: &ServerState, params: SearchParams) -> Result<Response, ApiError> {
    let pattern = required(params.name, "name")?;
    let names = state.storage.search(&pattern, state.search_limit)?;
    debug!("Search {:?} matched {} teams", pattern, names.len());

    state.metrics.record_search();
    Ok(Json(names).into_response())
}

fn matchup(state: &ServerState, params: MatchupParams) -> Result<Response, ApiError> {
    let home = required(params.home, "home")?;
    let away = required(params.away, "away")?;

    let home = lookup(state, &home)?;
    let away = lookup(state, &away)?;
    let prediction = predict(&home, &away);
    debug!(
        "Matchup {} vs {}: favorite {} ({:.3})",
        home.name, away.name, prediction.favorite.name, prediction.favorite_win_probability
    );

    state.metrics.record_matchup();
    Ok(Json(prediction).into_response())
}

/// Case-insensitive pattern search over team names
pub async fn search_handler(
    State(state): State<ServerState>,
    Query(params): Query<SearchParams>,
) -> Response {
    let timer = state.metrics.start_timer();
    let result = search(&state, params);
    finish(&state, "/search", timer, result)
}

/// Predict a matchup between two named teams; `home` is the first operand
pub async fn matchup_handler(
    State(state): State<ServerState>,
    Query(params): Query<MatchupParams>,
) -> Response {
    let timer = state.metrics.start_timer();
    let result = matchup(&state, params);
    finish(&state, "/matchup", timer, result)
}

/// Lightweight health check endpoint handler
pub async fn health_handler(State(state): State<ServerState>) -> impl IntoResponse {
    debug!("Health check requested");

    let status = HealthCheck::liveness_check(&state).await;
    let code = match status {
        HealthStatus::Unhealthy => StatusCode::SERVICE_UNAVAILABLE,
        _ => StatusCode::OK,
    };

    (
        code,
        Json(json!({
            "status": status,
            "service": state.service_name,
            "version": env!("CARGO_PKG_VERSION")
        })),
    )
}

/// Readiness check endpoint handler
pub async fn ready_handler(State(state): State<ServerState>) -> impl IntoResponse {
    debug!("Readiness check requested");

    match HealthCheck::readiness_check(&state).await {
        HealthStatus::Healthy => (StatusCode::OK, "Ready"),
        HealthStatus::Degraded => (StatusCode::OK, "Degraded but ready"),
        HealthStatus::Unhealthy => (StatusCode::SERVICE_UNAVAILABLE, "Not ready"),
    }
}

/// Liveness check endpoint handler
pub async fn alive_handler(State(state): State<ServerState>) -> impl IntoResponse {
    match HealthCheck::liveness_check(&state).await {
        HealthStatus::Unhealthy => (StatusCode::SERVICE_UNAVAILABLE, "Not alive"),
        _ => (StatusCode::OK, "Alive"),
    }
}

/// Detailed service statistics endpoint handler
pub async fn stats_handler(State(state): State<ServerState>) -> impl IntoResponse {
    let health = HealthCheck::check(&state).await;
    let code = match health.status {
        HealthStatus::Unhealthy => StatusCode::SERVICE_UNAVAILABLE,
        _ => StatusCode::OK,
    };

    (code, Json(health))
}

/// Prometheus metrics endpoint handler
pub async fn metrics_handler(State(state): State<ServerState>) -> Response {
    let metric_families = state.metrics.registry().gather();
    let encoder = TextEncoder::new();

    match encoder.encode_to_string(&metric_families) {
        Ok(metrics_output) => {
            debug!("Serving {} metric families", metric_families.len());
            (
                [(header::CONTENT_TYPE, encoder.format_type().to_string())],
                metrics_output,
            )
                .into_response()
        }
        Err(e) => {
            error!("Failed to encode metrics: {}", e);
            ApiError::Internal("Failed to encode metrics".to_string()).into_response()
        }
    }
}
