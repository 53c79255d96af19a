//! Query server
//!
//! Binds the axum router for rankings, search, matchup, health and metrics
//! endpoints, with optional static UI assets, and serves it until a shutdown
//! signal is broadcast.

use crate::api::handlers::{
    alive_handler, health_handler, matchup_handler, metrics_handler, rankings_handler,
    ready_handler, root_handler, search_handler, stats_handler, ServerState,
};
use anyhow::{Context, Result};
use axum::{routing::get, Router};
use std::net::SocketAddr;
use std::path::PathBuf;
use tokio::net::TcpListener;
use tokio::sync::watch;
use tower_http::services::{ServeDir, ServeFile};
use tracing::info;

/// Query server configuration
#[derive(Debug, Clone)]
pub struct RatingServerConfig {
    /// Port to bind the server to
    pub port: u16,
    /// Host to bind to
    pub host: String,
    /// Directory with `index.html` served at `/` and assets under `/static`
    pub static_dir: Option<PathBuf>,
}

impl Default for RatingServerConfig {
    fn default() -> Self {
        Self {
            port: 4000,
            host: "127.0.0.1".to_string(),
            static_dir: None,
        }
    }
}

/// HTTP server exposing the query surface
pub struct RatingServer {
    config: RatingServerConfig,
    state: ServerState,
    shutdown_tx: watch::Sender<bool>,
}

impl RatingServer {
    /// Create a new query server
    pub fn new(config: RatingServerConfig, state: ServerState) -> Self {
        let (shutdown_tx, _) = watch::channel(false);

        Self {
            config,
            state,
            shutdown_tx,
        }
    }

    /// Bind and serve until [`stop`](Self::stop) is called
    pub async fn start(&self) -> Result<()> {
        let listener = self.bind().await?;
        self.serve(listener).await
    }

    /// Bind the configured address without serving yet
    pub async fn bind(&self) -> Result<TcpListener> {
        let addr: SocketAddr = format!("{}:{}", self.config.host, self.config.port)
            .parse()
            .context("Invalid query server address")?;

        TcpListener::bind(addr)
            .await
            .with_context(|| format!("Failed to bind {}", addr))
    }

    /// Serve on an already bound listener
    pub async fn serve(&self, listener: TcpListener) -> Result<()> {
        let app = self.create_router();
        let mut shutdown_rx = self.shutdown_tx.subscribe();

        info!("Query server listening on http://{}", listener.local_addr()?);

        axum::serve(listener, app)
            .with_graceful_shutdown(async move {
                let _ = shutdown_rx.wait_for(|stopped| *stopped).await;
                info!("Query server shutdown signal received");
            })
            .await?;

        info!("Query server stopped");
        Ok(())
    }

    /// Create the Axum router with all endpoints
    pub fn create_router(&self) -> Router {
        let router = Router::new()
            .route("/rankings", get(rankings_handler))
            .route("/search", get(search_handler))
            .route("/matchup", get(matchup_handler))
            .route("/health", get(health_handler))
            .route("/ready", get(ready_handler))
            .route("/alive", get(alive_handler))
            .route("/metrics", get(metrics_handler))
            .route("/stats", get(stats_handler));

        let router = match &self.config.static_dir {
            Some(dir) => router
                .route_service("/", ServeFile::new(dir.join("index.html")))
                .nest_service("/static", ServeDir::new(dir)),
            None => router.route("/", get(root_handler)),
        };

        router.with_state(self.state.clone())
    }

    /// Stop the server; a server started afterwards exits immediately
    pub fn stop(&self) {
        self.shutdown_tx.send_replace(true);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::metrics::MetricsCollector;
    use crate::rating::storage::InMemoryPosteriorStorage;
    use crate::types::PosteriorRecord;
    use axum::{
        body::Body,
        http::{Request, StatusCode},
    };
    use std::sync::Arc;
    use tokio::sync::RwLock;
    use tower::ServiceExt; // for oneshot

    fn record(name: &str, mean_for: f64, mean_against: f64) -> PosteriorRecord {
        PosteriorRecord {
            name: name.to_string(),
            wins: 3,
            losses: 1,
            mean_for,
            sd_for: 10.0,
            mean_against,
            sd_against: 10.0,
        }
    }

    fn test_state(records: Vec<PosteriorRecord>, running: bool) -> ServerState {
        ServerState {
            service_name: "scorecast".to_string(),
            storage: Arc::new(InMemoryPosteriorStorage::new(records)),
            metrics: Arc::new(MetricsCollector::new().expect("Failed to create collector")),
            search_limit: 2,
            is_running: Arc::new(RwLock::new(running)),
        }
    }

    fn test_router() -> (Router, ServerState) {
        let state = test_state(
            vec![
                record("North Carolina", 80.0, 60.0),
                record("Duke", 78.0, 65.0),
                record("South Carolina", 65.0, 70.0),
            ],
            true,
        );
        let server = RatingServer::new(RatingServerConfig::default(), state.clone());
        (server.create_router(), state)
    }

    async fn get_json(app: Router, uri: &str) -> (StatusCode, serde_json::Value) {
        let response = app
            .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
            .await
            .unwrap();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    #[tokio::test]
    async fn test_root_endpoint() {
        let (app, _) = test_router();
        let (status, body) = get_json(app, "/").await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["service"], "scorecast");
    }

    #[tokio::test]
    async fn test_rankings_endpoint() {
        let (app, _) = test_router();
        let (status, body) = get_json(app, "/rankings").await;

        assert_eq!(status, StatusCode::OK);
        let rows = body.as_array().unwrap();
        assert_eq!(rows.len(), 3);
        assert_eq!(rows[0]["name"], "North Carolina");
        assert_eq!(rows[2]["sd_against"], 10.0);
    }

    #[tokio::test]
    async fn test_search_endpoint() {
        let (app, state) = test_router();
        let (status, body) = get_json(app, "/search?name=CAROLINA").await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, serde_json::json!(["North Carolina", "South Carolina"]));
        assert_eq!(state.metrics.query().search_queries_total.get(), 1);
    }

    #[tokio::test]
    async fn test_search_respects_limit() {
        let (app, _) = test_router();
        let (_, body) = get_json(app, "/search?name=").await;
        assert_eq!(body.as_array().unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_search_bad_requests() {
        let (app, _) = test_router();
        let (status, body) = get_json(app.clone(), "/search").await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(body["error"].as_str().unwrap().contains("name"));

        let (status, _) = get_json(app, "/search?name=%28").await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_matchup_endpoint() {
        let (app, state) = test_router();
        let (status, body) = get_json(app, "/matchup?home=Duke&away=North%20Carolina").await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["favorite"]["name"], "North Carolina");
        assert_eq!(body["underdog"]["name"], "Duke");
        assert_eq!(body["favorite_expected_score"], 72.5);
        assert_eq!(body["underdog_expected_score"], 69.0);
        let probability = body["favorite_win_probability"].as_f64().unwrap();
        assert!(probability > 0.5 && probability < 1.0);

        assert_eq!(state.metrics.query().matchup_predictions_total.get(), 1);
        assert_eq!(
            state
                .metrics
                .query()
                .http_requests_total
                .with_label_values(&["/matchup", "2xx"])
                .get(),
            1
        );
    }

    #[tokio::test]
    async fn test_matchup_unknown_team() {
        let (app, state) = test_router();
        let (status, body) = get_json(app, "/matchup?home=Duke&away=Gonzaga").await;

        assert_eq!(status, StatusCode::NOT_FOUND);
        assert!(body["error"].as_str().unwrap().contains("Gonzaga"));
        assert_eq!(state.metrics.query().unknown_team_total.get(), 1);
    }

    #[tokio::test]
    async fn test_matchup_missing_parameter() {
        let (app, _) = test_router();
        let (status, _) = get_json(app, "/matchup?home=Duke").await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_health_endpoints() {
        let (app, _) = test_router();

        let (status, body) = get_json(app.clone(), "/health").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "healthy");

        let response = app
            .clone()
            .oneshot(Request::builder().uri("/ready").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let (status, body) = get_json(app, "/stats").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["stats"]["teams_loaded"], 3);
    }

    #[tokio::test]
    async fn test_health_endpoints_when_stopped() {
        let state = test_state(vec![], false);
        let app = RatingServer::new(RatingServerConfig::default(), state).create_router();

        for uri in ["/health", "/ready", "/alive", "/stats"] {
            let response = app
                .clone()
                .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
                .await
                .unwrap();
            assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE, "{}", uri);
        }
    }

    #[tokio::test]
    async fn test_metrics_endpoint() {
        let (app, _) = test_router();
        let response = app
            .oneshot(
                Request::builder()
                    .uri("/metrics")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let content_type = response.headers().get("content-type").unwrap();
        assert!(content_type.to_str().unwrap().contains("text/plain"));
    }

    #[tokio::test]
    async fn test_static_index() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("index.html"), "<html>scorecast</html>").unwrap();
        std::fs::write(dir.path().join("scripts.js"), "// ui").unwrap();

        let config = RatingServerConfig {
            static_dir: Some(dir.path().to_path_buf()),
            ..Default::default()
        };
        let app = RatingServer::new(config, test_state(vec![], true)).create_router();

        let response = app
            .clone()
            .oneshot(Request::builder().uri("/").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        assert_eq!(&bytes[..], b"<html>scorecast</html>");

        let response = app
            .oneshot(
                Request::builder()
                    .uri("/static/scripts.js")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_404_handling() {
        let (app, _) = test_router();
        let response = app
            .oneshot(
                Request::builder()
                    .uri("/nonexistent")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_bind_reports_occupied_port() {
        let taken = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let config = RatingServerConfig {
            port: taken.local_addr().unwrap().port(),
            ..Default::default()
        };
        let server = RatingServer::new(config, test_state(vec![], true));

        let err = server.bind().await.unwrap_err();
        assert!(format!("{:#}", err).contains("Failed to bind"));
        assert!(server.start().await.is_err());
    }

    #[tokio::test]
    async fn test_serve_and_stop() {
        let (_, state) = test_router();
        let server = Arc::new(RatingServer::new(RatingServerConfig::default(), state));
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();

        let task = {
            let server = server.clone();
            tokio::spawn(async move { server.serve(listener).await })
        };

        tokio::time::sleep(std::time::Duration::from_millis(50)).await;
        server.stop();

        let result = tokio::time::timeout(std::time::Duration::from_secs(5), task)
            .await
            .expect("server did not stop")
            .unwrap();
        assert!(result.is_ok());
    }
}
