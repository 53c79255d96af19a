//! Main application configuration
//!
//! This module defines the primary configuration structures for the scorecast
//! service, including environment variable and TOML file loading and validation.

use crate::config::{Hyperparameters, IngestionConfig};
use anyhow::{anyhow, Context, Result};
use serde::{Deserialize, Serialize};
use std::env;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::time::Duration;

/// Main application configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub service: ServiceSettings,
    pub inference: Hyperparameters,
    pub ingestion: IngestionConfig,
    pub query: QuerySettings,
}

/// Service-level settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServiceSettings {
    /// Service name for logging and health reports
    pub name: String,
    /// Log level (trace, debug, info, warn, error)
    pub log_level: String,
    /// Host the query server binds to
    pub http_host: String,
    /// Port the query server binds to
    pub http_port: u16,
    /// Graceful shutdown timeout in seconds
    pub shutdown_timeout_seconds: u64,
}

/// Query surface settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct QuerySettings {
    /// Persisted posterior table loaded in serve mode
    pub rankings_path: PathBuf,
    /// Maximum number of names returned by a search
    pub search_limit: usize,
    /// Directory holding `index.html` and UI assets
    pub static_dir: Option<PathBuf>,
}

impl Default for ServiceSettings {
    fn default() -> Self {
        Self {
            name: "scorecast".to_string(),
            log_level: "info".to_string(),
            http_host: "127.0.0.1".to_string(),
            http_port: 4000,
            shutdown_timeout_seconds: 30,
        }
    }
}

impl Default for QuerySettings {
    fn default() -> Self {
        Self {
            rankings_path: PathBuf::from("rankings.csv"),
            search_limit: 10,
            static_dir: None,
        }
    }
}

/// Parse an environment variable into `target` when it is set
fn override_from_env<T: FromStr>(name: &str, target: &mut T) -> Result<()> {
    if let Ok(raw) = env::var(name) {
        *target = raw
            .parse()
            .map_err(|_| anyhow!("Invalid {} value: {}", name, raw))?;
    }
    Ok(())
}

impl AppConfig {
    /// Load configuration from environment variables with fallback to defaults
    pub fn from_env() -> Result<Self> {
        let mut config = Self::default();
        config.apply_env()?;
        validate_config(&config)?;
        Ok(config)
    }

    /// Load configuration from a TOML file; environment variables still override it
    pub fn from_file(path: &Path) -> Result<Self> {
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;
        let mut config: AppConfig = toml::from_str(&raw)
            .with_context(|| format!("Failed to parse config file {}", path.display()))?;
        config.apply_env()?;
        validate_config(&config)?;
        Ok(config)
    }

    fn apply_env(&mut self) -> Result<()> {
        // Service settings
        override_from_env("SERVICE_NAME", &mut self.service.name)?;
        override_from_env("LOG_LEVEL", &mut self.service.log_level)?;
        override_from_env("HTTP_HOST", &mut self.service.http_host)?;
        override_from_env("HTTP_PORT", &mut self.service.http_port)?;
        override_from_env(
            "SHUTDOWN_TIMEOUT_SECONDS",
            &mut self.service.shutdown_timeout_seconds,
        )?;

        // Inference hyperparameters
        override_from_env("PRIOR_MEAN", &mut self.inference.mu)?;
        override_from_env("PRIOR_PRECISION", &mut self.inference.tau)?;
        override_from_env("PRECISION_SHAPE", &mut self.inference.alpha)?;
        override_from_env("PRECISION_RATE", &mut self.inference.beta)?;
        override_from_env("ITERATIONS", &mut self.inference.iterations)?;

        // Query settings
        override_from_env("RANKINGS_PATH", &mut self.query.rankings_path)?;
        override_from_env("SEARCH_LIMIT", &mut self.query.search_limit)?;
        if let Ok(dir) = env::var("STATIC_DIR") {
            self.query.static_dir = Some(PathBuf::from(dir));
        }

        Ok(())
    }

    /// Get shutdown timeout as Duration
    pub fn shutdown_timeout(&self) -> Duration {
        Duration::from_secs(self.service.shutdown_timeout_seconds)
    }

    /// Address the query server binds to
    pub fn http_addr(&self) -> String {
        format!("{}:{}", self.service.http_host, self.service.http_port)
    }
}

/// Validate configuration values
pub fn validate_config(config: &AppConfig) -> Result<()> {
    // Validate log level
    match config.service.log_level.to_lowercase().as_str() {
        "trace" | "debug" | "info" | "warn" | "error" => {}
        _ => return Err(anyhow!("Invalid log level: {}", config.service.log_level)),
    }

    if config.service.http_port == 0 {
        return Err(anyhow!("HTTP port cannot be 0"));
    }
    if config.service.shutdown_timeout_seconds == 0 {
        return Err(anyhow!("Shutdown timeout must be greater than 0"));
    }

    config.inference.validate()?;

    let columns = [
        &config.ingestion.team_column,
        &config.ingestion.opponent_column,
        &config.ingestion.team_score_column,
        &config.ingestion.opponent_score_column,
    ];
    if columns.iter().any(|c| c.is_empty()) {
        return Err(anyhow!("Ingestion column names cannot be empty"));
    }

    if config.query.search_limit == 0 {
        return Err(anyhow!("Search limit must be greater than 0"));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        let config = AppConfig::default();
        assert!(validate_config(&config).is_ok());
        assert_eq!(config.http_addr(), "127.0.0.1:4000");
        assert_eq!(config.query.search_limit, 10);
        assert_eq!(config.shutdown_timeout(), Duration::from_secs(30));
    }

    #[test]
    fn test_invalid_log_level() {
        let mut config = AppConfig::default();
        config.service.log_level = "verbose".to_string();
        assert!(validate_config(&config).is_err());
    }

    #[test]
    fn test_invalid_hyperparameters_rejected() {
        let mut config = AppConfig::default();
        config.inference.tau = 0.0;
        assert!(validate_config(&config).is_err());
    }

    #[test]
    fn test_partial_toml() {
        let raw = r#"
            [service]
            http_port = 8080

            [inference]
            iterations = 50
            mu = 65.0

            [ingestion]
            skip_mirrored_rows = true
        "#;

        let config: AppConfig = toml::from_str(raw).unwrap();
        assert_eq!(config.service.http_port, 8080);
        assert_eq!(config.service.name, "scorecast");
        assert_eq!(config.inference.iterations, 50);
        assert_eq!(config.inference.mu, 65.0);
        assert_eq!(config.inference.tau, 0.1);
        assert!(config.ingestion.skip_mirrored_rows);
        assert_eq!(config.ingestion.team_column, "Team");
        assert!(validate_config(&config).is_ok());
    }

    #[test]
    fn test_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("scorecast.toml");
        std::fs::write(&path, "[query]\nsearch_limit = 5\n").unwrap();

        let config = AppConfig::from_file(&path).unwrap();
        assert_eq!(config.query.search_limit, 5);
    }

    #[test]
    fn test_from_missing_file() {
        let result = AppConfig::from_file(Path::new("/nonexistent/scorecast.toml"));
        assert!(result.is_err());
    }
}
