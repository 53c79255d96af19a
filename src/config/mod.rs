//! Configuration management for the scorecast service
//!
//! This module handles configuration loading from TOML files and environment
//! variables, validation, and default values.

pub mod app;
pub mod ingestion;
pub mod rating;

// Re-export commonly used types
pub use app::{validate_config, AppConfig, QuerySettings, ServiceSettings};
pub use ingestion::IngestionConfig;
pub use rating::Hyperparameters;
