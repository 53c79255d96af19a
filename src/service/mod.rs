//! Service layer for scorecast
//!
//! The batch compute pipeline, and the serve-mode application state with its
//! health checks.

pub mod app;
pub mod compute;
pub mod health;

pub use app::{AppState, ServiceError};
pub use compute::{run_compute, ComputeOutcome};
pub use health::{HealthCheck, HealthStatus};
