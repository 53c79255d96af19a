//! Metrics for the scorecast service
//!
//! Prometheus counters, gauges and histograms covering inference runs and
//! the query surface.

pub mod collector;

pub use collector::{
    InferenceMetrics, MetricsCollector, MetricsTimer, QueryMetrics, ServiceMetrics,
};
