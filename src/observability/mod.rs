// observability/mod.rs - Tracing and Metrics

//! Observability module providing structured logging and Prometheus metrics.
//!
//! # Features
//!
//! - **Tracing**: Structured logging through `tracing-subscriber`
//! - **Metrics**: Prometheus-compatible counters and histograms for store
//!   mutations, validity computations and path searches
//!
//! # Example
//!
//! ```ignore
//! use wot_engine::observability::{init_metrics, init_tracing, MetricsConfig, TracingConfig};
//!
//! init_tracing(TracingConfig::default())?;
//! let handle = init_metrics(MetricsConfig::default())?;
//! println!("{}", handle.render());
//! ```

mod metrics;
mod tracing_setup;

pub use metrics::{
    init_metrics, record_assertion, record_assertion_rejected, record_entity_registered,
    record_paths_found, record_trust_check, record_validity_computation, MetricsConfig,
    MetricsHandle, QueryMetrics, StoreMetrics,
};

pub use tracing_setup::{init_tracing, TracingConfig, TracingFormat};
