// lib.rs - Web of Trust Validity Engine
//
// Viewer-relative trust computation over a graph of complete and partial
// assertions, with path explanations for every verdict.

#![doc = include_str!("../README.md")]

pub mod config;
pub mod observability;
pub mod trust;

// Re-export commonly used types
pub use trust::{
    AssertionLevel, AssertionOutcome, EntityName, PathLimits, Scenario, ScenarioReport,
    TrustAssertionStore, TrustConfig, TrustError, TrustPath, TrustVerdict, ValidityLevel,
    ValidityMap, WebOfTrust,
};

pub use config::{ConfigError, WotConfig};

pub use observability::{
    init_metrics, init_tracing, MetricsConfig, MetricsHandle, TracingConfig, TracingFormat,
};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::trust::{
        AssertionLevel, EntityName, PathExplainer, PathLimits, TrustAssertionStore,
        TrustQueryFacade, TrustVerdict, ValidityEngine, ValidityLevel, ValidityMap, WebOfTrust,
    };
}
