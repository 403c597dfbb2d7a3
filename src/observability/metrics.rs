// observability/metrics.rs - Prometheus Metrics

use metrics::{counter, describe_counter, describe_histogram, histogram};
use metrics_exporter_prometheus::{BuildError, Matcher, PrometheusBuilder, PrometheusHandle};
use std::time::Duration;

use crate::trust::{AssertionLevel, ValidityLevel};

/// Configuration for metrics
#[derive(Clone, Debug)]
pub struct MetricsConfig {
    /// Histogram buckets for validity computation time (in seconds)
    pub compute_buckets: Vec<f64>,

    /// Histogram buckets for fixed-point pass counts
    pub pass_buckets: Vec<f64>,

    /// Histogram buckets for number of paths per search
    pub path_buckets: Vec<f64>,
}

impl Default for MetricsConfig {
    fn default() -> Self {
        Self {
            compute_buckets: vec![
                0.00001, 0.00005, 0.0001, 0.0005, 0.001, 0.005, 0.01, 0.05, 0.1, 0.5, 1.0,
            ],
            pass_buckets: vec![1.0, 2.0, 3.0, 4.0, 6.0, 8.0, 12.0, 16.0, 32.0, 64.0],
            path_buckets: vec![0.0, 1.0, 2.0, 4.0, 8.0, 16.0, 64.0, 256.0, 1024.0],
        }
    }
}

/// Handle to the Prometheus recorder
#[derive(Clone)]
pub struct MetricsHandle {
    handle: PrometheusHandle,
}

impl MetricsHandle {
    /// Render metrics in Prometheus text format
    pub fn render(&self) -> String {
        self.handle.render()
    }
}

/// Store mutation metrics
pub struct StoreMetrics;

impl StoreMetrics {
    pub const ENTITIES_REGISTERED_TOTAL: &'static str = "wot_entities_registered_total";
    pub const ASSERTIONS_TOTAL: &'static str = "wot_assertions_total";
    pub const ASSERTIONS_REJECTED_TOTAL: &'static str = "wot_assertions_rejected_total";
}

/// Query metrics
pub struct QueryMetrics;

impl QueryMetrics {
    pub const TRUST_CHECKS_TOTAL: &'static str = "wot_trust_checks_total";
    pub const VALIDITY_PASSES: &'static str = "wot_validity_passes";
    pub const VALIDITY_COMPUTE_SECONDS: &'static str = "wot_validity_compute_seconds";
    pub const PATHS_FOUND: &'static str = "wot_paths_found";
    pub const PATH_SEARCHES_TRUNCATED_TOTAL: &'static str = "wot_path_searches_truncated_total";
}

/// Install the Prometheus recorder
///
/// Only one recorder can be installed per process. Nothing is served over
/// HTTP; callers render the handle wherever they need to.
pub fn init_metrics(config: MetricsConfig) -> Result<MetricsHandle, BuildError> {
    let handle = PrometheusBuilder::new()
        .set_buckets_for_metric(
            Matcher::Full(QueryMetrics::VALIDITY_COMPUTE_SECONDS.into()),
            &config.compute_buckets,
        )?
        .set_buckets_for_metric(
            Matcher::Full(QueryMetrics::VALIDITY_PASSES.into()),
            &config.pass_buckets,
        )?
        .set_buckets_for_metric(
            Matcher::Full(QueryMetrics::PATHS_FOUND.into()),
            &config.path_buckets,
        )?
        .install_recorder()?;

    describe_metrics();

    Ok(MetricsHandle { handle })
}

fn describe_metrics() {
    describe_counter!(
        StoreMetrics::ENTITIES_REGISTERED_TOTAL,
        "Entity registration attempts by result"
    );
    describe_counter!(StoreMetrics::ASSERTIONS_TOTAL, "Trust assertions stored, by level");
    describe_counter!(
        StoreMetrics::ASSERTIONS_REJECTED_TOTAL,
        "Trust assertions rejected, by reason"
    );
    describe_counter!(QueryMetrics::TRUST_CHECKS_TOTAL, "Trust checks, by resulting level");
    describe_histogram!(
        QueryMetrics::VALIDITY_PASSES,
        "Full passes needed to reach the validity fixed point"
    );
    describe_histogram!(
        QueryMetrics::VALIDITY_COMPUTE_SECONDS,
        "Time spent computing a validity map"
    );
    describe_histogram!(QueryMetrics::PATHS_FOUND, "Paths returned per path search");
    describe_counter!(
        QueryMetrics::PATH_SEARCHES_TRUNCATED_TOTAL,
        "Path searches cut short by limits"
    );
}

// Convenience functions for recording metrics

pub fn record_entity_registered(accepted: bool) {
    let result = if accepted { "accepted" } else { "duplicate" };
    counter!(StoreMetrics::ENTITIES_REGISTERED_TOTAL, "result" => result).increment(1);
}

pub fn record_assertion(level: AssertionLevel) {
    counter!(StoreMetrics::ASSERTIONS_TOTAL, "level" => level.as_str()).increment(1);
}

pub fn record_assertion_rejected(reason: &'static str) {
    counter!(StoreMetrics::ASSERTIONS_REJECTED_TOTAL, "reason" => reason).increment(1);
}

pub fn record_trust_check(level: ValidityLevel) {
    counter!(QueryMetrics::TRUST_CHECKS_TOTAL, "level" => level.as_str()).increment(1);
}

pub fn record_validity_computation(passes: usize, elapsed: Duration) {
    histogram!(QueryMetrics::VALIDITY_PASSES).record(passes as f64);
    histogram!(QueryMetrics::VALIDITY_COMPUTE_SECONDS).record(elapsed.as_secs_f64());
}

pub fn record_paths_found(edge_type: AssertionLevel, count: usize, truncated: bool) {
    histogram!(QueryMetrics::PATHS_FOUND, "edge_type" => edge_type.as_str()).record(count as f64);
    if truncated {
        counter!(QueryMetrics::PATH_SEARCHES_TRUNCATED_TOTAL).increment(1);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_metrics_config_default() {
        let config = MetricsConfig::default();
        assert!(!config.compute_buckets.is_empty());
        assert!(config.pass_buckets.windows(2).all(|w| w[0] < w[1]));
        assert!(config.path_buckets.windows(2).all(|w| w[0] < w[1]));
    }

    #[test]
    fn test_recording_without_recorder_is_noop() {
        record_entity_registered(true);
        record_assertion(AssertionLevel::Partial);
        record_assertion_rejected("self_assertion");
        record_trust_check(ValidityLevel::Marginal);
        record_validity_computation(3, Duration::from_micros(20));
        record_paths_found(AssertionLevel::Complete, 2, true);
    }
}
