//! Prometheus metrics for the refollow relay
//!
//! Exposed as text on `GET /metrics`.

use lazy_static::lazy_static;
use prometheus::{register_counter_vec, CounterVec, Encoder, TextEncoder};

lazy_static! {
    /// Counter: cache operations (hit/miss)
    pub static ref CACHE_OPERATIONS: CounterVec = register_counter_vec!(
        "refollow_cache_operations_total",
        "Cache operations by type",
        &["operation"]
    )
    .expect("Failed to create cache_operations metric");

    /// Counter: upstream requests by endpoint
    pub static ref UPSTREAM_CALLS: CounterVec = register_counter_vec!(
        "refollow_upstream_calls_total",
        "Requests issued to the upstream provider",
        &["endpoint"]
    )
    .expect("Failed to create upstream_calls metric");

    /// Counter: upstream failures by endpoint
    pub static ref UPSTREAM_ERRORS: CounterVec = register_counter_vec!(
        "refollow_upstream_errors_total",
        "Failed upstream requests",
        &["endpoint"]
    )
    .expect("Failed to create upstream_errors metric");

    /// Counter: refollow requests by outcome
    pub static ref REQUESTS: CounterVec = register_counter_vec!(
        "refollow_requests_total",
        "Refollow requests by outcome",
        &["outcome"]
    )
    .expect("Failed to create requests metric");
}

/// Record cache hit
pub fn record_cache_hit() {
    CACHE_OPERATIONS.with_label_values(&["hit"]).inc();
}

/// Record cache miss
pub fn record_cache_miss() {
    CACHE_OPERATIONS.with_label_values(&["miss"]).inc();
}

pub fn record_upstream_call(endpoint: &str) {
    UPSTREAM_CALLS.with_label_values(&[endpoint]).inc();
}

pub fn record_upstream_error(endpoint: &str) {
    UPSTREAM_ERRORS.with_label_values(&[endpoint]).inc();
}

/// Record a finished request (`ok`, `invalid`, `denied`, `error`)
pub fn record_request(outcome: &str) {
    REQUESTS.with_label_values(&[outcome]).inc();
}

/// Encode all metrics as Prometheus text format
pub fn encode_metrics() -> crate::Result<String> {
    let encoder = TextEncoder::new();
    let metric_families = prometheus::gather();
    let mut buffer = Vec::new();
    encoder
        .encode(&metric_families, &mut buffer)
        .map_err(|e| crate::RefollowError::Other(format!("Failed to encode metrics: {}", e)))?;
    String::from_utf8(buffer)
        .map_err(|e| crate::RefollowError::Other(format!("Metrics are not UTF-8: {}", e)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_metrics_creation() {
        record_cache_hit();
        record_cache_miss();
        record_upstream_call("/v2/farcaster/followers");
        record_upstream_error("/v2/farcaster/followers");
        record_request("ok");
    }

    #[test]
    fn test_encode_metrics() {
        record_cache_miss();
        let output = encode_metrics().unwrap();
        assert!(output.contains("refollow_cache_operations_total"));
    }
}
