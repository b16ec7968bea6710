//! Prometheus metrics for indexer adapters.
//!
//! This module provides metrics for:
//! - Indexer requests (search, download) by outcome and duration
//! - Logins and re-authentications
//! - Response parse errors

use once_cell::sync::Lazy;
use prometheus::{HistogramOpts, HistogramVec, IntCounterVec, Opts};

// =============================================================================
// Requests
// =============================================================================

/// Indexer requests by indexer, operation and outcome.
pub static INDEXER_REQUESTS: Lazy<IntCounterVec> = Lazy::new(|| {
    IntCounterVec::new(
        Opts::new("trackerhub_indexer_requests_total", "Total indexer requests"),
        &["indexer", "operation", "outcome"], // outcome: "success", "auth_error", "transport_error", "exhausted_retry"
    )
    .unwrap()
});

/// Indexer request duration in seconds, including re-authentication.
pub static INDEXER_REQUEST_DURATION: Lazy<HistogramVec> = Lazy::new(|| {
    HistogramVec::new(
        HistogramOpts::new(
            "trackerhub_indexer_request_duration_seconds",
            "Duration of indexer operations",
        )
        .buckets(vec![0.1, 0.25, 0.5, 1.0, 2.5, 5.0, 10.0, 30.0, 60.0]),
        &["indexer", "operation"],
    )
    .unwrap()
});

// =============================================================================
// Authentication
// =============================================================================

/// Login attempts by result.
pub static INDEXER_LOGINS: Lazy<IntCounterVec> = Lazy::new(|| {
    IntCounterVec::new(
        Opts::new("trackerhub_indexer_logins_total", "Total indexer logins"),
        &["indexer", "result"], // "success", "rejected", "failed"
    )
    .unwrap()
});

/// Re-authentications triggered by a rejected token.
pub static INDEXER_REAUTHENTICATIONS: Lazy<IntCounterVec> = Lazy::new(|| {
    IntCounterVec::new(
        Opts::new(
            "trackerhub_indexer_reauthentications_total",
            "Re-authentications after a 401 response",
        ),
        &["indexer"],
    )
    .unwrap()
});

// =============================================================================
// Parsing
// =============================================================================

/// Parse errors by scope.
pub static PARSE_ERRORS: Lazy<IntCounterVec> = Lazy::new(|| {
    IntCounterVec::new(
        Opts::new(
            "trackerhub_parse_errors_total",
            "Malformed indexer responses or rows",
        ),
        &["indexer", "scope"], // "batch", "row"
    )
    .unwrap()
});

/// Releases returned by successful searches.
pub static SEARCH_RELEASES: Lazy<HistogramVec> = Lazy::new(|| {
    HistogramVec::new(
        HistogramOpts::new(
            "trackerhub_search_releases",
            "Number of releases returned per search",
        )
        .buckets(vec![0.0, 1.0, 5.0, 10.0, 25.0, 50.0, 100.0]),
        &["indexer"],
    )
    .unwrap()
});

/// All collectors, for registration in a registry.
pub fn all_metrics() -> Vec<Box<dyn prometheus::core::Collector>> {
    vec![
        Box::new(INDEXER_REQUESTS.clone()),
        Box::new(INDEXER_REQUEST_DURATION.clone()),
        Box::new(INDEXER_LOGINS.clone()),
        Box::new(INDEXER_REAUTHENTICATIONS.clone()),
        Box::new(PARSE_ERRORS.clone()),
        Box::new(SEARCH_RELEASES.clone()),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use prometheus::Registry;

    #[test]
    fn test_all_metrics_register() {
        let registry = Registry::new();
        for metric in all_metrics() {
            registry.register(metric).unwrap();
        }

        INDEXER_LOGINS
            .with_label_values(&["metrics-test", "success"])
            .inc();

        let families = registry.gather();
        assert!(families
            .iter()
            .any(|f| f.get_name() == "trackerhub_indexer_logins_total"));
    }
}
