// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Prometheus metrics for the Spark cluster service.
//!
//! All metrics use the namespace prefix `spark_clusters_` and are registered in
//! [`METRICS_REGISTRY`], which the REST server exposes on `/metrics`.
//!
//! # Metrics Categories
//!
//! - **Operation Metrics** - Count and time create/delete/find/list/update calls
//! - **Workflow Metrics** - Rollbacks, teardown sub-step failures, waits that gave up
//!
//! # Example
//!
//! ```rust,no_run
//! use spark_clusters::metrics::record_operation;
//!
//! record_operation("create", "success", std::time::Duration::from_millis(420));
//! ```

use prometheus::{
    CounterVec, Encoder, HistogramOpts, HistogramVec, IntCounter, Opts, Registry, TextEncoder,
};
use std::sync::LazyLock;
use std::time::Duration;

// ============================================================================
// Metric Name Constants
// ============================================================================

/// Namespace prefix for all metrics (prometheus-safe)
const METRICS_NAMESPACE: &str = "spark_clusters";

/// Outcome label for operations that succeeded
pub const OUTCOME_SUCCESS: &str = "success";

/// Outcome label for operations that failed
pub const OUTCOME_ERROR: &str = "error";

// ============================================================================
// Global Metrics Registry
// ============================================================================

/// Global Prometheus metrics registry
///
/// All metrics are registered in this registry and exposed via `/metrics` endpoint.
pub static METRICS_REGISTRY: LazyLock<Registry> = LazyLock::new(Registry::new);

// ============================================================================
// Operation Metrics
// ============================================================================

/// Total number of cluster operations by operation and outcome
///
/// Labels:
/// - `operation`: `create`, `delete`, `find`, `list`, `update`
/// - `outcome`: `success` or `error`
pub static OPERATIONS_TOTAL: LazyLock<CounterVec> = LazyLock::new(|| {
    let opts = Opts::new(
        format!("{METRICS_NAMESPACE}_operations_total"),
        "Total number of cluster operations by operation and outcome",
    );
    let counter = CounterVec::new(opts, &["operation", "outcome"]).unwrap();
    METRICS_REGISTRY
        .register(Box::new(counter.clone()))
        .unwrap();
    counter
});

/// Duration of cluster operations in seconds
pub static OPERATION_DURATION_SECONDS: LazyLock<HistogramVec> = LazyLock::new(|| {
    let opts = HistogramOpts::new(
        format!("{METRICS_NAMESPACE}_operation_duration_seconds"),
        "Duration of cluster operations in seconds by operation",
    )
    .buckets(vec![0.01, 0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0, 10.0, 30.0]);
    let histogram = HistogramVec::new(opts, &["operation"]).unwrap();
    METRICS_REGISTRY
        .register(Box::new(histogram.clone()))
        .unwrap();
    histogram
});

// ============================================================================
// Workflow Metrics
// ============================================================================

/// Provisioning attempts that were rolled back
pub static ROLLBACKS_TOTAL: LazyLock<IntCounter> = LazyLock::new(|| {
    let counter = IntCounter::new(
        format!("{METRICS_NAMESPACE}_rollbacks_total"),
        "Total number of provisioning rollbacks",
    )
    .unwrap();
    METRICS_REGISTRY
        .register(Box::new(counter.clone()))
        .unwrap();
    counter
});

/// Teardown sub-step failures by resource kind
pub static TEARDOWN_FAILURES_TOTAL: LazyLock<CounterVec> = LazyLock::new(|| {
    let opts = Opts::new(
        format!("{METRICS_NAMESPACE}_teardown_failures_total"),
        "Total number of non-fatal teardown failures by resource kind",
    );
    let counter = CounterVec::new(opts, &["kind"]).unwrap();
    METRICS_REGISTRY
        .register(Box::new(counter.clone()))
        .unwrap();
    counter
});

/// Bounded waits that ended without observing their condition
pub static WAIT_GIVE_UPS_TOTAL: LazyLock<CounterVec> = LazyLock::new(|| {
    let opts = Opts::new(
        format!("{METRICS_NAMESPACE}_wait_give_ups_total"),
        "Total number of bounded waits that gave up",
    );
    let counter = CounterVec::new(opts, &["wait"]).unwrap();
    METRICS_REGISTRY
        .register(Box::new(counter.clone()))
        .unwrap();
    counter
});

// ============================================================================
// Helper Functions
// ============================================================================

/// Record the outcome and duration of a workflow call
pub fn record_operation(operation: &str, outcome: &str, duration: Duration) {
    OPERATIONS_TOTAL
        .with_label_values(&[operation, outcome])
        .inc();
    OPERATION_DURATION_SECONDS
        .with_label_values(&[operation])
        .observe(duration.as_secs_f64());
}

/// Record a provisioning rollback
pub fn record_rollback() {
    ROLLBACKS_TOTAL.inc();
}

/// Record a failed teardown step for a resource kind
pub fn record_teardown_failure(kind: &str) {
    TEARDOWN_FAILURES_TOTAL.with_label_values(&[kind]).inc();
}

/// Record a bounded wait that gave up
pub fn record_wait_give_up(wait: &str) {
    WAIT_GIVE_UPS_TOTAL.with_label_values(&[wait]).inc();
}

/// Encode every registered metric in the Prometheus text format.
///
/// # Errors
///
/// Returns an error if encoding fails.
pub fn gather_metrics() -> Result<String, prometheus::Error> {
    let encoder = TextEncoder::new();
    let metric_families = METRICS_REGISTRY.gather();
    let mut buffer = Vec::new();
    encoder.encode(&metric_families, &mut buffer)?;
    String::from_utf8(buffer).map_err(|e| prometheus::Error::Msg(format!("UTF-8 error: {e}")))
}
