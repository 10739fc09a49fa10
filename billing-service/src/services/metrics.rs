//! Metrics module for billing-service.
//! Provides Prometheus metrics for bill operations and reconciliation runs.

use once_cell::sync::Lazy;
use prometheus::{
    Encoder, HistogramVec, IntCounterVec, TextEncoder, histogram_opts, opts,
    register_histogram_vec, register_int_counter_vec,
};
use std::sync::OnceLock;

/// Database query duration histogram
pub static DB_QUERY_DURATION: Lazy<HistogramVec> = Lazy::new(|| {
    register_histogram_vec!(
        histogram_opts!(
            "billing_db_query_duration_seconds",
            "Database query duration"
        ),
        &["operation"]
    )
    .expect("Failed to register DB_QUERY_DURATION")
});

/// Bill operations counter
pub static BILL_OPERATIONS_TOTAL: OnceLock<IntCounterVec> = OnceLock::new();

/// Reconciliation runs counter
pub static RECONCILIATION_RUNS_TOTAL: OnceLock<IntCounterVec> = OnceLock::new();

/// Penalty recomputations counter
pub static PENALTY_UPDATES_TOTAL: OnceLock<IntCounterVec> = OnceLock::new();

/// Initialize all metrics. Call once at startup.
pub fn init_metrics() {
    BILL_OPERATIONS_TOTAL.get_or_init(|| {
        register_int_counter_vec!(
            opts!(
                "billing_bill_operations_total",
                "Total bill operations by kind and operation"
            ),
            &["kind", "operation"]
        )
        .expect("Failed to register BILL_OPERATIONS_TOTAL")
    });

    RECONCILIATION_RUNS_TOTAL.get_or_init(|| {
        register_int_counter_vec!(
            opts!(
                "billing_reconciliation_runs_total",
                "Total reconciliation runs by trigger and status"
            ),
            &["trigger", "status"]
        )
        .expect("Failed to register RECONCILIATION_RUNS_TOTAL")
    });

    PENALTY_UPDATES_TOTAL.get_or_init(|| {
        register_int_counter_vec!(
            opts!(
                "billing_penalty_updates_total",
                "Total per-bill penalty recomputations by outcome"
            ),
            &["outcome"]
        )
        .expect("Failed to register PENALTY_UPDATES_TOTAL")
    });
}

pub fn record_bill_operation(kind: &str, operation: &str) {
    if let Some(counter) = BILL_OPERATIONS_TOTAL.get() {
        counter.with_label_values(&[kind, operation]).inc();
    }
}

pub fn record_reconciliation_run(trigger: &str, status: &str) {
    if let Some(counter) = RECONCILIATION_RUNS_TOTAL.get() {
        counter.with_label_values(&[trigger, status]).inc();
    }
}

pub fn record_penalty_update(outcome: &str) {
    if let Some(counter) = PENALTY_UPDATES_TOTAL.get() {
        counter.with_label_values(&[outcome]).inc();
    }
}

/// Render the default registry in Prometheus text format.
pub fn get_metrics() -> String {
    let encoder = TextEncoder::new();
    let metric_families = prometheus::gather();
    let mut buffer = Vec::new();
    if let Err(e) = encoder.encode(&metric_families, &mut buffer) {
        tracing::error!(error = %e, "Failed to encode metrics");
        return String::new();
    }
    String::from_utf8(buffer).unwrap_or_default()
}
