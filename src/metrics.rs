//! Prometheus metrics registry and instruments.
//!
//! This module is framework-agnostic and can be used from any layer.

use lazy_static::lazy_static;
use prometheus::{HistogramOpts, IntCounter, IntCounterVec, IntGauge, Opts, Registry};
use std::sync::Once;

lazy_static! {
    /// Global Prometheus registry
    pub static ref REGISTRY: Registry = Registry::new();

    // Database Metrics
    pub static ref DB_QUERIES_TOTAL: IntCounterVec = IntCounterVec::new(
        Opts::new("followgraph_db_queries_total", "Total number of database queries"),
        &["operation"]
    ).expect("metric can be created");
    pub static ref DB_QUERY_DURATION_SECONDS: prometheus::HistogramVec = prometheus::HistogramVec::new(
        HistogramOpts::new(
            "followgraph_db_query_duration_seconds",
            "Database query duration in seconds"
        ).buckets(vec![0.0001, 0.0005, 0.001, 0.005, 0.01, 0.05, 0.1, 0.5, 1.0]),
        &["operation"]
    ).expect("metric can be created");
    pub static ref CLIENT_STORES_OPEN: IntGauge = IntGauge::new(
        "followgraph_client_stores_open",
        "Number of client stores currently held open"
    ).expect("metric can be created");

    // Record Metrics
    pub static ref RECORDS_INSERTED_TOTAL: IntCounter = IntCounter::new(
        "followgraph_records_inserted_total",
        "Total number of account records inserted"
    ).expect("metric can be created");
    pub static ref RECORDS_DELETED_TOTAL: IntCounterVec = IntCounterVec::new(
        Opts::new("followgraph_records_deleted_total", "Total number of account records deleted"),
        &["by"]
    ).expect("metric can be created");

    // Analysis Metrics
    pub static ref ANALYSES_TOTAL: IntCounterVec = IntCounterVec::new(
        Opts::new("followgraph_analyses_total", "Total number of graph analyses"),
        &["relation", "mode", "layout"]
    ).expect("metric can be created");
    pub static ref ANALYSIS_DURATION_SECONDS: prometheus::Histogram = prometheus::Histogram::with_opts(
        HistogramOpts::new(
            "followgraph_analysis_duration_seconds",
            "Time spent building, ranking and rendering a graph"
        ).buckets(vec![0.001, 0.005, 0.01, 0.05, 0.1, 0.5, 1.0, 5.0, 10.0])
    ).expect("metric can be created");

    // Error Metrics
    pub static ref ERRORS_TOTAL: IntCounterVec = IntCounterVec::new(
        Opts::new("followgraph_errors_total", "Total number of errors"),
        &["error_type"]
    ).expect("metric can be created");
}

static INIT: Once = Once::new();

/// Initialize metrics registry.
///
/// Safe to call more than once; only the first call registers.
pub fn init_metrics() {
    INIT.call_once(|| {
        REGISTRY
            .register(Box::new(DB_QUERIES_TOTAL.clone()))
            .expect("DB_QUERIES_TOTAL can be registered");
        REGISTRY
            .register(Box::new(DB_QUERY_DURATION_SECONDS.clone()))
            .expect("DB_QUERY_DURATION_SECONDS can be registered");
        REGISTRY
            .register(Box::new(CLIENT_STORES_OPEN.clone()))
            .expect("CLIENT_STORES_OPEN can be registered");
        REGISTRY
            .register(Box::new(RECORDS_INSERTED_TOTAL.clone()))
            .expect("RECORDS_INSERTED_TOTAL can be registered");
        REGISTRY
            .register(Box::new(RECORDS_DELETED_TOTAL.clone()))
            .expect("RECORDS_DELETED_TOTAL can be registered");
        REGISTRY
            .register(Box::new(ANALYSES_TOTAL.clone()))
            .expect("ANALYSES_TOTAL can be registered");
        REGISTRY
            .register(Box::new(ANALYSIS_DURATION_SECONDS.clone()))
            .expect("ANALYSIS_DURATION_SECONDS can be registered");
        REGISTRY
            .register(Box::new(ERRORS_TOTAL.clone()))
            .expect("ERRORS_TOTAL can be registered");

        tracing::info!("Metrics registry initialized");
    });
}

/// Record one database operation.
pub fn observe_db_query(operation: &str, elapsed: std::time::Duration) {
    DB_QUERIES_TOTAL.with_label_values(&[operation]).inc();
    DB_QUERY_DURATION_SECONDS
        .with_label_values(&[operation])
        .observe(elapsed.as_secs_f64());
}
