//! API layer
//!
//! HTTP handlers for:
//! - Record management and analysis pages
//! - Rendered network artifacts
//! - Metrics (Prometheus)

mod client;
pub mod metrics;
mod pages;
mod templates;

pub use client::ClientStore;
pub use metrics::metrics_router;
pub use pages::pages_router;
