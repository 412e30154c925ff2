//! # Metrics Collection Module
//!
//! Prometheus export and a JSON stats view of the planner.
//!
//! ## Endpoints
//! - `GET /metrics` - Prometheus text format metrics
//! - `GET /v1/stats` - JSON format statistics
//!
//! ## Metrics Tracked
//!
//! **Counters:**
//! - `roadsage_planner_runs_total{node}` - Planning invocations per node
//! - `roadsage_reroutes_total{stage}` - Route replacements per stage
//!
//! **Histograms:**
//! - `roadsage_reconcile_duration_seconds` - Real-time reconciliation time
//!
//! **Gauges:**
//! - `roadsage_routes_total` - Candidate routes in the catalog
//! - `roadsage_sessions_active` - Running planning sessions

pub mod handler;
pub mod types;

pub use types::*;

pub use metrics_exporter_prometheus::PrometheusBuilder;

use crate::catalog::RouteCatalog;
use crate::session::SessionManager;
use std::sync::Arc;
use std::time::Instant;

/// Central coordinator for gauges and rendering.
pub struct MetricsCollector {
    catalog: RouteCatalog,
    sessions: Arc<SessionManager>,
    start_time: Instant,
    prometheus_handle: metrics_exporter_prometheus::PrometheusHandle,
}

impl MetricsCollector {
    pub fn new(
        catalog: RouteCatalog,
        sessions: Arc<SessionManager>,
        start_time: Instant,
        prometheus_handle: metrics_exporter_prometheus::PrometheusHandle,
    ) -> Self {
        Self {
            catalog,
            sessions,
            start_time,
            prometheus_handle,
        }
    }

    /// Refresh gauges derived from the catalog and session table.
    pub fn update_gauges(&self) {
        metrics::gauge!("roadsage_routes_total").set(self.catalog.len() as f64);
        metrics::gauge!("roadsage_sessions_active").set(self.sessions.len() as f64);
    }

    pub fn uptime_seconds(&self) -> u64 {
        self.start_time.elapsed().as_secs()
    }

    pub fn catalog(&self) -> &RouteCatalog {
        &self.catalog
    }

    pub fn sessions(&self) -> &Arc<SessionManager> {
        &self.sessions
    }

    /// Render Prometheus metrics in text format.
    pub fn render_metrics(&self) -> String {
        self.prometheus_handle.render()
    }
}

/// Install the global Prometheus recorder.
///
/// Reconciliation normally finishes in well under a second, so the
/// duration buckets are in the millisecond range.
pub fn setup_metrics(
) -> Result<metrics_exporter_prometheus::PrometheusHandle, Box<dyn std::error::Error>> {
    use metrics_exporter_prometheus::{Matcher, PrometheusBuilder};

    let duration_buckets = &[
        0.0005, 0.001, 0.0025, 0.005, 0.01, 0.025, 0.05, 0.1, 0.25, 0.5, 1.0,
    ];

    let handle = PrometheusBuilder::new()
        .set_buckets_for_metric(
            Matcher::Full("roadsage_reconcile_duration_seconds".to_string()),
            duration_buckets,
        )?
        .install_recorder()?;

    Ok(handle)
}

/// A handle for a recorder that is not installed globally.
///
/// Used when a global recorder already exists, e.g. several routers in one
/// test binary.
pub fn detached_handle() -> metrics_exporter_prometheus::PrometheusHandle {
    PrometheusBuilder::new().build_recorder().handle()
}
