//! Prometheus metrics export.
//!
//! Search code records through the `metrics` facade macros; this module owns the
//! recorder and renders the exposition text for `GET /metrics`.

use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};

use crate::error::{Error, Result};

/// Histogram buckets for `search_duration_seconds`.
const DURATION_BUCKETS: &[f64] = &[0.01, 0.025, 0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0, 10.0];

/// Handle to the Prometheus recorder.
#[derive(Clone)]
pub struct MetricsService {
    handle: PrometheusHandle,
}

impl MetricsService {
    /// Install the process-wide recorder. Call once at startup.
    pub fn install() -> Result<Self> {
        let handle = Self::builder()?
            .install_recorder()
            .map_err(|e| Error::Config(format!("failed to install metrics recorder: {}", e)))?;
        Ok(Self { handle })
    }

    /// A recorder that is not installed globally; renders only what it records.
    #[cfg(test)]
    pub fn detached() -> Result<Self> {
        let recorder = Self::builder()?.build_recorder();
        Ok(Self {
            handle: recorder.handle(),
        })
    }

    /// Prometheus text exposition.
    pub fn render(&self) -> String {
        self.handle.render()
    }

    fn builder() -> Result<PrometheusBuilder> {
        PrometheusBuilder::new()
            .set_buckets_for_metric(
                metrics_exporter_prometheus::Matcher::Full("search_duration_seconds".into()),
                DURATION_BUCKETS,
            )
            .map_err(|e| Error::Config(format!("invalid metrics buckets: {}", e)))
    }
}
