// Copyright (c) 2025 Varshith Gudur. Licensed under AGPLv3.
use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};
use std::sync::OnceLock;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::errors::NodeError;

static PROM_HANDLE: OnceLock<PrometheusHandle> = OnceLock::new();

/// Logs and metrics. Safe to call more than once; later calls are no-ops.
pub fn init_telemetry() -> Result<(), NodeError> {
    let filter = tracing_subscriber::EnvFilter::new(
        std::env::var("RUST_LOG").unwrap_or_else(|_| "basehealth_node=debug,tower_http=debug".into()),
    );
    // Someone else's subscriber is fine; metrics still need a recorder.
    if let Err(e) = tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer())
        .try_init()
    {
        tracing::debug!("Keeping existing tracing subscriber: {}", e);
    }

    if PROM_HANDLE.get().is_some() {
        return Ok(());
    }
    let handle = PrometheusBuilder::new()
        .install_recorder()
        .map_err(|e| NodeError::Config(format!("failed to install Prometheus recorder: {}", e)))?;
    if PROM_HANDLE.set(handle).is_err() {
        tracing::warn!("Prometheus handle already set. Telemetry re-initialized?");
    }

    metrics::describe_counter!("basehealth_operations_started_total", "Submissions and grants started");
    metrics::describe_counter!("basehealth_operations_succeeded_total", "Operations that reached success");
    metrics::describe_counter!("basehealth_operations_failed_total", "Operations that ended in failure");
    metrics::describe_gauge!("basehealth_records_displayed", "Records in the current display list");

    metrics::gauge!("basehealth_node_up", 1.0);
    Ok(())
}

pub fn get_metrics() -> String {
    if let Some(handle) = PROM_HANDLE.get() {
        handle.render()
    } else {
        "# metrics not initialized".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_metrics_installed_behind_foreign_subscriber() {
        let _ = tracing_subscriber::fmt().with_test_writer().try_init();

        init_telemetry().unwrap();
        init_telemetry().unwrap();

        let rendered = get_metrics();
        assert!(rendered.contains("basehealth_node_up"), "{}", rendered);
    }
}
