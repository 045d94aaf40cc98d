//! Prometheus counters for planner activity

use metrics::counter;
use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};

/// Install the global recorder; the handle renders `/metrics`
pub fn install_recorder() -> anyhow::Result<PrometheusHandle> {
    PrometheusBuilder::new()
        .install_recorder()
        .map_err(|e| anyhow::anyhow!("Failed to install metrics recorder: {}", e))
}

pub fn record_mutation(op: &'static str) {
    counter!("planner_mutations_total", "op" => op).increment(1);
}

pub fn record_persist_failure(action: &'static str) {
    counter!("planner_persist_failures_total", "action" => action).increment(1);
}

pub fn record_export(kind: &'static str) {
    counter!("planner_exports_total", "kind" => kind).increment(1);
}
