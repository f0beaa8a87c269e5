//! Metrics for the aggregator, recorded through the `metrics` facade.
//!
//! Recording is a no-op until [`init`] installs the Prometheus recorder, so the
//! pipeline code and its tests never depend on it. When `JOBS_PUSHGATEWAY_URL`
//! is set, [`push_all`] sends a final snapshot at the end of a command.

use std::sync::OnceLock;
use tracing::{info, warn};

const PUSHGATEWAY_ENV: &str = "JOBS_PUSHGATEWAY_URL";
const PUSH_JOB_NAME: &str = "job_aggregator";

static METRICS_HANDLE: OnceLock<metrics_exporter_prometheus::PrometheusHandle> = OnceLock::new();

/// Install the Prometheus recorder. Safe to call once per process.
pub fn init() -> Result<(), Box<dyn std::error::Error>> {
    let handle = metrics_exporter_prometheus::PrometheusBuilder::new()
        .install_recorder()
        .map_err(|e| format!("Failed to install Prometheus recorder: {}", e))?;
    METRICS_HANDLE.set(handle).ok();
    info!("Metrics system initialized");
    Ok(())
}

/// Current metrics in Prometheus text format, if the recorder is installed
pub fn render() -> Option<String> {
    METRICS_HANDLE.get().map(|handle| handle.render())
}

/// Push the rendered metrics to a Prometheus Pushgateway when configured.
/// Failures are logged and otherwise ignored.
pub async fn push_all(instance: &str) {
    let base = match std::env::var(PUSHGATEWAY_ENV) {
        Ok(v) if !v.trim().is_empty() => v,
        _ => return,
    };
    let Some(body) = render() else {
        return;
    };

    let push_url = format!(
        "{}/metrics/job/{}/instance/{}",
        base.trim_end_matches('/'),
        PUSH_JOB_NAME,
        instance
    );

    let result = reqwest::Client::new()
        .post(&push_url)
        .header("Content-Type", "text/plain; version=0.0.4")
        .body(body)
        .send()
        .await;

    match result {
        Ok(r) if r.status().is_success() => info!("Pushed metrics to Pushgateway for {}", instance),
        Ok(r) => warn!("Pushgateway responded with status {} for {}", r.status().as_u16(), instance),
        Err(e) => warn!("Failed to push metrics to Pushgateway for {}: {}", instance, e),
    }
}

// ============================================================================
// Merge Metrics
// ============================================================================

pub mod merge {
    pub fn records_received(source: &str, count: usize) {
        ::metrics::counter!("jobs_merge_records_received_total", "source" => source.to_string())
            .increment(count as u64);
    }

    pub fn record_admitted(source: &str) {
        ::metrics::counter!("jobs_merge_records_admitted_total", "source" => source.to_string())
            .increment(1);
    }

    /// `reason` is a short machine label, e.g. "excluded_keyword"
    pub fn record_filtered(source: &str, reason: &'static str) {
        ::metrics::counter!(
            "jobs_merge_records_filtered_total",
            "source" => source.to_string(),
            "reason" => reason
        )
        .increment(1);
    }

    pub fn batch_failed(source: &str) {
        ::metrics::counter!("jobs_merge_batches_failed_total", "source" => source.to_string())
            .increment(1);
    }

    pub fn duplicates_dropped(count: usize) {
        ::metrics::counter!("jobs_merge_duplicates_total").increment(count as u64);
    }

    pub fn missing_link(count: usize) {
        ::metrics::counter!("jobs_merge_missing_link_total").increment(count as u64);
    }

    pub fn jobs_written(count: usize) {
        ::metrics::gauge!("jobs_output_size").set(count as f64);
    }

    pub fn duration(secs: f64) {
        ::metrics::histogram!("jobs_merge_duration_seconds").record(secs);
    }
}

// ============================================================================
// Store Sync Metrics
// ============================================================================

pub mod sync {
    pub fn stale_deleted(count: usize) {
        ::metrics::counter!("jobs_sync_stale_deleted_total").increment(count as u64);
    }

    pub fn fetched(count: usize) {
        ::metrics::histogram!("jobs_sync_fetched_records").record(count as f64);
    }

    pub fn upsert_success(is_new: bool) {
        let kind = if is_new { "inserted" } else { "updated" };
        ::metrics::counter!("jobs_store_upserts_total", "result" => kind).increment(1);
    }

    pub fn upsert_error() {
        ::metrics::counter!("jobs_store_upserts_total", "result" => "error").increment(1);
    }
}

// ============================================================================
// Enrichment Metrics
// ============================================================================

pub mod enrich {
    pub fn page_success() {
        ::metrics::counter!("jobs_enrich_pages_total", "result" => "success").increment(1);
    }

    pub fn page_error() {
        ::metrics::counter!("jobs_enrich_pages_total", "result" => "error").increment(1);
    }

    pub fn fetch_duration(secs: f64) {
        ::metrics::histogram!("jobs_enrich_fetch_duration_seconds").record(secs);
    }
}
