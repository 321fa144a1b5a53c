//! Metrics for the approvals pipeline.
//!
//! Call sites use the small per-stage modules below instead of raw metric
//! strings. Without an installed recorder every call is a no-op.

use std::fmt;
use std::sync::OnceLock;

use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};
use tracing::info;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MetricName {
    // Fetch
    FetchPagesTotal,
    FetchRecordsTotal,

    // Enrich
    EnrichRecordsTotal,
    EnrichTicketIdMissingTotal,
    EnrichDatesUnparsedTotal,

    // Publish
    PublishFilesTotal,
    PublishBytes,
}

impl MetricName {
    pub fn as_str(&self) -> &'static str {
        match self {
            MetricName::FetchPagesTotal => "approvals_fetch_pages_total",
            MetricName::FetchRecordsTotal => "approvals_fetch_records_total",
            MetricName::EnrichRecordsTotal => "approvals_enrich_records_total",
            MetricName::EnrichTicketIdMissingTotal => "approvals_enrich_ticket_id_missing_total",
            MetricName::EnrichDatesUnparsedTotal => "approvals_enrich_dates_unparsed_total",
            MetricName::PublishFilesTotal => "approvals_publish_files_total",
            MetricName::PublishBytes => "approvals_publish_bytes",
        }
    }
}

impl fmt::Display for MetricName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

static METRICS_HANDLE: OnceLock<PrometheusHandle> = OnceLock::new();

/// Install the Prometheus recorder once per process
pub fn init() -> Result<(), Box<dyn std::error::Error>> {
    if METRICS_HANDLE.get().is_some() {
        return Ok(());
    }
    let handle = PrometheusBuilder::new()
        .install_recorder()
        .map_err(|e| format!("Failed to install Prometheus recorder: {}", e))?;
    METRICS_HANDLE.set(handle).ok();
    info!("Metrics recorder installed");
    Ok(())
}

/// Text exposition of everything recorded so far
pub fn render() -> Option<String> {
    METRICS_HANDLE.get().map(PrometheusHandle::render)
}

pub mod fetch {
    use super::MetricName;

    pub fn page_fetched(records: usize) {
        ::metrics::counter!(MetricName::FetchPagesTotal.as_str()).increment(1);
        ::metrics::counter!(MetricName::FetchRecordsTotal.as_str()).increment(records as u64);
    }
}

pub mod enrich {
    use super::MetricName;

    pub fn record_enriched(ticket_id_found: bool, date_parsed: bool) {
        ::metrics::counter!(MetricName::EnrichRecordsTotal.as_str()).increment(1);
        if !ticket_id_found {
            ::metrics::counter!(MetricName::EnrichTicketIdMissingTotal.as_str()).increment(1);
        }
        if !date_parsed {
            ::metrics::counter!(MetricName::EnrichDatesUnparsedTotal.as_str()).increment(1);
        }
    }
}

pub mod publish {
    use super::MetricName;

    pub fn file_published(destination: &str, bytes: usize) {
        ::metrics::counter!(MetricName::PublishFilesTotal.as_str(), "destination" => destination.to_string())
            .increment(1);
        ::metrics::histogram!(MetricName::PublishBytes.as_str()).record(bytes as f64);
    }
}
