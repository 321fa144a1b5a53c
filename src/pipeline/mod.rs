// Approval processing pipeline: flattening, classification and tabular output

pub mod csv_io;
pub mod flatten;
pub mod processing;

use serde::Serialize;
use std::fs::{self, File};
use std::io::{BufReader, BufWriter};
use std::path::Path;
use tracing::{debug, info, instrument};

use crate::error::Result;
use crate::observability::metrics;
use crate::types::RawApprovalRecord;
use processing::{ClassificationOptions, EnrichedRecord, Enricher, OutputLayout, RecordEnricher};

/// Result of cleaning one raw table
#[derive(Debug, Clone, Serialize)]
pub struct CleanSummary {
    pub records: usize,
    pub output_file: String,
}

/// Streams raw rows through the enricher and renders the output table
#[derive(Debug, Clone, Copy, Default)]
pub struct Pipeline {
    enricher: RecordEnricher,
    layout: OutputLayout,
}

impl Pipeline {
    pub fn new(options: ClassificationOptions, layout: OutputLayout) -> Self {
        Self {
            enricher: RecordEnricher::new(options),
            layout,
        }
    }

    pub fn layout(&self) -> OutputLayout {
        self.layout
    }

    /// One enriched record per input row, in input order
    pub fn enrich_all(&self, rows: &[RawApprovalRecord]) -> Vec<EnrichedRecord> {
        rows.iter()
            .map(|row| {
                let record = self.enricher.enrich(row);
                metrics::enrich::record_enriched(
                    record.classification.has_ticket_id(),
                    !record.calendar.is_empty(),
                );
                record
            })
            .collect()
    }

    /// Enrich rows and render them as CSV bytes
    pub fn render(&self, rows: &[RawApprovalRecord]) -> Result<Vec<u8>> {
        let records = self.enrich_all(rows);
        debug!("Rendering {} enriched records", records.len());
        csv_io::enriched_csv_bytes(&records, self.layout)
    }

    /// Read a raw table from `input` and write the enriched table to `output`
    #[instrument(skip(self), fields(layout = %self.layout))]
    pub fn clean_file(&self, input: &Path, output: &Path) -> Result<CleanSummary> {
        let rows = csv_io::read_raw_csv(BufReader::new(File::open(input)?))?;
        let records = self.enrich_all(&rows);

        if let Some(dir) = output.parent().filter(|d| !d.as_os_str().is_empty()) {
            fs::create_dir_all(dir)?;
        }
        csv_io::write_enriched_csv(&records, self.layout, BufWriter::new(File::create(output)?))?;

        info!(
            "Wrote {} records to {}",
            records.len(),
            output.display()
        );

        Ok(CleanSummary {
            records: records.len(),
            output_file: output.display().to_string(),
        })
    }
}
