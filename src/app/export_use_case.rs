use serde::Serialize;
use tracing::{info, instrument};

use crate::app::ports::{ApprovalSourcePort, FilePublisherPort};
use crate::error::Result;
use crate::observability::metrics;
use crate::pipeline::csv_io;
use crate::pipeline::flatten::flatten_approvals;
use crate::pipeline::Pipeline;

/// Outcome of one fetch → classify → publish run
#[derive(Debug, Clone, Serialize)]
pub struct ExportSummary {
    pub fetched: usize,
    pub enriched: usize,
    pub published: Vec<String>,
}

/// Names of the files an export run publishes
#[derive(Debug, Clone)]
pub struct ExportFiles {
    /// Raw flattened table, skipped when `None`
    pub raw_filename: Option<String>,
    pub clean_filename: String,
}

pub struct ExportUseCase<'a> {
    source: &'a dyn ApprovalSourcePort,
    publisher: &'a dyn FilePublisherPort,
    pipeline: Pipeline,
}

impl<'a> ExportUseCase<'a> {
    pub fn new(
        source: &'a dyn ApprovalSourcePort,
        publisher: &'a dyn FilePublisherPort,
        pipeline: Pipeline,
    ) -> Self {
        Self {
            source,
            publisher,
            pipeline,
        }
    }

    /// Fetch every approval, enrich it and publish the resulting tables.
    ///
    /// A fetch or publish failure aborts the run. Nothing is published when
    /// the source returns no items.
    #[instrument(skip(self), fields(destination = %self.publisher.destination()))]
    pub async fn run(&self, files: &ExportFiles) -> Result<ExportSummary> {
        let items = self.source.fetch_approvals().await?;
        info!("Fetched {} approval items", items.len());

        if items.is_empty() {
            return Ok(ExportSummary {
                fetched: 0,
                enriched: 0,
                published: Vec::new(),
            });
        }

        let rows = flatten_approvals(&items);
        let mut published = Vec::new();

        if let Some(raw_name) = &files.raw_filename {
            let bytes = csv_io::raw_csv_bytes(&rows)?;
            self.publish(raw_name, &bytes).await?;
            published.push(raw_name.clone());
        }

        let bytes = self.pipeline.render(&rows)?;
        self.publish(&files.clean_filename, &bytes).await?;
        published.push(files.clean_filename.clone());

        info!(
            "Published {} enriched records as {}",
            rows.len(),
            files.clean_filename
        );

        Ok(ExportSummary {
            fetched: items.len(),
            enriched: rows.len(),
            published,
        })
    }

    async fn publish(&self, filename: &str, bytes: &[u8]) -> Result<()> {
        self.publisher.publish(filename, bytes).await?;
        metrics::publish::file_published(self.publisher.destination(), bytes.len());
        Ok(())
    }
}
