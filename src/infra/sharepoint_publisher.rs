use async_trait::async_trait;
use reqwest::header::CONTENT_TYPE;
use tracing::{info, instrument};

use crate::app::ports::FilePublisherPort;
use crate::error::{PipelineError, Result};

/// Uploads files into a SharePoint document library through Graph
pub struct SharePointPublisher {
    client: reqwest::Client,
    graph_base_url: String,
    site_id: String,
    drive_id: String,
    token: String,
}

impl SharePointPublisher {
    pub fn new(
        graph_base_url: impl Into<String>,
        site_id: impl Into<String>,
        drive_id: impl Into<String>,
        token: impl Into<String>,
    ) -> Result<Self> {
        let site_id = site_id.into();
        let drive_id = drive_id.into();
        let token = token.into();
        if site_id.is_empty() || drive_id.is_empty() {
            return Err(PipelineError::Config(
                "SharePoint publishing needs both SITE_ID and DRIVE_ID".to_string(),
            ));
        }
        if token.trim().is_empty() {
            return Err(PipelineError::Config(
                "SharePoint publishing needs an access token".to_string(),
            ));
        }
        Ok(Self {
            client: reqwest::Client::new(),
            graph_base_url: graph_base_url.into(),
            site_id,
            drive_id,
            token,
        })
    }

    /// Drive item upload URL for `filename`.
    ///
    /// The name is placed in the URL path as is, so names that would change
    /// the target (separators, `#`, `?`, `%`, `:`) are rejected.
    pub fn upload_url(&self, filename: &str) -> Result<String> {
        if filename.is_empty()
            || filename
                .chars()
                .any(|c| matches!(c, '/' | '\\' | '#' | '?' | '%' | ':') || c.is_control())
        {
            return Err(PipelineError::Publish {
                filename: filename.to_string(),
                message: "file name is not a plain drive item name".to_string(),
            });
        }
        Ok(format!(
            "{}/sites/{}/drives/{}/root:/{}:/content",
            self.graph_base_url.trim_end_matches('/'),
            self.site_id,
            self.drive_id,
            filename
        ))
    }
}

#[async_trait]
impl FilePublisherPort for SharePointPublisher {
    fn destination(&self) -> &str {
        "sharepoint"
    }

    #[instrument(skip(self, content), fields(bytes = content.len()))]
    async fn publish(&self, filename: &str, content: &[u8]) -> Result<()> {
        let resp = self
            .client
            .put(self.upload_url(filename)?)
            .bearer_auth(&self.token)
            .header(CONTENT_TYPE, "text/csv")
            .body(content.to_vec())
            .send()
            .await?;

        let status = resp.status().as_u16();
        if status != 200 && status != 201 {
            let message = resp.text().await.unwrap_or_default();
            return Err(PipelineError::Publish {
                filename: filename.to_string(),
                message: format!("status {}: {}", status, message),
            });
        }

        info!("Uploaded {} to SharePoint", filename);
        Ok(())
    }
}
