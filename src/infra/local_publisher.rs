use async_trait::async_trait;
use std::ffi::OsStr;
use std::path::{Path, PathBuf};
use tracing::{info, instrument};

use crate::app::ports::FilePublisherPort;
use crate::error::{PipelineError, Result};

/// Writes published files into a local directory, creating it on demand
pub struct LocalDirPublisher {
    dir: PathBuf,
}

impl LocalDirPublisher {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }
}

#[async_trait]
impl FilePublisherPort for LocalDirPublisher {
    fn destination(&self) -> &str {
        "local"
    }

    #[instrument(skip(self, content), fields(dir = %self.dir.display(), bytes = content.len()))]
    async fn publish(&self, filename: &str, content: &[u8]) -> Result<()> {
        // Only a bare file name may be published, never a path
        if filename.is_empty() || Path::new(filename).file_name() != Some(OsStr::new(filename)) {
            return Err(PipelineError::Publish {
                filename: filename.to_string(),
                message: "file name must not contain path separators".to_string(),
            });
        }

        tokio::fs::create_dir_all(&self.dir).await?;
        let path = self.dir.join(filename);
        tokio::fs::write(&path, content).await?;

        info!("Wrote {}", path.display());
        Ok(())
    }
}
