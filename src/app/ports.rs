use async_trait::async_trait;

use crate::error::Result;
use crate::types::RawApprovalItem;

/// Upstream collaborator: the complete set of approval items, all pages
#[async_trait]
pub trait ApprovalSourcePort: Send + Sync {
    async fn fetch_approvals(&self) -> Result<Vec<RawApprovalItem>>;
}

/// Downstream collaborator: store a named file at the destination
#[async_trait]
pub trait FilePublisherPort: Send + Sync {
    /// Short label used in logs and metrics
    fn destination(&self) -> &str;

    async fn publish(&self, filename: &str, content: &[u8]) -> Result<()>;
}
