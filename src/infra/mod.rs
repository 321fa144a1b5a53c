pub mod graph_client;
pub mod local_publisher;
pub mod sharepoint_publisher;

pub use graph_client::GraphApprovalSource;
pub use local_publisher::LocalDirPublisher;
pub use sharepoint_publisher::SharePointPublisher;
