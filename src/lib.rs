pub mod config;
pub mod constants;
pub mod error;
pub mod logging;
pub mod observability;
pub mod pipeline;
pub mod types;

// Application use cases and the ports they depend on
pub mod app;
// Adapters for Graph, SharePoint and the local file system
pub mod infra;
