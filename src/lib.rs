//! Read-only blockchain explorer HTTP server.

pub mod backend;
pub mod config;
pub mod error;
pub mod handlers;
pub mod http;
pub mod lifecycle;
pub mod net;
pub mod observability;
pub mod render;
pub mod routing;
pub mod security;

pub use backend::{ExplorerBackend, SnapshotBackend};
pub use config::ExplorerConfig;
pub use error::ExplorerError;
pub use http::ExplorerServer;
pub use lifecycle::Shutdown;
