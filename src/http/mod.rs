//! HTTP protocol handling subsystem.
//!
//! # Data Flow
//! ```text
//! Admitted TCP connection
//!     → server.rs (hyper HTTP/1 driver, trace layer)
//!     → gate.rs (drops replies to requests never dispatched)
//!     → [routing::Dispatcher resolves, checks ACL, renders]
//!     → response.rs (status, CORS, content type, keep-alive)
//!     → Send to client
//! ```

pub mod gate;
pub mod response;
pub mod server;

pub use response::Reply;
pub use server::ExplorerServer;
