//! Lifecycle management subsystem.
//!
//! # Data Flow
//! ```text
//! Startup (main.rs):
//!     Load config → Validate → Logging/metrics → Backend + ACL → Listener
//!
//! Shutdown (shutdown.rs):
//!     Ctrl+C → Stop accepting, stop ACL refresher → Exit
//! ```

pub mod shutdown;

pub use shutdown::{wait_for_signal, Shutdown};
