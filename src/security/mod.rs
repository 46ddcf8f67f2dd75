//! Security subsystem.
//!
//! # Data Flow
//! ```text
//! Accepted connection:
//!     → net::whitelist (static, accept-time)
//! Matched request:
//!     → access_control.rs (live-reloaded file, per request)
//!     → Pass to handler
//! ```
//!
//! # Design Decisions
//! - Loopback peers always pass the ACL
//! - The ACL only grows while the process runs

pub mod access_control;

pub use access_control::AccessControlList;
