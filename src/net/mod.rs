//! Network layer subsystem.
//!
//! # Data Flow
//! ```text
//! Incoming TCP connection
//!     → listener.rs (bind with reuse + keep-alive, accept)
//!     → whitelist.rs (drop unlisted peers)
//!     → connection.rs (register by peer, deregister on task exit)
//!     → Hand off to HTTP layer
//!
//! Listener States:
//!     Binding → Accepting → (error) → Waiting → Binding
//! ```
//!
//! # Design Decisions
//! - manager.rs owns the listener and rebuilds it after any failure
//! - Accepted connections are independent of the listener that produced them

pub mod connection;
pub mod listener;
pub mod manager;
pub mod whitelist;

pub use connection::{ConnectionId, ConnectionRegistry, PeerKey};
pub use listener::{Listener, ListenerError};
pub use manager::ConnectionManager;
pub use whitelist::Whitelist;
