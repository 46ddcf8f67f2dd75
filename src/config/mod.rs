//! Configuration management subsystem.
//!
//! # Data Flow
//! ```text
//! config file (TOML)
//!     → loader.rs (parse & deserialize)
//!     → validation.rs (semantic checks)
//!     → ExplorerConfig (validated, immutable)
//!     → handed to subsystems at startup
//! ```
//!
//! # Design Decisions
//! - Config is immutable once loaded; the ACL file is the only live-reloaded input
//! - All fields have defaults to allow minimal configs
//! - Validation separates syntactic (serde) from semantic checks

pub mod loader;
pub mod schema;
pub mod validation;

pub use schema::AclConfig;
pub use schema::BackendConfig;
pub use schema::ExplorerConfig;
pub use schema::ListenerConfig;
pub use schema::ObservabilityConfig;
pub use schema::RenderConfig;
