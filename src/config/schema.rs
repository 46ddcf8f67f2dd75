//! Configuration schema definitions.
//!
//! This module defines the complete configuration structure for the server.
//! All types derive Serde traits for deserialization from config files.

use serde::{Deserialize, Serialize};

/// Root configuration for the explorer server.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct ExplorerConfig {
    /// Listener configuration (bind address, whitelist, restart policy).
    pub listener: ListenerConfig,

    /// File-sourced access control list.
    pub acl: AclConfig,

    /// Data backend settings.
    pub backend: BackendConfig,

    /// HTML rendering settings.
    pub render: RenderConfig,

    /// Observability settings.
    pub observability: ObservabilityConfig,
}

/// Listener configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ListenerConfig {
    /// Bind address (e.g., "0.0.0.0:8000").
    pub bind_address: String,

    /// Peer IPs allowed to connect. Empty disables the check.
    pub whitelist: Vec<String>,

    /// Delay before rebinding after a bind or accept failure, in milliseconds.
    pub restart_interval_ms: u64,

    /// Listen backlog.
    pub backlog: u32,
}

impl Default for ListenerConfig {
    fn default() -> Self {
        Self {
            bind_address: "0.0.0.0:8000".to_string(),
            whitelist: Vec::new(),
            restart_interval_ms: 1000,
            backlog: 1024,
        }
    }
}

/// Access control list configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct AclConfig {
    /// Path to the ACL file. Empty disables the ACL.
    pub path: String,

    /// How often the file's modification time is checked, in milliseconds.
    pub refresh_interval_ms: u64,
}

impl Default for AclConfig {
    fn default() -> Self {
        Self {
            path: String::new(),
            refresh_interval_ms: 5555,
        }
    }
}

/// Backend configuration.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct BackendConfig {
    /// JSON snapshot served by the built-in backend. Empty serves nothing.
    pub snapshot_path: String,
}

/// HTML rendering configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct RenderConfig {
    /// Display name of asset id 0.
    pub native_asset_name: String,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            native_asset_name: "Beam".to_string(),
        }
    }
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,

    /// Enable metrics endpoint.
    pub metrics_enabled: bool,

    /// Metrics endpoint bind address.
    pub metrics_address: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            metrics_enabled: false,
            metrics_address: "127.0.0.1:9090".to_string(),
        }
    }
}
