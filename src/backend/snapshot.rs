//! File-backed backend serving canned explorer documents.
//!
//! The snapshot is one JSON object:
//!
//! ```json
//! {
//!   "status": {...},
//!   "peers": [...], "swap_offers": [...], "swap_totals": {...},
//!   "contracts": [...], "headers": {...},
//!   "blocks": {"<height>": {...}},
//!   "kernels": {"<hex>": {...}},
//!   "contracts_by_id": {"<hex>": {...}},
//!   "assets_by_id": {"<id>": {...}},
//!   "assets_at": {"<height>": [...]}
//! }
//! ```

use std::path::Path;

use serde_json::{Map, Value};
use thiserror::Error;

use super::{AssetId, BackendError, ExplorerBackend, HashValue, Height};
use crate::handlers::columns::TotalsCol;
use crate::render::RenderMode;

#[derive(Debug, Error)]
pub enum SnapshotError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Parse error: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("snapshot root must be a JSON object")]
    NotAnObject,
}

#[derive(Debug, Clone, Default)]
pub struct SnapshotBackend {
    root: Map<String, Value>,
}

impl SnapshotBackend {
    pub fn new(root: Map<String, Value>) -> Self {
        Self { root }
    }

    pub fn load(path: &Path) -> Result<Self, SnapshotError> {
        let content = std::fs::read_to_string(path)?;
        match serde_json::from_str(&content)? {
            Value::Object(root) => Ok(Self { root }),
            _ => Err(SnapshotError::NotAnObject),
        }
    }

    fn entry(&self, key: &str) -> Result<Value, BackendError> {
        self.root
            .get(key)
            .cloned()
            .ok_or_else(|| BackendError::NotFound(key.to_string()))
    }

    fn keyed(&self, section: &str, key: &str) -> Result<Value, BackendError> {
        self.root
            .get(section)
            .and_then(|s| s.get(key))
            .cloned()
            .ok_or_else(|| BackendError::NotFound(format!("{}/{}", section, key)))
    }
}

impl ExplorerBackend for SnapshotBackend {
    fn get_status(&self, _mode: RenderMode) -> Result<Value, BackendError> {
        self.entry("status")
    }

    fn get_block(&self, height: Height, _mode: RenderMode) -> Result<Value, BackendError> {
        self.keyed("blocks", &height.to_string())
    }

    fn get_block_by_kernel(&self, kernel: &HashValue, _mode: RenderMode) -> Result<Value, BackendError> {
        self.keyed("kernels", &hex::encode(kernel))
    }

    fn get_blocks(&self, start: Height, count: u64, _mode: RenderMode) -> Result<Value, BackendError> {
        let Some(blocks) = self.root.get("blocks").and_then(Value::as_object) else {
            return Ok(Value::Array(Vec::new()));
        };
        let mut found: Vec<(Height, &Value)> = blocks
            .iter()
            .filter_map(|(k, v)| k.parse::<Height>().ok().map(|h| (h, v)))
            .filter(|(h, _)| *h >= start && *h - start < count)
            .collect();
        found.sort_by_key(|(h, _)| *h);
        Ok(Value::Array(found.into_iter().map(|(_, v)| v.clone()).collect()))
    }

    fn get_headers(
        &self,
        _h_top: Height,
        _max_count: u32,
        _stride: Height,
        _columns: &[TotalsCol],
        _mode: RenderMode,
    ) -> Result<Value, BackendError> {
        self.entry("headers")
    }

    fn get_peers(&self, _mode: RenderMode) -> Result<Value, BackendError> {
        self.entry("peers")
    }

    fn get_swap_offers(&self, _mode: RenderMode) -> Result<Value, BackendError> {
        self.entry("swap_offers")
    }

    fn get_swap_totals(&self, _mode: RenderMode) -> Result<Value, BackendError> {
        self.entry("swap_totals")
    }

    fn get_contracts(&self, _mode: RenderMode) -> Result<Value, BackendError> {
        self.entry("contracts")
    }

    fn get_contract_details(
        &self,
        id: &HashValue,
        _h_min: Height,
        _h_max: Height,
        _max_txs: u32,
        _mode: RenderMode,
    ) -> Result<Value, BackendError> {
        self.keyed("contracts_by_id", &hex::encode(id))
    }

    fn get_asset_details(
        &self,
        id: AssetId,
        _h_min: Height,
        _h_max: Height,
        _max_ops: u32,
        _mode: RenderMode,
    ) -> Result<Value, BackendError> {
        self.keyed("assets_by_id", &id.to_string())
    }

    /// Newest snapshot at or below `height`.
    fn get_assets_at(&self, height: Height, _mode: RenderMode) -> Result<Value, BackendError> {
        self.root
            .get("assets_at")
            .and_then(Value::as_object)
            .and_then(|at| {
                at.iter()
                    .filter_map(|(k, v)| k.parse::<Height>().ok().map(|h| (h, v)))
                    .filter(|(h, _)| *h <= height)
                    .max_by_key(|(h, _)| *h)
                    .map(|(_, v)| v.clone())
            })
            .ok_or_else(|| BackendError::NotFound(format!("assets_at/{}", height)))
    }
}
