//! Data backend interface.
//!
//! The server computes nothing itself: every endpoint translates its query
//! arguments into one call on an [`ExplorerBackend`] and renders whatever
//! document comes back.

pub mod snapshot;

use serde_json::Value;
use thiserror::Error;

use crate::handlers::columns::TotalsCol;
use crate::render::RenderMode;

pub use snapshot::SnapshotBackend;

/// Block height.
pub type Height = u64;

/// Highest representable height, the default upper bound of range queries.
pub const MAX_HEIGHT: Height = Height::MAX;

/// 32-byte identifier (kernel hash, contract id).
pub type HashValue = [u8; 32];

/// Asset identifier.
pub type AssetId = u32;

#[derive(Debug, Error)]
pub enum BackendError {
    #[error("not found: {0}")]
    NotFound(String),
}

/// Synchronous query interface over chain state.
///
/// Implementations must return without suspending; they run inline on the
/// connection task. The render mode is passed so the backend can emit typed
/// envelopes (`{"type": ..., "value": ...}`) only when the client asked for them.
pub trait ExplorerBackend: Send + Sync {
    fn get_status(&self, mode: RenderMode) -> Result<Value, BackendError>;

    fn get_block(&self, height: Height, mode: RenderMode) -> Result<Value, BackendError>;

    fn get_block_by_kernel(&self, kernel: &HashValue, mode: RenderMode) -> Result<Value, BackendError>;

    fn get_blocks(&self, start: Height, count: u64, mode: RenderMode) -> Result<Value, BackendError>;

    fn get_headers(
        &self,
        h_top: Height,
        max_count: u32,
        stride: Height,
        columns: &[TotalsCol],
        mode: RenderMode,
    ) -> Result<Value, BackendError>;

    fn get_peers(&self, mode: RenderMode) -> Result<Value, BackendError>;

    fn get_swap_offers(&self, mode: RenderMode) -> Result<Value, BackendError>;

    fn get_swap_totals(&self, mode: RenderMode) -> Result<Value, BackendError>;

    fn get_contracts(&self, mode: RenderMode) -> Result<Value, BackendError>;

    fn get_contract_details(
        &self,
        id: &HashValue,
        h_min: Height,
        h_max: Height,
        max_txs: u32,
        mode: RenderMode,
    ) -> Result<Value, BackendError>;

    fn get_asset_details(
        &self,
        id: AssetId,
        h_min: Height,
        h_max: Height,
        max_ops: u32,
        mode: RenderMode,
    ) -> Result<Value, BackendError>;

    fn get_assets_at(&self, height: Height, mode: RenderMode) -> Result<Value, BackendError>;
}
