//! Endpoint handlers.
//!
//! Each handler reads its query arguments, validates them and forwards one
//! call to the backend. Nothing is stored locally.

pub mod columns;

use serde_json::Value;

use crate::backend::{ExplorerBackend, MAX_HEIGHT};
use crate::error::ExplorerError;
use crate::render::RenderMode;
use crate::routing::{ParsedRequest, Route};
use self::columns::parse_columns;

/// Every endpoint the server answers, by path segment.
pub static ROUTES: [Route; 11] = [
    Route { name: "status", handler: status },
    Route { name: "block", handler: block },
    Route { name: "blocks", handler: blocks },
    Route { name: "hdrs", handler: hdrs },
    Route { name: "peers", handler: peers },
    Route { name: "swap_offers", handler: swap_offers },
    Route { name: "swap_totals", handler: swap_totals },
    Route { name: "contracts", handler: contracts },
    Route { name: "contract", handler: contract },
    Route { name: "asset", handler: asset },
    Route { name: "assets", handler: assets },
];

type HandlerResult = Result<Value, ExplorerError>;

fn status(backend: &dyn ExplorerBackend, _req: &ParsedRequest, mode: RenderMode) -> HandlerResult {
    Ok(backend.get_status(mode)?)
}

/// By kernel hash when a valid one is given, otherwise by height.
fn block(backend: &dyn ExplorerBackend, req: &ParsedRequest, mode: RenderMode) -> HandlerResult {
    if let Some(kernel) = req.hex_arg("kernel") {
        return Ok(backend.get_block_by_kernel(&kernel, mode)?);
    }
    let height = req.height_arg("height", 0);
    Ok(backend.get_block(height, mode)?)
}

fn blocks(backend: &dyn ExplorerBackend, req: &ParsedRequest, mode: RenderMode) -> HandlerResult {
    let start = req.int_arg("height", 0);
    let n = req.int_arg("n", 0);
    if start <= 0 || n < 0 {
        return Err(ExplorerError::validation(format!(
            "invalid block range: height={} n={}",
            start, n
        )));
    }
    Ok(backend.get_blocks(start as u64, n as u64, mode)?)
}

fn hdrs(backend: &dyn ExplorerBackend, req: &ParsedRequest, mode: RenderMode) -> HandlerResult {
    let h_top = req.height_arg("hMax", i64::MAX as u64);
    let max_count = req.count_arg("nMax", u32::MAX);
    let stride = req.height_arg("dh", 1);
    let columns = parse_columns(req.arg("cols"));
    Ok(backend.get_headers(h_top, max_count, stride, &columns, mode)?)
}

fn peers(backend: &dyn ExplorerBackend, _req: &ParsedRequest, mode: RenderMode) -> HandlerResult {
    Ok(backend.get_peers(mode)?)
}

fn swap_offers(backend: &dyn ExplorerBackend, _req: &ParsedRequest, mode: RenderMode) -> HandlerResult {
    Ok(backend.get_swap_offers(mode)?)
}

fn swap_totals(backend: &dyn ExplorerBackend, _req: &ParsedRequest, mode: RenderMode) -> HandlerResult {
    Ok(backend.get_swap_totals(mode)?)
}

fn contracts(backend: &dyn ExplorerBackend, _req: &ParsedRequest, mode: RenderMode) -> HandlerResult {
    Ok(backend.get_contracts(mode)?)
}

fn contract(backend: &dyn ExplorerBackend, req: &ParsedRequest, mode: RenderMode) -> HandlerResult {
    let id = req
        .hex_arg("id")
        .ok_or_else(|| ExplorerError::validation("id missing"))?;
    let h_min = req.height_arg("hMin", 0);
    let h_max = req.height_arg("hMax", MAX_HEIGHT);
    let max_txs = req.count_arg("nMaxTxs", u32::MAX);
    Ok(backend.get_contract_details(&id, h_min, h_max, max_txs, mode)?)
}

fn asset(backend: &dyn ExplorerBackend, req: &ParsedRequest, mode: RenderMode) -> HandlerResult {
    let raw = req.arg("id").ok_or_else(|| ExplorerError::validation("id missing"))?;
    let id = raw
        .parse::<u32>()
        .map_err(|_| ExplorerError::validation(format!("invalid asset id: {}", raw)))?;
    let h_min = req.height_arg("hMin", 0);
    let h_max = req.height_arg("hMax", MAX_HEIGHT);
    let max_ops = req.count_arg("nMaxOps", u32::MAX);
    Ok(backend.get_asset_details(id, h_min, h_max, max_ops, mode)?)
}

fn assets(backend: &dyn ExplorerBackend, req: &ParsedRequest, mode: RenderMode) -> HandlerResult {
    let height = req.height_arg("height", MAX_HEIGHT);
    Ok(backend.get_assets_at(height, mode)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::{AssetId, BackendError, HashValue, Height};
    use crate::handlers::columns::TotalsCol;
    use crate::routing::RouteTable;
    use serde_json::json;
    use std::sync::Mutex;

    /// Records the last call as a JSON description.
    #[derive(Default)]
    struct Recorder {
        last: Mutex<Option<Value>>,
    }

    impl Recorder {
        fn record(&self, call: Value) -> Result<Value, BackendError> {
            *self.last.lock().unwrap() = Some(call.clone());
            Ok(call)
        }
    }

    impl ExplorerBackend for Recorder {
        fn get_status(&self, _: RenderMode) -> Result<Value, BackendError> {
            self.record(json!(["status"]))
        }
        fn get_block(&self, h: Height, _: RenderMode) -> Result<Value, BackendError> {
            self.record(json!(["block", h]))
        }
        fn get_block_by_kernel(&self, k: &HashValue, _: RenderMode) -> Result<Value, BackendError> {
            self.record(json!(["kernel", hex::encode(k)]))
        }
        fn get_blocks(&self, s: Height, n: u64, _: RenderMode) -> Result<Value, BackendError> {
            self.record(json!(["blocks", s, n]))
        }
        fn get_headers(&self, h: Height, n: u32, dh: Height, c: &[TotalsCol], _: RenderMode) -> Result<Value, BackendError> {
            self.record(json!(["hdrs", h, n, dh, c.len()]))
        }
        fn get_peers(&self, _: RenderMode) -> Result<Value, BackendError> {
            self.record(json!(["peers"]))
        }
        fn get_swap_offers(&self, _: RenderMode) -> Result<Value, BackendError> {
            self.record(json!(["swap_offers"]))
        }
        fn get_swap_totals(&self, _: RenderMode) -> Result<Value, BackendError> {
            self.record(json!(["swap_totals"]))
        }
        fn get_contracts(&self, _: RenderMode) -> Result<Value, BackendError> {
            self.record(json!(["contracts"]))
        }
        fn get_contract_details(&self, id: &HashValue, a: Height, b: Height, n: u32, _: RenderMode) -> Result<Value, BackendError> {
            self.record(json!(["contract", hex::encode(id), a, b, n]))
        }
        fn get_asset_details(&self, id: AssetId, a: Height, b: Height, n: u32, _: RenderMode) -> Result<Value, BackendError> {
            self.record(json!(["asset", id, a, b, n]))
        }
        fn get_assets_at(&self, h: Height, _: RenderMode) -> Result<Value, BackendError> {
            self.record(json!(["assets", h]))
        }
    }

    fn call(target: &str) -> HandlerResult {
        let table = RouteTable::new();
        let req = ParsedRequest::parse(target, &table).expect("route");
        (req.route().handler)(&Recorder::default(), &req, req.render_mode())
    }

    #[test]
    fn block_by_kernel_or_height() {
        let k = "01".repeat(32);
        assert_eq!(call(&format!("/block?kernel={}&height=9", k)).unwrap(), json!(["kernel", k]));
        assert_eq!(call("/block?height=9").unwrap(), json!(["block", 9]));
        assert_eq!(call("/block").unwrap(), json!(["block", 0]));
        // malformed kernel falls back to the height lookup
        assert_eq!(call("/block?kernel=xyz&height=3").unwrap(), json!(["block", 3]));
    }

    #[test]
    fn blocks_range_validated() {
        assert_eq!(call("/blocks?height=5&n=10").unwrap(), json!(["blocks", 5, 10]));
        assert_eq!(call("/blocks?height=5&n=0").unwrap(), json!(["blocks", 5, 0]));
        assert!(matches!(call("/blocks?height=0&n=1"), Err(ExplorerError::Validation(_))));
        assert!(matches!(call("/blocks?height=5&n=-1"), Err(ExplorerError::Validation(_))));
        assert!(matches!(call("/blocks"), Err(ExplorerError::Validation(_))));
    }

    #[test]
    fn hdrs_defaults() {
        assert_eq!(
            call("/hdrs").unwrap(),
            json!(["hdrs", i64::MAX, u32::MAX, 1, 10])
        );
        assert_eq!(
            call("/hdrs?hMax=100&nMax=20&dh=5&cols=HTg").unwrap(),
            json!(["hdrs", 100, 20, 5, 3])
        );
    }

    #[test]
    fn contract_requires_hex_id() {
        let id = "ff".repeat(32);
        assert_eq!(
            call(&format!("/contract?id={}&hMin=3", id)).unwrap(),
            json!(["contract", id, 3, u64::MAX, u32::MAX])
        );
        assert!(matches!(call("/contract"), Err(ExplorerError::Validation(_))));
        assert!(matches!(call("/contract?id=12ab"), Err(ExplorerError::Validation(_))));
    }

    #[test]
    fn asset_requires_integer_id() {
        assert_eq!(
            call("/asset?id=4&hMax=50&nMaxOps=2").unwrap(),
            json!(["asset", 4, 0, 50, 2])
        );
        assert!(matches!(call("/asset"), Err(ExplorerError::Validation(_))));
        assert!(matches!(call("/asset?id=x"), Err(ExplorerError::Validation(_))));
    }

    #[test]
    fn argument_free_endpoints() {
        assert_eq!(call("/status").unwrap(), json!(["status"]));
        assert_eq!(call("/peers?htm=1").unwrap(), json!(["peers"]));
        assert_eq!(call("/swap_offers").unwrap(), json!(["swap_offers"]));
        assert_eq!(call("/swap_totals").unwrap(), json!(["swap_totals"]));
        assert_eq!(call("/contracts").unwrap(), json!(["contracts"]));
        assert_eq!(call("/assets").unwrap(), json!(["assets", u64::MAX]));
        assert_eq!(call("/assets?height=77").unwrap(), json!(["assets", 77]));
    }
}
