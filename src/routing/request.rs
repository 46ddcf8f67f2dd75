//! Request target parsing and query-argument accessors.

use std::collections::HashMap;

use super::router::{Route, RouteTable};
use crate::backend::{HashValue, Height};
use crate::render::RenderMode;

/// A request target resolved against the route table.
#[derive(Debug, Clone)]
pub struct ParsedRequest {
    route: &'static Route,
    target: String,
    args: HashMap<String, String>,
}

impl ParsedRequest {
    /// Resolve `target` (path plus optional query). The path must name a
    /// registered endpoint exactly, e.g. `/blocks?height=5&n=10`.
    pub fn parse(target: &str, routes: &RouteTable) -> Option<Self> {
        let (path, query) = match target.split_once('?') {
            Some((p, q)) => (p, q),
            None => (target, ""),
        };
        let name = path.strip_prefix('/').unwrap_or(path);
        let route = routes.lookup(name)?;

        let args = url::form_urlencoded::parse(query.as_bytes())
            .into_owned()
            .collect();

        Some(Self {
            route,
            target: target.to_string(),
            args,
        })
    }

    pub fn route(&self) -> &'static Route {
        self.route
    }

    /// The target as received, used as the base of pagination links.
    pub fn target(&self) -> &str {
        &self.target
    }

    pub fn arg(&self, name: &str) -> Option<&str> {
        self.args.get(name).map(String::as_str)
    }

    pub fn has(&self, name: &str) -> bool {
        self.args.contains_key(name)
    }

    pub fn render_mode(&self) -> RenderMode {
        RenderMode::from_flags(self.has("htm"), self.has("exp_am"))
    }

    /// Base-10 signed integer; missing or unparsable values yield `default`.
    pub fn int_arg(&self, name: &str, default: i64) -> i64 {
        self.arg(name)
            .and_then(|v| v.parse::<i64>().ok())
            .unwrap_or(default)
    }

    /// Height argument. Negative input wraps, so `-1` means the top.
    pub fn height_arg(&self, name: &str, default: Height) -> Height {
        match self.arg(name).and_then(|v| v.parse::<i64>().ok()) {
            Some(v) => v as Height,
            None => default,
        }
    }

    /// Count argument, truncated to 32 bits.
    pub fn count_arg(&self, name: &str, default: u32) -> u32 {
        match self.arg(name).and_then(|v| v.parse::<i64>().ok()) {
            Some(v) => v as u32,
            None => default,
        }
    }

    /// A 32-byte value written as exactly 64 hex digits.
    pub fn hex_arg(&self, name: &str) -> Option<HashValue> {
        let v = self.arg(name)?;
        let mut out = [0u8; 32];
        hex::decode_to_slice(v, &mut out).ok()?;
        Some(out)
    }
}
