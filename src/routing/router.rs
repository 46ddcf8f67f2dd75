//! Route table and request dispatch.
//!
//! # Responsibilities
//! - Hold the endpoint table, built once at startup
//! - Resolve a request target to its handler
//! - Gate handler invocation on the ACL
//! - Map handler outcomes to status codes
//!
//! # Design Decisions
//! - Immutable after construction (shared without locks)
//! - All handler and render errors collapse to 500 with the message as
//!   body; clients cannot tell bad input from internal failure
//! - The ACL is checked against the connection's peer, never a query credential

use std::collections::HashMap;
use std::fmt;
use std::net::IpAddr;
use std::sync::Arc;
use std::time::Instant;

use serde_json::Value;

use super::request::ParsedRequest;
use crate::backend::ExplorerBackend;
use crate::error::ExplorerError;
use crate::handlers::ROUTES;
use crate::http::response::Reply;
use crate::observability::metrics;
use crate::render::{RenderMode, Renderer};
use crate::security::access_control::AccessControlList;

/// Uniform endpoint contract.
pub type Handler = fn(&dyn ExplorerBackend, &ParsedRequest, RenderMode) -> Result<Value, ExplorerError>;

/// One endpoint: the path segment it answers to and its handler.
pub struct Route {
    pub name: &'static str,
    pub handler: Handler,
}

impl fmt::Debug for Route {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Route").field("name", &self.name).finish()
    }
}

/// Name to route lookup over [`ROUTES`].
#[derive(Debug, Clone)]
pub struct RouteTable {
    routes: HashMap<&'static str, &'static Route>,
}

impl RouteTable {
    pub fn new() -> Self {
        Self {
            routes: ROUTES.iter().map(|r| (r.name, r)).collect(),
        }
    }

    pub fn lookup(&self, name: &str) -> Option<&'static Route> {
        self.routes.get(name).copied()
    }

    pub fn len(&self) -> usize {
        self.routes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.routes.is_empty()
    }
}

impl Default for RouteTable {
    fn default() -> Self {
        Self::new()
    }
}

/// Turns a request target from a given peer into a [`Reply`].
pub struct Dispatcher {
    routes: RouteTable,
    backend: Arc<dyn ExplorerBackend>,
    acl: Arc<AccessControlList>,
    renderer: Renderer,
}

impl Dispatcher {
    pub fn new(backend: Arc<dyn ExplorerBackend>, acl: Arc<AccessControlList>, renderer: Renderer) -> Self {
        Self {
            routes: RouteTable::new(),
            backend,
            acl,
            renderer,
        }
    }

    pub fn dispatch(&self, peer: IpAddr, target: &str) -> Reply {
        let start = Instant::now();

        let Some(req) = ParsedRequest::parse(target, &self.routes) else {
            tracing::debug!(peer = %peer, target = %target, "No route matched");
            metrics::record_request("none", 404, start);
            return Reply::not_found();
        };
        let endpoint = req.route().name;

        if !self.acl.check(peer) {
            tracing::warn!(peer = %peer, endpoint, "Rejected by ACL");
            metrics::record_request(endpoint, 403, start);
            return Reply::forbidden();
        }

        let mode = req.render_mode();
        let reply = match self.handle(&req, mode) {
            Ok(reply) => reply,
            Err(e) => {
                tracing::warn!(peer = %peer, endpoint, error = %e, "Request failed");
                Reply::internal_error(&e)
            }
        };
        metrics::record_request(endpoint, reply.status.as_u16(), start);
        reply
    }

    fn handle(&self, req: &ParsedRequest, mode: RenderMode) -> Result<Reply, ExplorerError> {
        let doc = (req.route().handler)(self.backend.as_ref(), req, mode)?;
        let rendered = self.renderer.render(doc, mode, req.target())?;
        Ok(Reply::ok(rendered))
    }
}
