//! Connection registry and lifecycle tracking.
//!
//! # Responsibilities
//! - Key live connections by peer address
//! - Generate unique connection IDs for tracing
//! - Deregister a connection whenever its task ends, however it ends

use std::net::SocketAddr;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Instant;

use dashmap::DashMap;

use crate::observability::metrics;

/// Global atomic counter for connection IDs.
/// Using relaxed ordering is sufficient since we only need uniqueness, not synchronization.
static CONNECTION_ID_COUNTER: AtomicU64 = AtomicU64::new(1);

/// Unique identifier for a connection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ConnectionId(u64);

impl ConnectionId {
    /// Generate a new unique connection ID.
    pub fn new() -> Self {
        Self(CONNECTION_ID_COUNTER.fetch_add(1, Ordering::Relaxed))
    }

    /// Get the raw ID value.
    pub fn as_u64(&self) -> u64 {
        self.0
    }
}

impl Default for ConnectionId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for ConnectionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "conn-{}", self.0)
    }
}

/// Map key identifying a peer. IPv4-mapped IPv6 addresses are folded to
/// IPv4 so one host has one spelling.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PeerKey(SocketAddr);

impl PeerKey {
    pub fn new(addr: SocketAddr) -> Self {
        Self(SocketAddr::new(addr.ip().to_canonical(), addr.port()))
    }

    pub fn addr(&self) -> SocketAddr {
        self.0
    }
}

impl From<SocketAddr> for PeerKey {
    fn from(addr: SocketAddr) -> Self {
        Self::new(addr)
    }
}

impl std::fmt::Display for PeerKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.0.fmt(f)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Inbound,
}

/// A registered connection.
#[derive(Debug)]
pub struct Connection {
    id: ConnectionId,
    peer: PeerKey,
    direction: Direction,
    opened_at: Instant,
    requests: AtomicU64,
}

impl Connection {
    pub fn id(&self) -> ConnectionId {
        self.id
    }

    pub fn peer(&self) -> PeerKey {
        self.peer
    }

    pub fn direction(&self) -> Direction {
        self.direction
    }

    pub fn opened_at(&self) -> Instant {
        self.opened_at
    }

    /// Count one request; returns the running total.
    pub fn record_request(&self) -> u64 {
        self.requests.fetch_add(1, Ordering::Relaxed) + 1
    }

    pub fn requests(&self) -> u64 {
        self.requests.load(Ordering::Relaxed)
    }
}

/// Live connections keyed by peer.
#[derive(Debug, Clone, Default)]
pub struct ConnectionRegistry {
    connections: Arc<DashMap<PeerKey, Arc<Connection>>>,
}

impl ConnectionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register an inbound connection. The returned guard deregisters it on drop.
    pub fn register(&self, peer: impl Into<PeerKey>) -> Registration {
        let peer = peer.into();
        let connection = Arc::new(Connection {
            id: ConnectionId::new(),
            peer,
            direction: Direction::Inbound,
            opened_at: Instant::now(),
            requests: AtomicU64::new(0),
        });
        if let Some(stale) = self.connections.insert(peer, Arc::clone(&connection)) {
            tracing::warn!(peer = %peer, stale = %stale.id, "Replacing registered connection");
        } else {
            metrics::connection_opened();
        }
        Registration {
            registry: self.clone(),
            connection,
        }
    }

    pub fn len(&self) -> usize {
        self.connections.len()
    }

    pub fn is_empty(&self) -> bool {
        self.connections.is_empty()
    }

    pub fn contains(&self, peer: impl Into<PeerKey>) -> bool {
        self.connections.contains_key(&peer.into())
    }

    pub fn get(&self, peer: impl Into<PeerKey>) -> Option<Arc<Connection>> {
        self.connections.get(&peer.into()).map(|c| Arc::clone(c.value()))
    }

    fn deregister(&self, connection: &Connection) {
        let removed = self
            .connections
            .remove_if(&connection.peer, |_, c| c.id == connection.id);
        if removed.is_some() {
            metrics::connection_closed();
        }
    }
}

/// Guard tying a connection's registration to its task.
#[derive(Debug)]
pub struct Registration {
    registry: ConnectionRegistry,
    connection: Arc<Connection>,
}

impl Registration {
    pub fn connection(&self) -> &Arc<Connection> {
        &self.connection
    }
}

impl Drop for Registration {
    fn drop(&mut self) {
        self.registry.deregister(&self.connection);
        tracing::debug!(
            connection_id = %self.connection.id,
            peer = %self.connection.peer,
            requests = self.connection.requests(),
            open_ms = self.connection.opened_at().elapsed().as_millis() as u64,
            "-peer"
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn addr(s: &str) -> SocketAddr {
        s.parse().unwrap()
    }

    #[test]
    fn connection_id_unique() {
        let id1 = ConnectionId::new();
        let id2 = ConnectionId::new();
        assert_ne!(id1, id2);
    }

    #[test]
    fn registration_lifetime() {
        let registry = ConnectionRegistry::new();
        assert!(registry.is_empty());

        let a = registry.register(addr("10.0.0.1:4000"));
        let b = registry.register(addr("10.0.0.1:4001"));
        assert_eq!(registry.len(), 2);
        assert!(registry.contains(addr("10.0.0.1:4000")));
        assert_eq!(a.connection().direction(), Direction::Inbound);

        drop(a);
        assert_eq!(registry.len(), 1);
        assert!(!registry.contains(addr("10.0.0.1:4000")));

        drop(b);
        assert!(registry.is_empty());
    }

    #[test]
    fn mapped_v6_peer_matches_v4_key() {
        let registry = ConnectionRegistry::new();
        let _g = registry.register(addr("[::ffff:10.0.0.7]:5000"));
        assert!(registry.contains(addr("10.0.0.7:5000")));
    }

    #[test]
    fn stale_guard_does_not_evict_replacement() {
        let registry = ConnectionRegistry::new();
        let old = registry.register(addr("10.0.0.2:1"));
        let new = registry.register(addr("10.0.0.2:1"));
        drop(old);
        assert_eq!(
            registry.get(addr("10.0.0.2:1")).map(|c| c.id()),
            Some(new.connection().id())
        );
    }

    #[test]
    fn request_counter() {
        let registry = ConnectionRegistry::new();
        let reg = registry.register(addr("10.0.0.3:1"));
        assert_eq!(reg.connection().record_request(), 1);
        assert_eq!(reg.connection().record_request(), 2);
        assert_eq!(reg.connection().requests(), 2);
    }
}
