//! Listener supervision and connection admission.
//!
//! # Responsibilities
//! - Keep a listener bound, re-binding after any bind or accept failure
//! - Drop non-whitelisted peers at accept time
//! - Register admitted connections and hand them to the HTTP layer
//!
//! # Design Decisions
//! - Restarts use a fixed interval; a failed listener is always recreated
//!   from scratch rather than retried in place
//! - Live connections survive a listener restart

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use tokio::net::TcpStream;
use tokio::sync::{broadcast, watch};

use super::connection::ConnectionRegistry;
use super::listener::{parse_bind_address, Listener, ListenerError};
use super::whitelist::Whitelist;
use crate::config::ListenerConfig;
use crate::http::server::serve_connection;
use crate::observability::metrics;
use crate::routing::Dispatcher;

enum AcceptExit {
    Shutdown,
    Failed(ListenerError),
}

pub struct ConnectionManager {
    bind_address: SocketAddr,
    backlog: u32,
    restart_interval: Duration,
    whitelist: Whitelist,
    registry: ConnectionRegistry,
    dispatcher: Arc<Dispatcher>,
    bound: watch::Sender<Option<SocketAddr>>,
    /// Accept calls left to fail on purpose.
    #[cfg(test)]
    accept_faults: std::sync::atomic::AtomicUsize,
}

impl ConnectionManager {
    pub fn new(config: &ListenerConfig, dispatcher: Arc<Dispatcher>) -> Result<Self, ListenerError> {
        let bind_address = parse_bind_address(&config.bind_address)?;
        let whitelist = Whitelist::from_config(&config.whitelist).map_err(ListenerError::Whitelist)?;
        let (bound, _) = watch::channel(None);

        Ok(Self {
            bind_address,
            backlog: config.backlog,
            restart_interval: Duration::from_millis(config.restart_interval_ms),
            whitelist,
            registry: ConnectionRegistry::new(),
            dispatcher,
            bound,
            #[cfg(test)]
            accept_faults: std::sync::atomic::AtomicUsize::new(0),
        })
    }

    /// Address of the current listener, `None` while (re)binding.
    pub fn bound_addr(&self) -> watch::Receiver<Option<SocketAddr>> {
        self.bound.subscribe()
    }

    pub fn registry(&self) -> &ConnectionRegistry {
        &self.registry
    }

    pub fn active_connections(&self) -> usize {
        self.registry.len()
    }

    pub fn is_registered(&self, peer: SocketAddr) -> bool {
        self.registry.contains(peer)
    }

    /// Supervise the listener until shutdown.
    pub async fn run(self: Arc<Self>, mut shutdown: broadcast::Receiver<()>) {
        tracing::info!(
            address = %self.bind_address,
            whitelist = self.whitelist.len(),
            "Connection manager starting"
        );

        loop {
            let listener = match Listener::bind(self.bind_address, self.backlog) {
                Ok(listener) => listener,
                Err(e) => {
                    tracing::error!(
                        address = %self.bind_address,
                        error = %e,
                        retry_in_ms = self.restart_interval.as_millis() as u64,
                        "Cannot start server, will retry"
                    );
                    metrics::record_listener_restart();
                    if self.pause(&mut shutdown).await {
                        break;
                    }
                    continue;
                }
            };
            self.bound.send_replace(listener.local_addr().ok());

            let exit = self.accept_loop(&listener, &mut shutdown).await;
            self.bound.send_replace(None);
            drop(listener);

            match exit {
                AcceptExit::Shutdown => break,
                AcceptExit::Failed(e) => {
                    tracing::error!(
                        error = %e,
                        retry_in_ms = self.restart_interval.as_millis() as u64,
                        "Listener failed, restarting"
                    );
                    metrics::record_listener_restart();
                    if self.pause(&mut shutdown).await {
                        break;
                    }
                }
            }
        }

        tracing::info!(active_connections = self.active_connections(), "Connection manager stopped");
    }

    async fn accept_loop(&self, listener: &Listener, shutdown: &mut broadcast::Receiver<()>) -> AcceptExit {
        loop {
            tokio::select! {
                accepted = self.accept_next(listener) => match accepted {
                    Ok((stream, peer)) => self.on_accept(stream, peer),
                    Err(e) => return AcceptExit::Failed(e),
                },
                _ = shutdown.recv() => return AcceptExit::Shutdown,
            }
        }
    }

    async fn accept_next(&self, listener: &Listener) -> Result<(TcpStream, SocketAddr), ListenerError> {
        let accepted = listener.accept().await;
        #[cfg(test)]
        {
            use std::sync::atomic::Ordering;
            let pending = self.accept_faults.load(Ordering::SeqCst);
            if pending > 0 {
                self.accept_faults.store(pending - 1, Ordering::SeqCst);
                return Err(ListenerError::Accept(std::io::Error::other("injected accept failure")));
            }
        }
        accepted
    }

    fn on_accept(&self, stream: TcpStream, peer: SocketAddr) {
        if !self.whitelist.allows(peer.ip()) {
            tracing::warn!(peer = %peer, "Peer not in IP whitelist, closing");
            metrics::record_rejected_connection("whitelist");
            return;
        }

        let registration = self.registry.register(peer);
        tracing::debug!(
            connection_id = %registration.connection().id(),
            peer = %peer,
            "+peer"
        );
        tokio::spawn(serve_connection(stream, registration, Arc::clone(&self.dispatcher)));
    }

    /// Wait out the restart interval. Returns true if shutdown arrived first.
    async fn pause(&self, shutdown: &mut broadcast::Receiver<()>) -> bool {
        tokio::select! {
            _ = tokio::time::sleep(self.restart_interval) => false,
            _ = shutdown.recv() => true,
        }
    }
}
