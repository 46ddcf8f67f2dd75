//! HTTP server setup.
//!
//! # Responsibilities
//! - Wire backend, ACL, renderer and dispatcher into a connection manager
//! - Serve each admitted connection as HTTP/1.1 with keep-alive
//! - Run the ACL refresher alongside the listener
//!
//! # Design Decisions
//! - One task per connection; requests on a connection are handled in order
//! - Transport is hyper's HTTP/1 connection driver wrapped in a tower stack
//! - Replies hyper makes up for unparseable requests never reach the peer

use std::convert::Infallible;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use axum::http::Request;
use hyper::body::Incoming;
use hyper::server::conn::http1;
use hyper_util::rt::TokioIo;
use hyper_util::service::TowerToHyperService;
use tokio::net::TcpStream;
use tokio::sync::watch;
use tower::ServiceBuilder;
use tower_http::trace::TraceLayer;

use super::gate::GatedStream;
use crate::backend::ExplorerBackend;
use crate::config::ExplorerConfig;
use crate::lifecycle::Shutdown;
use crate::net::connection::Registration;
use crate::net::listener::ListenerError;
use crate::net::manager::ConnectionManager;
use crate::render::Renderer;
use crate::routing::Dispatcher;
use crate::security::access_control::{spawn_refresher, AccessControlList};

/// Read-only explorer HTTP server.
pub struct ExplorerServer {
    manager: Arc<ConnectionManager>,
    acl: Arc<AccessControlList>,
    acl_refresh: Duration,
}

impl ExplorerServer {
    pub fn new(
        config: &ExplorerConfig,
        backend: Arc<dyn ExplorerBackend>,
        acl: Arc<AccessControlList>,
    ) -> Result<Self, ListenerError> {
        let renderer = Renderer::new(&config.render);
        let dispatcher = Arc::new(Dispatcher::new(backend, Arc::clone(&acl), renderer));
        let manager = Arc::new(ConnectionManager::new(&config.listener, dispatcher)?);

        Ok(Self {
            manager,
            acl,
            acl_refresh: Duration::from_millis(config.acl.refresh_interval_ms),
        })
    }

    pub fn manager(&self) -> &Arc<ConnectionManager> {
        &self.manager
    }

    /// Address of the live listener, `None` while (re)binding.
    pub fn bound_addr(&self) -> watch::Receiver<Option<SocketAddr>> {
        self.manager.bound_addr()
    }

    /// Run until `shutdown` triggers.
    pub async fn run(self, shutdown: &Shutdown) {
        let refresher = spawn_refresher(Arc::clone(&self.acl), self.acl_refresh, shutdown.subscribe());

        Arc::clone(&self.manager).run(shutdown.subscribe()).await;

        if let Err(e) = refresher.await {
            tracing::error!(error = %e, "ACL refresher panicked");
        }
        tracing::info!("HTTP server stopped");
    }
}

/// Serve one admitted connection until the peer leaves, a framing error
/// occurs, or a non-200 reply closes it. Dropping `registration` removes
/// the connection from the registry.
pub async fn serve_connection(stream: TcpStream, registration: Registration, dispatcher: Arc<Dispatcher>) {
    let connection = Arc::clone(registration.connection());
    let peer = connection.peer().addr();
    let io = TokioIo::new(GatedStream::new(stream, Arc::clone(&connection)));

    let service = tower::service_fn(move |request: Request<Incoming>| {
        let dispatcher = Arc::clone(&dispatcher);
        let connection = Arc::clone(&connection);
        async move {
            connection.record_request();
            let target = request
                .uri()
                .path_and_query()
                .map(|pq| pq.as_str())
                .unwrap_or("/");
            let reply = dispatcher.dispatch(peer.ip(), target);
            Ok::<_, Infallible>(reply.into_response())
        }
    });
    let service = ServiceBuilder::new()
        .layer(TraceLayer::new_for_http())
        .service(service);

    let served = http1::Builder::new()
        .keep_alive(true)
        .serve_connection(io, TowerToHyperService::new(service))
        .await;

    if let Err(e) = served {
        tracing::debug!(peer = %peer, error = %e, "Connection ended with error");
    }
    drop(registration);
}
