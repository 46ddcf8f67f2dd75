//! Reply gating for served connections.
//!
//! hyper answers malformed or oversized request heads on its own with a 400
//! or 431. A peer that sends something unparseable gets a silent close
//! instead: bytes reach the socket only for a reply whose request went
//! through the dispatcher, which bumps the connection's request counter.

use std::io;
use std::pin::Pin;
use std::sync::Arc;
use std::task::{ready, Context, Poll};

use tokio::io::{AsyncRead, AsyncWrite, ReadBuf};

use crate::net::connection::Connection;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Phase {
    Idle,
    /// A reply is being written; it reaches the peer only when `allowed`.
    Writing { allowed: bool },
}

/// Stream wrapper that drops replies nobody dispatched. A reply spans every
/// write up to the next flush.
pub struct GatedStream<T> {
    inner: T,
    connection: Arc<Connection>,
    answered: u64,
    phase: Phase,
}

impl<T> GatedStream<T> {
    pub fn new(inner: T, connection: Arc<Connection>) -> Self {
        Self {
            inner,
            connection,
            answered: 0,
            phase: Phase::Idle,
        }
    }

    fn begin_write(&mut self) -> bool {
        if let Phase::Writing { allowed } = self.phase {
            return allowed;
        }
        let allowed = self.connection.requests() > self.answered;
        if allowed {
            self.answered += 1;
        } else {
            tracing::debug!(
                connection_id = %self.connection.id(),
                peer = %self.connection.peer(),
                "Discarding reply to undispatched request"
            );
        }
        self.phase = Phase::Writing { allowed };
        allowed
    }
}

impl<T: AsyncRead + Unpin> AsyncRead for GatedStream<T> {
    fn poll_read(self: Pin<&mut Self>, cx: &mut Context<'_>, buf: &mut ReadBuf<'_>) -> Poll<io::Result<()>> {
        Pin::new(&mut self.get_mut().inner).poll_read(cx, buf)
    }
}

impl<T: AsyncWrite + Unpin> AsyncWrite for GatedStream<T> {
    fn poll_write(self: Pin<&mut Self>, cx: &mut Context<'_>, buf: &[u8]) -> Poll<io::Result<usize>> {
        let this = self.get_mut();
        if buf.is_empty() || this.begin_write() {
            Pin::new(&mut this.inner).poll_write(cx, buf)
        } else {
            Poll::Ready(Ok(buf.len()))
        }
    }

    fn poll_flush(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<io::Result<()>> {
        let this = self.get_mut();
        let flushed = match this.phase {
            Phase::Writing { allowed: false } => Ok(()),
            _ => ready!(Pin::new(&mut this.inner).poll_flush(cx)),
        };
        this.phase = Phase::Idle;
        Poll::Ready(flushed)
    }

    fn poll_shutdown(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<io::Result<()>> {
        Pin::new(&mut self.get_mut().inner).poll_shutdown(cx)
    }
}
