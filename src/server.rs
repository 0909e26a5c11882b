use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;
use std::time::Instant;

use tokio::io::{AsyncRead, AsyncWrite};

use crate::connection::Connection;
use crate::identity::{AcceptAll, IdentityProvider};
use crate::options::ServerOptions;
use crate::session::Session;

/// The process-wide half of the impersonated server: options, the
/// identity provider, and the connection-id allocator. Everything else is
/// per-connection.
///
/// The server does not listen for anything. The embedding accepts
/// sockets (TCP, Unix, an in-memory duplex in tests, ...) however it
/// likes and hands each established byte stream to [`serve`] together
/// with a fresh [`Session`].
///
/// [`serve`]: Server::serve
pub struct Server {
    options: Arc<ServerOptions>,
    identity: Arc<dyn IdentityProvider>,
    next_connection_id: AtomicU32,
    started: Instant,
}

impl Server {
    /// A server that lets anyone in (see [`AcceptAll`]).
    pub fn new(options: ServerOptions) -> Self {
        Self::with_identity(options, AcceptAll)
    }

    pub fn with_identity(options: ServerOptions, identity: impl IdentityProvider + 'static) -> Self {
        Self {
            options: Arc::new(options),
            identity: Arc::new(identity),
            next_connection_id: AtomicU32::new(1),
            started: Instant::now(),
        }
    }

    /// Drive one client connection over an established byte stream until
    /// it quits, disconnects, or dies of a protocol error.
    ///
    /// Connections are independent; call this from one task per accepted
    /// stream.
    pub async fn serve<S, IO>(
        &self,
        session: S,
        io: IO,
        peer_addr: impl Into<String>,
    ) -> crate::Result<()>
    where
        S: Session,
        IO: AsyncRead + AsyncWrite + Unpin + Send,
    {
        let connection_id = self.next_connection_id.fetch_add(1, Ordering::Relaxed);
        let peer_addr = peer_addr.into();

        log::debug!("connection {} accepted from {}", connection_id, peer_addr);

        Connection::new(
            io,
            session,
            Arc::clone(&self.identity),
            Arc::clone(&self.options),
            connection_id,
            peer_addr,
            self.started,
        )
        .run()
        .await
    }
}

#[cfg(test)]
mod tests {
    use super::{Server, ServerOptions};

    #[test]
    fn connection_ids_are_unique_and_increasing() {
        use std::sync::atomic::Ordering;

        let server = Server::new(ServerOptions::new());

        let a = server.next_connection_id.fetch_add(1, Ordering::Relaxed);
        let b = server.next_connection_id.fetch_add(1, Ordering::Relaxed);

        assert!(b > a);
        assert_eq!(a, 1);
    }
}
