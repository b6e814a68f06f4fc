use ahash::AHashMap;
use codec::{crypto::is_authentic_request, Packet, MAX_PACKET_LENGTH};
use parking_lot::Mutex;
use tokio::net::{ToSocketAddrs, UdpSocket};
use tokio::sync::watch;

use std::io::ErrorKind;
use std::net::SocketAddr;
use std::sync::Arc;

use crate::{
    context::Context,
    handler::{Handler, Request, ResponseWriter},
    secrets::SecretSource,
    Error,
};

/// The conventional authentication port.
pub const DEFAULT_AUTH_ADDRESS: &str = "0.0.0.0:1812";

/// One in-flight request, for duplicate suppression.
///
/// The key carries the first authenticator bytes beside the remote
/// address and identifier, so two clients behind one NAT reusing an
/// identifier cannot shadow each other.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
struct RequestKey {
    remote: String,
    identifier: u8,
    authenticator: [u8; 4],
}

impl RequestKey {
    fn new(remote: SocketAddr, packet: &Packet) -> Self {
        let mut authenticator = [0u8; 4];
        authenticator.copy_from_slice(&packet.authenticator[..4]);

        Self {
            remote: remote.to_string(),
            identifier: packet.identifier,
            authenticator,
        }
    }
}

struct Shared {
    // set once at shutdown; read loop and request contexts watch it.
    shutdown: watch::Sender<bool>,
    // in-flight handler count per key; a slot holds the dedup claim.
    active: Mutex<AHashMap<RequestKey, usize>>,
    // total in-flight handlers, the shutdown barrier waits on zero.
    handlers: watch::Sender<usize>,
}

impl Shared {
    fn claim(&self, key: &RequestKey, allow_retransmission: bool) -> bool {
        let mut active = self.active.lock();
        match active.get_mut(key) {
            None => {
                active.insert(key.clone(), 1);
                true
            }
            Some(_) if !allow_retransmission => false,
            Some(count) => {
                *count += 1;
                true
            }
        }
    }

    fn release(&self, key: &RequestKey) {
        let mut active = self.active.lock();
        if let Some(count) = active.get_mut(key) {
            *count -= 1;
            if *count == 0 {
                active.remove(key);
            }
        }
    }
}

/// A server dispatching RADIUS datagrams to a [`Handler`].
///
/// The server moves idle → serving → shutting-down: [`serve`] runs the
/// read loop until [`shutdown`] is observed, shutdown cancels every
/// request context and waits for the handlers to drain.  Shutting down
/// twice is harmless.
///
/// [`serve`]: PacketServer::serve
/// [`shutdown`]: PacketServer::shutdown
pub struct PacketServer<H, S> {
    handler: Arc<H>,
    secret_source: Arc<S>,
    insecure_skip_verify: bool,
    allow_retransmission: bool,
    shared: Arc<Shared>,
}

impl<H, S> PacketServer<H, S>
where
    H: Handler,
    S: SecretSource,
{
    pub fn new(handler: H, secret_source: S) -> Self {
        Self {
            handler: Arc::new(handler),
            secret_source: Arc::new(secret_source),
            insecure_skip_verify: false,
            allow_retransmission: false,
            shared: Arc::new(Shared {
                shutdown: watch::Sender::new(false),
                active: Mutex::default(),
                handlers: watch::Sender::new(0),
            }),
        }
    }

    /// Skip incoming packet authenticity validation.  Debugging only.
    pub fn insecure_skip_verify(mut self, skip: bool) -> Self {
        self.insecure_skip_verify = skip;
        self
    }

    /// Dispatch retransmitted requests to the handler again instead of
    /// suppressing them while the first dispatch is in flight.
    pub fn allow_retransmission(mut self, allow: bool) -> Self {
        self.allow_retransmission = allow;
        self
    }

    /// Bind a UDP socket and serve on it.
    pub async fn listen_and_serve(&self, address: impl ToSocketAddrs) -> Result<(), Error> {
        self.serve(UdpSocket::bind(address).await?).await
    }

    /// Accept and dispatch datagrams until shutdown.
    pub async fn serve(&self, socket: UdpSocket) -> Result<(), Error> {
        if *self.shared.shutdown.borrow() {
            return Err(Error::ServerShutdown);
        }

        let socket = Arc::new(socket);
        let local_addr = socket.local_addr()?;
        let mut shutdown = self.shared.shutdown.subscribe();
        let mut buf = vec![0u8; MAX_PACKET_LENGTH];

        log::info!("radius server listening: {}", local_addr);

        loop {
            let (size, remote) = tokio::select! {
                _ = shutdown.wait_for(|shutdown| *shutdown) => {
                    return Err(Error::ServerShutdown);
                }
                received = socket.recv_from(&mut buf) => match received {
                    Ok(received) => received,
                    // the peer half of a connected flow going away is
                    // not a listener failure.
                    Err(e) if e.kind() == ErrorKind::ConnectionReset => continue,
                    Err(e) => return Err(e.into()),
                },
            };

            log::trace!("udp socket receive: size={}, addr={:?}", size, remote);

            let secret = match self.secret_source.radius_secret(remote).await {
                Ok(secret) => secret,
                Err(e) => {
                    log::warn!("secret lookup failed: addr={:?}, error={}", remote, e);
                    continue;
                }
            };

            // an empty secret means this peer is unknown.
            if secret.is_empty() {
                continue;
            }

            if !self.insecure_skip_verify && !is_authentic_request(&buf[..size], &secret) {
                log::debug!("non-authentic request dropped: addr={:?}", remote);
                continue;
            }

            let packet = match Packet::parse(&buf[..size], secret) {
                Ok(packet) => packet,
                Err(e) => {
                    log::debug!("malformed request dropped: addr={:?}, error={}", remote, e);
                    continue;
                }
            };

            let key = RequestKey::new(remote, &packet);
            if !self.shared.claim(&key, self.allow_retransmission) {
                log::trace!("in-flight duplicate dropped: addr={:?}", remote);
                continue;
            }

            self.dispatch(packet, key, socket.clone(), local_addr, remote);
        }
    }

    fn dispatch(
        &self,
        packet: Packet,
        key: RequestKey,
        socket: Arc<UdpSocket>,
        local_addr: SocketAddr,
        remote_addr: SocketAddr,
    ) {
        let request = Request {
            packet,
            local_addr,
            remote_addr,
            context: Context::from_watch(self.shared.shutdown.subscribe()),
        };

        let writer = ResponseWriter::new(socket, local_addr, remote_addr);
        let handler = self.handler.clone();
        let shared = self.shared.clone();

        shared.handlers.send_modify(|count| *count += 1);

        tokio::spawn(async move {
            // the handler runs on its own task so a panic unwinds that
            // task alone and still releases the dedup slot here.
            let handled =
                tokio::spawn(async move { handler.serve_radius(writer, request).await }).await;

            if let Err(e) = handled {
                if e.is_panic() {
                    log::error!("handler panicked: addr={:?}", remote_addr);
                }
            }

            shared.release(&key);
            shared.handlers.send_modify(|count| *count -= 1);
        });
    }

    /// Stop reading, cancel every request context, and wait for the
    /// in-flight handlers, bounded by `ctx`.
    pub async fn shutdown(&self, ctx: &Context) -> Result<(), Error> {
        let _ = self.shared.shutdown.send(true);

        let mut handlers = self.shared.handlers.subscribe();
        tokio::select! {
            err = ctx.done() => Err(err.into()),
            drained = handlers.wait_for(|count| *count == 0) => {
                let _ = drained;
                Ok(())
            }
        }
    }
}
