use codec::{Code, Packet};
use tokio::net::UdpSocket;

use std::net::SocketAddr;
use std::ops::Deref;
use std::sync::Arc;

use crate::{context::Context, Error};

/// An accepted request on its way to a handler.
///
/// The server owns the packet exclusively while the handler runs; a
/// handler that needs it longer clones it.  The context is cancelled
/// when the server shuts down.
#[derive(Debug, Clone)]
pub struct Request {
    pub packet: Packet,
    pub local_addr: SocketAddr,
    pub remote_addr: SocketAddr,
    pub(crate) context: Context,
}

impl Request {
    pub fn context(&self) -> &Context {
        &self.context
    }

    /// A reply packet that the codec will sign correctly, sharing the
    /// request's identifier, authenticator and secret.
    pub fn response(&self, code: Code) -> Packet {
        self.packet.response(code)
    }
}

impl Deref for Request {
    type Target = Packet;

    fn deref(&self) -> &Self::Target {
        &self.packet
    }
}

/// Replies to the remote that sent the request.  A handler may write
/// any number of packets; each goes out as one datagram.
#[derive(Debug, Clone)]
pub struct ResponseWriter {
    socket: Arc<UdpSocket>,
    local_addr: SocketAddr,
    remote_addr: SocketAddr,
}

impl ResponseWriter {
    pub(crate) fn new(socket: Arc<UdpSocket>, local_addr: SocketAddr, remote_addr: SocketAddr) -> Self {
        Self {
            socket,
            local_addr,
            remote_addr,
        }
    }

    pub fn local_addr(&self) -> SocketAddr {
        self.local_addr
    }

    pub fn remote_addr(&self) -> SocketAddr {
        self.remote_addr
    }

    /// Encode and send one reply datagram to the request's origin.
    pub async fn write(&self, packet: &Packet) -> Result<(), Error> {
        let wire = packet.encode()?;
        self.send(&wire).await
    }

    /// Send pre-encoded bytes to the request's origin.
    pub async fn send(&self, wire: &[u8]) -> Result<(), Error> {
        self.socket.send_to(wire, self.remote_addr).await?;
        Ok(())
    }
}

/// A value that can handle the server's packet events.
pub trait Handler: Send + Sync + 'static {
    fn serve_radius(
        &self,
        writer: ResponseWriter,
        request: Request,
    ) -> impl Future<Output = ()> + Send;
}

/// Wrapper that lets a plain async closure serve as a [`Handler`].
///
/// # Unit Test
///
/// ```
/// use radius_server_service::{HandlerFn, StaticSecretSource, PacketServer};
/// use codec::Code;
///
/// let handler = HandlerFn::new(|writer, request| async move {
///     let _ = writer.write(&request.response(Code::AccessReject)).await;
/// });
///
/// let _server = PacketServer::new(handler, StaticSecretSource::new(&b"12345"[..]));
/// ```
pub struct HandlerFn<F>(F);

impl<F, Fut> HandlerFn<F>
where
    F: Fn(ResponseWriter, Request) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = ()> + Send,
{
    pub fn new(handler: F) -> Self {
        Self(handler)
    }
}

impl<F, Fut> Handler for HandlerFn<F>
where
    F: Fn(ResponseWriter, Request) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = ()> + Send,
{
    fn serve_radius(
        &self,
        writer: ResponseWriter,
        request: Request,
    ) -> impl Future<Output = ()> + Send {
        (self.0)(writer, request)
    }
}
