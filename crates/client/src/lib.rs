//! RADIUS client exchange engine.
//!
//! An exchange serializes a request once, fires it at the server over a
//! connected UDP socket, re-sends on a retry timer, and resolves with
//! the first datagram that parses and proves authentic against the
//! request authenticator.  The transport is unreliable by design, so a
//! bounded number of spurious or malformed datagrams is tolerated
//! before the exchange gives up.

use codec::{crypto::is_authentic_response, Packet, MAX_PACKET_LENGTH};
use tokio::net::{lookup_host, UdpSocket};
use tokio::time::{interval_at, Duration, Instant};

use std::net::{IpAddr, Ipv4Addr, Ipv6Addr, SocketAddr};

pub use service::context::{Canceller, Context, ContextError};

/// The interval between request re-sends when none is configured.
pub const DEFAULT_RETRY: Duration = Duration::from_secs(2);

/// The retry floor; anything lower would flood the server.
pub const MIN_RETRY: Duration = Duration::from_millis(100);

/// Spurious or malformed datagrams tolerated per exchange when none is
/// configured.
pub const DEFAULT_MAX_PACKET_ERRORS: u32 = 10;

#[derive(Debug)]
pub enum Error {
    IO(std::io::Error),
    Codec(codec::Error),
    /// A datagram parsed but failed the response authenticity check,
    /// more often than the error budget allows.
    NonAuthenticResponse,
    DeadlineExceeded,
    Cancelled,
}

impl Error {
    /// Whether the exchange failed because time ran out, as opposed to
    /// being cancelled or receiving something unusable.
    pub fn is_timeout(&self) -> bool {
        match self {
            Self::DeadlineExceeded => true,
            Self::IO(e) => e.kind() == std::io::ErrorKind::TimedOut,
            _ => false,
        }
    }
}

impl std::error::Error for Error {}

impl std::fmt::Display for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:?}", self)
    }
}

impl From<std::io::Error> for Error {
    fn from(value: std::io::Error) -> Self {
        Self::IO(value)
    }
}

impl From<codec::Error> for Error {
    fn from(value: codec::Error) -> Self {
        Self::Codec(value)
    }
}

impl From<ContextError> for Error {
    fn from(value: ContextError) -> Self {
        match value {
            ContextError::DeadlineExceeded => Self::DeadlineExceeded,
            ContextError::Cancelled => Self::Cancelled,
        }
    }
}

/// A RADIUS client.
#[derive(Debug, Clone)]
pub struct Client {
    /// Interval at which the request is re-sent.  Clamped to
    /// [`MIN_RETRY`].
    pub retry: Duration,
    /// How many unusable datagrams one exchange tolerates before it
    /// surfaces the last error.
    pub max_packet_errors: u32,
}

impl Default for Client {
    fn default() -> Self {
        Self {
            retry: DEFAULT_RETRY,
            max_packet_errors: DEFAULT_MAX_PACKET_ERRORS,
        }
    }
}

impl Client {
    /// Send `packet` to `address` and wait for an authentic response.
    ///
    /// The request bytes are encoded once, so every retry puts the same
    /// datagram on the wire.  Concurrent exchanges are independent:
    /// each owns its socket, and the first authentic response wins.
    ///
    /// # Test
    ///
    /// ```no_run
    /// use codec::rfc2865::{UserName, UserPassword};
    /// use codec::{Code, Packet};
    /// use radius_client::{Client, Context};
    ///
    /// #[tokio::main(flavor = "current_thread")]
    /// async fn main() -> Result<(), Box<dyn std::error::Error>> {
    ///     let mut request = Packet::new(Code::AccessRequest, &b"secret"[..]);
    ///     request.set::<UserName>("tim")?;
    ///     request.set::<UserPassword>(b"12345".to_vec())?;
    ///
    ///     let client = Client::default();
    ///     let response = client
    ///         .exchange(&Context::background(), &request, "localhost:1812")
    ///         .await?;
    ///
    ///     println!("code: {}", response.code);
    ///     Ok(())
    /// }
    /// ```
    pub async fn exchange(
        &self,
        ctx: &Context,
        packet: &Packet,
        address: &str,
    ) -> Result<Packet, Error> {
        let wire = packet.encode()?;

        let target = lookup_host(address).await?.next().ok_or_else(|| {
            Error::IO(std::io::Error::new(
                std::io::ErrorKind::NotFound,
                "no address resolved",
            ))
        })?;

        let socket = UdpSocket::bind(unspecified_for(&target)).await?;
        socket.connect(target).await?;
        socket.send(&wire).await?;

        let retry = self.retry.max(MIN_RETRY);
        let mut ticker = interval_at(Instant::now() + retry, retry);
        let mut errors = 0u32;
        let mut buf = vec![0u8; MAX_PACKET_LENGTH];

        loop {
            tokio::select! {
                _ = ticker.tick() => {
                    socket.send(&wire).await?;
                }
                err = ctx.done() => {
                    return Err(err.into());
                }
                received = socket.recv(&mut buf) => {
                    let size = received?;
                    match accept(&buf[..size], &wire, packet) {
                        Ok(response) => return Ok(response),
                        Err(e) => {
                            errors += 1;
                            if errors > self.max_packet_errors {
                                return Err(e);
                            }
                        }
                    }
                }
            }
        }
    }
}

/// One-shot exchange with the default client.
pub async fn exchange(ctx: &Context, packet: &Packet, address: &str) -> Result<Packet, Error> {
    Client::default().exchange(ctx, packet, address).await
}

fn accept(bytes: &[u8], request_wire: &[u8], request: &Packet) -> Result<Packet, Error> {
    let response = Packet::parse(bytes, request.secret.clone())?;

    if !is_authentic_response(bytes, request_wire, &request.secret) {
        return Err(Error::NonAuthenticResponse);
    }

    Ok(response)
}

fn unspecified_for(target: &SocketAddr) -> SocketAddr {
    match target {
        SocketAddr::V4(_) => SocketAddr::new(IpAddr::V4(Ipv4Addr::UNSPECIFIED), 0),
        SocketAddr::V6(_) => SocketAddr::new(IpAddr::V6(Ipv6Addr::UNSPECIFIED), 0),
    }
}
