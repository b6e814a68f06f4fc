//! RADIUS server runtime.
//!
//! The codec crate understands bytes; this crate runs them.  It owns
//! the datagram read loop, the secret lookup, the duplicate-suppression
//! table, handler dispatch, and the shutdown barrier, and defines the
//! [`Context`] capability both server handlers and client exchanges are
//! cancelled through.

pub mod context;
pub mod handler;
pub mod secrets;
pub mod server;

pub use self::{
    context::{Canceller, Context, ContextError},
    handler::{Handler, HandlerFn, Request, ResponseWriter},
    secrets::{SecretSource, StaticSecretSource},
    server::PacketServer,
};

#[derive(Debug)]
pub enum Error {
    IO(std::io::Error),
    Codec(codec::Error),
    /// `serve` observed `shutdown`; the socket is no longer read.
    ServerShutdown,
    DeadlineExceeded,
    Cancelled,
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
