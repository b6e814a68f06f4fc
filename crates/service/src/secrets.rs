use bytes::Bytes;

use std::net::SocketAddr;

/// A capability producing the shared secret for a remote address.
///
/// Keeping this a one-method trait lets per-client directories, remote
/// stores, or plain closures over a map compose with the server without
/// the server baking in any single secret.  Lookup failures are logged
/// and the datagram dropped; an empty secret drops it silently.
pub trait SecretSource: Send + Sync + 'static {
    fn radius_secret(
        &self,
        remote: SocketAddr,
    ) -> impl Future<Output = Result<Bytes, std::io::Error>> + Send;
}

/// The same shared secret for every client.
#[derive(Debug, Clone)]
pub struct StaticSecretSource(Bytes);

impl StaticSecretSource {
    pub fn new(secret: impl Into<Bytes>) -> Self {
        Self(secret.into())
    }
}

impl SecretSource for StaticSecretSource {
    async fn radius_secret(&self, _: SocketAddr) -> Result<Bytes, std::io::Error> {
        Ok(self.0.clone())
    }
}
