pub mod auth;
pub mod config;

use service::PacketServer;

use std::sync::Arc;

use crate::auth::{AuthHandler, ConfigSecretSource};
use crate::config::Config;

/// In order to let integration tests start the daemon without going
/// through a process boundary, the main function body lives here.
pub async fn server_main(config: Arc<Config>) -> anyhow::Result<()> {
    let server = PacketServer::new(
        AuthHandler::new(&config),
        ConfigSecretSource::new(&config),
    )
    .allow_retransmission(config.radius.allow_retransmission)
    .insecure_skip_verify(config.radius.insecure_skip_verify);

    server.listen_and_serve(config.radius.listen).await?;
    Ok(())
}
