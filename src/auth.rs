use bytes::Bytes;
use codec::rfc2865::{verify_chap_password, ReplyMessage, UserName, UserPassword};
use codec::Code;
use service::{Handler, Request, ResponseWriter, SecretSource};
use tokio::process::Command;

use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::Arc;

use crate::config::Config;

/// Per-client shared secrets from the configuration, with `*` as the
/// fallback entry.
pub struct ConfigSecretSource {
    secrets: HashMap<String, Bytes>,
}

impl ConfigSecretSource {
    pub fn new(config: &Config) -> Self {
        Self {
            secrets: config
                .secrets
                .iter()
                .map(|(client, secret)| (client.clone(), Bytes::from(secret.clone())))
                .collect(),
        }
    }
}

impl SecretSource for ConfigSecretSource {
    async fn radius_secret(&self, remote: SocketAddr) -> Result<Bytes, std::io::Error> {
        let secret = self
            .secrets
            .get(&remote.ip().to_string())
            .or_else(|| self.secrets.get("*"))
            .cloned()
            .unwrap_or_default();

        Ok(secret)
    }
}

/// The authentication handler of the daemon.
///
/// Credentials are checked against the static user table first; a miss
/// falls through to the external program when one is configured, with
/// the credentials exported as RADIUS_USERNAME and RADIUS_PASSWORD and
/// the program's standard output echoed back as a Reply-Message.
#[derive(Clone)]
pub struct AuthHandler {
    users: Arc<HashMap<String, String>>,
    exec: Option<Arc<String>>,
}

impl AuthHandler {
    pub fn new(config: &Config) -> Self {
        Self {
            users: Arc::new(config.auth.users.clone()),
            exec: config.auth.exec.clone().map(Arc::new),
        }
    }

    fn check_static(&self, request: &Request) -> Option<bool> {
        let username = request.get::<UserName>()?;
        let expected = self.users.get(username)?;

        if let Some(password) = request.get::<UserPassword>() {
            return Some(password == expected.as_bytes());
        }

        if request.attributes.get(3).is_some() {
            return Some(verify_chap_password(request, expected.as_bytes()));
        }

        None
    }

    async fn check_exec(&self, request: &Request) -> Option<(bool, String)> {
        let program = self.exec.as_ref()?;
        let username = request.get::<UserName>()?.to_string();
        let password = request.get::<UserPassword>()?;

        let output = Command::new(program.as_str())
            .env("RADIUS_USERNAME", &username)
            .env("RADIUS_PASSWORD", String::from_utf8_lossy(&password).as_ref())
            .output()
            .await;

        match output {
            Err(e) => {
                log::error!("auth program failed to run: {}", e);
                Some((false, String::new()))
            }
            Ok(output) => Some((
                output.status.success(),
                String::from_utf8_lossy(&output.stdout).trim_end().to_string(),
            )),
        }
    }
}

impl Handler for AuthHandler {
    async fn serve_radius(&self, writer: ResponseWriter, request: Request) {
        if request.code != Code::AccessRequest {
            log::debug!(
                "ignoring {} from {}",
                request.code,
                request.remote_addr
            );
            return;
        }

        let username = request.get::<UserName>().unwrap_or_default().to_string();

        let (accepted, message) = match self.check_static(&request) {
            Some(accepted) => (accepted, String::new()),
            None => self.check_exec(&request).await.unwrap_or((false, String::new())),
        };

        let code = match accepted {
            true => Code::AccessAccept,
            false => Code::AccessReject,
        };

        log::info!(
            "auth: user={:?}, addr={}, id={}, result={}",
            username,
            request.remote_addr,
            request.identifier,
            code
        );

        let mut response = request.response(code);
        if !message.is_empty() {
            if let Err(e) = response.set::<ReplyMessage>(&message) {
                log::error!("reply message rejected: {}", e);
            }
        }

        if let Err(e) = writer.write(&response).await {
            log::error!("response write failed: addr={}, error={}", request.remote_addr, e);
        }
    }
}
