use anyhow::Result;
use codec::rfc2865::{ChapPassword, ReplyMessage, UserName, UserPassword};
use codec::{Code, Packet};
use client::{Client, Context};
use radius_server::auth::{AuthHandler, ConfigSecretSource};
use radius_server::config::Config;
use service::PacketServer;
use tokio::net::UdpSocket;
use tokio::time::Duration;

use std::sync::Arc;

const SECRET: &str = "top-secret";

fn test_config() -> Config {
    serde_json5::from_str(&format!(
        r#"{{
            auth: {{ users: {{ tim: "12345" }} }},
            secrets: {{ "127.0.0.1": "{SECRET}" }},
        }}"#
    ))
    .unwrap()
}

async fn start_server(config: Config) -> Result<(String, Arc<PacketServer<AuthHandler, ConfigSecretSource>>)> {
    let socket = UdpSocket::bind("127.0.0.1:0").await?;
    let address = socket.local_addr()?.to_string();

    let server = Arc::new(PacketServer::new(
        AuthHandler::new(&config),
        ConfigSecretSource::new(&config),
    ));

    {
        let server = server.clone();
        tokio::spawn(async move { server.serve(socket).await });
    }

    Ok((address, server))
}

fn client() -> Client {
    Client {
        retry: Duration::from_millis(50),
        ..Client::default()
    }
}

#[tokio::test]
async fn test_password_authentication() -> Result<()> {
    let (address, server) = start_server(test_config()).await?;

    let mut request = Packet::new(Code::AccessRequest, SECRET);
    request.set::<UserName>("tim")?;
    request.set::<UserPassword>(b"12345".to_vec())?;

    let response = client()
        .exchange(&Context::background(), &request, &address)
        .await?;
    assert_eq!(response.code, Code::AccessAccept);

    let mut request = Packet::new(Code::AccessRequest, SECRET);
    request.set::<UserName>("tim")?;
    request.set::<UserPassword>(b"wrong"[..].to_vec())?;

    let response = client()
        .exchange(&Context::background(), &request, &address)
        .await?;
    assert_eq!(response.code, Code::AccessReject);

    server.shutdown(&Context::background()).await?;
    Ok(())
}

#[tokio::test]
async fn test_chap_authentication() -> Result<()> {
    let (address, server) = start_server(test_config()).await?;

    let mut request = Packet::new(Code::AccessRequest, SECRET);
    request.set::<UserName>("tim")?;
    request.set::<ChapPassword>(b"12345")?;

    let response = client()
        .exchange(&Context::background(), &request, &address)
        .await?;
    assert_eq!(response.code, Code::AccessAccept);

    server.shutdown(&Context::background()).await?;
    Ok(())
}

#[tokio::test]
async fn test_unknown_user_is_rejected() -> Result<()> {
    let (address, server) = start_server(test_config()).await?;

    let mut request = Packet::new(Code::AccessRequest, SECRET);
    request.set::<UserName>("mallory")?;
    request.set::<UserPassword>(b"12345".to_vec())?;

    let response = client()
        .exchange(&Context::background(), &request, &address)
        .await?;
    assert_eq!(response.code, Code::AccessReject);

    server.shutdown(&Context::background()).await?;
    Ok(())
}

#[tokio::test]
async fn test_unknown_client_times_out() -> Result<()> {
    let mut config = test_config();
    config.secrets.clear();
    config.secrets.insert("192.0.2.1".into(), SECRET.into());

    let (address, server) = start_server(config).await?;

    let mut request = Packet::new(Code::AccessRequest, SECRET);
    request.set::<UserName>("tim")?;
    request.set::<UserPassword>(b"12345".to_vec())?;

    let err = client()
        .exchange(
            &Context::with_timeout(Duration::from_millis(200)),
            &request,
            &address,
        )
        .await
        .expect_err("an unlisted client must never get a reply");
    assert!(err.is_timeout());

    server.shutdown(&Context::background()).await?;
    Ok(())
}

#[cfg(unix)]
#[tokio::test]
async fn test_exec_program_authentication() -> Result<()> {
    use std::io::Write;
    use std::os::unix::fs::PermissionsExt;

    let dir = std::env::temp_dir().join(format!("radius-exec-{}", std::process::id()));
    std::fs::create_dir_all(&dir)?;

    let program = dir.join("authorize.sh");
    {
        let mut file = std::fs::File::create(&program)?;
        writeln!(file, "#!/bin/sh")?;
        writeln!(
            file,
            "test \"$RADIUS_USERNAME\" = flopsy && test \"$RADIUS_PASSWORD\" = carrots || exit 1"
        )?;
        writeln!(file, "echo welcome")?;
    }
    std::fs::set_permissions(&program, std::fs::Permissions::from_mode(0o755))?;

    let mut config = test_config();
    config.auth.exec = Some(program.to_string_lossy().into_owned());

    let (address, server) = start_server(config).await?;

    let mut request = Packet::new(Code::AccessRequest, SECRET);
    request.set::<UserName>("flopsy")?;
    request.set::<UserPassword>(b"carrots".to_vec())?;

    let response = client()
        .exchange(&Context::background(), &request, &address)
        .await?;
    assert_eq!(response.code, Code::AccessAccept);
    assert_eq!(response.get::<ReplyMessage>(), Some("welcome"));

    let mut request = Packet::new(Code::AccessRequest, SECRET);
    request.set::<UserName>("flopsy")?;
    request.set::<UserPassword>(b"lettuce".to_vec())?;

    let response = client()
        .exchange(&Context::background(), &request, &address)
        .await?;
    assert_eq!(response.code, Code::AccessReject);

    server.shutdown(&Context::background()).await?;
    std::fs::remove_dir_all(&dir)?;
    Ok(())
}
