use clap::Parser;
use codec::rfc2865::{NasPort, ReplyMessage, UserName, UserPassword};
use codec::{Code, Packet};
use client::{exchange, Context};
use tokio::time::Duration;

/// Sends an Access-Request RADIUS packet to a server and prints the
/// result.
#[derive(Parser)]
#[command(version = env!("CARGO_PKG_VERSION"))]
struct Cli {
    /// seconds to wait for the request to finish.
    #[arg(long, default_value_t = 10)]
    timeout: u64,

    user: String,
    password: String,

    /// radius server as host or host:port; the port defaults to 1812.
    server: String,

    nas_port: u32,
    secret: String,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let address = match cli.server.contains(':') {
        true => cli.server.clone(),
        false => format!("{}:1812", cli.server),
    };

    let mut packet = Packet::new(Code::AccessRequest, cli.secret.clone().into_bytes());
    packet.set::<UserName>(&cli.user)?;
    packet.set::<UserPassword>(cli.password.clone().into_bytes())?;
    packet.set::<NasPort>(cli.nas_port)?;

    let ctx = Context::with_timeout(Duration::from_secs(cli.timeout));
    let response = exchange(&ctx, &packet, &address).await?;

    match response.get::<ReplyMessage>() {
        Some(message) => println!("{} ({})", response.code, message),
        None => println!("{}", response.code),
    }

    if response.code != Code::AccessAccept {
        std::process::exit(2);
    }

    Ok(())
}
