use clap::Parser;
use serde::Deserialize;

use std::collections::HashMap;
use std::fs::read_to_string;
use std::net::SocketAddr;

#[derive(Deserialize, Debug)]
pub struct Radius {
    /// radius server listen address
    ///
    /// the address and port bound by the UDP server.  the conventional
    /// authentication port is 1812; accounting deployments usually run
    /// a second instance on 1813.  ipv4 and ipv6 are both supported.
    #[serde(default = "Radius::listen")]
    pub listen: SocketAddr,

    /// handler retransmission behavior
    ///
    /// when enabled, a retransmitted request is handed to the handler
    /// again while the first dispatch is still running.  the default
    /// suppresses in-flight duplicates, which is what NAS retry
    /// behavior over UDP wants.
    #[serde(default)]
    pub allow_retransmission: bool,

    /// skip request authenticity verification
    ///
    /// Warn: disables the shared-secret check on incoming accounting
    /// and dynamic-authorization requests.  this exists for debugging
    /// against broken clients, do not enable it in production.
    #[serde(default)]
    pub insecure_skip_verify: bool,
}

impl Radius {
    fn listen() -> SocketAddr {
        "127.0.0.1:1812".parse().unwrap()
    }
}

impl Default for Radius {
    fn default() -> Self {
        Self {
            listen: Self::listen(),
            allow_retransmission: false,
            insecure_skip_verify: false,
        }
    }
}

#[derive(Deserialize, Debug, Default)]
pub struct Auth {
    /// static user password table
    ///
    /// username to plaintext password.  requests carrying User-Password
    /// or CHAP-Password are checked against this table first.
    #[serde(default)]
    pub users: HashMap<String, String>,

    /// external authentication program
    ///
    /// when set, requests that miss the static table are decided by
    /// running this program; exit status zero accepts.  the credentials
    /// are passed in the RADIUS_USERNAME and RADIUS_PASSWORD
    /// environment variables, and anything the program prints on
    /// standard output is attached as a Reply-Message.
    #[serde(default)]
    pub exec: Option<String>,
}

#[derive(Deserialize, Debug)]
pub enum LogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl Default for LogLevel {
    fn default() -> Self {
        Self::Info
    }
}

impl LogLevel {
    pub fn as_level(&self) -> log::Level {
        match *self {
            Self::Error => log::Level::Error,
            Self::Warn => log::Level::Warn,
            Self::Info => log::Level::Info,
            Self::Debug => log::Level::Debug,
            Self::Trace => log::Level::Trace,
        }
    }
}

#[derive(Deserialize, Debug, Default)]
pub struct Log {
    /// log level
    ///
    /// An enum representing the available verbosity levels of the logger.
    #[serde(default)]
    pub level: LogLevel,
}

#[derive(Deserialize, Debug, Default)]
pub struct Config {
    #[serde(default)]
    pub radius: Radius,
    #[serde(default)]
    pub auth: Auth,
    #[serde(default)]
    pub log: Log,

    /// per-client shared secrets
    ///
    /// client source address (without port) to shared secret.  the
    /// entry "*" is the fallback for addresses not listed; a client
    /// with no entry at all is dropped silently.
    #[serde(default)]
    pub secrets: HashMap<String, String>,
}

#[derive(Parser)]
#[command(
    about = env!("CARGO_PKG_DESCRIPTION"),
    version = env!("CARGO_PKG_VERSION"),
)]
struct Cli {
    /// specify the configuration file path.
    #[arg(long)]
    config: Option<String>,
}

impl Config {
    /// Load command line parameters; if a configuration file path is
    /// specified the configuration is read from it, otherwise the
    /// defaults apply.
    pub fn load() -> anyhow::Result<Self> {
        let payload = match Cli::parse().config {
            Some(path) => read_to_string(path)?,
            None => return Ok(Self::default()),
        };

        Ok(serde_json5::from_str(&payload)?)
    }
}
