//! Server configuration.
//!
//! Every option is a CLI flag that can also be set through the environment
//! variable named next to it.

use std::net::SocketAddr;
use std::path::PathBuf;
use std::time::Duration;

use clap::Parser;

#[derive(Parser, Debug, Clone)]
#[command(name = "kanthor-playground")]
#[command(version, about = "Kanthor playground - try webhook delivery end to end")]
pub struct Args {
    /// Address to listen on.
    #[arg(long, default_value = "0.0.0.0:9081", env = "LISTEN_ADDR")]
    pub addr: SocketAddr,

    /// Directory holding the weekly record store files.
    #[arg(long, default_value = "./", env = "STORAGE_PATH")]
    pub storage_path: PathBuf,

    /// Public base URL of this server; webhook endpoints point here.
    #[arg(
        long,
        default_value = "http://localhost:9081",
        env = "KANTHOR_PLAYGROUND_ENDPOINT"
    )]
    pub playground_endpoint: String,

    /// API base URL shown to users instead of the client's own.
    #[arg(long, env = "KANTHOR_SDK_ENDPOINT_PUBLIC")]
    pub sdk_endpoint_public: Option<String>,

    /// Platform API host override.
    #[arg(long, env = "KANTHOR_SDK_HOST")]
    pub sdk_host: Option<String>,

    /// Base URL of the provisioning portal.
    #[arg(
        long,
        default_value = "http://localhost:8180",
        env = "KANTHOR_PORTAL_ENDPOINT"
    )]
    pub portal_endpoint: String,

    /// Basic-auth token for the portal.
    #[arg(long, default_value = "", env = "KANTHOR_PORTAL_AUTH_CREDENTIALS")]
    pub portal_auth_credentials: String,

    /// Directory served under `/assets`.
    #[arg(long, default_value = "./assets", env = "ASSETS_DIR")]
    pub assets_dir: PathBuf,

    /// Deadline for calls to the platform, in seconds.
    #[arg(long, default_value_t = 60, env = "BOOTSTRAP_TIMEOUT")]
    pub bootstrap_timeout: u64,

    /// Output logs as JSON.
    #[arg(long, env = "LOG_JSON")]
    pub log_json: bool,
}

/// Runtime configuration shared by the handlers.
#[derive(Debug, Clone)]
pub struct PlaygroundConfig {
    pub playground_endpoint: String,
    pub sdk_endpoint_public: Option<String>,
    pub sdk_host: Option<String>,
    pub portal_endpoint: String,
    pub portal_auth_credentials: String,
    pub assets_dir: PathBuf,
    pub bootstrap_timeout: Duration,
}

impl PlaygroundConfig {
    /// Defaults suitable for tests, pointing at the given portal and platform.
    pub fn new(
        playground_endpoint: impl Into<String>,
        portal_endpoint: impl Into<String>,
        sdk_host: Option<String>,
    ) -> Self {
        Self {
            playground_endpoint: playground_endpoint.into(),
            sdk_endpoint_public: None,
            sdk_host,
            portal_endpoint: portal_endpoint.into(),
            portal_auth_credentials: String::new(),
            assets_dir: PathBuf::from("./assets"),
            bootstrap_timeout: Duration::from_secs(60),
        }
    }
}

impl From<&Args> for PlaygroundConfig {
    fn from(args: &Args) -> Self {
        Self {
            playground_endpoint: args.playground_endpoint.clone(),
            sdk_endpoint_public: non_empty(args.sdk_endpoint_public.as_deref()),
            sdk_host: non_empty(args.sdk_host.as_deref()),
            portal_endpoint: args.portal_endpoint.clone(),
            portal_auth_credentials: args.portal_auth_credentials.clone(),
            assets_dir: args.assets_dir.clone(),
            bootstrap_timeout: Duration::from_secs(args.bootstrap_timeout),
        }
    }
}

fn non_empty(value: Option<&str>) -> Option<String> {
    value.map(str::trim).filter(|v| !v.is_empty()).map(String::from)
}
