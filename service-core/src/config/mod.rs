use crate::error::AppError;
use config::{Config as Cfg, Environment, File};
use serde::Deserialize;
use std::net::{IpAddr, Ipv4Addr, SocketAddr};

/// Listener settings shared by every HTTP service.
#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    /// Interface to bind. Falls back to all interfaces when unset.
    #[serde(default)]
    pub ip: Option<IpAddr>,
    #[serde(default = "default_port")]
    pub port: u16,
}

fn default_port() -> u16 {
    8080
}

impl Config {
    /// Load from `configuration.*` (optional) overlaid with `{prefix}_IP` and
    /// `{prefix}_PORT` environment variables.
    pub fn load(prefix: &str) -> Result<Self, AppError> {
        dotenvy::dotenv().ok();

        let config = Cfg::builder()
            .add_source(File::with_name("configuration").required(false))
            .add_source(Environment::with_prefix(prefix).try_parsing(true))
            .build()?;

        let config: Self = config.try_deserialize()?;
        if config.ip.is_none() {
            tracing::warn!("No {}_IP environment variable", prefix);
        }
        Ok(config)
    }

    pub fn bind_addr(&self) -> SocketAddr {
        let ip = self.ip.unwrap_or(IpAddr::V4(Ipv4Addr::UNSPECIFIED));
        SocketAddr::new(ip, self.port)
    }
}
