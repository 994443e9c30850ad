use serde::Deserialize;
use std::net::SocketAddr;
use std::time::Duration;

/// The `[app]` table: where to listen and how long a request may run.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,

    pub port: u16,

    #[serde(default = "default_request_timeout_seconds")]
    pub request_timeout_seconds: u64,
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_request_timeout_seconds() -> u64 {
    30
}

impl ServerConfig {
    /// Gets the host:port this server binds to.
    pub fn socket_addr(&self) -> Result<SocketAddr, HostPortError> {
        if self.port == 0 {
            return Err(HostPortError::InvalidPort(self.port));
        }
        let address = format!("{}:{}", self.host, self.port).parse::<SocketAddr>()?;
        Ok(address)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_seconds)
    }
}

#[derive(Debug, thiserror::Error)]
pub enum HostPortError {
    #[error("Invalid port: {0}")]
    InvalidPort(u16),

    #[error("Invalid hostname: {0}")]
    InvalidHostname(#[from] std::net::AddrParseError),
}
