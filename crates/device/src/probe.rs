//! TCP-level reachability check, independent of authentication.

use std::time::Duration;

use async_trait::async_trait;
use sr_domain::config::DeviceConfig;
use tokio::net::TcpStream;

/// Whether `host:port` accepts a TCP connection within `timeout`.
///
/// Refused, unreachable, DNS failure and timeout all yield `false`.  The
/// socket is dropped immediately; there is no retry here.
pub async fn probe(host: &str, port: u16, timeout: Duration) -> bool {
    match tokio::time::timeout(timeout, TcpStream::connect((host, port))).await {
        Ok(Ok(_stream)) => true,
        Ok(Err(e)) => {
            tracing::debug!(host, port, error = %e, "device unreachable");
            false
        }
        Err(_) => {
            tracing::debug!(
                host,
                port,
                timeout_ms = timeout.as_millis() as u64,
                "device probe timed out"
            );
            false
        }
    }
}

/// Something that can tell whether the device is up.
#[async_trait]
pub trait Reachability: Send + Sync {
    async fn probe(&self) -> bool;

    /// `host:port` for log lines.
    fn target(&self) -> String;
}

#[derive(Debug, Clone)]
pub struct TcpProber {
    host: String,
    port: u16,
    timeout: Duration,
}

impl TcpProber {
    pub fn new(host: impl Into<String>, port: u16, timeout: Duration) -> Self {
        Self {
            host: host.into(),
            port,
            timeout,
        }
    }

    pub fn from_config(cfg: &DeviceConfig) -> Self {
        Self::new(cfg.host.clone(), cfg.port, cfg.probe_timeout())
    }
}

#[async_trait]
impl Reachability for TcpProber {
    async fn probe(&self) -> bool {
        probe(&self.host, self.port, self.timeout).await
    }

    fn target(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}
