use std::time::Duration;

use serde::{Deserialize, Serialize};

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Sound-level device connection
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeviceConfig {
    #[serde(default = "d_host")]
    pub host: String,
    #[serde(default = "d_80")]
    pub port: u16,
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub password: String,
    /// Per-request timeout for authenticated device calls.
    #[serde(default = "d_10000")]
    pub request_timeout_ms: u64,
    /// TCP connect budget for the reachability probe.
    #[serde(default = "d_3000")]
    pub probe_timeout_ms: u64,
    /// Header the device reads the session cookie from.
    #[serde(default = "d_cookie_header")]
    pub cookie_header: String,
}

impl Default for DeviceConfig {
    fn default() -> Self {
        Self {
            host: d_host(),
            port: 80,
            username: String::new(),
            password: String::new(),
            request_timeout_ms: 10_000,
            probe_timeout_ms: 3_000,
            cookie_header: d_cookie_header(),
        }
    }
}

impl DeviceConfig {
    /// `http://host:port`, without a trailing slash.
    pub fn base_url(&self) -> String {
        format!("http://{}:{}", self.host, self.port)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_millis(self.request_timeout_ms)
    }

    pub fn probe_timeout(&self) -> Duration {
        Duration::from_millis(self.probe_timeout_ms)
    }
}

// ── serde default helpers ───────────────────────────────────────────

fn d_host() -> String {
    "192.168.11.88".into()
}
fn d_80() -> u16 {
    80
}
fn d_10000() -> u64 {
    10_000
}
fn d_3000() -> u64 {
    3_000
}
fn d_cookie_header() -> String {
    "CRYCookie".into()
}
