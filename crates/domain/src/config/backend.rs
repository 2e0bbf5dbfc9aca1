use std::time::Duration;

use serde::{Deserialize, Serialize};

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Data-center backend
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BackendConfig {
    /// Backend host, optionally with a scheme. Bare hosts get `https://`.
    #[serde(default)]
    pub url: String,
    #[serde(default = "d_10000")]
    pub timeout_ms: u64,
}

impl Default for BackendConfig {
    fn default() -> Self {
        Self {
            url: String::new(),
            timeout_ms: 10_000,
        }
    }
}

impl BackendConfig {
    /// Base URL with a scheme and no trailing slash.
    pub fn base_url(&self) -> String {
        let url = self.url.trim_end_matches('/');
        if url.contains("://") {
            url.to_owned()
        } else {
            format!("https://{url}")
        }
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }
}

fn d_10000() -> u64 {
    10_000
}
