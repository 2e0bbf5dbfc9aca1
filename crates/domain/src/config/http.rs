use std::time::Duration;

use serde::{Deserialize, Serialize};

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Transient-failure retry for device requests
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// Retry policy applied to every device request before the session and
/// reconnect logic ever sees a failure.
///
/// Only 429 / 500 / 502 / 503 / 504 and transport errors are retried; the
/// wait doubles from `backoff_base_ms` (1s, 2s, 4s with the defaults).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HttpRetryConfig {
    #[serde(default = "d_3")]
    pub max_retries: u32,
    #[serde(default = "d_1000")]
    pub backoff_base_ms: u64,
}

impl Default for HttpRetryConfig {
    fn default() -> Self {
        Self {
            max_retries: 3,
            backoff_base_ms: 1_000,
        }
    }
}

impl HttpRetryConfig {
    /// Back-off before retry number `attempt` (1-indexed).
    pub fn backoff_for(&self, attempt: u32) -> Duration {
        let factor = 2u64.saturating_pow(attempt.saturating_sub(1));
        Duration::from_millis(self.backoff_base_ms.saturating_mul(factor))
    }
}

fn d_3() -> u32 {
    3
}
fn d_1000() -> u64 {
    1_000
}
