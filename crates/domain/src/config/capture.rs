use std::time::Duration;

use serde::{Deserialize, Serialize};

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Capture loop pacing
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CaptureConfig {
    /// Sleep between capture cycles.
    #[serde(default = "d_10")]
    pub interval_secs: u64,
    /// Number of cycles to run when `infinite` is false.
    #[serde(default = "d_1")]
    pub count: u64,
    #[serde(default)]
    pub infinite: bool,
    /// Sleep between reconnect rounds (unreachable host or exhausted login).
    #[serde(default = "d_10")]
    pub reconnect_delay_secs: u64,
}

impl Default for CaptureConfig {
    fn default() -> Self {
        Self {
            interval_secs: 10,
            count: 1,
            infinite: false,
            reconnect_delay_secs: 10,
        }
    }
}

impl CaptureConfig {
    pub fn interval(&self) -> Duration {
        Duration::from_secs(self.interval_secs)
    }

    pub fn reconnect_delay(&self) -> Duration {
        Duration::from_secs(self.reconnect_delay_secs)
    }

    /// Cycle limit, or `None` when running unbounded.
    pub fn limit(&self) -> Option<u64> {
        if self.infinite {
            None
        } else {
            Some(self.count)
        }
    }
}

fn d_10() -> u64 {
    10
}
fn d_1() -> u64 {
    1
}
