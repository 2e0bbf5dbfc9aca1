use std::time::Duration;

use serde::{Deserialize, Serialize};

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Device session / login policy
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionConfig {
    #[serde(default = "d_5000")]
    pub login_timeout_ms: u64,
    #[serde(default = "d_5")]
    pub login_max_attempts: u32,
    #[serde(default = "d_3000")]
    pub login_retry_delay_ms: u64,
    #[serde(default)]
    pub stale_token_policy: StaleTokenPolicy,
}

/// What happens to the cookie once the device has rejected it.
///
/// * `Retain`: keep sending the old cookie until a re-login succeeds.
///   A failed re-login therefore leaves the known-expired token in place.
/// * `Discard`: drop the cookie the moment expiry is detected, so a
///   rejected token is never sent again.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StaleTokenPolicy {
    #[default]
    Retain,
    Discard,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            login_timeout_ms: 5_000,
            login_max_attempts: 5,
            login_retry_delay_ms: 3_000,
            stale_token_policy: StaleTokenPolicy::Retain,
        }
    }
}

impl SessionConfig {
    pub fn login_timeout(&self) -> Duration {
        Duration::from_millis(self.login_timeout_ms)
    }

    pub fn login_retry_delay(&self) -> Duration {
        Duration::from_millis(self.login_retry_delay_ms)
    }
}

fn d_5000() -> u64 {
    5_000
}
fn d_5() -> u32 {
    5
}
fn d_3000() -> u64 {
    3_000
}
