mod backend;
mod capture;
mod device;
mod http;
mod observability;
mod session;

pub use backend::*;
pub use capture::*;
pub use device::*;
pub use http::*;
pub use observability::*;
pub use session::*;

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::{Error, Result};

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Top-level config
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    #[serde(default)]
    pub device: DeviceConfig,
    #[serde(default)]
    pub session: SessionConfig,
    #[serde(default)]
    pub http: HttpRetryConfig,
    #[serde(default)]
    pub backend: BackendConfig,
    #[serde(default)]
    pub capture: CaptureConfig,
    #[serde(default)]
    pub observability: ObservabilityConfig,
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Environment overrides
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// Deployment environment variables and the fields they override.
pub const ENV_HOST: &str = "HOST";
pub const ENV_HTTP_PORT: &str = "HTTP_PORT";
pub const ENV_USERNAME: &str = "CRY_USERNAME";
pub const ENV_PASSWORD: &str = "CRY_PASSWORD";
pub const ENV_BACKEND: &str = "DATA_CENTER_BACKEND";
pub const ENV_INTERVAL: &str = "INTERVAL_SECONDS";
pub const ENV_COUNT: &str = "COUNT";
pub const ENV_INFINITE: &str = "INFINITE";

impl Config {
    /// Overlay environment variables on top of the file config.
    ///
    /// `lookup` abstracts `std::env::var` so tests can inject a map.
    /// Unset (or empty) variables leave the file value alone; a numeric
    /// variable that fails to parse is an error.
    pub fn apply_env<F>(&mut self, lookup: F) -> Result<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        if let Some(host) = get(ENV_HOST) {
            self.device.host = host;
        }
        if let Some(port) = get(ENV_HTTP_PORT) {
            self.device.port = parse_env(ENV_HTTP_PORT, &port)?;
        }
        if let Some(user) = get(ENV_USERNAME) {
            self.device.username = user;
        }
        if let Some(pass) = get(ENV_PASSWORD) {
            self.device.password = pass;
        }
        if let Some(url) = get(ENV_BACKEND) {
            self.backend.url = url;
        }
        if let Some(secs) = get(ENV_INTERVAL) {
            self.capture.interval_secs = parse_env(ENV_INTERVAL, &secs)?;
        }
        if let Some(count) = get(ENV_COUNT) {
            self.capture.count = parse_env(ENV_COUNT, &count)?;
        }
        if let Some(flag) = get(ENV_INFINITE) {
            self.capture.infinite = flag.trim().eq_ignore_ascii_case("true");
        }
        Ok(())
    }

    /// [`apply_env`](Self::apply_env) against the process environment.
    pub fn apply_process_env(&mut self) -> Result<()> {
        self.apply_env(|key| std::env::var(key).ok())
    }

    /// A copy safe to print: the device password is masked.
    pub fn redacted(&self) -> Config {
        let mut copy = self.clone();
        if !copy.device.password.is_empty() {
            copy.device.password = "********".into();
        }
        copy
    }
}

fn parse_env<T: std::str::FromStr>(key: &str, raw: &str) -> Result<T>
where
    T::Err: fmt::Display,
{
    raw.trim()
        .parse()
        .map_err(|e| Error::Config(format!("{key}={raw:?}: {e}")))
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Config validation
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// Severity level for a configuration issue.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigSeverity {
    Error,
    Warning,
}

/// A single configuration validation issue.
#[derive(Debug, Clone)]
pub struct ConfigError {
    pub severity: ConfigSeverity,
    pub field: String,
    pub message: String,
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let tag = match self.severity {
            ConfigSeverity::Error => "ERROR",
            ConfigSeverity::Warning => "WARN",
        };
        write!(f, "[{tag}] {}: {}", self.field, self.message)
    }
}

impl Config {
    /// Validate the configuration and return a list of issues.
    ///
    /// Returns an empty vec when everything looks good.
    pub fn validate(&self) -> Vec<ConfigError> {
        let mut errors = Vec::new();

        if self.device.host.is_empty() {
            errors.push(ConfigError {
                severity: ConfigSeverity::Error,
                field: "device.host".into(),
                message: "host must not be empty".into(),
            });
        }

        if self.device.port == 0 {
            errors.push(ConfigError {
                severity: ConfigSeverity::Error,
                field: "device.port".into(),
                message: "port must be greater than 0".into(),
            });
        }

        if self.device.username.is_empty() || self.device.password.is_empty() {
            errors.push(ConfigError {
                severity: ConfigSeverity::Warning,
                field: "device.username".into(),
                message: format!(
                    "credentials incomplete (set {ENV_USERNAME} / {ENV_PASSWORD}); login will likely fail"
                ),
            });
        }

        if self.backend.url.trim().is_empty() {
            errors.push(ConfigError {
                severity: ConfigSeverity::Error,
                field: "backend.url".into(),
                message: format!("backend url must not be empty (set {ENV_BACKEND})"),
            });
        }

        if self.session.login_max_attempts == 0 {
            errors.push(ConfigError {
                severity: ConfigSeverity::Error,
                field: "session.login_max_attempts".into(),
                message: "at least one login attempt is required".into(),
            });
        }

        if !self.capture.infinite && self.capture.count == 0 {
            errors.push(ConfigError {
                severity: ConfigSeverity::Warning,
                field: "capture.count".into(),
                message: "count is 0 and infinite is off; no cycles will run".into(),
            });
        }

        errors
    }
}
