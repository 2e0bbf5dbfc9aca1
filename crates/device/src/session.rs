//! Device session: the one authentication cookie this process holds.
//!
//! ```text
//!   Unauthenticated ──login()──▶ Authenticating ──ok──▶ Authenticated
//!          ▲                           │                      │
//!          └──────── failure ──────────┘ (previous state)     │
//!          └──────────────────── mark_expired() ──────────────┘
//! ```
//!
//! A failed login restores whatever state preceded it, so a rejected
//! re-login never silently de-authenticates a session that was still good.

use std::time::Duration;

use parking_lot::RwLock;
use sr_domain::config::{DeviceConfig, SessionConfig, StaleTokenPolicy};
use sr_domain::trace::TraceEvent;
use tokio_util::sync::CancellationToken;

use crate::transport::{from_reqwest, DeviceTransport};
use crate::types::{LoginError, LoginResponse, LOGIN_OK, LOGIN_PATH};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SessionState {
    #[default]
    Unauthenticated,
    Authenticating,
    Authenticated,
}

#[derive(Debug, Default)]
struct Session {
    state: SessionState,
    cookie: Option<String>,
}

/// Owns the device session cookie.  Shared with the
/// [`DeviceClient`](crate::client::DeviceClient) behind an `Arc`; the
/// cookie is read fresh on every request so a re-login is picked up
/// immediately.
#[derive(Debug)]
pub struct SessionManager {
    transport: DeviceTransport,
    username: String,
    password: String,
    login_timeout: Duration,
    stale_token_policy: StaleTokenPolicy,
    session: RwLock<Session>,
    shutdown: CancellationToken,
}

impl SessionManager {
    pub fn new(
        transport: DeviceTransport,
        device: &DeviceConfig,
        cfg: &SessionConfig,
        shutdown: CancellationToken,
    ) -> Self {
        Self {
            transport,
            username: device.username.clone(),
            password: device.password.clone(),
            login_timeout: cfg.login_timeout(),
            stale_token_policy: cfg.stale_token_policy,
            session: RwLock::new(Session::default()),
            shutdown,
        }
    }

    pub fn state(&self) -> SessionState {
        self.session.read().state
    }

    pub fn is_authenticated(&self) -> bool {
        self.state() == SessionState::Authenticated
    }

    pub fn current_token(&self) -> Option<String> {
        self.session.read().cookie.clone()
    }

    /// Record that the device rejected the current cookie.
    ///
    /// Returns whether the old cookie is still held (per the configured
    /// [`StaleTokenPolicy`]).
    pub fn mark_expired(&self) -> bool {
        let mut s = self.session.write();
        s.state = SessionState::Unauthenticated;
        if self.stale_token_policy == StaleTokenPolicy::Discard {
            s.cookie = None;
        }
        s.cookie.is_some()
    }

    /// One login attempt.  Never panics; every failure mode comes back as
    /// a [`LoginError`].
    pub async fn login(&self) -> Result<(), LoginError> {
        let previous = {
            let mut s = self.session.write();
            let prev = s.state;
            s.state = SessionState::Authenticating;
            prev
        };

        tracing::info!(user = %self.username, "logging in to device");

        match self.request_cookie().await {
            Ok(cookie) => {
                let mut s = self.session.write();
                s.state = SessionState::Authenticated;
                s.cookie = Some(cookie);
                tracing::info!("login successful");
                Ok(())
            }
            Err(e) => {
                self.session.write().state = previous;
                tracing::error!(error = %e, "login failed");
                Err(e)
            }
        }
    }

    /// Call [`login`](Self::login) up to `max_attempts` times, sleeping
    /// `delay` between attempts.  Returns `true` on the first success.
    ///
    /// Gives up early (returning `false`) if shutdown is requested while
    /// waiting between attempts.
    pub async fn login_with_retry(&self, max_attempts: u32, delay: Duration) -> bool {
        for attempt in 1..=max_attempts {
            tracing::info!(attempt, max_attempts, "login attempt");
            if self.login().await.is_ok() {
                TraceEvent::SessionEstablished { attempt }.emit();
                return true;
            }
            if attempt < max_attempts {
                tracing::warn!(delay_ms = delay.as_millis() as u64, "retrying login");
                tokio::select! {
                    _ = tokio::time::sleep(delay) => {}
                    _ = self.shutdown.cancelled() => return false,
                }
            }
        }
        tracing::error!(max_attempts, "all login attempts failed");
        false
    }

    async fn request_cookie(&self) -> Result<String, LoginError> {
        let url = self.transport.url(LOGIN_PATH);
        let form = [
            ("user", self.username.as_str()),
            ("password", self.password.as_str()),
        ];

        let resp = self
            .transport
            .execute_with_retry(&format!("POST {LOGIN_PATH}"), || {
                self.transport
                    .http()
                    .post(&url)
                    .form(&form)
                    .timeout(self.login_timeout)
            })
            .await?;

        let status = resp.status();
        let body = resp.text().await.map_err(from_reqwest)?;
        tracing::debug!(status = status.as_u16(), body = %body, "login response");

        if !status.is_success() {
            return Err(LoginError::Status(status.as_u16()));
        }

        let parsed: LoginResponse = serde_json::from_str(&body)
            .map_err(|e| LoginError::Malformed(format!("{e}: {body}")))?;

        let info = parsed.info.as_deref().unwrap_or_default();
        if info != LOGIN_OK {
            return Err(LoginError::Rejected(info.to_owned()));
        }

        parsed
            .cookie_value()
            .ok_or_else(|| LoginError::Malformed("login ok but no cookie".into()))
    }
}
