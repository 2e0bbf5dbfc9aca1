//! `sr-device` — client side of the sound-level device's HTTP API.
//!
//! | Piece              | Role                                                  |
//! |--------------------|-------------------------------------------------------|
//! | [`probe`]          | TCP reachability check                                |
//! | [`SessionManager`] | owns the session cookie, login / bounded retry login  |
//! | [`DeviceClient`]   | sensor read, stream status / enable, force I-frame    |
//! | [`DeviceApi`]      | trait seam the orchestrator drives                    |
//!
//! # Quick start
//!
//! ```rust,no_run
//! use sr_domain::config::Config;
//! use tokio_util::sync::CancellationToken;
//!
//! # async fn example() -> sr_domain::error::Result<()> {
//! let cfg = Config::default();
//! let device = sr_device::build_client(&cfg, CancellationToken::new())?;
//!
//! if device.session().login_with_retry(5, std::time::Duration::from_secs(3)).await {
//!     if let Some(reading) = device.read_sensor_level().await {
//!         println!("{} dB", reading.value_db);
//!     }
//! }
//! # Ok(())
//! # }
//! ```

pub mod api;
pub mod client;
pub mod probe;
pub mod session;
pub mod transport;
pub mod types;

// ── Re-exports for ergonomic imports ─────────────────────────────────

pub use api::DeviceApi;
pub use client::DeviceClient;
pub use probe::{probe, Reachability, TcpProber};
pub use session::{SessionManager, SessionState};
pub use transport::{from_reqwest, DeviceTransport};
pub use types::{LoginError, Reading, StreamState, StreamStatus};

use std::sync::Arc;

use sr_domain::config::Config;
use sr_domain::error::Result;
use tokio_util::sync::CancellationToken;

/// Wire a [`SessionManager`] and [`DeviceClient`] together from config.
/// Both share one transport (and so one connection pool).
pub fn build_client(cfg: &Config, shutdown: CancellationToken) -> Result<DeviceClient> {
    let transport = DeviceTransport::new(&cfg.device, &cfg.http)?;
    let session = Arc::new(SessionManager::new(
        transport.clone(),
        &cfg.device,
        &cfg.session,
        shutdown,
    ));
    Ok(DeviceClient::new(transport, session))
}
