//! The device surface the capture orchestrator drives.
//!
//! [`DeviceClient`] is the production implementation; tests substitute
//! scripted doubles.

use std::time::Duration;

use async_trait::async_trait;
use sr_domain::error::Result;

use crate::client::DeviceClient;
use crate::types::{Reading, StreamState};

#[async_trait]
pub trait DeviceApi: Send + Sync {
    /// Bounded login retry (see [`SessionManager::login_with_retry`]).
    ///
    /// [`SessionManager::login_with_retry`]: crate::session::SessionManager::login_with_retry
    async fn login_with_retry(&self, max_attempts: u32, delay: Duration) -> bool;

    async fn read_sensor_level(&self) -> Option<Reading>;

    async fn force_keyframe(&self);

    async fn get_stream_status(&self) -> Result<StreamState>;

    async fn enable_stream(&self) -> Option<serde_json::Value>;
}

#[async_trait]
impl DeviceApi for DeviceClient {
    async fn login_with_retry(&self, max_attempts: u32, delay: Duration) -> bool {
        self.session().login_with_retry(max_attempts, delay).await
    }

    async fn read_sensor_level(&self) -> Option<Reading> {
        DeviceClient::read_sensor_level(self).await
    }

    async fn force_keyframe(&self) {
        DeviceClient::force_keyframe(self).await
    }

    async fn get_stream_status(&self) -> Result<StreamState> {
        DeviceClient::get_stream_status(self).await
    }

    async fn enable_stream(&self) -> Option<serde_json::Value> {
        DeviceClient::enable_stream(self).await
    }
}
