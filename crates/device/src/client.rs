//! Authenticated calls against the device API.
//!
//! Two failure policies live side by side here:
//!
//! | Call                  | On failure                                   |
//! |-----------------------|----------------------------------------------|
//! | `read_sensor_level`   | one re-login + one retry, then `None`        |
//! | `get_stream_status`   | error returned to the caller (reconnect)     |
//! | `enable_stream`       | logged, `None`                               |
//! | `force_keyframe`      | logged, swallowed                            |

use std::sync::Arc;

use reqwest::StatusCode;
use sr_domain::error::{Error, Result};
use sr_domain::trace::TraceEvent;

use crate::session::SessionManager;
use crate::transport::{from_reqwest, DeviceTransport};
use crate::types::{
    extract_db_spl, has_payload_marker, MediaStatusResponse, Reading, RtspEnableRequest,
    StreamState, FORCE_KEYFRAME_PATH, MEDIA_STATUS_PATH, RTSP_PATH, SENSOR_DATA_PATH,
};

/// Raw answer from the sensor-data endpoint.
struct SensorResponse {
    status: StatusCode,
    body: Option<serde_json::Value>,
}

impl SensorResponse {
    /// Why this response looks like a dead session, if it does.
    fn expiry_reason(&self) -> Option<&'static str> {
        if self.status == StatusCode::UNAUTHORIZED {
            return Some("HTTP 401");
        }
        match &self.body {
            Some(body) if has_payload_marker(body) => None,
            _ => Some("payload marker missing"),
        }
    }

    fn reading(&self) -> Result<Reading> {
        if !self.status.is_success() {
            return Err(Error::Device(format!(
                "{SENSOR_DATA_PATH} returned {}",
                self.status.as_u16()
            )));
        }
        let body = self
            .body
            .as_ref()
            .ok_or_else(|| Error::Payload("sensor response is not JSON".into()))?;
        extract_db_spl(body)
            .map(Reading::now)
            .ok_or_else(|| Error::Payload("imager.MaxdB.dBSpl missing or not numeric".into()))
    }
}

#[derive(Debug, Clone)]
pub struct DeviceClient {
    transport: DeviceTransport,
    session: Arc<SessionManager>,
}

impl DeviceClient {
    pub fn new(transport: DeviceTransport, session: Arc<SessionManager>) -> Self {
        Self { transport, session }
    }

    pub fn session(&self) -> &Arc<SessionManager> {
        &self.session
    }

    /// Read the current dB SPL level.
    ///
    /// A 401 or a body without the `imager` marker is treated as an expired
    /// session: exactly one re-login is attempted and the read retried once.
    /// Any remaining failure yields `None`; the caller decides what next.
    pub async fn read_sensor_level(&self) -> Option<Reading> {
        tracing::debug!("requesting sound data from device");

        let first = match self.fetch_sensor().await {
            Ok(r) => r,
            Err(e) => {
                tracing::error!(error = %e, "failed to get dBSpl");
                return None;
            }
        };

        let resp = match first.expiry_reason() {
            None => first,
            Some(reason) => {
                let token_retained = self.session.mark_expired();
                tracing::warn!(reason, token_retained, "session expired or invalid, re-logging in");
                TraceEvent::SessionExpired {
                    endpoint: SENSOR_DATA_PATH.to_owned(),
                    token_retained,
                }
                .emit();

                if self.session.login().await.is_err() {
                    return None;
                }

                match self.fetch_sensor().await {
                    Ok(r) => r,
                    Err(e) => {
                        tracing::error!(error = %e, "failed to get dBSpl after re-login");
                        return None;
                    }
                }
            }
        };

        match resp.reading() {
            Ok(reading) => {
                tracing::info!(db_spl = reading.value_db, "dBSpl reading");
                Some(reading)
            }
            Err(e) => {
                tracing::error!(error = %e, "failed to get dBSpl");
                None
            }
        }
    }

    /// Ask the encoder for an I-frame.  Purely cosmetic, so nothing here
    /// can fail the caller.
    pub async fn force_keyframe(&self) {
        let url = self.transport.url(FORCE_KEYFRAME_PATH);
        let token = self.session.current_token();

        let result = self
            .transport
            .execute_with_retry(&format!("POST {FORCE_KEYFRAME_PATH}"), || {
                self.transport
                    .authorize(self.transport.http().post(&url), token.as_deref())
            })
            .await;

        match result {
            Ok(resp) => {
                let status = resp.status().as_u16();
                let body = resp.text().await.unwrap_or_default();
                tracing::info!(status, body = %body, "force I-frame response");
            }
            Err(e) => tracing::warn!(error = %e, "force I-frame failed"),
        }
    }

    /// Query the media status and pick out the RTSP stream.
    ///
    /// A non-zero result code or a missing RTSP entry is a normal answer
    /// ([`StreamState::unknown`]).  Transport errors, non-2xx statuses and
    /// unparseable bodies are returned so the caller can reconnect; a 401 or
    /// 403 comes back as [`Error::Auth`].
    pub async fn get_stream_status(&self) -> Result<StreamState> {
        let url = self.transport.url(MEDIA_STATUS_PATH);
        let token = self.session.current_token();

        let resp = self
            .transport
            .execute_with_retry(&format!("GET {MEDIA_STATUS_PATH}"), || {
                self.transport
                    .authorize(self.transport.http().get(&url), token.as_deref())
            })
            .await?;

        let status = resp.status();
        let body = resp.text().await.map_err(from_reqwest)?;
        if status == StatusCode::UNAUTHORIZED || status == StatusCode::FORBIDDEN {
            return Err(Error::Auth(format!(
                "{MEDIA_STATUS_PATH} auth failed ({}): {body}",
                status.as_u16()
            )));
        }
        if !status.is_success() {
            return Err(Error::Device(format!(
                "{MEDIA_STATUS_PATH} returned {}: {body}",
                status.as_u16()
            )));
        }

        let parsed: MediaStatusResponse = serde_json::from_str(&body)?;
        let state = parsed.rtsp_state();
        tracing::debug!(status = ?state.status, kind = ?state.kind, "RTSP stream state");
        Ok(state)
    }

    /// Switch the RTSP stream on with audio and video.  Returns the device's
    /// JSON answer, or `None` when the request failed.
    pub async fn enable_stream(&self) -> Option<serde_json::Value> {
        let url = self.transport.url(RTSP_PATH);
        let token = self.session.current_token();
        let req = RtspEnableRequest::default();

        let result = self
            .transport
            .execute_with_retry(&format!("POST {RTSP_PATH}"), || {
                self.transport
                    .authorize(self.transport.http().post(&url), token.as_deref())
                    .json(&req)
            })
            .await;

        let outcome: Option<serde_json::Value> = match result {
            Ok(resp) if resp.status().is_success() => match resp.json().await {
                Ok(v) => Some(v),
                Err(e) => {
                    tracing::warn!(error = %e, "enable stream: unparseable response");
                    None
                }
            },
            Ok(resp) => {
                let status = resp.status().as_u16();
                let body = resp.text().await.unwrap_or_default();
                tracing::warn!(status, body = %body, "enable stream: HTTP error");
                None
            }
            Err(e) => {
                tracing::warn!(error = %e, "enable stream: request error");
                None
            }
        };

        TraceEvent::StreamEnabled {
            ok: outcome.is_some(),
        }
        .emit();
        outcome
    }

    async fn fetch_sensor(&self) -> Result<SensorResponse> {
        let url = self.transport.url(SENSOR_DATA_PATH);
        let token = self.session.current_token();

        let resp = self
            .transport
            .execute_with_retry(&format!("GET {SENSOR_DATA_PATH}"), || {
                self.transport
                    .authorize(self.transport.http().get(&url), token.as_deref())
            })
            .await?;

        let status = resp.status();
        let text = resp.text().await.map_err(from_reqwest)?;
        tracing::debug!(status = status.as_u16(), body = %text, "capture response");

        Ok(SensorResponse {
            status,
            body: serde_json::from_str(&text).ok(),
        })
    }
}
