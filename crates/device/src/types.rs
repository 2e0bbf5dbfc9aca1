//! Wire DTOs for the device HTTP API and the values the client hands back.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sr_domain::error::Error;

// ── Endpoints ────────────────────────────────────────────────────────

pub const LOGIN_PATH: &str = "api/register/v1/login";
pub const SENSOR_DATA_PATH: &str = "api/data/v1/data";
pub const FORCE_KEYFRAME_PATH: &str = "api/device/v1/forceIFrame";
pub const MEDIA_STATUS_PATH: &str = "api/media/v1/status";
pub const RTSP_PATH: &str = "api/media/v1/rtsp";

/// `info` value the device returns on a successful login.
pub const LOGIN_OK: &str = "login ok";

/// Top-level key every valid sensor payload carries. Its absence means the
/// device answered with something other than data (usually a login page
/// or an auth error) even when the status was 200.
pub const PAYLOAD_MARKER: &str = "imager";

/// Stream type discriminator of the RTSP entry in the media status list.
pub const RTSP_STREAM_TYPE: i64 = 1;

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Login
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, Clone, Deserialize)]
pub struct LoginResponse {
    #[serde(default)]
    pub info: Option<String>,
    #[serde(default)]
    pub cookie: Option<serde_json::Value>,
}

impl LoginResponse {
    /// The session cookie as a header-ready string.
    pub fn cookie_value(&self) -> Option<String> {
        match self.cookie.as_ref()? {
            serde_json::Value::String(s) if !s.is_empty() => Some(s.clone()),
            serde_json::Value::Null | serde_json::Value::String(_) => None,
            other => Some(other.to_string()),
        }
    }
}

/// Why a single login attempt failed. None of these are fatal; the caller
/// decides whether to retry.
#[derive(thiserror::Error, Debug)]
pub enum LoginError {
    #[error("login rejected: {0}")]
    Rejected(String),
    #[error("malformed login response: {0}")]
    Malformed(String),
    #[error("login returned HTTP {0}")]
    Status(u16),
    #[error(transparent)]
    Transport(#[from] Error),
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Sensor readings
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// A single dB SPL sample, stamped when it was read.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Reading {
    pub value_db: f64,
    pub captured_at: DateTime<Utc>,
}

impl Reading {
    pub fn now(value_db: f64) -> Self {
        Self {
            value_db,
            captured_at: Utc::now(),
        }
    }
}

pub fn has_payload_marker(body: &serde_json::Value) -> bool {
    body.get(PAYLOAD_MARKER).is_some()
}

/// Pull `imager.MaxdB.dBSpl` out of a sensor payload.
pub fn extract_db_spl(body: &serde_json::Value) -> Option<f64> {
    body.pointer("/imager/MaxdB/dBSpl")?.as_f64()
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Media / RTSP
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StreamStatus {
    On,
    Off,
    Unknown,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StreamState {
    pub status: StreamStatus,
    pub kind: Option<i64>,
}

impl StreamState {
    /// The "no answer" state: failed result code or no RTSP entry.
    pub fn unknown() -> Self {
        Self {
            status: StreamStatus::Unknown,
            kind: None,
        }
    }

    pub fn is_on(&self) -> bool {
        self.status == StreamStatus::On
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct MediaStatusResponse {
    #[serde(default)]
    pub result: Option<i64>,
    #[serde(default)]
    pub data: Vec<MediaStreamEntry>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct MediaStreamEntry {
    #[serde(rename = "type", default)]
    pub kind: Option<i64>,
    #[serde(default)]
    pub status: Option<serde_json::Value>,
}

impl MediaStatusResponse {
    /// State of the RTSP stream; other stream types are ignored.
    pub fn rtsp_state(&self) -> StreamState {
        if self.result != Some(0) {
            return StreamState::unknown();
        }
        self.data
            .iter()
            .find(|s| s.kind == Some(RTSP_STREAM_TYPE))
            .map(|s| StreamState {
                status: flag_status(s.status.as_ref()),
                kind: s.kind,
            })
            .unwrap_or_else(StreamState::unknown)
    }
}

/// The device reports the on/off flag as a bool on newer firmware and as
/// 0/1 on older builds.
fn flag_status(v: Option<&serde_json::Value>) -> StreamStatus {
    match v {
        Some(serde_json::Value::Bool(true)) => StreamStatus::On,
        Some(serde_json::Value::Bool(false)) => StreamStatus::Off,
        Some(serde_json::Value::Number(n)) => match n.as_f64() {
            Some(x) if x != 0.0 => StreamStatus::On,
            Some(_) => StreamStatus::Off,
            None => StreamStatus::Unknown,
        },
        _ => StreamStatus::Unknown,
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct RtspEnableRequest {
    pub enable: bool,
    pub audio: bool,
    pub video: bool,
}

impl Default for RtspEnableRequest {
    fn default() -> Self {
        Self {
            enable: true,
            audio: true,
            video: true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn extracts_nested_db_spl() {
        let body = json!({ "imager": { "MaxdB": { "dBSpl": 42.5 } } });
        assert_eq!(extract_db_spl(&body), Some(42.5));
        assert!(has_payload_marker(&body));
    }

    #[test]
    fn missing_path_yields_none() {
        let body = json!({ "imager": { "MaxdB": {} } });
        assert_eq!(extract_db_spl(&body), None);
        assert!(has_payload_marker(&body));

        let body = json!({ "info": "please login" });
        assert_eq!(extract_db_spl(&body), None);
        assert!(!has_payload_marker(&body));
    }

    #[test]
    fn non_numeric_db_spl_is_rejected() {
        let body = json!({ "imager": { "MaxdB": { "dBSpl": "loud" } } });
        assert_eq!(extract_db_spl(&body), None);
    }

    #[test]
    fn rtsp_entry_is_selected_among_others() {
        let resp: MediaStatusResponse = serde_json::from_value(json!({
            "result": 0,
            "data": [
                { "type": 2, "status": true },
                { "type": 1, "status": false },
            ]
        }))
        .unwrap();
        let state = resp.rtsp_state();
        assert_eq!(state.status, StreamStatus::Off);
        assert_eq!(state.kind, Some(1));
        assert!(!state.is_on());
    }

    #[test]
    fn integer_flags_are_accepted() {
        let resp: MediaStatusResponse = serde_json::from_value(json!({
            "result": 0,
            "data": [{ "type": 1, "status": 1 }]
        }))
        .unwrap();
        assert!(resp.rtsp_state().is_on());
    }

    #[test]
    fn failed_result_or_empty_list_is_unknown() {
        let failed: MediaStatusResponse = serde_json::from_value(json!({
            "result": -1,
            "data": [{ "type": 1, "status": true }]
        }))
        .unwrap();
        assert_eq!(failed.rtsp_state(), StreamState::unknown());

        let empty: MediaStatusResponse =
            serde_json::from_value(json!({ "result": 0, "data": [] })).unwrap();
        assert_eq!(empty.rtsp_state(), StreamState::unknown());

        let missing: MediaStatusResponse = serde_json::from_value(json!({})).unwrap();
        assert_eq!(missing.rtsp_state(), StreamState::unknown());
    }

    #[test]
    fn cookie_value_handles_shapes() {
        let s: LoginResponse =
            serde_json::from_value(json!({ "info": "login ok", "cookie": "abc" })).unwrap();
        assert_eq!(s.cookie_value().as_deref(), Some("abc"));

        let n: LoginResponse =
            serde_json::from_value(json!({ "info": "login ok", "cookie": 1234 })).unwrap();
        assert_eq!(n.cookie_value().as_deref(), Some("1234"));

        let none: LoginResponse = serde_json::from_value(json!({ "info": "login ok" })).unwrap();
        assert_eq!(none.cookie_value(), None);
    }
}
