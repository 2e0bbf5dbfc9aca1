use serde::Serialize;

/// Structured trace events emitted across all SoundRelay crates.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "event")]
pub enum TraceEvent {
    DeviceCall {
        endpoint: String,
        status: u16,
        duration_ms: u64,
    },
    SessionEstablished {
        attempt: u32,
    },
    SessionExpired {
        endpoint: String,
        token_retained: bool,
    },
    ReadingRelayed {
        value_db: f64,
        status: u16,
    },
    StreamEnabled {
        ok: bool,
    },
    CycleCompleted {
        iteration: u64,
        reconnects: u64,
    },
}

impl TraceEvent {
    pub fn emit(&self) {
        let json = serde_json::to_string(self).unwrap_or_default();
        tracing::info!(trace_event = %json, "sr_event");
    }
}
