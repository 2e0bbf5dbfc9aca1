use std::time::Instant;

use async_trait::async_trait;
use reqwest::Client;
use sr_domain::config::BackendConfig;
use sr_domain::error::{Error, Result};
use sr_domain::trace::TraceEvent;

pub const CAPTURE_PATH: &str = "api/sound/capture";

/// Form field the backend expects the reading in.
pub const VALUE_FIELD: &str = "value-db";

/// Consumer of captured readings.
#[async_trait]
pub trait ReadingSink: Send + Sync {
    /// Forward one reading.  Must not fail the caller.
    async fn send_reading(&self, value_db: f64);
}

/// Fire-and-forget HTTP relay to `<backend>/api/sound/capture`.
#[derive(Debug, Clone)]
pub struct BackendRelay {
    http: Client,
    endpoint: String,
}

impl BackendRelay {
    pub fn new(cfg: &BackendConfig) -> Result<Self> {
        let http = Client::builder()
            .timeout(cfg.timeout())
            .build()
            .map_err(|e| Error::Http(e.to_string()))?;

        Ok(Self {
            http,
            endpoint: format!("{}/{CAPTURE_PATH}", cfg.base_url()),
        })
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    async fn post(&self, value_db: f64) -> Result<(u16, String)> {
        let resp = self
            .http
            .post(&self.endpoint)
            .form(&[(VALUE_FIELD, format_db(value_db))])
            .send()
            .await
            .map_err(|e| Error::Backend(e.to_string()))?;

        let status = resp.status().as_u16();
        let body = resp.text().await.unwrap_or_default();
        Ok((status, body))
    }
}

/// Form value for a reading.  Whole numbers keep their `.0` (`42.0`, not
/// `42`), which is what the backend has always been sent.
fn format_db(value_db: f64) -> String {
    if value_db.is_finite() && value_db.fract() == 0.0 {
        format!("{value_db:.1}")
    } else {
        value_db.to_string()
    }
}

#[async_trait]
impl ReadingSink for BackendRelay {
    async fn send_reading(&self, value_db: f64) {
        tracing::info!(value_db, endpoint = %self.endpoint, "sending reading to backend");
        let start = Instant::now();

        match self.post(value_db).await {
            Ok((status, body)) => {
                tracing::info!(
                    status,
                    body = %body,
                    duration_ms = start.elapsed().as_millis() as u64,
                    "backend response"
                );
                TraceEvent::ReadingRelayed { value_db, status }.emit();
            }
            Err(e) => {
                tracing::error!(error = %e, "failed to send reading to backend");
                TraceEvent::ReadingRelayed {
                    value_db,
                    status: 0,
                }
                .emit();
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn whole_readings_keep_decimal_point() {
        assert_eq!(format_db(42.0), "42.0");
        assert_eq!(format_db(42.5), "42.5");
        assert_eq!(format_db(-3.0), "-3.0");
        assert_eq!(format_db(61.25), "61.25");
    }

    #[test]
    fn endpoint_defaults_to_https() {
        let relay = BackendRelay::new(&BackendConfig {
            url: "dc.example.com".into(),
            ..Default::default()
        })
        .unwrap();
        assert_eq!(relay.endpoint(), "https://dc.example.com/api/sound/capture");
    }
}
