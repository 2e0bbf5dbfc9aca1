//! HTTP plumbing shared by the session manager and the device client.
//!
//! `DeviceTransport` wraps a `reqwest::Client` bound to one device and
//! retries transient failures (429 / 5xx / connection errors) with
//! exponential back-off before any caller sees them.  Every other status,
//! 401 included, is handed back untouched: deciding what an auth failure
//! means is the session layer's job.

use std::time::Instant;

use reqwest::{Client, RequestBuilder, Response, StatusCode};
use sr_domain::config::{DeviceConfig, HttpRetryConfig};
use sr_domain::error::{Error, Result};
use sr_domain::trace::TraceEvent;

#[derive(Debug, Clone)]
pub struct DeviceTransport {
    http: Client,
    base_url: String,
    cookie_header: String,
    retry: HttpRetryConfig,
}

impl DeviceTransport {
    pub fn new(device: &DeviceConfig, retry: &HttpRetryConfig) -> Result<Self> {
        let http = Client::builder()
            .timeout(device.request_timeout())
            .build()
            .map_err(|e| Error::Http(e.to_string()))?;

        Ok(Self {
            http,
            base_url: device.base_url(),
            cookie_header: device.cookie_header.clone(),
            retry: retry.clone(),
        })
    }

    pub fn http(&self) -> &Client {
        &self.http
    }

    /// Build the full URL for an API path like `api/data/v1/data`.
    pub fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }

    /// Attach the session cookie (when there is one) and the JSON content
    /// type the device expects on authenticated calls.
    pub fn authorize(&self, rb: RequestBuilder, token: Option<&str>) -> RequestBuilder {
        let rb = rb.header(reqwest::header::CONTENT_TYPE, "application/json");
        match token {
            Some(t) => rb.header(self.cookie_header.as_str(), t),
            None => rb,
        }
    }

    // ── retry engine ─────────────────────────────────────────────────

    /// Execute a request, retrying transient failures.
    ///
    /// * Retries on 429 / 500 / 502 / 503 / 504 and on transport errors.
    /// * Returns every other response as-is, whatever its status.
    /// * Emits a `TraceEvent::DeviceCall` after every attempt.
    pub async fn execute_with_retry(
        &self,
        endpoint: &str,
        build_request: impl Fn() -> RequestBuilder,
    ) -> Result<Response> {
        let mut last_err: Option<Error> = None;

        for attempt in 0..=self.retry.max_retries {
            if attempt > 0 {
                let backoff = self.retry.backoff_for(attempt);
                tracing::debug!(
                    endpoint,
                    attempt,
                    backoff_ms = backoff.as_millis() as u64,
                    "retrying device request"
                );
                tokio::time::sleep(backoff).await;
            }

            let start = Instant::now();
            let result = build_request().send().await;
            let duration_ms = start.elapsed().as_millis() as u64;

            match result {
                Ok(resp) => {
                    let status = resp.status();

                    TraceEvent::DeviceCall {
                        endpoint: endpoint.to_owned(),
                        status: status.as_u16(),
                        duration_ms,
                    }
                    .emit();

                    if is_transient(status) {
                        let body = resp.text().await.unwrap_or_default();
                        last_err = Some(Error::Device(format!(
                            "{endpoint} returned {}: {body}",
                            status.as_u16()
                        )));
                        continue;
                    }

                    return Ok(resp);
                }
                Err(e) => {
                    TraceEvent::DeviceCall {
                        endpoint: endpoint.to_owned(),
                        status: 0,
                        duration_ms,
                    }
                    .emit();

                    last_err = Some(from_reqwest(e));
                }
            }
        }

        Err(last_err.unwrap_or_else(|| Error::Device(format!("{endpoint}: all retries exhausted"))))
    }
}

fn is_transient(status: StatusCode) -> bool {
    matches!(
        status,
        StatusCode::TOO_MANY_REQUESTS
            | StatusCode::INTERNAL_SERVER_ERROR
            | StatusCode::BAD_GATEWAY
            | StatusCode::SERVICE_UNAVAILABLE
            | StatusCode::GATEWAY_TIMEOUT
    )
}

/// Convert a `reqwest::Error` into a domain `Error`.
///
/// Timeout errors become `Error::Timeout`; everything else becomes
/// `Error::Http`.
pub fn from_reqwest(e: reqwest::Error) -> Error {
    if e.is_timeout() {
        Error::Timeout(e.to_string())
    } else {
        Error::Http(e.to_string())
    }
}
