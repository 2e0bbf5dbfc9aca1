//! The capture state machine.
//!
//! ```text
//!            ┌────────────── wait_for_connection ──────────────┐
//!            │ probe ──no──▶ sleep ─┐                          │
//!            │   │ yes              └──▶ probe ...             │
//!            │   ▼                                             │
//!            │ login_with_retry ──no──▶ sleep ──▶ probe ...    │
//!            │   │ yes                                         │
//!            └───┼─────────────────────────────────────────────┘
//!                ▼
//!   force I-frame, then per cycle:
//!     read ──None──▶ wait_for_connection ──▶ read ...
//!     relay
//!     stream status ──Err──▶ wait_for_connection ──▶ status ...
//!     enable stream unless on
//!     sleep interval
//! ```
//!
//! Everything runs on one task.  Every sleep races the shutdown token, and
//! [`CaptureOrchestrator::run`] races the whole thing against it, so an
//! interrupt ends the run immediately.

use std::sync::Arc;
use std::time::Duration;

use sr_backend::{BackendRelay, ReadingSink};
use sr_device::{DeviceApi, Reachability, StreamState, TcpProber};
use sr_domain::config::Config;
use sr_domain::trace::TraceEvent;
use tokio_util::sync::CancellationToken;

#[derive(thiserror::Error, Debug, PartialEq, Eq)]
pub enum CaptureError {
    #[error("shutdown requested")]
    Shutdown,
}

/// Timing and limits for one orchestrator.
#[derive(Debug, Clone)]
pub struct CaptureSettings {
    pub reconnect_delay: Duration,
    pub login_max_attempts: u32,
    pub login_retry_delay: Duration,
    pub interval: Duration,
    /// `None` runs forever.
    pub limit: Option<u64>,
}

impl CaptureSettings {
    pub fn from_config(cfg: &Config) -> Self {
        Self {
            reconnect_delay: cfg.capture.reconnect_delay(),
            login_max_attempts: cfg.session.login_max_attempts,
            login_retry_delay: cfg.session.login_retry_delay(),
            interval: cfg.capture.interval(),
            limit: cfg.capture.limit(),
        }
    }
}

/// Counts capture cycles against an optional limit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CycleCounter {
    iteration: u64,
    limit: Option<u64>,
}

impl CycleCounter {
    pub fn new(limit: Option<u64>) -> Self {
        Self {
            iteration: 0,
            limit,
        }
    }

    pub fn iteration(&self) -> u64 {
        self.iteration
    }

    pub fn is_exhausted(&self) -> bool {
        matches!(self.limit, Some(limit) if self.iteration >= limit)
    }

    /// Start the next cycle, returning its 1-based number, or `None` once
    /// the limit has been reached.
    pub fn advance(&mut self) -> Option<u64> {
        if self.is_exhausted() {
            return None;
        }
        self.iteration += 1;
        Some(self.iteration)
    }

    /// `"2/5"` when bounded, `"2 (infinite)"` otherwise.
    pub fn label(&self) -> String {
        match self.limit {
            Some(limit) => format!("{}/{limit}", self.iteration),
            None => format!("{} (infinite)", self.iteration),
        }
    }
}

/// What a finished run did.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CaptureSummary {
    pub cycles: u64,
    pub readings_relayed: u64,
    /// Full reconnect sequences run from inside the capture loop.
    pub reconnects: u64,
    pub stream_enable_attempts: u64,
}

pub struct CaptureOrchestrator {
    device: Arc<dyn DeviceApi>,
    prober: Arc<dyn Reachability>,
    sink: Arc<dyn ReadingSink>,
    settings: CaptureSettings,
    shutdown: CancellationToken,
}

impl CaptureOrchestrator {
    pub fn new(
        device: Arc<dyn DeviceApi>,
        prober: Arc<dyn Reachability>,
        sink: Arc<dyn ReadingSink>,
        settings: CaptureSettings,
        shutdown: CancellationToken,
    ) -> Self {
        Self {
            device,
            prober,
            sink,
            settings,
            shutdown,
        }
    }

    /// Production wiring: HTTP device client, TCP prober, HTTP backend relay.
    pub fn from_config(cfg: &Config, shutdown: CancellationToken) -> sr_domain::error::Result<Self> {
        let device = sr_device::build_client(cfg, shutdown.clone())?;
        let prober = TcpProber::from_config(&cfg.device);
        let relay = BackendRelay::new(&cfg.backend)?;

        Ok(Self::new(
            Arc::new(device),
            Arc::new(prober),
            Arc::new(relay),
            CaptureSettings::from_config(cfg),
            shutdown,
        ))
    }

    /// Connect, then capture until the cycle limit or shutdown.
    pub async fn run(&self) -> Result<CaptureSummary, CaptureError> {
        tokio::select! {
            r = async {
                self.wait_for_connection().await?;
                self.capture_loop().await
            } => r,
            _ = self.shutdown.cancelled() => {
                tracing::info!("shutdown requested");
                Err(CaptureError::Shutdown)
            }
        }
    }

    /// Block until the device is both reachable and logged in.
    ///
    /// Never gives up on its own; only shutdown ends it early.  A failed
    /// login round restarts from the reachability probe, not just the login.
    pub async fn wait_for_connection(&self) -> Result<(), CaptureError> {
        loop {
            if self.shutdown.is_cancelled() {
                return Err(CaptureError::Shutdown);
            }

            if !self.prober.probe().await {
                tracing::info!(
                    device = %self.prober.target(),
                    delay_secs = self.settings.reconnect_delay.as_secs(),
                    "device unreachable, retrying"
                );
                self.pause(self.settings.reconnect_delay).await?;
                continue;
            }

            if self
                .device
                .login_with_retry(self.settings.login_max_attempts, self.settings.login_retry_delay)
                .await
            {
                tracing::info!(device = %self.prober.target(), "device connection established");
                return Ok(());
            }

            tracing::info!(
                delay_secs = self.settings.reconnect_delay.as_secs(),
                "login failed, retrying"
            );
            self.pause(self.settings.reconnect_delay).await?;
        }
    }

    /// The capture cycles.  Assumes [`wait_for_connection`] already
    /// succeeded once.
    ///
    /// [`wait_for_connection`]: Self::wait_for_connection
    pub async fn capture_loop(&self) -> Result<CaptureSummary, CaptureError> {
        self.device.force_keyframe().await;

        let mut counter = CycleCounter::new(self.settings.limit);
        let mut summary = CaptureSummary::default();

        while let Some(iteration) = counter.advance() {
            if self.shutdown.is_cancelled() {
                return Err(CaptureError::Shutdown);
            }
            tracing::info!(cycle = %counter.label(), "capture");

            // ── dBSpl reading ────────────────────────────────────────
            let reading = loop {
                if let Some(r) = self.device.read_sensor_level().await {
                    break r;
                }
                tracing::warn!("no dBSpl reading, waiting for connection");
                self.wait_for_connection().await?;
                summary.reconnects += 1;
            };

            self.sink.send_reading(reading.value_db).await;
            summary.readings_relayed += 1;

            // ── RTSP status ──────────────────────────────────────────
            let state = loop {
                match self.device.get_stream_status().await {
                    Ok(state) => break state,
                    Err(e) if e.requires_reconnect() => {
                        tracing::error!(error = %e, "failed to check RTSP status");
                        self.wait_for_connection().await?;
                        summary.reconnects += 1;
                    }
                    Err(e) => {
                        tracing::warn!(error = %e, "RTSP status unavailable, treating as unknown");
                        break StreamState::unknown();
                    }
                }
            };

            if state.is_on() {
                tracing::info!("RTSP stream is already on");
            } else {
                tracing::info!(status = ?state.status, "RTSP stream is off, enabling");
                let res = self.device.enable_stream().await;
                summary.stream_enable_attempts += 1;
                match res {
                    Some(body) => tracing::info!(response = %body, "enable response"),
                    None => tracing::warn!("enable stream request failed"),
                }
            }

            summary.cycles = iteration;
            TraceEvent::CycleCompleted {
                iteration,
                reconnects: summary.reconnects,
            }
            .emit();

            // The final bounded cycle exits without waiting out the interval.
            if counter.is_exhausted() {
                break;
            }
            tracing::info!(
                interval_secs = self.settings.interval.as_secs(),
                "waiting before next capture"
            );
            self.pause(self.settings.interval).await?;
        }

        Ok(summary)
    }

    async fn pause(&self, delay: Duration) -> Result<(), CaptureError> {
        tokio::select! {
            _ = tokio::time::sleep(delay) => Ok(()),
            _ = self.shutdown.cancelled() => Err(CaptureError::Shutdown),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bounded_counter_stops_at_limit() {
        let mut c = CycleCounter::new(Some(2));
        assert_eq!(c.advance(), Some(1));
        assert_eq!(c.label(), "1/2");
        assert!(!c.is_exhausted());
        assert_eq!(c.advance(), Some(2));
        assert!(c.is_exhausted());
        assert_eq!(c.advance(), None);
        assert_eq!(c.iteration(), 2);
    }

    #[test]
    fn zero_limit_runs_nothing() {
        let mut c = CycleCounter::new(Some(0));
        assert_eq!(c.advance(), None);
    }

    #[test]
    fn unbounded_counter_never_exhausts() {
        let mut c = CycleCounter::new(None);
        for _ in 0..1000 {
            assert!(c.advance().is_some());
        }
        assert!(!c.is_exhausted());
        assert_eq!(c.label(), "1000 (infinite)");
    }

    #[test]
    fn settings_follow_config() {
        let mut cfg = Config::default();
        cfg.capture.infinite = true;
        cfg.capture.interval_secs = 30;
        let s = CaptureSettings::from_config(&cfg);
        assert_eq!(s.limit, None);
        assert_eq!(s.interval, Duration::from_secs(30));
        assert_eq!(s.login_max_attempts, 5);
        assert_eq!(s.login_retry_delay, Duration::from_secs(3));
        assert_eq!(s.reconnect_delay, Duration::from_secs(10));
    }
}
