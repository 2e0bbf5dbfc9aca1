//! `sr-capture` — drives the sound-level device: keeps a session alive,
//! relays dB readings to the backend, and keeps the RTSP stream switched on.

pub mod cli;
pub mod orchestrator;

pub use orchestrator::{
    CaptureError, CaptureOrchestrator, CaptureSettings, CaptureSummary, CycleCounter,
};
