//! `sr-backend` — forwards dB readings to the data-center backend.
//!
//! The backend is a side channel: [`ReadingSink::send_reading`] has no
//! return value, and every failure ends in a log line.

pub mod relay;

pub use relay::{BackendRelay, ReadingSink, CAPTURE_PATH, VALUE_FIELD};
