//! `sr-domain` — shared types for the SoundRelay crates: the error
//! taxonomy, structured trace events, and configuration.

pub mod config;
pub mod error;
pub mod trace;
