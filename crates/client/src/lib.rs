//! Spellwave client library.
//!
//! Holds the environment-driven configuration and the autopilot the
//! `spellwave` binary uses to play a run end to end.
pub mod autoplay;
pub mod config;

pub use autoplay::{Autopilot, spawn_event_logger};
pub use config::ClientConfig;
