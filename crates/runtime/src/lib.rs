//! Runtime orchestration for Spellwave runs.
//!
//! This crate wires the combat engine, a simple arena simulation and the
//! loaded content into a run session driven by a background worker.
//! Consumers embed [`Runtime`] to start a run, subscribe to events, and send
//! player commands through [`RuntimeHandle`].
//!
//! Modules are organized by responsibility:
//! - [`runtime`] hosts the orchestrator and builder
//! - [`api`] exposes the types downstream clients interact with
//! - [`events`] provides topic-based event bus for flexible event routing
//! - [`session`] owns the rules of a run: waves, spawns and rewards
//! - [`arena`] moves enemies and projectiles and detects collisions
pub mod api;
pub mod arena;
pub mod events;
pub mod runtime;
pub mod session;

mod workers;

pub use api::{Result, RuntimeError, RuntimeHandle};
pub use arena::{Arena, ArenaEvent, Enemy};
pub use events::{Event, EventBus, RewardEvent, RunOutcome, Topic, WaveEvent};
pub use runtime::{Runtime, RuntimeBuilder, RuntimeConfig};
pub use session::{EnemyView, RunSession, RunSnapshot, RunStatus, SessionSettings};
