//! Identifiers, clock and geometry shared by every combat subsystem.
//!
//! These are plain value types; the mutable combat state itself lives in
//! [`crate::engine::CombatState`].
mod common;

pub use common::{EntityId, ProjectileId, RelicId, Team, Tick, Vec2};
