//! The seam between the combat rules and whatever simulates the world.
//!
//! The engine never moves anything. It asks the battlefield where combatants
//! are, tells it to launch or remove projectiles, and applies damage through
//! it. Physics, rendering and enemy AI stay on the other side of this trait.

use super::damage::Damage;
use super::projectile::ProjectileLaunch;
use crate::state::{EntityId, ProjectileId, Team, Vec2};

/// Outcome of applying damage to a battlefield combatant.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct DamageReport {
    /// Health actually removed.
    pub dealt: i32,
    /// True when this hit reduced the target to zero health.
    pub killed: bool,
}

/// World collaborator driven by [`crate::engine::CombatEngine`].
pub trait Battlefield {
    /// Team of a live combatant, `None` if it does not exist (or already died).
    fn team_of(&self, target: EntityId) -> Option<Team>;

    fn position_of(&self, target: EntityId) -> Option<Vec2>;

    /// Every live combatant, of any team, within `radius` of `center`.
    fn targets_within(&self, center: Vec2, radius: f32) -> Vec<EntityId>;

    fn apply_damage(&mut self, target: EntityId, damage: Damage) -> DamageReport;

    /// Pushes `target` by `impulse` (direction × force).
    fn apply_knockback(&mut self, target: EntityId, impulse: Vec2);

    fn launch(&mut self, projectile: ProjectileLaunch);

    fn despawn(&mut self, projectile: ProjectileId);
}
