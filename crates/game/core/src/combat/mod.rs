//! Damage, projectiles and the battlefield seam.
pub mod battlefield;
pub mod damage;
pub mod projectile;

pub use battlefield::{Battlefield, DamageReport};
pub use damage::{Damage, DamageKind};
pub use projectile::{
    ActiveProjectile, BurstSpec, HitMode, HitResolution, ProjectileLaunch, ProjectileTracker,
    Strike, Trajectory,
};
