//! Deterministic combat rules shared by the runtime and offline tools.
//!
//! `game-core` defines the formula language, spell and relic models, and the
//! [`engine::CombatEngine`] that drives them. It performs no I/O and no
//! logging: every outcome is reported as a value. All state mutation flows
//! through the engine, and supporting crates depend on the types re-exported
//! here.
pub mod caster;
pub mod combat;
pub mod config;
pub mod engine;
pub mod error;
pub mod events;
pub mod formula;
pub mod relic;
pub mod scheduler;
pub mod spell;
pub mod state;
pub mod stats;
pub mod wave;

pub use caster::{CastOutcome, CastRejection, CasterError, SpellCaster};
pub use combat::{
    Battlefield, Damage, DamageKind, DamageReport, HitResolution, ProjectileLaunch, Strike,
    Trajectory,
};
pub use config::CombatConfig;
pub use engine::{CombatEngine, CombatSnapshot, CombatState, PlayerState, SpellSummary};
pub use error::{CombatError, ErrorSeverity, GameError, RelicFault};
pub use events::{Channel, CombatEvent};
pub use formula::{Bindings, Formula, FormulaError};
pub use relic::{EffectKind, EndCondition, RelicDefinition, TriggerKind};
pub use spell::{
    BaseSpell, CastPlan, LayerBehavior, ModifierKind, ModifierLayer, Rarity, Spell, SpellKind,
};
pub use state::{EntityId, ProjectileId, RelicId, Team, Tick, Vec2};
pub use stats::{CharacterClass, ClassStats, ModifierSet, ResourceMeter, ValueModifier};
pub use wave::{EnemyTemplate, LevelDefinition, SpawnLocation, SpawnPlan, SpawnRule, plan_spawn};
