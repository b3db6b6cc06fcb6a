//! Numeric stat building blocks.
//!
//! - [`modifiers`]: additive/multiplicative aggregation used by every spell stat
//! - [`resources`]: bounded health and mana pools
//! - [`class`]: per-wave character class curves
pub mod class;
pub mod modifiers;
pub mod resources;

pub use class::{CharacterClass, ClassStats};
pub use modifiers::{
    ModifierSet, ModifierStack, StatChannel, ValueModifier, apply_modifiers, apply_modifiers_int,
};
pub use resources::ResourceMeter;
