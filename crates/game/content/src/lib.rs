//! Data-driven content for the combat engine.
//!
//! This crate turns the JSON and TOML files of a data directory into
//! `game-core` types:
//! - Character classes (stat curves over the wave)
//! - Base spells and modifiers, and the builder that assembles them
//! - Relics, including the built-in ones, and the offer pool
//! - Enemy templates and level spawn rules
//! - Combat tunables
//!
//! Content is consumed by the runtime session and never appears in engine
//! state by name; only the built values do.

pub mod classes;
pub mod records;
pub mod relics;
pub mod spells;

#[cfg(feature = "loaders")]
pub mod loaders;

pub use classes::ClassRegistry;
pub use records::{ClassRecord, EnemyRecord, LevelRecord, RelicRecord, SpawnRecord, SpellRecord};
pub use relics::{RelicBuildError, RelicFactory, RelicPool, builtin_relics};
pub use spells::{BuildError, DEFAULT_SPELL, SpellBuilder, SpellCatalog};

#[cfg(feature = "loaders")]
pub use loaders::{
    ClassLoader, ConfigLoader, ContentFactory, EnemyLoader, LevelLoader, LoadResult, RelicLoader,
    SpellLoader, factory::ContentBundle,
};
