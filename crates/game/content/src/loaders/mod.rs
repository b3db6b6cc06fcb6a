//! Content loaders for reading game data from files.
//!
//! Each loader reads one file of the data directory and converts its records
//! into `game-core` types. [`ContentFactory`] ties them to a directory layout.

pub mod classes;
pub mod config;
pub mod factory;
pub mod relics;
pub mod spells;
pub mod waves;

pub use classes::ClassLoader;
pub use config::ConfigLoader;
pub use factory::ContentFactory;
pub use relics::RelicLoader;
pub use spells::SpellLoader;
pub use waves::{EnemyLoader, LevelLoader};

use std::path::Path;

use serde::de::DeserializeOwned;

/// Common result type for loaders.
pub type LoadResult<T> = anyhow::Result<T>;

/// Helper function to read file contents.
pub(crate) fn read_file(path: &Path) -> LoadResult<String> {
    std::fs::read_to_string(path)
        .map_err(|e| anyhow::anyhow!("Failed to read file {}: {}", path.display(), e))
}

/// Reads and parses a JSON file; `what` names the content in error messages.
pub(crate) fn read_json<T: DeserializeOwned>(path: &Path, what: &str) -> LoadResult<T> {
    let content = read_file(path)?;
    serde_json::from_str(&content).map_err(|e| {
        anyhow::anyhow!("Failed to parse {} JSON {}: {}", what, path.display(), e)
    })
}
