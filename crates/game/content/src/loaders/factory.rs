//! Content factory for loading every content file from a data directory.

use std::path::{Path, PathBuf};

use tracing::{info, warn};

use game_core::{CombatConfig, EnemyTemplate, LevelDefinition, RelicDefinition};

use crate::classes::ClassRegistry;
use crate::loaders::{
    ClassLoader, ConfigLoader, EnemyLoader, LevelLoader, LoadResult, RelicLoader, SpellLoader,
};
use crate::relics::builtin_relics;
use crate::spells::SpellCatalog;

/// Everything a run needs, loaded in one go.
#[derive(Clone, Debug)]
pub struct ContentBundle {
    pub config: CombatConfig,
    pub classes: ClassRegistry,
    pub spells: SpellCatalog,
    pub relics: Vec<RelicDefinition>,
    pub enemies: Vec<EnemyTemplate>,
    pub levels: Vec<LevelDefinition>,
}

impl ContentBundle {
    pub fn level(&self, name: &str) -> Option<&LevelDefinition> {
        self.levels.iter().find(|level| level.name == name)
    }

    pub fn enemy(&self, name: &str) -> Option<&EnemyTemplate> {
        self.enemies.iter().find(|enemy| enemy.name == name)
    }
}

/// Content factory that loads all game content from a data directory.
///
/// # Directory Structure
///
/// ```text
/// data_dir/
/// ├── config.toml
/// ├── classes.json
/// ├── spells.json
/// ├── relics.json
/// ├── enemies.json
/// └── levels.json
/// ```
pub struct ContentFactory {
    data_dir: PathBuf,
}

impl ContentFactory {
    /// Creates a new content factory pointing to a data directory.
    pub fn new(data_dir: impl Into<PathBuf>) -> Self {
        Self {
            data_dir: data_dir.into(),
        }
    }

    /// Load combat configuration from `config.toml`.
    pub fn load_config(&self) -> LoadResult<CombatConfig> {
        ConfigLoader::load(&self.data_dir.join("config.toml"))
    }

    /// Load playable classes from `classes.json`.
    pub fn load_classes(&self) -> LoadResult<ClassRegistry> {
        ClassLoader::load(&self.data_dir.join("classes.json"))
    }

    /// Load base spells and modifiers from `spells.json`.
    pub fn load_spells(&self) -> LoadResult<SpellCatalog> {
        SpellLoader::load(&self.data_dir.join("spells.json"))
    }

    /// Load relics from `relics.json`, followed by the built-in relics.
    ///
    /// A missing file leaves only the built-in relics.
    pub fn load_relics(&self) -> LoadResult<Vec<RelicDefinition>> {
        let path = self.data_dir.join("relics.json");
        let mut relics = if path.exists() {
            RelicLoader::load(&path)?
        } else {
            warn!(path = %path.display(), "no relic file, using built-in relics only");
            Vec::new()
        };
        relics.extend(builtin_relics());
        Ok(relics)
    }

    /// Load enemy templates from `enemies.json`.
    pub fn load_enemies(&self) -> LoadResult<Vec<EnemyTemplate>> {
        EnemyLoader::load(&self.data_dir.join("enemies.json"))
    }

    /// Load level definitions from `levels.json`.
    pub fn load_levels(&self) -> LoadResult<Vec<LevelDefinition>> {
        LevelLoader::load(&self.data_dir.join("levels.json"))
    }

    /// Load every content file.
    pub fn load_bundle(&self) -> LoadResult<ContentBundle> {
        let bundle = ContentBundle {
            config: self.load_config()?,
            classes: self.load_classes()?,
            spells: self.load_spells()?,
            relics: self.load_relics()?,
            enemies: self.load_enemies()?,
            levels: self.load_levels()?,
        };
        info!(
            data_dir = %self.data_dir.display(),
            classes = bundle.classes.len(),
            spells = bundle.spells.len(),
            relics = bundle.relics.len(),
            enemies = bundle.enemies.len(),
            levels = bundle.levels.len(),
            "content loaded"
        );
        Ok(bundle)
    }

    /// Returns the data directory path.
    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }
}
