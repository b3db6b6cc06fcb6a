//! Enemy and level loaders.

use std::path::Path;

use game_core::{EnemyTemplate, LevelDefinition};

use crate::loaders::{LoadResult, read_json};
use crate::records::{EnemyRecord, LevelRecord};

/// Loader for `enemies.json`.
pub struct EnemyLoader;

impl EnemyLoader {
    pub fn load(path: &Path) -> LoadResult<Vec<EnemyTemplate>> {
        let records: Vec<EnemyRecord> = read_json(path, "enemy")?;
        Ok(records.into_iter().map(EnemyTemplate::from).collect())
    }
}

/// Loader for `levels.json`.
pub struct LevelLoader;

impl LevelLoader {
    pub fn load(path: &Path) -> LoadResult<Vec<LevelDefinition>> {
        let records: Vec<LevelRecord> = read_json(path, "level")?;
        Ok(records.into_iter().map(LevelDefinition::from).collect())
    }
}
