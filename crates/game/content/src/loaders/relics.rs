//! Relic loader.

use std::path::Path;

use game_core::RelicDefinition;

use crate::loaders::{LoadResult, read_json};
use crate::records::RelicRecord;
use crate::relics::RelicFactory;

/// Loader for `relics.json`, a list of relic records.
pub struct RelicLoader;

impl RelicLoader {
    /// Loads every well-formed relic; malformed ones are logged and skipped.
    pub fn load(path: &Path) -> LoadResult<Vec<RelicDefinition>> {
        let records: Vec<RelicRecord> = read_json(path, "relic")?;
        Ok(RelicFactory::build_all(&records))
    }
}
