//! Spell catalog loader.

use std::collections::BTreeMap;
use std::path::Path;

use crate::loaders::{LoadResult, read_json};
use crate::records::SpellRecord;
use crate::spells::SpellCatalog;

/// Loader for `spells.json`, an object keyed by spell or modifier name.
pub struct SpellLoader;

impl SpellLoader {
    pub fn load(path: &Path) -> LoadResult<SpellCatalog> {
        let records: BTreeMap<String, SpellRecord> = read_json(path, "spell")?;
        Ok(SpellCatalog::from_records(records))
    }
}
