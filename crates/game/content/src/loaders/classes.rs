//! Class loader.

use std::collections::BTreeMap;
use std::path::Path;

use crate::classes::ClassRegistry;
use crate::loaders::{LoadResult, read_json};
use crate::records::ClassRecord;

/// Loader for `classes.json`, an object keyed by class name.
pub struct ClassLoader;

impl ClassLoader {
    pub fn load(path: &Path) -> LoadResult<ClassRegistry> {
        let records: BTreeMap<String, ClassRecord> = read_json(path, "class")?;
        Ok(ClassRegistry::from_records(records))
    }
}
