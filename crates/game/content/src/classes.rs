//! Playable class registry.

use std::collections::BTreeMap;

use tracing::warn;

use game_core::CharacterClass;

use crate::records::ClassRecord;

/// Classes keyed by name. The built-in mage is used for unknown names.
#[derive(Clone, Debug, Default)]
pub struct ClassRegistry {
    classes: BTreeMap<String, CharacterClass>,
}

impl ClassRegistry {
    pub const FALLBACK_CLASS: &'static str = "mage";

    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_records(records: impl IntoIterator<Item = (String, ClassRecord)>) -> Self {
        Self {
            classes: records
                .into_iter()
                .map(|(name, record)| {
                    let class = record.into_class(&name);
                    (name, class)
                })
                .collect(),
        }
    }

    pub fn insert(&mut self, class: CharacterClass) {
        self.classes.insert(class.name.clone(), class);
    }

    pub fn get(&self, name: &str) -> Option<&CharacterClass> {
        self.classes.get(name)
    }

    /// The class named `name`, or the mage when there is none.
    pub fn resolve(&self, name: &str) -> CharacterClass {
        if let Some(class) = self.get(name) {
            return class.clone();
        }
        warn!(class = name, "unknown class, using the mage");
        self.get(Self::FALLBACK_CLASS)
            .cloned()
            .unwrap_or_else(CharacterClass::mage)
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.classes.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.classes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.classes.is_empty()
    }
}
