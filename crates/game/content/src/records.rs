//! Serde shapes of the JSON content files.
//!
//! Records mirror the files field for field and keep every field optional, so
//! defaults are applied in one place by the code that turns a record into a
//! `game-core` type.

use serde::Deserialize;

use game_core::{
    CharacterClass, EnemyTemplate, Formula, LevelDefinition, SpawnLocation, SpawnRule,
};

/// One `classes.json` entry; the class name is the map key.
#[derive(Clone, Debug, Default, Deserialize)]
#[serde(default)]
pub struct ClassRecord {
    pub sprite: u32,
    pub health: Option<Formula>,
    pub mana: Option<Formula>,
    pub mana_regeneration: Option<Formula>,
    pub spellpower: Option<Formula>,
    pub speed: Option<Formula>,
}

impl ClassRecord {
    pub fn into_class(self, name: &str) -> CharacterClass {
        let defaults = CharacterClass::new(name);
        CharacterClass {
            name: name.to_owned(),
            sprite: self.sprite,
            health: self.health.unwrap_or(defaults.health),
            mana: self.mana.unwrap_or(defaults.mana),
            mana_regeneration: self.mana_regeneration.unwrap_or(defaults.mana_regeneration),
            spell_power: self.spellpower.unwrap_or(defaults.spell_power),
            speed: self.speed.unwrap_or(defaults.speed),
        }
    }
}

#[derive(Clone, Debug, Default, Deserialize)]
#[serde(default)]
pub struct DamageRecord {
    pub amount: Option<Formula>,
    #[serde(rename = "type")]
    pub kind: Option<String>,
}

#[derive(Clone, Debug, Default, Deserialize)]
#[serde(default)]
pub struct ProjectileRecord {
    pub speed: Option<Formula>,
    pub trajectory: Option<String>,
    pub sprite: Option<u32>,
    pub lifetime: Option<Formula>,
}

/// One `spells.json` entry: a base spell or a modifier.
#[derive(Clone, Debug, Default, Deserialize)]
#[serde(default)]
pub struct SpellRecord {
    pub name: Option<String>,
    pub description: Option<String>,
    pub icon: Option<u32>,
    pub damage: Option<DamageRecord>,
    pub mana_cost: Option<Formula>,
    pub cooldown: Option<Formula>,
    pub projectile: Option<ProjectileRecord>,

    // blast / spray / nova
    #[serde(rename = "N")]
    pub count: Option<Formula>,
    pub secondary_damage: Option<Formula>,
    pub secondary_projectile: Option<ProjectileRecord>,
    pub spray: Option<Formula>,
    pub radius: Option<Formula>,
    pub knockback_force: Option<Formula>,

    // modifiers
    pub damage_multiplier: Option<Formula>,
    pub mana_multiplier: Option<Formula>,
    pub speed_multiplier: Option<Formula>,
    pub cooldown_multiplier: Option<Formula>,
    pub delay: Option<Formula>,
    pub angle: Option<Formula>,
    pub mana_adder: Option<Formula>,
    pub max_pierces: Option<Formula>,
    pub max_chains: Option<Formula>,
    pub chain_range: Option<Formula>,
    pub damage_reduction: Option<Formula>,
    pub projectile_trajectory: Option<String>,
}

impl SpellRecord {
    /// True when any modifier-only key is present: `damage_multiplier`,
    /// `mana_multiplier`, `speed_multiplier`, `cooldown_multiplier`, `delay`,
    /// `angle`, `mana_adder`, `max_pierces` or `max_chains`.
    pub fn is_modifier(&self) -> bool {
        [
            &self.damage_multiplier,
            &self.mana_multiplier,
            &self.speed_multiplier,
            &self.cooldown_multiplier,
            &self.delay,
            &self.angle,
            &self.mana_adder,
            &self.max_pierces,
            &self.max_chains,
        ]
        .iter()
        .any(|field| field.is_some())
    }
}

#[derive(Clone, Debug, Default, Deserialize)]
#[serde(default)]
pub struct TriggerRecord {
    pub description: String,
    #[serde(rename = "type")]
    pub kind: String,
    pub amount: Option<String>,
}

#[derive(Clone, Debug, Default, Deserialize)]
#[serde(default)]
pub struct EffectRecord {
    pub description: String,
    #[serde(rename = "type")]
    pub kind: String,
    pub amount: Option<String>,
    pub until: Option<String>,
}

/// One `relics.json` entry.
#[derive(Clone, Debug, Default, Deserialize)]
#[serde(default)]
pub struct RelicRecord {
    pub name: String,
    pub sprite: u32,
    pub trigger: TriggerRecord,
    pub effect: EffectRecord,
}

/// One `enemies.json` entry.
#[derive(Clone, Debug, Default, Deserialize)]
#[serde(default)]
pub struct EnemyRecord {
    pub name: String,
    pub sprite: u32,
    pub hp: i32,
    pub speed: i32,
    pub damage: i32,
}

impl From<EnemyRecord> for EnemyTemplate {
    fn from(record: EnemyRecord) -> Self {
        EnemyTemplate {
            name: record.name,
            sprite: record.sprite,
            hp: record.hp,
            speed: record.speed,
            damage: record.damage,
        }
    }
}

#[derive(Clone, Debug, Default, Deserialize)]
#[serde(default)]
pub struct SpawnRecord {
    pub enemy: String,
    pub count: Option<Formula>,
    pub sequence: Option<Vec<u32>>,
    pub delay: Option<Formula>,
    pub location: Option<String>,
    pub hp: Option<Formula>,
    pub speed: Option<Formula>,
    pub damage: Option<Formula>,
}

impl From<SpawnRecord> for SpawnRule {
    fn from(record: SpawnRecord) -> Self {
        let defaults = SpawnRule::new(record.enemy);
        SpawnRule {
            count: record.count.unwrap_or(defaults.count),
            hp: record.hp.unwrap_or(defaults.hp),
            speed: record.speed.unwrap_or(defaults.speed),
            damage: record.damage.unwrap_or(defaults.damage),
            delay: record.delay.unwrap_or(defaults.delay),
            sequence: record.sequence.unwrap_or(defaults.sequence),
            location: record
                .location
                .map(|raw| raw.parse::<SpawnLocation>().unwrap_or_default())
                .unwrap_or(SpawnLocation::Random),
            enemy: defaults.enemy,
        }
    }
}

/// One `levels.json` entry.
#[derive(Clone, Debug, Deserialize)]
#[serde(default)]
pub struct LevelRecord {
    pub name: String,
    pub waves: i32,
    pub spawns: Vec<SpawnRecord>,
}

impl Default for LevelRecord {
    fn default() -> Self {
        Self {
            name: String::new(),
            waves: LevelDefinition::ENDLESS,
            spawns: Vec::new(),
        }
    }
}

impl From<LevelRecord> for LevelDefinition {
    fn from(record: LevelRecord) -> Self {
        LevelDefinition {
            name: record.name,
            waves: record.waves,
            spawns: record.spawns.into_iter().map(SpawnRule::from).collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn modifier_classification_is_structural() {
        let amp: SpellRecord =
            serde_json::from_str(r#"{"name": "damage-amplified", "damage_multiplier": "1.5"}"#)
                .unwrap();
        let bolt: SpellRecord = serde_json::from_str(
            r#"{"name": "Arcane Bolt", "damage": {"amount": "25 power 5 / +", "type": "arcane"}}"#,
        )
        .unwrap();
        let trajectory_only: SpellRecord =
            serde_json::from_str(r#"{"projectile_trajectory": "homing"}"#).unwrap();
        assert!(amp.is_modifier());
        assert!(!bolt.is_modifier());
        assert!(!trajectory_only.is_modifier());
    }

    #[test]
    fn spawn_defaults_fill_missing_fields() {
        let record: SpawnRecord =
            serde_json::from_str(r#"{"enemy": "zombie", "count": 5, "location": "random red"}"#)
                .unwrap();
        let rule = SpawnRule::from(record);
        assert_eq!(rule.count.as_str(), "5");
        assert_eq!(rule.sequence, vec![1]);
        assert_eq!(rule.delay.as_str(), "2");
        assert_eq!(rule.hp.as_str(), "base");
        assert_eq!(rule.location, SpawnLocation::RandomOf("RED".into()));
    }

    #[test]
    fn levels_default_to_endless() {
        let level: LevelRecord = serde_json::from_str(r#"{"name": "Endless"}"#).unwrap();
        assert!(LevelDefinition::from(level).is_endless());
    }
}
