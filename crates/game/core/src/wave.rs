//! Levels, enemy templates and per-wave spawn planning.

use std::fmt;
use std::str::FromStr;

use crate::formula::{Bindings, Formula, FormulaError, vars};

/// Base stats of an enemy type.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct EnemyTemplate {
    pub name: String,
    pub sprite: u32,
    pub hp: i32,
    pub speed: i32,
    pub damage: i32,
}

/// Where spawned enemies appear.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum SpawnLocation {
    /// Any spawn point.
    #[default]
    Random,
    /// A random spawn point of the given kind, e.g. `"random red"`.
    RandomOf(String),
}

impl FromStr for SpawnLocation {
    type Err = std::convert::Infallible;

    /// Unrecognized strings fall back to [`SpawnLocation::Random`].
    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        Ok(match raw.strip_prefix("random ") {
            Some(kind) if !kind.trim().is_empty() => {
                SpawnLocation::RandomOf(kind.trim().to_ascii_uppercase())
            }
            _ => SpawnLocation::Random,
        })
    }
}

impl fmt::Display for SpawnLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SpawnLocation::Random => f.write_str("random"),
            SpawnLocation::RandomOf(kind) => write!(f, "random {}", kind.to_ascii_lowercase()),
        }
    }
}

/// How one enemy type spawns during a level's waves.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SpawnRule {
    pub enemy: String,
    pub count: Formula,
    pub hp: Formula,
    pub speed: Formula,
    pub damage: Formula,
    /// Seconds between groups.
    pub delay: Formula,
    /// Group sizes, cycled until the count is exhausted.
    pub sequence: Vec<u32>,
    pub location: SpawnLocation,
}

impl SpawnRule {
    pub fn new(enemy: impl Into<String>) -> Self {
        Self {
            enemy: enemy.into(),
            count: Formula::from("1"),
            hp: Formula::from(vars::BASE),
            speed: Formula::from(vars::BASE),
            damage: Formula::from(vars::BASE),
            delay: Formula::from("2"),
            sequence: vec![1],
            location: SpawnLocation::Random,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LevelDefinition {
    pub name: String,
    /// Number of waves; negative means endless.
    pub waves: i32,
    pub spawns: Vec<SpawnRule>,
}

impl LevelDefinition {
    pub const ENDLESS: i32 = -1;

    pub fn is_endless(&self) -> bool {
        self.waves < 0
    }

    /// True when `wave` is the last wave of a finite level.
    pub fn is_final_wave(&self, wave: u32) -> bool {
        !self.is_endless() && i64::from(wave) >= i64::from(self.waves)
    }
}

/// Concrete spawn parameters for one rule in one wave.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SpawnPlan {
    pub enemy: String,
    pub sprite: u32,
    pub hp: i32,
    pub speed: i32,
    pub damage: i32,
    pub delay_secs: f32,
    /// Group sizes in spawn order; they sum to the total count.
    pub groups: Vec<u32>,
    pub location: SpawnLocation,
}

impl SpawnPlan {
    pub fn total(&self) -> u32 {
        self.groups.iter().sum()
    }
}

/// Evaluates `rule` for `enemy` at `wave`.
pub fn plan_spawn(
    rule: &SpawnRule,
    enemy: &EnemyTemplate,
    wave: u32,
) -> Result<SpawnPlan, FormulaError> {
    let wave_int = i32::try_from(wave).unwrap_or(i32::MAX);
    let with_base = |base: i32| Bindings::new().with(vars::WAVE, wave_int).with(vars::BASE, base);

    let count = rule.count.eval_int(&with_base(1))?.max(0) as u32;
    let delay_secs = rule.delay.eval_float(
        &Bindings::new()
            .with(vars::WAVE, wave as f32)
            .with(vars::BASE, 1.0),
    )?;

    Ok(SpawnPlan {
        enemy: enemy.name.clone(),
        sprite: enemy.sprite,
        hp: rule.hp.eval_int(&with_base(enemy.hp))?,
        speed: rule.speed.eval_int(&with_base(enemy.speed))?,
        damage: rule.damage.eval_int(&with_base(enemy.damage))?,
        delay_secs,
        groups: spawn_groups(count, &rule.sequence),
        location: rule.location.clone(),
    })
}

fn spawn_groups(count: u32, sequence: &[u32]) -> Vec<u32> {
    let sizes: Vec<u32> = sequence.iter().copied().filter(|s| *s > 0).collect();
    let sizes = if sizes.is_empty() { vec![1] } else { sizes };

    let mut groups = Vec::new();
    let mut remaining = count;
    for size in sizes.iter().cycle() {
        if remaining == 0 {
            break;
        }
        let group = (*size).min(remaining);
        groups.push(group);
        remaining -= group;
    }
    groups
}
