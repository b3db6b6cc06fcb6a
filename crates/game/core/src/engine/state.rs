use crate::caster::SpellCaster;
use crate::spell::{Rarity, Spell};
use crate::state::{Tick, Vec2};
use crate::stats::{ClassStats, ResourceMeter};

/// The player character as the combat rules see it.
#[derive(Clone, Debug, PartialEq)]
pub struct PlayerState {
    pub caster: SpellCaster,
    pub health: ResourceMeter,
    pub position: Vec2,
}

impl PlayerState {
    pub const STARTING_HEALTH: i32 = 100;

    /// A fresh player at the origin with full health, holding `starting_spell`.
    pub fn new(starting_spell: Spell) -> Self {
        Self {
            caster: SpellCaster::player(starting_spell),
            health: ResourceMeter::full(Self::STARTING_HEALTH),
            position: Vec2::ZERO,
        }
    }

    pub fn is_dead(&self) -> bool {
        self.health.is_empty()
    }
}

/// Class stats currently folded into the player, so a new wave's stats can be
/// applied as a delta without disturbing relic gains.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub(crate) struct ClassBaseline {
    pub health: i32,
    pub mana: i32,
    pub spell_power: i32,
}

impl ClassBaseline {
    pub fn from_stats(stats: &ClassStats) -> Self {
        Self {
            health: stats.health,
            mana: stats.mana,
            spell_power: stats.spell_power,
        }
    }
}

/// Mutable combat state owned by the engine.
#[derive(Clone, Debug, PartialEq)]
pub struct CombatState {
    pub now: Tick,
    pub wave: u32,
    pub player: PlayerState,
    pub(crate) baseline: ClassBaseline,
}

impl CombatState {
    pub fn new(player: PlayerState) -> Self {
        Self {
            now: Tick::ZERO,
            wave: 1,
            player,
            baseline: ClassBaseline {
                health: PlayerState::STARTING_HEALTH,
                mana: SpellCaster::PLAYER_MANA,
                spell_power: 0,
            },
        }
    }
}

/// One spell slot, for display.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SpellSummary {
    pub name: String,
    pub rarity: Rarity,
    pub ready: bool,
    pub mana_cost: Option<i32>,
}

/// Read-only view of the combat state.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct CombatSnapshot {
    pub now: Tick,
    pub wave: u32,
    pub health: ResourceMeter,
    pub mana: ResourceMeter,
    pub spell_power: i32,
    pub pending_bonus: i32,
    pub position: Vec2,
    pub selected: usize,
    pub spells: Vec<SpellSummary>,
    pub relics: Vec<String>,
    pub live_projectiles: usize,
}
