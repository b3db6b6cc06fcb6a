//! Base spell definitions: shared attributes plus the kind-specific cast shape.

use crate::combat::{DamageKind, Trajectory};
use crate::formula::Formula;

/// Cast shape of a base spell, with its kind-specific formulas.
///
/// Formulas are evaluated against `{power, wave}` at cast time.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum SpellKind {
    /// One projectile toward the target.
    Bolt,
    /// One projectile that bursts into secondary projectiles on impact.
    Blast {
        count: Formula,
        secondary_damage: Formula,
        secondary_speed: Formula,
        secondary_lifetime: Formula,
        secondary_sprite: u32,
    },
    /// Immediate damage to every enemy around the caster, with knockback.
    Nova { radius: Formula, knockback: Formula },
    /// A fan of projectiles spread across `spread` radians.
    Spray {
        count: Formula,
        spread: Formula,
        lifetime: Formula,
    },
}

impl SpellKind {
    pub fn blast() -> Self {
        SpellKind::Blast {
            count: Formula::from("8"),
            secondary_damage: Formula::from("5"),
            secondary_speed: Formula::from("20"),
            secondary_lifetime: Formula::from("0.1"),
            secondary_sprite: 0,
        }
    }

    pub fn nova() -> Self {
        SpellKind::Nova {
            radius: Formula::from("5"),
            knockback: Formula::from("10"),
        }
    }

    pub fn spray() -> Self {
        SpellKind::Spray {
            count: Formula::from("7"),
            spread: Formula::from("0.3"),
            lifetime: Formula::from("0.1"),
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            SpellKind::Bolt => "bolt",
            SpellKind::Blast { .. } => "blast",
            SpellKind::Nova { .. } => "nova",
            SpellKind::Spray { .. } => "spray",
        }
    }
}

/// Attributes every base spell carries.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct BaseSpell {
    pub name: String,
    pub description: String,
    pub icon: u32,
    pub damage: Formula,
    pub damage_kind: DamageKind,
    pub mana_cost: Formula,
    /// Seconds.
    pub cooldown: Formula,
    pub speed: Formula,
    pub trajectory: Trajectory,
    pub sprite: u32,
    pub kind: SpellKind,
}

impl BaseSpell {
    pub fn new(name: impl Into<String>, kind: SpellKind) -> Self {
        Self {
            name: name.into(),
            kind,
            ..Self::default()
        }
    }
}

impl Default for BaseSpell {
    fn default() -> Self {
        Self {
            name: "Spell".to_owned(),
            description: "A basic spell".to_owned(),
            icon: 0,
            damage: Formula::from("10"),
            damage_kind: DamageKind::Arcane,
            mana_cost: Formula::from("10"),
            cooldown: Formula::from("1"),
            speed: Formula::from("10"),
            trajectory: Trajectory::Straight,
            sprite: 0,
            kind: SpellKind::Bolt,
        }
    }
}
