//! Character classes: per-wave stat curves expressed as formulas over `wave`.

use crate::formula::{Bindings, Formula, FormulaError, vars};

/// Stat curves for a playable class.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct CharacterClass {
    pub name: String,
    pub sprite: u32,
    pub health: Formula,
    pub mana: Formula,
    pub mana_regeneration: Formula,
    pub spell_power: Formula,
    pub speed: Formula,
}

impl CharacterClass {
    pub const DEFAULT_HEALTH: &'static str = "100";
    pub const DEFAULT_MANA: &'static str = "50";
    pub const DEFAULT_MANA_REGENERATION: &'static str = "5";
    pub const DEFAULT_SPELL_POWER: &'static str = "10";
    pub const DEFAULT_SPEED: &'static str = "5";

    /// A class using the default curve for every stat.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            sprite: 0,
            health: Formula::from(Self::DEFAULT_HEALTH),
            mana: Formula::from(Self::DEFAULT_MANA),
            mana_regeneration: Formula::from(Self::DEFAULT_MANA_REGENERATION),
            spell_power: Formula::from(Self::DEFAULT_SPELL_POWER),
            speed: Formula::from(Self::DEFAULT_SPEED),
        }
    }

    /// The built-in mage, whose curves grow quadratically with the wave.
    pub fn mage() -> Self {
        Self {
            name: "mage".to_owned(),
            sprite: 0,
            health: Formula::from("95 wave 12 * + wave wave * 2 * +"),
            mana: Formula::from("90 wave 15 * + wave wave * 3 * +"),
            mana_regeneration: Formula::from("10 wave 2 * + wave 10 / +"),
            spell_power: Formula::from("wave 12 *"),
            speed: Formula::from("5 wave 15 / +"),
        }
    }

    /// Evaluates every curve for `wave`.
    pub fn stats_at(&self, wave: u32) -> Result<ClassStats, FormulaError> {
        let wave = i32::try_from(wave).unwrap_or(i32::MAX);
        let bindings = Bindings::new().with(vars::WAVE, wave);
        Ok(ClassStats {
            health: self.health.eval_int(&bindings)?,
            mana: self.mana.eval_int(&bindings)?,
            mana_regeneration: self.mana_regeneration.eval_int(&bindings)?,
            spell_power: self.spell_power.eval_int(&bindings)?,
            speed: self.speed.eval_int(&bindings)?,
        })
    }
}

/// Concrete class stats for one wave.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ClassStats {
    pub health: i32,
    pub mana: i32,
    pub mana_regeneration: i32,
    pub spell_power: i32,
    pub speed: i32,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mage_curves_at_wave_three() {
        let stats = CharacterClass::mage().stats_at(3).unwrap();
        assert_eq!(
            stats,
            ClassStats {
                health: 149,
                mana: 162,
                mana_regeneration: 16,
                spell_power: 36,
                speed: 5,
            }
        );
    }

    #[test]
    fn default_curves_are_flat() {
        let class = CharacterClass::new("apprentice");
        assert_eq!(class.stats_at(1).unwrap(), class.stats_at(9).unwrap());
        assert_eq!(class.stats_at(1).unwrap().mana, 50);
    }
}
