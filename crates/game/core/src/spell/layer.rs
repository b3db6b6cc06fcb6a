//! Modifier layers wrapped around a base spell.
//!
//! A spell keeps its layers as plain data, ordered innermost first. Each layer
//! contributes a [`ModifierSet`], may force a trajectory, and may replace the
//! cast procedure with a [`LayerBehavior`].

use crate::combat::Trajectory;
use crate::stats::{ModifierSet, StatChannel, ValueModifier};

/// How a layer changes the cast procedure of everything it wraps.
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum LayerBehavior {
    /// Only stats (and possibly trajectory) change.
    Stat,
    /// Cast the wrapped spell twice, the second time after `delay_secs`.
    Repeat { delay_secs: f32 },
    /// Cast the wrapped spell twice, rotated by ±`angle_degrees`/2.
    Split { angle_degrees: f32 },
    /// Fire one projectile that passes through up to `max_hits` enemies.
    Pierce { max_hits: u32, reduction: f32 },
    /// Fire one projectile whose hit jumps to nearby enemies.
    Chain {
        max_chains: u32,
        range: f32,
        reduction: f32,
    },
}

impl LayerBehavior {
    /// Pierce and chain fire a single projectile of their own and never
    /// reach the cast procedure of the layers they wrap.
    pub fn is_terminal(&self) -> bool {
        matches!(self, LayerBehavior::Pierce { .. } | LayerBehavior::Chain { .. })
    }
}

/// One modifier wrapped around a spell.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ModifierLayer {
    /// Catalog key, e.g. `damage_amp`.
    pub key: String,
    /// Name prepended to the wrapped spell's name, e.g. `damage-amplified`.
    pub display_name: String,
    pub description: String,
    pub modifiers: ModifierSet,
    pub trajectory: Option<Trajectory>,
    pub behavior: LayerBehavior,
}

impl ModifierLayer {
    pub fn new(key: impl Into<String>, display_name: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            display_name: display_name.into(),
            description: String::new(),
            modifiers: ModifierSet::new(),
            trajectory: None,
            behavior: LayerBehavior::Stat,
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    pub fn with_modifier(mut self, channel: StatChannel, modifier: ValueModifier) -> Self {
        self.modifiers.channel_mut(channel).push(modifier);
        self
    }

    pub fn with_trajectory(mut self, trajectory: Trajectory) -> Self {
        self.trajectory = Some(trajectory);
        self
    }

    pub fn with_behavior(mut self, behavior: LayerBehavior) -> Self {
        self.behavior = behavior;
        self
    }
}

/// The built-in modifiers and their default tuning.
#[derive(
    Clone,
    Copy,
    Debug,
    PartialEq,
    Eq,
    Hash,
    strum::Display,
    strum::EnumString,
    strum::EnumIter,
    strum::AsRefStr,
)]
#[strum(serialize_all = "snake_case")]
pub enum ModifierKind {
    DamageAmp,
    SpeedAmp,
    Chaos,
    Homing,
    Doubler,
    Splitter,
    Piercing,
    ChainLightning,
}

impl ModifierKind {
    pub const fn display_name(self) -> &'static str {
        match self {
            ModifierKind::DamageAmp => "damage-amplified",
            ModifierKind::SpeedAmp => "speed-amplified",
            ModifierKind::Chaos => "chaotic",
            ModifierKind::Homing => "homing",
            ModifierKind::Doubler => "doubled",
            ModifierKind::Splitter => "split",
            ModifierKind::Piercing => "piercing",
            ModifierKind::ChainLightning => "chain lightning",
        }
    }

    pub const fn description(self) -> &'static str {
        match self {
            ModifierKind::DamageAmp => "Increased damage and increased mana cost.",
            ModifierKind::SpeedAmp => "Faster projectile speed.",
            ModifierKind::Chaos => "Significantly increased damage, but projectile is spiraling.",
            ModifierKind::Homing => {
                "Homing projectile, with decreased damage and increased mana cost."
            }
            ModifierKind::Doubler => {
                "Spell is cast a second time after a small delay; increased mana cost and cooldown."
            }
            ModifierKind::Splitter => {
                "Spell is cast twice in slightly different directions; increased mana cost."
            }
            ModifierKind::Piercing => {
                "Projectiles pierce through enemies, dealing reduced damage to each subsequent target."
            }
            ModifierKind::ChainLightning => {
                "Spell chains to nearby enemies, dealing reduced damage to each subsequent target."
            }
        }
    }

    /// The layer this modifier produces when its record sets no overrides.
    pub fn default_layer(self) -> ModifierLayer {
        use StatChannel::{Cooldown, Damage, ManaCost, Speed};
        use ValueModifier::{Additive, Multiplicative};

        let layer = ModifierLayer::new(self.as_ref(), self.display_name())
            .with_description(self.description());
        match self {
            ModifierKind::DamageAmp => layer
                .with_modifier(Damage, Multiplicative(1.5))
                .with_modifier(ManaCost, Multiplicative(1.5)),
            ModifierKind::SpeedAmp => layer.with_modifier(Speed, Multiplicative(1.75)),
            ModifierKind::Chaos => layer
                .with_modifier(Damage, Multiplicative(1.5))
                .with_trajectory(Trajectory::Spiraling),
            ModifierKind::Homing => layer
                .with_modifier(Damage, Multiplicative(0.75))
                .with_modifier(ManaCost, Additive(10.0))
                .with_trajectory(Trajectory::Homing),
            ModifierKind::Doubler => layer
                .with_modifier(ManaCost, Multiplicative(1.5))
                .with_modifier(Cooldown, Multiplicative(1.5))
                .with_behavior(LayerBehavior::Repeat { delay_secs: 0.5 }),
            ModifierKind::Splitter => layer
                .with_modifier(ManaCost, Multiplicative(1.5))
                .with_behavior(LayerBehavior::Split {
                    angle_degrees: 10.0,
                }),
            ModifierKind::Piercing => layer.with_behavior(LayerBehavior::Pierce {
                max_hits: 3,
                reduction: 0.8,
            }),
            ModifierKind::ChainLightning => layer.with_behavior(LayerBehavior::Chain {
                max_chains: 3,
                range: 4.0,
                reduction: 0.7,
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use strum::IntoEnumIterator;

    #[test]
    fn keys_parse_back_to_kinds() {
        for kind in ModifierKind::iter() {
            let parsed: ModifierKind = kind.as_ref().parse().unwrap();
            assert_eq!(parsed, kind);
            assert_eq!(kind.default_layer().key, kind.as_ref());
        }
        assert_eq!(ModifierKind::ChainLightning.as_ref(), "chain_lightning");
    }

    #[test]
    fn only_pierce_and_chain_are_terminal() {
        let terminal: Vec<ModifierKind> = ModifierKind::iter()
            .filter(|k| k.default_layer().behavior.is_terminal())
            .collect();
        assert_eq!(
            terminal,
            vec![ModifierKind::Piercing, ModifierKind::ChainLightning]
        );
    }
}
