//! Relics: passive items pairing a trigger with an effect.
//!
//! A relic's trigger holds bus subscriptions while the relic is owned; its
//! effect may hold one more subscription for its end condition. Both are
//! released through [`RelicCollection`] so that each is released exactly once.
mod effect;
mod trigger;

pub use effect::{Effect, EffectKind, EffectTarget, EndCondition};
pub use trigger::{StandStillTracker, Trigger, TriggerKind, TriggerResponse};

use std::collections::BTreeMap;

use crate::caster::SpellCaster;
use crate::events::EventBus;
use crate::state::RelicId;

/// Static description of a relic, as offered to the player.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct RelicDefinition {
    pub name: String,
    pub sprite: u32,
    pub trigger_description: String,
    pub effect_description: String,
    pub trigger: TriggerKind,
    pub effect: EffectKind,
}

impl RelicDefinition {
    pub fn new(name: impl Into<String>, trigger: TriggerKind, effect: EffectKind) -> Self {
        Self {
            name: name.into(),
            sprite: 0,
            trigger_description: String::new(),
            effect_description: String::new(),
            trigger,
            effect,
        }
    }

    pub fn with_descriptions(
        mut self,
        trigger_description: impl Into<String>,
        effect_description: impl Into<String>,
    ) -> Self {
        self.trigger_description = trigger_description.into();
        self.effect_description = effect_description.into();
        self
    }

    pub fn with_sprite(mut self, sprite: u32) -> Self {
        self.sprite = sprite;
        self
    }
}

/// An owned relic with live trigger and effect state.
#[derive(Debug)]
pub struct Relic {
    definition: RelicDefinition,
    pub trigger: Trigger,
    pub effect: Effect,
}

impl Relic {
    pub fn new(definition: RelicDefinition) -> Self {
        Self {
            trigger: Trigger::new(definition.trigger),
            effect: Effect::new(definition.effect.clone()),
            definition,
        }
    }

    pub fn definition(&self) -> &RelicDefinition {
        &self.definition
    }

    pub fn name(&self) -> &str {
        &self.definition.name
    }

    /// Releases the trigger and reverts the effect. Safe to call repeatedly.
    pub fn retire(&mut self, caster: &mut SpellCaster, bus: &mut EventBus) {
        self.trigger.deactivate(bus);
        self.effect.end(caster, bus);
    }
}

/// Relics owned by the player, keyed by the id assigned on insertion.
#[derive(Debug, Default)]
pub struct RelicCollection {
    next_id: u32,
    relics: BTreeMap<RelicId, Relic>,
}

impl RelicCollection {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds `relic` and activates its trigger.
    pub fn insert(&mut self, mut relic: Relic, bus: &mut EventBus) -> RelicId {
        let id = RelicId(self.next_id);
        self.next_id += 1;
        relic.trigger.activate(id, bus);
        self.relics.insert(id, relic);
        id
    }

    /// Removes relic `id`, releasing its subscriptions and reverting its effect.
    pub fn remove(
        &mut self,
        id: RelicId,
        caster: &mut SpellCaster,
        bus: &mut EventBus,
    ) -> Option<Relic> {
        let mut relic = self.relics.remove(&id)?;
        relic.retire(caster, bus);
        Some(relic)
    }

    /// Retires and removes every relic, returning their ids.
    pub fn clear(&mut self, caster: &mut SpellCaster, bus: &mut EventBus) -> Vec<RelicId> {
        let relics = std::mem::take(&mut self.relics);
        relics
            .into_iter()
            .map(|(id, mut relic)| {
                relic.retire(caster, bus);
                id
            })
            .collect()
    }

    pub fn get(&self, id: RelicId) -> Option<&Relic> {
        self.relics.get(&id)
    }

    pub fn get_mut(&mut self, id: RelicId) -> Option<&mut Relic> {
        self.relics.get_mut(&id)
    }

    pub fn iter(&self) -> impl Iterator<Item = (RelicId, &Relic)> {
        self.relics.iter().map(|(id, relic)| (*id, relic))
    }

    pub fn names(&self) -> Vec<String> {
        self.relics.values().map(|r| r.name().to_owned()).collect()
    }

    pub fn len(&self) -> usize {
        self.relics.len()
    }

    pub fn is_empty(&self) -> bool {
        self.relics.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::Team;

    fn orb() -> Relic {
        Relic::new(RelicDefinition::new(
            "Mystic Orb",
            TriggerKind::OnSpellCast,
            EffectKind::GainMana(2),
        ))
    }

    #[test]
    fn removal_releases_subscriptions() {
        let mut bus = EventBus::new();
        let mut caster = SpellCaster::new(10, 0, Team::Player);
        let mut relics = RelicCollection::new();
        let a = relics.insert(orb(), &mut bus);
        let b = relics.insert(orb(), &mut bus);
        assert_ne!(a, b);
        assert_eq!(bus.len(), 2);

        assert!(relics.remove(a, &mut caster, &mut bus).is_some());
        assert!(relics.remove(a, &mut caster, &mut bus).is_none());
        assert_eq!(bus.len(), 1);

        assert_eq!(relics.clear(&mut caster, &mut bus), vec![b]);
        assert!(bus.is_empty() && relics.is_empty());
    }
}
