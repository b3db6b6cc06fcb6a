//! Relic construction from records, the built-in relics, and the offer pool.

use rand::Rng;
use rand::seq::SliceRandom;
use tracing::{debug, warn};

use game_core::formula::vars;
use game_core::{
    Bindings, EffectKind, EndCondition, Formula, FormulaError, RelicDefinition, TriggerKind,
};

use crate::records::{EffectRecord, RelicRecord, TriggerRecord};

#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum RelicBuildError {
    #[error("unknown trigger type `{0}`")]
    UnknownTrigger(String),

    #[error("unknown effect type `{0}`")]
    UnknownEffect(String),

    #[error("effect `{0}` requires an amount")]
    MissingAmount(String),

    #[error("effect `{effect}` has an unusable amount")]
    InvalidAmount {
        effect: String,
        #[source]
        source: FormulaError,
    },
}

/// Turns relic records into definitions.
pub struct RelicFactory;

impl RelicFactory {
    pub fn try_build(record: &RelicRecord) -> Result<RelicDefinition, RelicBuildError> {
        let effect = effect_kind(&record.effect)?;
        let trigger = trigger_kind(&record.trigger)?;
        Ok(RelicDefinition::new(record.name.clone(), trigger, effect)
            .with_descriptions(
                record.trigger.description.clone(),
                record.effect.description.clone(),
            )
            .with_sprite(record.sprite))
    }

    /// Like [`Self::try_build`], logging and discarding malformed records.
    pub fn build(record: &RelicRecord) -> Option<RelicDefinition> {
        match Self::try_build(record) {
            Ok(definition) => Some(definition),
            Err(error) => {
                warn!(relic = %record.name, %error, "relic rejected");
                None
            }
        }
    }

    pub fn build_all<'a>(records: impl IntoIterator<Item = &'a RelicRecord>) -> Vec<RelicDefinition> {
        records.into_iter().filter_map(Self::build).collect()
    }
}

fn parse_or<T: std::str::FromStr>(raw: Option<&str>, default: T) -> T {
    raw.map(str::trim)
        .filter(|raw| !raw.is_empty())
        .and_then(|raw| raw.parse().ok())
        .unwrap_or(default)
}

fn trigger_kind(record: &TriggerRecord) -> Result<TriggerKind, RelicBuildError> {
    Ok(match record.kind.as_str() {
        "take-damage" => TriggerKind::OnDamageTaken,
        "on-kill" => TriggerKind::OnKill,
        "stand-still" => TriggerKind::OnStandStill {
            duration_secs: parse_or(
                record.amount.as_deref(),
                TriggerKind::DEFAULT_STAND_STILL_SECS,
            ),
        },
        "cast-spell" => TriggerKind::OnSpellCast,
        "wave-complete" => TriggerKind::OnWaveComplete,
        other => return Err(RelicBuildError::UnknownTrigger(other.to_owned())),
    })
}

fn effect_kind(record: &EffectRecord) -> Result<EffectKind, RelicBuildError> {
    let amount = record.amount.as_deref();
    let until = record.until.as_deref();
    Ok(match record.kind.as_str() {
        "gain-mana" => EffectKind::GainMana(parse_or(amount, EffectKind::DEFAULT_MANA)),
        "gain-spellpower" if until == Some("cast-spell") => EffectKind::ModifyNextSpell(parse_or(
            amount,
            EffectKind::DEFAULT_NEXT_SPELL_BONUS,
        )),
        "gain-spellpower" => {
            let amount = amount
                .filter(|raw| !raw.trim().is_empty())
                .ok_or_else(|| RelicBuildError::MissingAmount(record.kind.clone()))?;
            let amount = Formula::from(amount);
            // Evaluated on every trigger, so a broken formula is refused here.
            amount
                .eval_int(&Bindings::new().with(vars::WAVE, 1))
                .map_err(|source| RelicBuildError::InvalidAmount {
                    effect: record.kind.clone(),
                    source,
                })?;
            EffectKind::GainSpellPower {
                amount,
                until: until.and_then(|raw| raw.parse::<EndCondition>().ok()),
            }
        }
        "gain-max-health" => {
            EffectKind::GainMaxHealth(parse_or(amount, EffectKind::DEFAULT_MAX_HEALTH))
        }
        "heal" => EffectKind::Heal(parse_or(amount, EffectKind::DEFAULT_HEAL)),
        other => return Err(RelicBuildError::UnknownEffect(other.to_owned())),
    })
}

/// Relics that exist regardless of the data files.
pub fn builtin_relics() -> Vec<RelicDefinition> {
    vec![
        RelicDefinition::new("Mystic Orb", TriggerKind::OnSpellCast, EffectKind::GainMana(2))
            .with_descriptions("Whenever you cast a spell", "you replenish 2 mana")
            .with_sprite(4),
        RelicDefinition::new(
            "Vitality Crystal",
            TriggerKind::OnWaveComplete,
            EffectKind::GainMaxHealth(10),
        )
        .with_descriptions("Whenever you complete a wave", "you gain 10 max health")
        .with_sprite(5),
        RelicDefinition::new(
            "Phoenix Feather",
            TriggerKind::OnDamageTaken,
            EffectKind::Heal(3),
        )
        .with_descriptions("When you take damage", "you heal 3 health")
        .with_sprite(6),
        RelicDefinition::new(
            "Soul Harvester",
            TriggerKind::OnKill,
            EffectKind::GainSpellPower {
                amount: Formula::from("2"),
                until: None,
            },
        )
        .with_descriptions("When you kill an enemy", "you gain 2 spell power permanently")
        .with_sprite(7),
    ]
}

/// Relics not yet taken by the player, and the offers drawn from them.
#[derive(Clone, Debug, Default)]
pub struct RelicPool {
    all: Vec<RelicDefinition>,
    available: Vec<RelicDefinition>,
}

impl RelicPool {
    pub fn new(relics: Vec<RelicDefinition>) -> Self {
        Self {
            available: relics.clone(),
            all: relics,
        }
    }

    /// Up to `size` distinct relics still in the pool, in random order.
    pub fn offer<R: Rng>(&self, size: usize, rng: &mut R) -> Vec<RelicDefinition> {
        let offer: Vec<RelicDefinition> = self
            .available
            .choose_multiple(rng, size)
            .cloned()
            .collect();
        debug!(
            available = self.available.len(),
            offered = offer.len(),
            "relic offer drawn"
        );
        offer
    }

    /// Removes the relic named `name` from the pool.
    pub fn take(&mut self, name: &str) -> Option<RelicDefinition> {
        let index = self.available.iter().position(|r| r.name == name)?;
        Some(self.available.remove(index))
    }

    /// Makes every relic available again.
    pub fn reset(&mut self) {
        self.available = self.all.clone();
    }

    pub fn available(&self) -> &[RelicDefinition] {
        &self.available
    }

    pub fn is_exhausted(&self) -> bool {
        self.available.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeSet;

    use super::*;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    fn record(json: &str) -> RelicRecord {
        serde_json::from_str(json).unwrap()
    }

    #[test]
    fn parses_stand_still_with_temporary_power() {
        let definition = RelicFactory::try_build(&record(
            r#"{
                "name": "Cursed Scroll",
                "sprite": 0,
                "trigger": {"description": "Stand still for 3s", "type": "stand-still", "amount": "3"},
                "effect": {"description": "gain spell power", "type": "gain-spellpower", "amount": "10", "until": "move"}
            }"#,
        ))
        .unwrap();
        assert_eq!(
            definition.trigger,
            TriggerKind::OnStandStill { duration_secs: 3.0 }
        );
        assert_eq!(
            definition.effect,
            EffectKind::GainSpellPower {
                amount: "10".into(),
                until: Some(EndCondition::Move),
            }
        );
        assert_eq!(definition.trigger_description, "Stand still for 3s");
    }

    #[test]
    fn spell_power_until_cast_becomes_next_spell_bonus() {
        let definition = RelicFactory::try_build(&record(
            r#"{
                "name": "Golden Mask",
                "trigger": {"type": "take-damage"},
                "effect": {"type": "gain-spellpower", "amount": "100", "until": "cast-spell"}
            }"#,
        ))
        .unwrap();
        assert_eq!(definition.effect, EffectKind::ModifyNextSpell(100));
    }

    #[test]
    fn missing_or_unparsable_amounts_use_defaults() {
        let definition = RelicFactory::try_build(&record(
            r#"{"name": "Jade", "trigger": {"type": "stand-still"}, "effect": {"type": "heal", "amount": "lots"}}"#,
        ))
        .unwrap();
        assert_eq!(
            definition.trigger,
            TriggerKind::OnStandStill { duration_secs: 3.0 }
        );
        assert_eq!(definition.effect, EffectKind::Heal(5));
    }

    #[test]
    fn malformed_records_are_rejected() {
        let unknown_trigger = record(
            r#"{"name": "A", "trigger": {"type": "on-dodge"}, "effect": {"type": "heal"}}"#,
        );
        let unknown_effect = record(
            r#"{"name": "B", "trigger": {"type": "on-kill"}, "effect": {"type": "teleport"}}"#,
        );
        let missing_amount = record(
            r#"{"name": "C", "trigger": {"type": "on-kill"}, "effect": {"type": "gain-spellpower"}}"#,
        );
        assert_eq!(
            RelicFactory::try_build(&unknown_trigger),
            Err(RelicBuildError::UnknownTrigger("on-dodge".into()))
        );
        assert_eq!(
            RelicFactory::try_build(&unknown_effect),
            Err(RelicBuildError::UnknownEffect("teleport".into()))
        );
        assert!(matches!(
            RelicFactory::try_build(&missing_amount),
            Err(RelicBuildError::MissingAmount(_))
        ));
        let broken_amount = record(
            r#"{"name": "D", "trigger": {"type": "cast-spell"}, "effect": {"type": "gain-spellpower", "amount": "wave bogus +"}}"#,
        );
        assert!(matches!(
            RelicFactory::try_build(&broken_amount),
            Err(RelicBuildError::InvalidAmount {
                source: FormulaError::MalformedExpression { .. },
                ..
            })
        ));
        assert!(
            RelicFactory::build_all([
                &unknown_trigger,
                &unknown_effect,
                &missing_amount,
                &broken_amount
            ])
            .is_empty()
        );
    }

    #[test]
    fn pool_offers_distinct_relics_and_resets() {
        let mut pool = RelicPool::new(builtin_relics());
        let mut rng = StdRng::seed_from_u64(3);

        let offer = pool.offer(3, &mut rng);
        assert_eq!(offer.len(), 3);
        let names: BTreeSet<&str> = offer.iter().map(|r| r.name.as_str()).collect();
        assert_eq!(names.len(), 3);

        assert!(pool.take("Soul Harvester").is_some());
        assert!(pool.take("Soul Harvester").is_none());
        assert_eq!(pool.offer(10, &mut rng).len(), 3);

        pool.reset();
        assert_eq!(pool.available().len(), 4);
    }
}
