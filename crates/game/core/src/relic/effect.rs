use crate::caster::SpellCaster;
use crate::events::{Channel, EventBus, Listener, Subscription};
use crate::formula::{Bindings, Formula, FormulaError, vars};
use crate::state::RelicId;
use crate::stats::ResourceMeter;

/// Event that ends a temporary effect.
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, Hash, strum::Display, strum::EnumString, strum::AsRefStr,
)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[strum(serialize_all = "kebab-case")]
pub enum EndCondition {
    Move,
    CastSpell,
}

impl EndCondition {
    pub fn channel(self) -> Channel {
        match self {
            EndCondition::Move => Channel::PlayerMove,
            EndCondition::CastSpell => Channel::SpellCast,
        }
    }
}

/// What a relic does when its trigger fires.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum EffectKind {
    GainMana(i32),
    /// `amount` is evaluated over `{wave}`; with `until` the gain is temporary.
    GainSpellPower {
        amount: Formula,
        until: Option<EndCondition>,
    },
    GainMaxHealth(i32),
    Heal(i32),
    /// Extra power for the next cast only.
    ModifyNextSpell(i32),
}

impl EffectKind {
    pub const DEFAULT_MANA: i32 = 5;
    pub const DEFAULT_NEXT_SPELL_BONUS: i32 = 100;
    pub const DEFAULT_MAX_HEALTH: i32 = 10;
    pub const DEFAULT_HEAL: i32 = 5;

    pub fn is_temporary(&self) -> bool {
        matches!(
            self,
            EffectKind::GainSpellPower { until: Some(_), .. } | EffectKind::ModifyNextSpell(_)
        )
    }

    fn end_condition(&self) -> Option<EndCondition> {
        match self {
            EffectKind::GainSpellPower { until, .. } => *until,
            EffectKind::ModifyNextSpell(_) => Some(EndCondition::CastSpell),
            _ => None,
        }
    }
}

/// Player state an effect may change.
pub struct EffectTarget<'a> {
    pub caster: &'a mut SpellCaster,
    pub health: &'a mut ResourceMeter,
    pub wave: u32,
}

/// An effect plus the bookkeeping needed to undo it.
#[derive(Debug)]
pub struct Effect {
    kind: EffectKind,
    active: bool,
    applied: i32,
    end: Option<Subscription>,
}

impl Effect {
    pub fn new(kind: EffectKind) -> Self {
        Self {
            kind,
            active: false,
            applied: 0,
            end: None,
        }
    }

    pub fn kind(&self) -> &EffectKind {
        &self.kind
    }

    /// True while a temporary effect is applied and waiting for its end condition.
    pub fn is_active(&self) -> bool {
        self.active
    }

    /// Power currently applied by a temporary spell-power effect.
    pub fn applied(&self) -> i32 {
        self.applied
    }

    /// Applies the effect once on behalf of `relic`.
    pub fn execute(
        &mut self,
        relic: RelicId,
        target: EffectTarget<'_>,
        bus: &mut EventBus,
    ) -> Result<(), FormulaError> {
        match &self.kind {
            EffectKind::GainMana(amount) => {
                target.caster.mana_mut().restore(*amount);
            }
            EffectKind::GainMaxHealth(amount) => target.health.raise_maximum(*amount),
            EffectKind::Heal(amount) => {
                target.health.restore(*amount);
            }
            EffectKind::GainSpellPower { amount, until } => {
                if until.is_some() && self.active {
                    return Ok(());
                }
                let wave = i32::try_from(target.wave).unwrap_or(i32::MAX);
                let gained = amount.eval_int(&Bindings::new().with(vars::WAVE, wave))?;
                target.caster.add_power(gained);
                if until.is_some() {
                    self.applied = gained;
                    self.begin(relic, bus);
                }
            }
            EffectKind::ModifyNextSpell(bonus) => {
                target.caster.stage_next_spell_bonus(*bonus);
                self.begin(relic, bus);
            }
        }
        Ok(())
    }

    fn begin(&mut self, relic: RelicId, bus: &mut EventBus) {
        self.active = true;
        if self.end.is_none() {
            if let Some(condition) = self.kind.end_condition() {
                self.end = Some(bus.subscribe(condition.channel(), Listener::EffectEnd(relic)));
            }
        }
    }

    /// Reverts a temporary effect. Returns false when nothing was active.
    pub fn end(&mut self, caster: &mut SpellCaster, bus: &mut EventBus) -> bool {
        if !self.active {
            return false;
        }
        if let EffectKind::GainSpellPower { .. } = self.kind {
            caster.add_power(-self.applied);
        }
        self.applied = 0;
        self.active = false;
        if let Some(subscription) = self.end.take() {
            bus.unsubscribe(subscription);
        }
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::Team;

    struct Player {
        caster: SpellCaster,
        health: ResourceMeter,
    }

    impl Player {
        fn new() -> Self {
            Self {
                caster: SpellCaster::new(100, 0, Team::Player),
                health: ResourceMeter::new(50, 100),
            }
        }

        fn target(&mut self, wave: u32) -> EffectTarget<'_> {
            EffectTarget {
                caster: &mut self.caster,
                health: &mut self.health,
                wave,
            }
        }
    }

    #[test]
    fn temporary_power_reverts_exactly_despite_permanent_gains() {
        let mut bus = EventBus::new();
        let mut player = Player::new();
        player.caster.update_power_and_wave(20, 2);

        let mut temporary = Effect::new(EffectKind::GainSpellPower {
            amount: "wave 10 *".into(),
            until: Some(EndCondition::Move),
        });
        let mut permanent = Effect::new(EffectKind::GainSpellPower {
            amount: "3".into(),
            until: None,
        });

        temporary.execute(RelicId(0), player.target(2), &mut bus).unwrap();
        // Re-firing while active does nothing.
        temporary.execute(RelicId(0), player.target(2), &mut bus).unwrap();
        permanent.execute(RelicId(1), player.target(2), &mut bus).unwrap();
        assert_eq!(player.caster.power(), 43);
        assert_eq!(bus.listener_count(Channel::PlayerMove), 1);

        assert!(temporary.end(&mut player.caster, &mut bus));
        assert!(!temporary.end(&mut player.caster, &mut bus));
        assert_eq!(player.caster.power(), 23);
        assert!(bus.is_empty());
    }

    #[test]
    fn heal_and_mana_clamp_to_maximum() {
        let mut bus = EventBus::new();
        let mut player = Player::new();
        player.caster.mana_mut().spend(3);
        Effect::new(EffectKind::GainMana(5))
            .execute(RelicId(0), player.target(1), &mut bus)
            .unwrap();
        Effect::new(EffectKind::Heal(80))
            .execute(RelicId(0), player.target(1), &mut bus)
            .unwrap();
        assert!(player.caster.mana().is_full());
        assert_eq!(player.health.current, 100);

        Effect::new(EffectKind::GainMaxHealth(10))
            .execute(RelicId(0), player.target(1), &mut bus)
            .unwrap();
        assert_eq!(player.health, ResourceMeter::new(100, 110));
    }

    #[test]
    fn next_spell_bonus_stacks_and_waits_for_a_cast() {
        let mut bus = EventBus::new();
        let mut player = Player::new();
        let mut effect = Effect::new(EffectKind::ModifyNextSpell(100));
        effect.execute(RelicId(3), player.target(1), &mut bus).unwrap();
        effect.execute(RelicId(3), player.target(1), &mut bus).unwrap();
        assert_eq!(player.caster.pending_bonus(), 200);
        assert_eq!(bus.listener_count(Channel::SpellCast), 1);
        assert!(effect.end(&mut player.caster, &mut bus));
        assert_eq!(player.caster.power(), 0);
    }

    #[test]
    fn end_conditions_parse_from_kebab_case() {
        assert_eq!("cast-spell".parse(), Ok(EndCondition::CastSpell));
        assert_eq!("move".parse(), Ok(EndCondition::Move));
    }
}
