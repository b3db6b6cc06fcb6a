//! Spells: a base kind, an ordered stack of modifier layers, and a cast context.
//!
//! Layers are stored innermost first. Everything numeric about a spell is a
//! fold over that list, so a spell is plain data that can be cloned, compared
//! and serialized.
mod cast;
mod kind;
mod layer;
mod rarity;

pub use cast::{CastPlan, CastStep, ResolvedStats};
pub use kind::{BaseSpell, SpellKind};
pub use layer::{LayerBehavior, ModifierKind, ModifierLayer};
pub use rarity::Rarity;

use crate::combat::Trajectory;
use crate::formula::{Bindings, FormulaError, vars};
use crate::state::Tick;
use crate::stats::ModifierSet;

/// Caster attributes spell formulas are evaluated against.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SpellContext {
    pub power: i32,
    pub wave: u32,
}

impl SpellContext {
    pub fn new(power: i32, wave: u32) -> Self {
        Self { power, wave }
    }

    pub fn int_bindings(&self, power_bonus: i32) -> Bindings<'static, i32> {
        Bindings::new()
            .with(vars::POWER, self.power.saturating_add(power_bonus))
            .with(vars::WAVE, i32::try_from(self.wave).unwrap_or(i32::MAX))
    }

    pub fn float_bindings(&self, power_bonus: i32) -> Bindings<'static, f32> {
        Bindings::new()
            .with(vars::POWER, self.power.saturating_add(power_bonus) as f32)
            .with(vars::WAVE, self.wave as f32)
    }
}

/// Cooldown state of a spell at a given instant.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SpellState {
    Ready,
    OnCooldown { remaining_ms: u64 },
}

/// A castable spell.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Spell {
    base: BaseSpell,
    layers: Vec<ModifierLayer>,
    context: SpellContext,
    cooldown_end: Option<Tick>,
    rarity: Rarity,
}

impl Spell {
    pub fn new(base: BaseSpell) -> Self {
        Self {
            base,
            layers: Vec::new(),
            context: SpellContext::default(),
            cooldown_end: None,
            rarity: Rarity::Common,
        }
    }

    pub fn base(&self) -> &BaseSpell {
        &self.base
    }

    /// Applied layers, innermost first.
    pub fn layers(&self) -> &[ModifierLayer] {
        &self.layers
    }

    pub fn context(&self) -> SpellContext {
        self.context
    }

    pub fn set_context(&mut self, power: i32, wave: u32) {
        self.context = SpellContext::new(power, wave);
    }

    pub fn rarity(&self) -> Rarity {
        self.rarity
    }

    /// Wraps `layer` around everything applied so far.
    pub fn wrap(&mut self, layer: ModifierLayer) {
        self.layers.push(layer);
        self.rarity = Rarity::from_modifier_count(self.layers.len());
    }

    /// Builder-style [`Spell::wrap`].
    pub fn wrapped(mut self, layer: ModifierLayer) -> Self {
        self.wrap(layer);
        self
    }

    /// Display name, outermost modifier first: `"homing damage-amplified Arcane Bolt"`.
    pub fn name(&self) -> String {
        self.prefixed(&self.base.name)
    }

    pub fn description(&self) -> String {
        self.prefixed(&self.base.description)
    }

    fn prefixed(&self, tail: &str) -> String {
        let mut out = String::new();
        for layer in self.layers.iter().rev() {
            out.push_str(&layer.display_name);
            out.push(' ');
        }
        out.push_str(tail);
        out
    }

    /// Modifier keys in the order they were applied.
    pub fn modifier_names(&self) -> Vec<&str> {
        self.layers.iter().map(|layer| layer.key.as_str()).collect()
    }

    pub fn state(&self, now: Tick) -> SpellState {
        match self.cooldown_end {
            Some(end) if now < end => SpellState::OnCooldown {
                remaining_ms: end.since(now),
            },
            _ => SpellState::Ready,
        }
    }

    pub fn is_ready(&self, now: Tick) -> bool {
        self.state(now) == SpellState::Ready
    }

    pub fn cooldown_end(&self) -> Option<Tick> {
        self.cooldown_end
    }

    pub(crate) fn start_cooldown(&mut self, now: Tick, cooldown_secs: f32) {
        self.cooldown_end = Some(now + Tick::millis_from_secs(cooldown_secs));
    }

    /// `external`, then every layer's set from outermost to innermost.
    pub fn flattened_modifiers(&self, external: &ModifierSet) -> ModifierSet {
        let mut combined = external.clone();
        for layer in self.layers.iter().rev() {
            combined.append(&layer.modifiers);
        }
        combined
    }

    /// The outermost trajectory override, else the base trajectory.
    pub fn trajectory(&self) -> Trajectory {
        self.layers
            .iter()
            .rev()
            .find_map(|layer| layer.trajectory)
            .unwrap_or(self.base.trajectory)
    }

    /// Effective stats with `power_bonus` added to the context power.
    pub fn stats_with(
        &self,
        external: &ModifierSet,
        power_bonus: i32,
    ) -> Result<ResolvedStats, FormulaError> {
        let modifiers = self.flattened_modifiers(external);
        let ints = self.context.int_bindings(power_bonus);
        let floats = self.context.float_bindings(power_bonus);

        let damage = modifiers.damage.apply_int(self.base.damage.eval_int(&ints)?);
        Ok(ResolvedStats {
            damage: crate::combat::Damage::new(damage, self.base.damage_kind),
            mana_cost: modifiers
                .mana_cost
                .apply_int(self.base.mana_cost.eval_int(&ints)?),
            cooldown_secs: modifiers
                .cooldown
                .apply(self.base.cooldown.eval_float(&floats)?),
            speed: modifiers.speed.apply(self.base.speed.eval_float(&floats)?),
            trajectory: self.trajectory(),
            modifiers,
        })
    }

    /// Effective stats with no external modifiers and no pending bonus.
    pub fn stats(&self) -> Result<ResolvedStats, FormulaError> {
        self.stats_with(&ModifierSet::new(), 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::stats::{StatChannel, ValueModifier};

    fn bolt() -> Spell {
        let mut base = BaseSpell::new("Arcane Bolt", SpellKind::Bolt);
        base.damage = "25 power 5 / +".into();
        base.mana_cost = "10".into();
        base.cooldown = "2".into();
        let mut spell = Spell::new(base);
        spell.set_context(50, 1);
        spell
    }

    #[test]
    fn damage_follows_power() {
        let mut spell = bolt();
        assert_eq!(spell.stats().unwrap().damage.amount, 35);
        spell.set_context(52, 1);
        assert_eq!(spell.stats().unwrap().damage.amount, 35);
        spell.set_context(55, 1);
        assert_eq!(spell.stats().unwrap().damage.amount, 36);
        assert_eq!(spell.stats_with(&ModifierSet::new(), 5).unwrap().damage.amount, 36);
    }

    #[test]
    fn names_prefix_outermost_first() {
        let spell = bolt()
            .wrapped(ModifierKind::DamageAmp.default_layer())
            .wrapped(ModifierKind::Homing.default_layer());
        assert_eq!(spell.name(), "homing damage-amplified Arcane Bolt");
        assert_eq!(spell.modifier_names(), vec!["damage_amp", "homing"]);
        assert_eq!(spell.rarity(), Rarity::Rare);
    }

    #[test]
    fn stat_outcome_ignores_wrap_order() {
        let forward = bolt()
            .wrapped(ModifierKind::DamageAmp.default_layer())
            .wrapped(ModifierKind::Homing.default_layer());
        let reverse = bolt()
            .wrapped(ModifierKind::Homing.default_layer())
            .wrapped(ModifierKind::DamageAmp.default_layer());
        let (a, b) = (forward.stats().unwrap(), reverse.stats().unwrap());
        assert_eq!(a.damage, b.damage);
        assert_eq!(a.mana_cost, b.mana_cost);
        // (10 + 10) * 1.5
        assert_eq!(a.mana_cost, 30);
        assert_ne!(forward.name(), reverse.name());
    }

    #[test]
    fn external_modifiers_fold_in_first() {
        let spell = bolt().wrapped(ModifierKind::DamageAmp.default_layer());
        let external = ModifierSet::new().with(StatChannel::Damage, ValueModifier::Additive(5.0));
        let flat = spell.flattened_modifiers(&external);
        assert_eq!(
            flat.damage.as_slice(),
            &[ValueModifier::Additive(5.0), ValueModifier::Multiplicative(1.5)]
        );
        assert_eq!(spell.stats_with(&external, 0).unwrap().damage.amount, 60);
    }

    #[test]
    fn outermost_trajectory_wins() {
        let spell = bolt()
            .wrapped(ModifierKind::Homing.default_layer())
            .wrapped(ModifierKind::Chaos.default_layer());
        assert_eq!(spell.trajectory(), Trajectory::Spiraling);
        assert_eq!(bolt().trajectory(), Trajectory::Straight);
    }

    #[test]
    fn cooldown_runs_until_deadline() {
        let mut spell = bolt();
        assert!(spell.is_ready(Tick::ZERO));
        spell.start_cooldown(Tick(1_000), 1.5);
        assert_eq!(
            spell.state(Tick(2_000)),
            SpellState::OnCooldown { remaining_ms: 500 }
        );
        assert!(spell.is_ready(Tick(2_500)));
    }
}
