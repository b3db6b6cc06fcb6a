//! The spell caster: bounded spell slots, a mana pool and cast gating.

use arrayvec::ArrayVec;

use crate::config::CombatConfig;
use crate::formula::FormulaError;
use crate::spell::{CastPlan, Spell, SpellState};
use crate::state::{Team, Tick, Vec2};
use crate::stats::{ModifierSet, ResourceMeter};

const SLOTS: usize = CombatConfig::MAX_SPELL_SLOTS;

/// Errors raised by slot management.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum CasterError {
    #[error("slot {index} is outside the {capacity} available spell slots")]
    InvalidSlot { index: usize, capacity: usize },
}

/// Why a cast did not happen. None of these change any state.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CastRejection {
    EmptySlot { index: usize },
    InsufficientResource { required: i32, available: i32 },
    OnCooldown { remaining_ms: u64 },
}

/// Result of a cast attempt.
#[derive(Clone, Debug, PartialEq)]
pub enum CastOutcome {
    Cast(CastPlan),
    Rejected(CastRejection),
}

impl CastOutcome {
    pub fn is_cast(&self) -> bool {
        matches!(self, CastOutcome::Cast(_))
    }
}

/// Mana, spell power and up to four spells.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SpellCaster {
    mana: ResourceMeter,
    regeneration: i32,
    team: Team,
    slots: ArrayVec<Spell, SLOTS>,
    selected: usize,
    power: i32,
    wave: u32,
    pending_bonus: i32,
    external: ModifierSet,
}

impl SpellCaster {
    pub const PLAYER_MANA: i32 = 125;
    pub const PLAYER_REGENERATION: i32 = 8;

    pub fn new(mana: i32, regeneration: i32, team: Team) -> Self {
        Self {
            mana: ResourceMeter::full(mana),
            regeneration,
            team,
            slots: ArrayVec::new(),
            selected: 0,
            power: 0,
            wave: 1,
            pending_bonus: 0,
            external: ModifierSet::new(),
        }
    }

    /// A fresh player caster holding `starting_spell`.
    pub fn player(starting_spell: Spell) -> Self {
        let mut caster = Self::new(Self::PLAYER_MANA, Self::PLAYER_REGENERATION, Team::Player);
        caster.add_spell(starting_spell);
        caster
    }

    pub fn team(&self) -> Team {
        self.team
    }

    pub fn mana(&self) -> ResourceMeter {
        self.mana
    }

    pub fn mana_mut(&mut self) -> &mut ResourceMeter {
        &mut self.mana
    }

    pub fn regeneration(&self) -> i32 {
        self.regeneration
    }

    pub fn set_regeneration(&mut self, regeneration: i32) {
        self.regeneration = regeneration;
    }

    /// Adds one regeneration tick of mana. Returns the amount gained.
    pub fn regenerate(&mut self) -> i32 {
        self.mana.restore(self.regeneration)
    }

    pub fn power(&self) -> i32 {
        self.power
    }

    pub fn wave(&self) -> u32 {
        self.wave
    }

    /// Sets power and wave on the caster and every held spell.
    pub fn update_power_and_wave(&mut self, power: i32, wave: u32) {
        self.power = power;
        self.wave = wave;
        for spell in &mut self.slots {
            spell.set_context(power, wave);
        }
    }

    /// Shifts spell power by `delta` (negative to withdraw).
    pub fn add_power(&mut self, delta: i32) {
        self.update_power_and_wave(self.power.saturating_add(delta), self.wave);
    }

    pub fn pending_bonus(&self) -> i32 {
        self.pending_bonus
    }

    /// Stages extra power for the next successful cast; stacks with earlier bonuses.
    pub fn stage_next_spell_bonus(&mut self, bonus: i32) {
        self.pending_bonus = self.pending_bonus.saturating_add(bonus);
    }

    pub fn clear_pending_bonus(&mut self) {
        self.pending_bonus = 0;
    }

    pub fn external_modifiers(&self) -> &ModifierSet {
        &self.external
    }

    /// Modifiers folded into every cast ahead of the spell's own layers.
    pub fn set_external_modifiers(&mut self, modifiers: ModifierSet) {
        self.external = modifiers;
    }

    pub fn spells(&self) -> &[Spell] {
        &self.slots
    }

    pub fn spell(&self, index: usize) -> Option<&Spell> {
        self.slots.get(index)
    }

    pub fn selected_index(&self) -> usize {
        self.selected
    }

    pub fn selected_spell(&self) -> Option<&Spell> {
        self.slots.get(self.selected)
    }

    /// Appends `spell` while a slot is free, otherwise replaces the selected one.
    ///
    /// Returns the replaced spell, if any.
    pub fn add_spell(&mut self, mut spell: Spell) -> Option<Spell> {
        spell.set_context(self.power, self.wave);
        match self.slots.try_push(spell) {
            Ok(()) => None,
            Err(full) => {
                let spell = full.element();
                let index = self.selected.min(self.slots.len().saturating_sub(1));
                Some(std::mem::replace(&mut self.slots[index], spell))
            }
        }
    }

    /// Removes the spell at `index` unless it is the last one left.
    pub fn remove_spell(&mut self, index: usize) -> Option<Spell> {
        if self.slots.len() <= 1 || index >= self.slots.len() {
            return None;
        }
        let removed = self.slots.remove(index);
        self.selected = self.selected.min(self.slots.len() - 1);
        Some(removed)
    }

    /// Selects slot `index`; empty slots are selectable.
    pub fn select(&mut self, index: usize) -> Result<(), CasterError> {
        if index >= SLOTS {
            return Err(CasterError::InvalidSlot {
                index,
                capacity: SLOTS,
            });
        }
        self.selected = index;
        Ok(())
    }

    /// Attempts to cast the selected spell from `origin` toward `target`.
    ///
    /// Rejections leave the caster untouched. Formula errors propagate and also
    /// leave it untouched.
    pub fn cast(
        &mut self,
        origin: Vec2,
        target: Vec2,
        now: Tick,
    ) -> Result<CastOutcome, FormulaError> {
        let index = self.selected;
        let Some(spell) = self.slots.get(index) else {
            return Ok(CastOutcome::Rejected(CastRejection::EmptySlot { index }));
        };

        let plan = spell.plan_cast(origin, target, &self.external, self.pending_bonus)?;
        let cost = plan.stats.mana_cost;
        if !self.mana.has_at_least(cost) {
            return Ok(CastOutcome::Rejected(CastRejection::InsufficientResource {
                required: cost,
                available: self.mana.current,
            }));
        }
        if let SpellState::OnCooldown { remaining_ms } = spell.state(now) {
            return Ok(CastOutcome::Rejected(CastRejection::OnCooldown { remaining_ms }));
        }

        self.pending_bonus = 0;
        self.mana.spend(cost);
        self.slots[index].start_cooldown(now, plan.stats.cooldown_secs);
        Ok(CastOutcome::Cast(plan))
    }
}
