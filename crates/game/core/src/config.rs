use crate::stats::ModifierSet;

/// Combat configuration constants and tunable parameters.
///
/// Compile-time limits live in associated constants; everything a designer may
/// want to retune per data set is a field, loaded from `config.toml` by the
/// content crate.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct CombatConfig {
    /// Interval between mana regeneration ticks, in milliseconds.
    pub regen_interval_ms: u64,
    /// Interval between stand-still displacement samples, in milliseconds.
    pub stand_still_poll_ms: u64,
    /// Displacement below which the player counts as standing still.
    pub stand_still_tolerance: f32,
    /// Relics are offered on every wave divisible by this cadence.
    pub relic_offer_cadence: u32,
    /// Number of relics presented per offer.
    pub relic_offer_size: usize,
    /// Maximum number of modifiers a random reward spell can roll.
    pub max_random_modifiers: usize,
    /// Modifiers folded into every player cast ahead of the spell's own layers.
    pub cast_modifiers: ModifierSet,
}

impl CombatConfig {
    // ===== compile-time constants used as type parameters =====
    /// Maximum number of spell slots on a caster.
    pub const MAX_SPELL_SLOTS: usize = 4;
    /// Maximum number of trigger subscriptions a single relic holds.
    pub const MAX_TRIGGER_CHANNELS: usize = 2;

    // ===== runtime-tunable defaults =====
    pub const DEFAULT_REGEN_INTERVAL_MS: u64 = 1_000;
    pub const DEFAULT_STAND_STILL_POLL_MS: u64 = 100;
    pub const DEFAULT_STAND_STILL_TOLERANCE: f32 = 0.1;
    pub const DEFAULT_RELIC_OFFER_CADENCE: u32 = 3;
    pub const DEFAULT_RELIC_OFFER_SIZE: usize = 3;
    pub const DEFAULT_MAX_RANDOM_MODIFIERS: usize = 3;

    pub fn new() -> Self {
        Self {
            regen_interval_ms: Self::DEFAULT_REGEN_INTERVAL_MS,
            stand_still_poll_ms: Self::DEFAULT_STAND_STILL_POLL_MS,
            stand_still_tolerance: Self::DEFAULT_STAND_STILL_TOLERANCE,
            relic_offer_cadence: Self::DEFAULT_RELIC_OFFER_CADENCE,
            relic_offer_size: Self::DEFAULT_RELIC_OFFER_SIZE,
            max_random_modifiers: Self::DEFAULT_MAX_RANDOM_MODIFIERS,
            cast_modifiers: ModifierSet::new(),
        }
    }

    pub fn with_regen_interval(mut self, regen_interval_ms: u64) -> Self {
        self.regen_interval_ms = regen_interval_ms;
        self
    }

    pub fn with_stand_still_poll(mut self, poll_ms: u64, tolerance: f32) -> Self {
        self.stand_still_poll_ms = poll_ms;
        self.stand_still_tolerance = tolerance;
        self
    }

    pub fn with_relic_offers(mut self, cadence: u32, size: usize) -> Self {
        self.relic_offer_cadence = cadence;
        self.relic_offer_size = size;
        self
    }

    pub fn with_cast_modifiers(mut self, modifiers: ModifierSet) -> Self {
        self.cast_modifiers = modifiers;
        self
    }

    /// Returns true when `wave` should present a relic offer.
    ///
    /// Offers start at the first multiple of the cadence; a cadence of zero
    /// disables offers.
    pub fn offers_relics_on(&self, wave: u32) -> bool {
        self.relic_offer_cadence != 0
            && wave >= self.relic_offer_cadence
            && wave % self.relic_offer_cadence == 0
    }
}

impl Default for CombatConfig {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn relic_offers_follow_cadence() {
        let config = CombatConfig::default();
        let offered: Vec<u32> = (1..=10).filter(|w| config.offers_relics_on(*w)).collect();
        assert_eq!(offered, vec![3, 6, 9]);
    }

    #[test]
    fn zero_cadence_disables_offers() {
        let config = CombatConfig::default().with_relic_offers(0, 3);
        assert!((0..20).all(|w| !config.offers_relics_on(w)));
    }
}
