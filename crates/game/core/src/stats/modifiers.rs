//! Value modifier aggregation.
//!
//! A modifier either adds to or scales a base value. Aggregation always sums
//! every additive delta into the base first and then multiplies by the product
//! of every factor:
//!
//! ```text
//! result = (base + Σ additive) × Π multiplicative
//! ```
//!
//! Both phases are commutative, so the order modifiers were collected in never
//! changes the result.

/// A single adjustment applied to a stat value.
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ValueModifier {
    /// Added to the base before any scaling.
    Additive(f32),
    /// Multiplied into the result after all additive deltas.
    Multiplicative(f32),
}

impl ValueModifier {
    pub fn additive(delta: f32) -> Self {
        ValueModifier::Additive(delta)
    }

    pub fn multiplicative(factor: f32) -> Self {
        ValueModifier::Multiplicative(factor)
    }
}

/// Applies `modifiers` to `base`, returning `base` unchanged when empty.
///
/// # Example
/// ```
/// # use game_core::stats::{ValueModifier, apply_modifiers};
/// let result = apply_modifiers(
///     100.0,
///     &[ValueModifier::Multiplicative(2.0), ValueModifier::Additive(20.0)],
/// );
/// assert_eq!(result, 240.0);
/// ```
pub fn apply_modifiers(base: f32, modifiers: &[ValueModifier]) -> f32 {
    if modifiers.is_empty() {
        return base;
    }

    let (sum, product) = modifiers
        .iter()
        .fold((0.0_f32, 1.0_f32), |(sum, product), modifier| match modifier {
            ValueModifier::Additive(delta) => (sum + delta, product),
            ValueModifier::Multiplicative(factor) => (sum, product * factor),
        });

    (base + sum) * product
}

/// Integer variant of [`apply_modifiers`]; the float result is rounded to nearest.
pub fn apply_modifiers_int(base: i32, modifiers: &[ValueModifier]) -> i32 {
    if modifiers.is_empty() {
        return base;
    }
    apply_modifiers(base as f32, modifiers).round() as i32
}

/// Ordered collection of modifiers for a single stat.
#[derive(Clone, Debug, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(transparent))]
pub struct ModifierStack {
    modifiers: Vec<ValueModifier>,
}

impl ModifierStack {
    pub fn new() -> Self {
        Self {
            modifiers: Vec::new(),
        }
    }

    pub fn push(&mut self, modifier: ValueModifier) {
        self.modifiers.push(modifier);
    }

    pub fn extend(&mut self, modifiers: impl IntoIterator<Item = ValueModifier>) {
        self.modifiers.extend(modifiers);
    }

    pub fn apply(&self, base: f32) -> f32 {
        apply_modifiers(base, &self.modifiers)
    }

    pub fn apply_int(&self, base: i32) -> i32 {
        apply_modifiers_int(base, &self.modifiers)
    }

    pub fn as_slice(&self) -> &[ValueModifier] {
        &self.modifiers
    }

    pub fn is_empty(&self) -> bool {
        self.modifiers.is_empty()
    }

    pub fn len(&self) -> usize {
        self.modifiers.len()
    }
}

/// The four stats a spell modifier can touch.
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, Hash, strum::Display, strum::EnumIter, strum::EnumCount,
)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[strum(serialize_all = "snake_case")]
pub enum StatChannel {
    Damage,
    ManaCost,
    Cooldown,
    Speed,
}

/// Per-channel modifier stacks in effect for one cast.
#[derive(Clone, Debug, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct ModifierSet {
    pub damage: ModifierStack,
    pub mana_cost: ModifierStack,
    pub cooldown: ModifierStack,
    pub speed: ModifierStack,
}

impl ModifierSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn channel(&self, channel: StatChannel) -> &ModifierStack {
        match channel {
            StatChannel::Damage => &self.damage,
            StatChannel::ManaCost => &self.mana_cost,
            StatChannel::Cooldown => &self.cooldown,
            StatChannel::Speed => &self.speed,
        }
    }

    pub fn channel_mut(&mut self, channel: StatChannel) -> &mut ModifierStack {
        match channel {
            StatChannel::Damage => &mut self.damage,
            StatChannel::ManaCost => &mut self.mana_cost,
            StatChannel::Cooldown => &mut self.cooldown,
            StatChannel::Speed => &mut self.speed,
        }
    }

    /// Builder-style push onto one channel.
    pub fn with(mut self, channel: StatChannel, modifier: ValueModifier) -> Self {
        self.channel_mut(channel).push(modifier);
        self
    }

    /// Appends every stack of `other` after this set's own modifiers.
    pub fn append(&mut self, other: &ModifierSet) {
        use strum::IntoEnumIterator;

        for channel in StatChannel::iter() {
            let incoming = other.channel(channel).as_slice().iter().copied();
            self.channel_mut(channel).extend(incoming);
        }
    }

    /// Concatenation of `first` followed by `second`.
    pub fn concat(first: &ModifierSet, second: &ModifierSet) -> ModifierSet {
        let mut combined = first.clone();
        combined.append(second);
        combined
    }

    pub fn is_empty(&self) -> bool {
        self.damage.is_empty()
            && self.mana_cost.is_empty()
            && self.cooldown.is_empty()
            && self.speed.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn additive_then_multiplicative_regardless_of_order() {
        let forward = [ValueModifier::Additive(20.0), ValueModifier::Multiplicative(2.0)];
        let reversed = [ValueModifier::Multiplicative(2.0), ValueModifier::Additive(20.0)];
        assert_eq!(apply_modifiers(100.0, &forward), 240.0);
        assert_eq!(apply_modifiers(100.0, &reversed), 240.0);
        assert_eq!(apply_modifiers_int(100, &forward), 240);
    }

    #[test]
    fn empty_modifiers_return_base() {
        assert_eq!(apply_modifiers(7.5, &[]), 7.5);
        assert_eq!(apply_modifiers_int(-3, &[]), -3);
    }

    #[test]
    fn integer_variant_rounds_to_nearest() {
        let stack = [ValueModifier::Multiplicative(1.5)];
        assert_eq!(apply_modifiers_int(15, &stack), 23);
        assert_eq!(apply_modifiers_int(10, &[ValueModifier::Multiplicative(0.75)]), 8);
    }

    #[test]
    fn concat_keeps_external_first() {
        let external = ModifierSet::new().with(StatChannel::Damage, ValueModifier::Additive(5.0));
        let layer =
            ModifierSet::new().with(StatChannel::Damage, ValueModifier::Multiplicative(2.0));

        let combined = ModifierSet::concat(&external, &layer);
        assert_eq!(
            combined.damage.as_slice(),
            &[ValueModifier::Additive(5.0), ValueModifier::Multiplicative(2.0)]
        );
        assert!(combined.mana_cost.is_empty());
        assert_eq!(combined.damage.apply_int(10), 30);
    }
}
