//! Spell catalog and builder.
//!
//! The catalog splits `spells.json` into base spells and modifiers once, when
//! it is created. The builder turns catalog entries into [`Spell`] values:
//! base records become a [`BaseSpell`] of the matching [`SpellKind`], modifier
//! records become a [`ModifierLayer`] wrapped around an existing spell.

use std::collections::BTreeMap;

use rand::Rng;
use rand::seq::SliceRandom;
use tracing::{debug, warn};

use game_core::formula::Bindings;
use game_core::stats::StatChannel;
use game_core::{
    BaseSpell, DamageKind, Formula, FormulaError, LayerBehavior, ModifierKind, ModifierLayer,
    Spell, SpellKind, Trajectory, ValueModifier,
};

use crate::records::{ProjectileRecord, SpellRecord};

/// Catalog key used when no spell name is given.
pub const DEFAULT_SPELL: &str = "arcane_bolt";

#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum BuildError {
    #[error("unknown spell definition `{0}`")]
    UnknownSpellDefinition(String),

    #[error("unknown modifier definition `{0}`")]
    UnknownModifierDefinition(String),

    #[error("modifier `{key}` has an invalid parameter: {source}")]
    Formula {
        key: String,
        #[source]
        source: FormulaError,
    },
}

/// Spell records keyed by catalog name, classified into bases and modifiers.
#[derive(Clone, Debug, Default)]
pub struct SpellCatalog {
    bases: BTreeMap<String, SpellRecord>,
    modifiers: BTreeMap<String, SpellRecord>,
}

impl SpellCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_records(records: impl IntoIterator<Item = (String, SpellRecord)>) -> Self {
        let mut catalog = Self::new();
        for (key, record) in records {
            catalog.insert(key, record);
        }
        debug!(
            bases = catalog.bases.len(),
            modifiers = catalog.modifiers.len(),
            "spell catalog loaded"
        );
        catalog
    }

    pub fn insert(&mut self, key: impl Into<String>, record: SpellRecord) {
        let key = key.into();
        if record.is_modifier() {
            self.bases.remove(&key);
            self.modifiers.insert(key, record);
        } else {
            self.modifiers.remove(&key);
            self.bases.insert(key, record);
        }
    }

    pub fn base(&self, key: &str) -> Option<&SpellRecord> {
        self.bases.get(key)
    }

    pub fn modifier(&self, key: &str) -> Option<&SpellRecord> {
        self.modifiers.get(key)
    }

    pub fn base_names(&self) -> impl Iterator<Item = &str> {
        self.bases.keys().map(String::as_str)
    }

    pub fn modifier_names(&self) -> impl Iterator<Item = &str> {
        self.modifiers.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.bases.len() + self.modifiers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Builds spells out of a [`SpellCatalog`].
#[derive(Clone, Debug)]
pub struct SpellBuilder {
    catalog: SpellCatalog,
    max_random_modifiers: usize,
}

impl SpellBuilder {
    pub const DEFAULT_MAX_RANDOM_MODIFIERS: usize = 3;

    pub fn new(catalog: SpellCatalog) -> Self {
        Self {
            catalog,
            max_random_modifiers: Self::DEFAULT_MAX_RANDOM_MODIFIERS,
        }
    }

    pub fn with_max_random_modifiers(mut self, max: usize) -> Self {
        self.max_random_modifiers = max;
        self
    }

    pub fn catalog(&self) -> &SpellCatalog {
        &self.catalog
    }

    /// Builds the base spell stored under `key`.
    pub fn try_build(&self, key: &str) -> Result<Spell, BuildError> {
        let record = self
            .catalog
            .base(key)
            .ok_or_else(|| BuildError::UnknownSpellDefinition(key.to_owned()))?;
        let base = base_spell(key, record);
        debug!(spell = %base.name, kind = base.kind.label(), "built spell");
        Ok(Spell::new(base))
    }

    /// Like [`Self::try_build`], falling back to a default bolt.
    pub fn build(&self, key: &str) -> Spell {
        match self.try_build(key) {
            Ok(spell) => spell,
            Err(error) => {
                warn!(%error, "falling back to a default bolt");
                Spell::new(BaseSpell::default())
            }
        }
    }

    /// Wraps `spell` in the modifier stored under `key`.
    ///
    /// Modifier parameters are evaluated once, here, against the spell's
    /// current power and wave.
    pub fn try_wrap(&self, spell: &mut Spell, key: &str) -> Result<(), BuildError> {
        let unknown = || BuildError::UnknownModifierDefinition(key.to_owned());
        let record = self.catalog.modifier(key).ok_or_else(unknown)?;
        let kind: ModifierKind = key.parse().map_err(|_| unknown())?;
        let bindings = spell.context().float_bindings(0);
        let layer = modifier_layer(kind, record, &bindings).map_err(|source| BuildError::Formula {
            key: key.to_owned(),
            source,
        })?;
        debug!(modifier = key, spell = %spell.name(), "wrapped spell");
        spell.wrap(layer);
        Ok(())
    }

    /// Like [`Self::try_wrap`], leaving the spell unchanged on failure.
    pub fn wrap(&self, mut spell: Spell, key: &str) -> Spell {
        if let Err(error) = self.try_wrap(&mut spell, key) {
            warn!(%error, spell = %spell.name(), "modifier skipped");
        }
        spell
    }

    /// A uniformly chosen base spell wrapped in up to the configured number of
    /// uniformly chosen modifiers (repeats allowed).
    pub fn build_random<R: Rng>(&self, power: i32, wave: u32, rng: &mut R) -> Spell {
        let bases: Vec<&str> = self.catalog.base_names().collect();
        let mut spell = match bases.choose(rng) {
            Some(key) => self.build(key),
            None => {
                warn!("spell catalog has no base spells");
                Spell::new(BaseSpell::default())
            }
        };
        spell.set_context(power, wave);

        let modifiers: Vec<&str> = self.catalog.modifier_names().collect();
        let count = rng.gen_range(0..=self.max_random_modifiers);
        for _ in 0..count {
            if let Some(key) = modifiers.choose(rng) {
                spell = self.wrap(spell, key);
            }
        }
        spell
    }
}

/// Picks the cast shape: known catalog names first, then structural fields.
fn spell_kind(key: &str, record: &SpellRecord) -> SpellKind {
    match key {
        "arcane_bolt" | "magic_missile" => SpellKind::Bolt,
        "arcane_blast" => blast(record),
        "arcane_spray" => spray(record),
        "arcane_nova" => nova(record),
        _ if record.radius.is_some() => nova(record),
        _ if record.secondary_damage.is_some() => blast(record),
        _ if record.spray.is_some() => spray(record),
        _ => SpellKind::Bolt,
    }
}

fn blast(record: &SpellRecord) -> SpellKind {
    let mut kind = SpellKind::blast();
    if let SpellKind::Blast {
        count,
        secondary_damage,
        secondary_speed,
        secondary_lifetime,
        secondary_sprite,
    } = &mut kind
    {
        override_with(count, &record.count);
        override_with(secondary_damage, &record.secondary_damage);
        if let Some(secondary) = &record.secondary_projectile {
            override_with(secondary_speed, &secondary.speed);
            override_with(secondary_lifetime, &secondary.lifetime);
            *secondary_sprite = secondary.sprite.unwrap_or(*secondary_sprite);
        }
    }
    kind
}

fn spray(record: &SpellRecord) -> SpellKind {
    let mut kind = SpellKind::spray();
    if let SpellKind::Spray {
        count,
        spread,
        lifetime,
    } = &mut kind
    {
        override_with(count, &record.count);
        override_with(spread, &record.spray);
        if let Some(projectile) = &record.projectile {
            override_with(lifetime, &projectile.lifetime);
        }
    }
    kind
}

fn nova(record: &SpellRecord) -> SpellKind {
    let mut kind = SpellKind::nova();
    if let SpellKind::Nova { radius, knockback } = &mut kind {
        override_with(radius, &record.radius);
        override_with(knockback, &record.knockback_force);
    }
    kind
}

fn override_with(slot: &mut Formula, value: &Option<Formula>) {
    if let Some(value) = value {
        *slot = value.clone();
    }
}

fn base_spell(key: &str, record: &SpellRecord) -> BaseSpell {
    let defaults = BaseSpell::default();
    let projectile = record.projectile.clone().unwrap_or_default();
    let ProjectileRecord {
        speed,
        trajectory,
        sprite,
        ..
    } = projectile;
    let (damage, damage_kind) = match &record.damage {
        Some(damage) => (
            damage.amount.clone().unwrap_or(defaults.damage),
            damage
                .kind
                .as_deref()
                .map(DamageKind::parse_or_default)
                .unwrap_or(defaults.damage_kind),
        ),
        None => (defaults.damage, defaults.damage_kind),
    };

    BaseSpell {
        name: record.name.clone().unwrap_or_else(|| key.to_owned()),
        description: record.description.clone().unwrap_or(defaults.description),
        icon: record.icon.unwrap_or(defaults.icon),
        damage,
        damage_kind,
        mana_cost: record.mana_cost.clone().unwrap_or(defaults.mana_cost),
        cooldown: record.cooldown.clone().unwrap_or(defaults.cooldown),
        speed: speed.unwrap_or(defaults.speed),
        trajectory: trajectory
            .as_deref()
            .and_then(|raw| raw.parse().ok())
            .unwrap_or(defaults.trajectory),
        sprite: sprite.unwrap_or(defaults.sprite),
        kind: spell_kind(key, record),
    }
}

fn eval_or(
    formula: Option<&Formula>,
    default: f32,
    bindings: &Bindings<'_, f32>,
) -> Result<f32, FormulaError> {
    formula.map_or(Ok(default), |f| f.eval_float(bindings))
}

/// Builds the layer for `kind`, overriding its default tuning with whatever
/// the record sets.
fn modifier_layer(
    kind: ModifierKind,
    record: &SpellRecord,
    bindings: &Bindings<'_, f32>,
) -> Result<ModifierLayer, FormulaError> {
    use StatChannel::{Cooldown, Damage, ManaCost, Speed};
    use ValueModifier::{Additive, Multiplicative};

    let eval = |formula: &Option<Formula>, default: f32| eval_or(formula.as_ref(), default, bindings);
    let trajectory = |default: Trajectory| {
        record
            .projectile_trajectory
            .as_deref()
            .and_then(|raw| raw.parse().ok())
            .unwrap_or(default)
    };

    let mut layer = ModifierLayer::new(
        kind.as_ref(),
        record.name.as_deref().unwrap_or(kind.display_name()),
    )
    .with_description(
        record
            .description
            .as_deref()
            .unwrap_or(kind.description()),
    );

    layer = match kind {
        ModifierKind::DamageAmp => layer
            .with_modifier(Damage, Multiplicative(eval(&record.damage_multiplier, 1.5)?))
            .with_modifier(ManaCost, Multiplicative(eval(&record.mana_multiplier, 1.5)?)),
        ModifierKind::SpeedAmp => {
            layer.with_modifier(Speed, Multiplicative(eval(&record.speed_multiplier, 1.75)?))
        }
        ModifierKind::Chaos => layer
            .with_modifier(Damage, Multiplicative(eval(&record.damage_multiplier, 1.5)?))
            .with_trajectory(trajectory(Trajectory::Spiraling)),
        ModifierKind::Homing => layer
            .with_modifier(Damage, Multiplicative(eval(&record.damage_multiplier, 0.75)?))
            .with_modifier(ManaCost, Additive(eval(&record.mana_adder, 10.0)?))
            .with_trajectory(trajectory(Trajectory::Homing)),
        ModifierKind::Doubler => layer
            .with_modifier(ManaCost, Multiplicative(eval(&record.mana_multiplier, 1.5)?))
            .with_modifier(Cooldown, Multiplicative(eval(&record.cooldown_multiplier, 1.5)?))
            .with_behavior(LayerBehavior::Repeat {
                delay_secs: eval(&record.delay, 0.5)?,
            }),
        ModifierKind::Splitter => layer
            .with_modifier(ManaCost, Multiplicative(eval(&record.mana_multiplier, 1.5)?))
            .with_behavior(LayerBehavior::Split {
                angle_degrees: eval(&record.angle, 10.0)?,
            }),
        ModifierKind::Piercing => layer.with_behavior(LayerBehavior::Pierce {
            max_hits: eval(&record.max_pierces, 3.0)?.max(0.0) as u32,
            reduction: eval(&record.damage_reduction, 0.8)?,
        }),
        ModifierKind::ChainLightning => layer.with_behavior(LayerBehavior::Chain {
            max_chains: eval(&record.max_chains, 3.0)?.max(0.0) as u32,
            range: eval(&record.chain_range, 4.0)?,
            reduction: eval(&record.damage_reduction, 0.7)?,
        }),
    };
    Ok(layer)
}
