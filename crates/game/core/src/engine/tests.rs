use super::*;
use crate::combat::{DamageKind, DamageReport};
use crate::events::Channel;
use crate::relic::{EffectKind, EndCondition, TriggerKind};
use crate::spell::{BaseSpell, ModifierKind, SpellKind};

/// Battlefield double with hit points, recording launches and knockback.
#[derive(Default)]
struct Arena {
    combatants: Vec<(EntityId, Team, Vec2, i32)>,
    launched: Vec<ProjectileLaunch>,
    despawned: Vec<ProjectileId>,
    pushed: Vec<(EntityId, Vec2)>,
}

impl Arena {
    fn with_enemy(mut self, id: u32, x: f32, y: f32, hp: i32) -> Self {
        self.combatants
            .push((EntityId(id), Team::Monsters, Vec2::new(x, y), hp));
        self
    }

    fn hp(&self, id: u32) -> Option<i32> {
        self.combatants
            .iter()
            .find(|c| c.0 == EntityId(id))
            .map(|c| c.3)
    }
}

impl Battlefield for Arena {
    fn team_of(&self, target: EntityId) -> Option<Team> {
        self.combatants
            .iter()
            .find(|c| c.0 == target && c.3 > 0)
            .map(|c| c.1)
    }

    fn position_of(&self, target: EntityId) -> Option<Vec2> {
        self.combatants.iter().find(|c| c.0 == target).map(|c| c.2)
    }

    fn targets_within(&self, center: Vec2, radius: f32) -> Vec<EntityId> {
        self.combatants
            .iter()
            .filter(|c| c.3 > 0 && center.distance(c.2) <= radius)
            .map(|c| c.0)
            .collect()
    }

    fn apply_damage(&mut self, target: EntityId, damage: Damage) -> DamageReport {
        let Some(entry) = self.combatants.iter_mut().find(|c| c.0 == target) else {
            return DamageReport::default();
        };
        let dealt = damage.amount.min(entry.3);
        entry.3 -= dealt;
        DamageReport {
            dealt,
            killed: entry.3 == 0,
        }
    }

    fn apply_knockback(&mut self, target: EntityId, impulse: Vec2) {
        self.pushed.push((target, impulse));
    }

    fn launch(&mut self, projectile: ProjectileLaunch) {
        self.launched.push(projectile);
    }

    fn despawn(&mut self, projectile: ProjectileId) {
        self.despawned.push(projectile);
    }
}

fn spell(kind: SpellKind) -> Spell {
    let mut base = BaseSpell::new("Arcane Bolt", kind);
    base.damage = "25 power 5 / +".into();
    base.mana_cost = "10".into();
    base.cooldown = "1".into();
    Spell::new(base)
}

fn engine_with(spell: Spell) -> CombatEngine {
    CombatEngine::new(CombatConfig::default(), PlayerState::new(spell))
}

fn cast_events(events: &[CombatEvent]) -> usize {
    events
        .iter()
        .filter(|e| e.channel() == Channel::SpellCast)
        .count()
}

fn first_launch(arena: &Arena) -> ProjectileId {
    arena.launched[0].id
}

#[test]
fn kill_with_soul_harvester_raises_power_by_two() {
    let mut engine = engine_with(spell(SpellKind::Bolt));
    let mut arena = Arena::default().with_enemy(1, 5.0, 0.0, 10);
    engine.add_relic(RelicDefinition::new(
        "Soul Harvester",
        TriggerKind::OnKill,
        EffectKind::GainSpellPower {
            amount: "2".into(),
            until: None,
        },
    ));
    engine.apply_class_stats(&ClassStats {
        health: 100,
        mana: 125,
        mana_regeneration: 8,
        spell_power: 48,
        speed: 5,
    });
    assert_eq!(engine.caster().spells()[0].stats().unwrap().damage.amount, 34);

    engine.cast_player_spell(Vec2::new(5.0, 0.0), &mut arena).unwrap();
    let projectile = first_launch(&arena);
    engine
        .projectile_hit(projectile, EntityId(1), Vec2::new(5.0, 0.0), &mut arena)
        .unwrap();

    assert_eq!(arena.hp(1), Some(0));
    assert_eq!(engine.caster().power(), 50);
    assert_eq!(engine.caster().spells()[0].stats().unwrap().damage.amount, 35);
    assert_eq!(arena.despawned, vec![projectile]);
    assert!(engine.drain_events().iter().any(|e| matches!(
        e,
        CombatEvent::EnemyKilled {
            killer: Team::Player,
            ..
        }
    )));
}

#[test]
fn mana_regenerates_every_second() {
    let mut engine = engine_with(spell(SpellKind::Bolt));
    let mut arena = Arena::default();
    engine.cast_player_spell(Vec2::new(1.0, 0.0), &mut arena).unwrap();
    assert_eq!(engine.caster().mana().current, 115);

    engine.advance(999, &mut arena).unwrap();
    assert_eq!(engine.caster().mana().current, 115);
    engine.advance(1, &mut arena).unwrap();
    assert_eq!(engine.caster().mana().current, 123);
    engine.advance(5_000, &mut arena).unwrap();
    assert!(engine.caster().mana().is_full());
}

#[test]
fn doubled_spell_casts_again_after_the_delay() {
    let doubled = spell(SpellKind::Bolt).wrapped(ModifierKind::Doubler.default_layer());
    let mut engine = engine_with(doubled);
    let mut arena = Arena::default();

    let outcome = engine.cast_player_spell(Vec2::new(1.0, 0.0), &mut arena).unwrap();
    assert!(outcome.is_cast());
    assert_eq!(arena.launched.len(), 1);
    assert_eq!(cast_events(&engine.drain_events()), 1);

    engine.advance(500, &mut arena).unwrap();
    assert_eq!(arena.launched.len(), 2);
    assert_eq!(cast_events(&engine.drain_events()), 1);
    // Mana was paid once: 125 - 15.
    assert_eq!(engine.caster().mana().current, 110);
    // Cooldown 1.5 s from the original cast, untouched by the deferred one.
    assert_eq!(engine.caster().spells()[0].cooldown_end(), Some(Tick(1_500)));
}

#[test]
fn standing_still_grants_power_until_the_player_moves() {
    let mut engine = engine_with(spell(SpellKind::Bolt));
    let mut arena = Arena::default();
    engine.add_relic(RelicDefinition::new(
        "Meditation Stone",
        TriggerKind::OnStandStill { duration_secs: 0.3 },
        EffectKind::GainSpellPower {
            amount: "10".into(),
            until: Some(EndCondition::Move),
        },
    ));
    engine.apply_class_stats(&ClassStats {
        health: 100,
        mana: 125,
        mana_regeneration: 8,
        spell_power: 5,
        speed: 5,
    });

    engine.advance(300, &mut arena).unwrap();
    assert_eq!(engine.caster().power(), 5);
    engine.advance(100, &mut arena).unwrap();
    assert_eq!(engine.caster().power(), 15);
    // Keeps firing while still, but the effect applies once.
    engine.advance(500, &mut arena).unwrap();
    assert_eq!(engine.caster().power(), 15);

    engine.move_player(Vec2::new(3.0, 0.0)).unwrap();
    assert_eq!(engine.caster().power(), 5);
    assert_eq!(engine.bus().listener_count(Channel::PlayerMove), 1);
}

#[test]
fn next_spell_bonus_is_spent_on_one_cast() {
    let mut engine = engine_with(spell(SpellKind::Bolt));
    let mut arena = Arena::default();
    engine.add_relic(RelicDefinition::new(
        "Focus Lens",
        TriggerKind::OnWaveComplete,
        EffectKind::ModifyNextSpell(100),
    ));
    engine.complete_wave().unwrap();
    assert_eq!(engine.caster().pending_bonus(), 100);

    let CastOutcome::Cast(plan) = engine
        .cast_player_spell(Vec2::new(1.0, 0.0), &mut arena)
        .unwrap()
    else {
        panic!("cast should succeed");
    };
    assert_eq!(plan.stats.damage.amount, 45);
    assert_eq!(engine.caster().pending_bonus(), 0);
    assert!(
        engine
            .relics()
            .iter()
            .all(|(_, relic)| !relic.effect.is_active())
    );
}

#[test]
fn player_damage_publishes_and_heals_through_relics() {
    let mut engine = engine_with(spell(SpellKind::Bolt));
    engine.add_relic(RelicDefinition::new(
        "Phoenix Feather",
        TriggerKind::OnDamageTaken,
        EffectKind::Heal(3),
    ));
    let dealt = engine
        .damage_player(Damage::new(10, DamageKind::Physical))
        .unwrap();
    assert_eq!(dealt, 10);
    assert_eq!(engine.player().health.current, 93);

    let channels: Vec<Channel> = engine.drain_events().iter().map(|e| e.channel()).collect();
    assert_eq!(channels, vec![Channel::Damage, Channel::PlayerDamageTaken]);
}

#[test]
fn nova_hits_hostiles_in_range_and_pushes_them_away() {
    let mut engine = engine_with(spell(SpellKind::nova()));
    let mut arena = Arena::default()
        .with_enemy(1, 3.0, 0.0, 100)
        .with_enemy(2, 0.0, 9.0, 100);

    engine.cast_player_spell(Vec2::new(1.0, 0.0), &mut arena).unwrap();
    assert_eq!(arena.hp(1), Some(75));
    assert_eq!(arena.hp(2), Some(100));
    assert_eq!(arena.pushed, vec![(EntityId(1), Vec2::new(10.0, 0.0))]);
    assert!(arena.launched.is_empty());
}

#[test]
fn blast_bursts_only_on_hostile_hits() {
    let mut engine = engine_with(spell(SpellKind::blast()));
    let mut arena = Arena::default().with_enemy(1, 4.0, 0.0, 100);
    engine.cast_player_spell(Vec2::new(4.0, 0.0), &mut arena).unwrap();
    let projectile = first_launch(&arena);

    let ignored = engine
        .projectile_hit(projectile, EntityId::PLAYER, Vec2::ZERO, &mut arena)
        .unwrap();
    assert!(ignored.strikes.is_empty());
    assert_eq!(arena.launched.len(), 1);

    engine
        .projectile_hit(projectile, EntityId(1), Vec2::new(4.0, 0.0), &mut arena)
        .unwrap();
    assert_eq!(arena.hp(1), Some(75));
    assert_eq!(arena.launched.len(), 9);
    assert!(
        arena.launched[1..]
            .iter()
            .all(|p| p.origin == Vec2::new(4.0, 0.0) && p.lifetime_secs == Some(0.1))
    );
    assert_eq!(engine.live_projectiles(), 8);
}

#[test]
fn clearing_relics_releases_everything() {
    let mut engine = engine_with(spell(SpellKind::Bolt));
    engine.add_relic(RelicDefinition::new(
        "Focus Lens",
        TriggerKind::OnWaveComplete,
        EffectKind::ModifyNextSpell(100),
    ));
    engine.add_relic(RelicDefinition::new(
        "Meditation Stone",
        TriggerKind::OnStandStill { duration_secs: 3.0 },
        EffectKind::GainMana(5),
    ));
    engine.complete_wave().unwrap();
    assert_eq!(engine.scheduler().len(), 2);

    assert_eq!(engine.clear_relics(), 2);
    assert!(engine.bus().is_empty());
    assert_eq!(engine.caster().pending_bonus(), 0);
    assert_eq!(engine.scheduler().len(), 1);
}

#[test]
fn removing_an_unknown_relic_fails() {
    let mut engine = engine_with(spell(SpellKind::Bolt));
    let id = engine.add_relic(RelicDefinition::new(
        "Mystic Orb",
        TriggerKind::OnSpellCast,
        EffectKind::GainMana(2),
    ));
    assert!(engine.remove_relic(id).is_ok());
    assert_eq!(engine.remove_relic(id), Err(CombatError::UnknownRelic(id)));
}

#[test]
fn reset_player_restarts_regeneration_once() {
    let mut engine = engine_with(spell(SpellKind::Bolt));
    let mut arena = Arena::default();
    engine.advance(250, &mut arena).unwrap();
    engine.reset_player(PlayerState::new(spell(SpellKind::Bolt)));
    assert_eq!(engine.scheduler().len(), 1);
    assert_eq!(engine.scheduler().next_due(), Some(Tick(1_250)));
}

#[test]
fn broken_relic_formula_does_not_abort_the_cast() {
    let mut engine = engine_with(spell(SpellKind::Bolt));
    let mut arena = Arena::default();
    let broken = engine.add_relic(RelicDefinition::new(
        "Cracked Idol",
        TriggerKind::OnSpellCast,
        EffectKind::GainSpellPower {
            amount: "wave bogus +".into(),
            until: None,
        },
    ));
    engine.add_relic(RelicDefinition::new(
        "Mystic Orb",
        TriggerKind::OnSpellCast,
        EffectKind::GainMana(2),
    ));
    let mana_before = engine.caster().mana().current;
    let power_before = engine.caster().power();

    let outcome = engine
        .cast_player_spell(Vec2::new(5.0, 0.0), &mut arena)
        .unwrap();

    assert!(outcome.is_cast());
    assert_eq!(arena.launched.len(), 1);
    // Cost 10, refunded 2 by the listener after the broken one.
    assert_eq!(engine.caster().mana().current, mana_before - 8);
    assert_eq!(engine.caster().power(), power_before);

    let faults = engine.drain_faults();
    assert_eq!(faults.len(), 1);
    assert_eq!(faults[0].relic, broken);
    assert_eq!(faults[0].channel, Channel::SpellCast);
    assert!(matches!(
        faults[0].error,
        crate::formula::FormulaError::MalformedExpression { .. }
    ));
    assert!(engine.drain_faults().is_empty());
}

#[test]
fn configured_cast_modifiers_apply_to_every_cast() {
    use crate::stats::{ModifierSet, StatChannel, ValueModifier};

    let config = CombatConfig::default().with_cast_modifiers(
        ModifierSet::new().with(StatChannel::Damage, ValueModifier::Multiplicative(2.0)),
    );
    let mut engine = CombatEngine::new(config, PlayerState::new(spell(SpellKind::Bolt)));
    let mut arena = Arena::default();

    let CastOutcome::Cast(plan) = engine
        .cast_player_spell(Vec2::new(1.0, 0.0), &mut arena)
        .unwrap()
    else {
        panic!("cast should succeed");
    };
    assert_eq!(plan.stats.damage.amount, 50);
    assert_eq!(
        engine.caster().external_modifiers(),
        &engine.config().cast_modifiers
    );
}
