//! One run: a class fighting through the waves of a level.
//!
//! The session owns the combat engine and the arena, schedules enemy spawns,
//! applies class stat curves at each wave, and hands out spell and relic
//! rewards between waves. Every engine event is forwarded to the outbox.

use rand::SeedableRng;
use rand::rngs::StdRng;
use serde::Serialize;
use tracing::{debug, info, warn};

use game_content::{ContentBundle, DEFAULT_SPELL, RelicPool, SpellBuilder};
use game_core::{
    CastOutcome, CharacterClass, CombatEngine, CombatSnapshot, Damage, DamageKind, EntityId,
    EnemyTemplate, HitResolution, LevelDefinition, PlayerState, ProjectileId, RelicDefinition,
    RelicId, SpawnPlan, Tick, Vec2, plan_spawn,
};

use crate::api::{Result, RuntimeError};
use crate::arena::{Arena, ArenaEvent};
use crate::events::{Event, RewardEvent, RunOutcome, WaveEvent};

/// Which class, level and random seed a run uses.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SessionSettings {
    pub class: String,
    pub level: String,
    pub seed: u64,
}

impl Default for SessionSettings {
    fn default() -> Self {
        Self {
            class: "mage".to_owned(),
            level: "Easy".to_owned(),
            seed: 0,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(tag = "state", content = "outcome", rename_all = "snake_case")]
pub enum RunStatus {
    InWave,
    BetweenWaves,
    Over(RunOutcome),
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct EnemyView {
    pub id: EntityId,
    pub name: String,
    pub position: Vec2,
    pub hp: i32,
    pub max_hp: i32,
}

/// Read-only view of a run.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct RunSnapshot {
    pub class: String,
    pub level: String,
    pub status: RunStatus,
    pub combat: CombatSnapshot,
    pub enemies: Vec<EnemyView>,
    pub pending_spawns: usize,
    pub relic_offer: Vec<String>,
}

#[derive(Clone, Debug)]
struct PendingSpawn {
    at: Tick,
    plan: SpawnPlan,
    size: u32,
}

pub struct RunSession {
    engine: CombatEngine,
    arena: Arena,
    class: CharacterClass,
    level: LevelDefinition,
    enemies: Vec<EnemyTemplate>,
    builder: SpellBuilder,
    relics: RelicPool,
    rng: StdRng,
    status: RunStatus,
    pending: Vec<PendingSpawn>,
    offer: Vec<RelicDefinition>,
    outbox: Vec<Event>,
}

impl RunSession {
    /// Starts a run and its first wave.
    pub fn new(content: ContentBundle, settings: &SessionSettings) -> Result<Self> {
        let level = content
            .level(&settings.level)
            .cloned()
            .ok_or_else(|| RuntimeError::UnknownLevel(settings.level.clone()))?;
        if let Some(rule) = level
            .spawns
            .iter()
            .find(|rule| content.enemy(&rule.enemy).is_none())
        {
            return Err(RuntimeError::UnknownEnemy(rule.enemy.clone()));
        }

        let class = content.classes.resolve(&settings.class);
        let builder = SpellBuilder::new(content.spells)
            .with_max_random_modifiers(content.config.max_random_modifiers);
        let starting_spell = builder.build(DEFAULT_SPELL);
        let engine = CombatEngine::new(content.config, PlayerState::new(starting_spell));

        info!(
            class = %class.name,
            level = %level.name,
            seed = settings.seed,
            "run started"
        );

        let mut session = Self {
            engine,
            arena: Arena::new(StdRng::seed_from_u64(settings.seed.wrapping_add(1))),
            class,
            level,
            enemies: content.enemies,
            builder,
            relics: RelicPool::new(content.relics),
            rng: StdRng::seed_from_u64(settings.seed),
            status: RunStatus::BetweenWaves,
            pending: Vec::new(),
            offer: Vec::new(),
            outbox: Vec::new(),
        };
        session.start_wave(1)?;
        Ok(session)
    }

    pub fn status(&self) -> RunStatus {
        self.status
    }

    pub fn engine(&self) -> &CombatEngine {
        &self.engine
    }

    pub fn arena(&self) -> &Arena {
        &self.arena
    }

    pub fn drain_events(&mut self) -> Vec<Event> {
        std::mem::take(&mut self.outbox)
    }

    fn ensure_running(&self) -> Result<()> {
        match self.status {
            RunStatus::Over(_) => Err(RuntimeError::RunOver),
            _ => Ok(()),
        }
    }

    fn forward_engine_events(&mut self) {
        for fault in self.engine.drain_faults() {
            warn!(
                relic = %fault.relic,
                channel = %fault.channel,
                error = %fault.error,
                "relic listener failed"
            );
        }
        self.outbox
            .extend(self.engine.drain_events().into_iter().map(Event::Combat));
    }

    // ===== player commands =====

    pub fn cast(&mut self, target: Vec2) -> Result<CastOutcome> {
        self.ensure_running()?;
        let outcome = self.engine.cast_player_spell(target, &mut self.arena);
        self.forward_engine_events();
        let outcome = outcome?;
        if let CastOutcome::Rejected(reason) = &outcome {
            debug!(?reason, "cast rejected");
        }
        self.check_wave_cleared()?;
        Ok(outcome)
    }

    pub fn select_spell(&mut self, index: usize) -> Result<()> {
        self.engine.select_spell(index)?;
        Ok(())
    }

    pub fn move_player(&mut self, to: Vec2) -> Result<()> {
        self.ensure_running()?;
        let moved = self.engine.move_player(to);
        self.arena.set_player_position(to);
        self.forward_engine_events();
        Ok(moved?)
    }

    /// Resolves a collision detected outside the arena.
    pub fn report_hit(
        &mut self,
        projectile: ProjectileId,
        target: EntityId,
        impact: Vec2,
    ) -> Result<HitResolution> {
        self.ensure_running()?;
        let resolution = self
            .engine
            .projectile_hit(projectile, target, impact, &mut self.arena);
        self.forward_engine_events();
        let resolution = resolution?;
        self.check_wave_cleared()?;
        Ok(resolution)
    }

    pub fn damage_player(&mut self, damage: Damage) -> Result<i32> {
        self.ensure_running()?;
        let dealt = self.engine.damage_player(damage);
        self.forward_engine_events();
        let dealt = dealt?;
        self.check_defeat();
        Ok(dealt)
    }

    /// Moves the run forward by `dt_ms`: spawns, arena movement, collisions
    /// and the engine clock, in that order.
    pub fn advance(&mut self, dt_ms: u64) -> Result<()> {
        self.ensure_running()?;
        let until = self.engine.now() + dt_ms;
        self.release_spawns(until);

        for event in self.arena.step(dt_ms) {
            match event {
                ArenaEvent::Collision {
                    projectile,
                    target,
                    impact,
                } => {
                    self.engine
                        .projectile_hit(projectile, target, impact, &mut self.arena)?;
                }
                ArenaEvent::Expired(projectile) => {
                    self.engine.projectile_expired(projectile);
                }
                ArenaEvent::Contact { enemy, damage } => {
                    debug!(?enemy, damage, "enemy strikes the player");
                    self.engine
                        .damage_player(Damage::new(damage, DamageKind::Physical))?;
                }
            }
            if self.engine.is_player_dead() {
                break;
            }
        }

        let advanced = self.engine.advance(dt_ms, &mut self.arena);
        self.forward_engine_events();
        advanced?;

        self.check_defeat();
        self.check_wave_cleared()
    }

    // ===== waves =====

    fn start_wave(&mut self, wave: u32) -> Result<()> {
        let stats = self.class.stats_at(wave)?;
        self.engine.apply_class_stats(&stats);
        self.engine.start_wave(wave)?;
        self.forward_engine_events();

        let start = self.engine.now();
        let mut plans = Vec::with_capacity(self.level.spawns.len());
        for rule in &self.level.spawns {
            let Some(enemy) = self.enemies.iter().find(|e| e.name == rule.enemy) else {
                warn!(enemy = %rule.enemy, "no template for spawn rule");
                continue;
            };
            let plan = plan_spawn(rule, enemy, wave)?;
            let delay_ms = Tick::millis_from_secs(plan.delay_secs);
            let mut at = start;
            for &size in &plan.groups {
                self.pending.push(PendingSpawn {
                    at,
                    plan: plan.clone(),
                    size,
                });
                at = at + delay_ms;
            }
            plans.push(plan);
        }
        self.pending.sort_by_key(|spawn| spawn.at);
        self.status = RunStatus::InWave;

        info!(
            wave,
            enemies = plans.iter().map(SpawnPlan::total).sum::<u32>(),
            health = stats.health,
            spell_power = stats.spell_power,
            "wave started"
        );
        self.outbox.push(Event::Wave(WaveEvent::Started {
            wave,
            spawns: plans,
        }));
        self.release_spawns(start);
        Ok(())
    }

    fn release_spawns(&mut self, until: Tick) {
        let due = self.pending.partition_point(|spawn| spawn.at <= until);
        for spawn in self.pending.drain(..due) {
            let spawned = self.arena.spawn(&spawn.plan, spawn.size);
            debug!(enemy = %spawn.plan.enemy, count = spawned.len(), "group spawned");
        }
    }

    fn check_defeat(&mut self) {
        if self.engine.is_player_dead() && self.status != RunStatus::Over(RunOutcome::Defeat) {
            let wave = self.engine.state().wave;
            self.status = RunStatus::Over(RunOutcome::Defeat);
            info!(wave, "run lost");
            self.outbox.push(Event::Wave(WaveEvent::Finished {
                wave,
                outcome: RunOutcome::Defeat,
            }));
        }
    }

    fn check_wave_cleared(&mut self) -> Result<()> {
        if self.status == RunStatus::InWave
            && self.pending.is_empty()
            && self.arena.living_enemies() == 0
        {
            self.finish_wave()?;
        }
        Ok(())
    }

    /// Ends the current wave immediately, discarding enemies still alive or
    /// waiting to spawn.
    pub fn complete_wave(&mut self) -> Result<()> {
        self.ensure_running()?;
        if self.status != RunStatus::InWave {
            debug!("no wave in progress");
            return Ok(());
        }
        self.pending.clear();
        self.arena.clear();
        self.finish_wave()
    }

    fn finish_wave(&mut self) -> Result<()> {
        let wave = self.engine.state().wave;
        self.engine.complete_wave()?;
        self.forward_engine_events();
        self.outbox.push(Event::Wave(WaveEvent::Cleared { wave }));
        info!(wave, "wave cleared");

        self.grant_spell_reward(wave);
        if self.engine.config().offers_relics_on(wave) {
            self.offer_relics(wave);
        }

        if self.level.is_final_wave(wave) {
            self.status = RunStatus::Over(RunOutcome::Victory);
            info!(wave, "run won");
            self.outbox.push(Event::Wave(WaveEvent::Finished {
                wave,
                outcome: RunOutcome::Victory,
            }));
        } else {
            self.status = RunStatus::BetweenWaves;
        }
        Ok(())
    }

    /// Starts the next wave. An unanswered relic offer is forfeited.
    pub fn next_wave(&mut self) -> Result<u32> {
        self.ensure_running()?;
        if self.status == RunStatus::InWave {
            return Err(RuntimeError::WaveInProgress);
        }
        if !self.offer.is_empty() {
            info!(relics = self.offer.len(), "relic offer forfeited");
            self.offer.clear();
        }
        let wave = self.engine.state().wave + 1;
        self.start_wave(wave)?;
        Ok(wave)
    }

    // ===== rewards =====

    fn grant_spell_reward(&mut self, wave: u32) {
        let power = self.engine.caster().power();
        let spell = self.builder.build_random(power, wave, &mut self.rng);
        let name = spell.name();
        let replaced = self.engine.add_spell(spell).map(|old| old.name());
        info!(spell = %name, replaced = ?replaced, "spell reward");
        self.outbox.push(Event::Reward(RewardEvent::SpellGranted {
            spell: name,
            replaced,
        }));
    }

    fn offer_relics(&mut self, wave: u32) {
        let size = self.engine.config().relic_offer_size;
        self.offer = self.relics.offer(size, &mut self.rng);
        if self.offer.is_empty() {
            debug!(wave, "no relics left to offer");
            return;
        }
        let relics: Vec<String> = self.offer.iter().map(|r| r.name.clone()).collect();
        info!(wave, ?relics, "relics offered");
        self.outbox
            .push(Event::Reward(RewardEvent::RelicsOffered { wave, relics }));
    }

    /// Takes one relic of the pending offer.
    pub fn choose_relic(&mut self, name: &str) -> Result<RelicId> {
        self.ensure_running()?;
        if self.offer.is_empty() {
            return Err(RuntimeError::NoRelicOffer);
        }
        if !self.offer.iter().any(|relic| relic.name == name) {
            return Err(RuntimeError::UnknownRelicChoice(name.to_owned()));
        }
        let definition = self
            .relics
            .take(name)
            .ok_or_else(|| RuntimeError::UnknownRelicChoice(name.to_owned()))?;
        self.offer.clear();
        let id = self.engine.add_relic(definition);
        info!(relic = name, "relic chosen");
        self.outbox.push(Event::Reward(RewardEvent::RelicChosen {
            relic: name.to_owned(),
        }));
        Ok(id)
    }

    pub fn snapshot(&self) -> RunSnapshot {
        RunSnapshot {
            class: self.class.name.clone(),
            level: self.level.name.clone(),
            status: self.status,
            combat: self.engine.snapshot(),
            enemies: self
                .arena
                .enemies()
                .map(|enemy| EnemyView {
                    id: enemy.id,
                    name: enemy.name.clone(),
                    position: enemy.position,
                    hp: enemy.hp,
                    max_hp: enemy.max_hp,
                })
                .collect(),
            pending_spawns: self.pending.iter().map(|s| s.size as usize).sum(),
            relic_offer: self.offer.iter().map(|r| r.name.clone()).collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use std::path::Path;

    use game_content::ContentFactory;
    use game_core::CombatEvent;

    use super::*;

    fn content() -> ContentBundle {
        let data = Path::new(env!("CARGO_MANIFEST_DIR")).join("../../data");
        ContentFactory::new(data).load_bundle().unwrap()
    }

    fn session(level: &str) -> RunSession {
        let settings = SessionSettings {
            level: level.to_owned(),
            seed: 7,
            ..SessionSettings::default()
        };
        RunSession::new(content(), &settings).unwrap()
    }

    #[test]
    fn first_wave_starts_with_staggered_spawns() {
        let mut run = session("Easy");
        let snapshot = run.snapshot();

        assert_eq!(snapshot.status, RunStatus::InWave);
        assert_eq!(snapshot.combat.wave, 1);
        // Six zombies, one per group, the first released immediately.
        assert_eq!(snapshot.enemies.len(), 1);
        assert_eq!(snapshot.pending_spawns, 5);
        assert_eq!(snapshot.enemies[0].hp, 25);

        let events = run.drain_events();
        assert!(events.iter().any(|e| matches!(
            e,
            Event::Wave(WaveEvent::Started { wave: 1, spawns }) if spawns[0].total() == 6
        )));
        assert!(
            events
                .iter()
                .any(|e| matches!(e, Event::Combat(CombatEvent::WaveStart { wave: 1 })))
        );

        run.advance(2_000).unwrap();
        assert_eq!(run.snapshot().pending_spawns, 4);
    }

    #[test]
    fn unknown_level_is_rejected() {
        let settings = SessionSettings {
            level: "Nightmare".to_owned(),
            ..SessionSettings::default()
        };
        assert!(matches!(
            RunSession::new(content(), &settings),
            Err(RuntimeError::UnknownLevel(name)) if name == "Nightmare"
        ));
    }

    #[test]
    fn completed_waves_grant_spells_and_offer_relics() {
        let mut run = session("Easy");
        run.drain_events();

        run.complete_wave().unwrap();
        assert_eq!(run.status(), RunStatus::BetweenWaves);
        assert!(run.snapshot().enemies.is_empty());
        let events = run.drain_events();
        assert!(
            events
                .iter()
                .any(|e| matches!(e, Event::Reward(RewardEvent::SpellGranted { .. })))
        );
        assert_eq!(run.snapshot().combat.spells.len(), 2);
        assert!(matches!(
            run.choose_relic("Green Gem"),
            Err(RuntimeError::NoRelicOffer)
        ));

        assert_eq!(run.next_wave().unwrap(), 2);
        assert!(matches!(run.next_wave(), Err(RuntimeError::WaveInProgress)));
        run.complete_wave().unwrap();
        run.next_wave().unwrap();
        run.complete_wave().unwrap();

        let offer = run.snapshot().relic_offer;
        assert_eq!(offer.len(), 3);
        assert!(matches!(
            run.choose_relic("Not A Relic"),
            Err(RuntimeError::UnknownRelicChoice(_))
        ));
        run.choose_relic(&offer[1]).unwrap();

        let snapshot = run.snapshot();
        assert!(snapshot.relic_offer.is_empty());
        assert_eq!(snapshot.combat.relics, vec![offer[1].clone()]);
        assert!(run.drain_events().iter().any(|e| matches!(
            e,
            Event::Reward(RewardEvent::RelicChosen { relic }) if *relic == offer[1]
        )));
    }

    #[test]
    fn clearing_the_last_wave_wins_the_run() {
        let mut run = session("Easy");
        for wave in 1..=10 {
            assert_eq!(run.snapshot().combat.wave, wave);
            run.complete_wave().unwrap();
            if wave < 10 {
                run.next_wave().unwrap();
            }
        }
        assert_eq!(run.status(), RunStatus::Over(RunOutcome::Victory));
        assert!(matches!(run.next_wave(), Err(RuntimeError::RunOver)));
        assert!(run.drain_events().iter().any(|e| matches!(
            e,
            Event::Wave(WaveEvent::Finished {
                wave: 10,
                outcome: RunOutcome::Victory
            })
        )));
    }

    #[test]
    fn lethal_damage_ends_the_run() {
        let mut run = session("Easy");
        run.damage_player(Damage::new(10_000, DamageKind::Physical))
            .unwrap();

        assert_eq!(run.status(), RunStatus::Over(RunOutcome::Defeat));
        assert!(matches!(
            run.cast(Vec2::new(1.0, 0.0)),
            Err(RuntimeError::RunOver)
        ));
    }

    #[test]
    fn idle_player_is_overrun() {
        let mut run = session("Easy");
        for _ in 0..1_200 {
            if run.status() != RunStatus::InWave {
                break;
            }
            run.advance(100).unwrap();
        }
        assert_eq!(run.status(), RunStatus::Over(RunOutcome::Defeat));
        assert!(
            run.drain_events()
                .iter()
                .any(|e| matches!(e, Event::Combat(CombatEvent::PlayerDamageTaken { .. })))
        );
    }

    #[test]
    fn aimed_bolt_kills_the_first_zombie() {
        let mut run = session("Easy");
        let target = run.snapshot().enemies[0].position;

        let outcome = run.cast(target).unwrap();
        assert!(outcome.is_cast());

        for _ in 0..30 {
            run.advance(100).unwrap();
        }
        let events = run.drain_events();
        assert!(
            events
                .iter()
                .any(|e| matches!(e, Event::Combat(CombatEvent::SpellCast { .. })))
        );
        assert!(events.iter().any(|e| matches!(
            e,
            Event::Combat(CombatEvent::EnemyKilled {
                killer: game_core::Team::Player,
                ..
            })
        )));
    }
}
