//! The combat engine: the single owner of combat state and the central tick driver.
//!
//! Every mutation of the player, relics or projectiles flows through
//! [`CombatEngine`]. Events published along the way are dispatched to relic
//! listeners synchronously and appended to an outbox the host drains with
//! [`CombatEngine::drain_events`].
mod state;

pub use state::{CombatSnapshot, CombatState, PlayerState, SpellSummary};

use crate::caster::{CastOutcome, SpellCaster};
use crate::combat::{
    ActiveProjectile, Battlefield, BurstSpec, Damage, HitMode, HitResolution, ProjectileLaunch,
    ProjectileTracker, Trajectory,
};
use crate::config::CombatConfig;
use crate::error::{CombatError, RelicFault};
use crate::formula::FormulaError;
use crate::events::{CombatEvent, EventBus, Listener};
use crate::relic::{EffectTarget, Relic, RelicCollection, RelicDefinition, TriggerResponse};
use crate::scheduler::{DueTask, Scheduler, Task, TaskOwner};
use crate::spell::{CastStep, Spell};
use crate::state::{EntityId, ProjectileId, RelicId, Team, Tick, Vec2};
use crate::stats::ClassStats;
use state::ClassBaseline;

pub struct CombatEngine {
    state: CombatState,
    bus: EventBus,
    scheduler: Scheduler,
    relics: RelicCollection,
    projectiles: ProjectileTracker,
    outbox: Vec<CombatEvent>,
    faults: Vec<RelicFault>,
    config: CombatConfig,
}

impl CombatEngine {
    pub fn new(config: CombatConfig, mut player: PlayerState) -> Self {
        player
            .caster
            .set_external_modifiers(config.cast_modifiers.clone());
        let mut engine = Self {
            state: CombatState::new(player),
            bus: EventBus::new(),
            scheduler: Scheduler::new(),
            relics: RelicCollection::new(),
            projectiles: ProjectileTracker::new(),
            outbox: Vec::new(),
            faults: Vec::new(),
            config,
        };
        engine.start_regeneration();
        engine
    }

    pub fn state(&self) -> &CombatState {
        &self.state
    }

    pub fn config(&self) -> &CombatConfig {
        &self.config
    }

    pub fn now(&self) -> Tick {
        self.state.now
    }

    pub fn player(&self) -> &PlayerState {
        &self.state.player
    }

    pub fn caster(&self) -> &SpellCaster {
        &self.state.player.caster
    }

    pub fn relics(&self) -> &RelicCollection {
        &self.relics
    }

    pub fn bus(&self) -> &EventBus {
        &self.bus
    }

    pub fn scheduler(&self) -> &Scheduler {
        &self.scheduler
    }

    pub fn live_projectiles(&self) -> usize {
        self.projectiles.len()
    }

    pub fn is_player_dead(&self) -> bool {
        self.state.player.is_dead()
    }

    /// Takes every event published since the last drain.
    pub fn drain_events(&mut self) -> Vec<CombatEvent> {
        std::mem::take(&mut self.outbox)
    }

    /// Takes every relic listener failure recorded since the last drain.
    pub fn drain_faults(&mut self) -> Vec<RelicFault> {
        std::mem::take(&mut self.faults)
    }

    fn start_regeneration(&mut self) {
        self.scheduler.schedule_every(
            self.state.now,
            self.config.regen_interval_ms,
            TaskOwner::Caster,
            Task::RegenerateMana,
        );
    }

    // ===== event dispatch =====

    /// Dispatches `event` to every listener on its channel. A failing relic
    /// is recorded as a [`RelicFault`] and the remaining listeners still run.
    fn publish(&mut self, event: CombatEvent) {
        self.outbox.push(event.clone());
        let channel = event.channel();
        for (id, listener) in self.bus.snapshot(channel) {
            // Released by an earlier listener in this same dispatch.
            if !self.bus.is_subscribed(channel, id) {
                continue;
            }
            match listener {
                Listener::Trigger(relic) => {
                    if let Err(error) = self.fire_trigger(relic, &event) {
                        self.faults.push(RelicFault {
                            relic,
                            channel,
                            error,
                        });
                    }
                }
                Listener::EffectEnd(relic) => self.end_effect(relic),
            }
        }
    }

    fn fire_trigger(&mut self, id: RelicId, event: &CombatEvent) -> Result<(), FormulaError> {
        let Some(relic) = self.relics.get_mut(id) else {
            return Ok(());
        };
        match relic.trigger.respond(event) {
            TriggerResponse::Fire => {
                let target = EffectTarget {
                    caster: &mut self.state.player.caster,
                    health: &mut self.state.player.health,
                    wave: self.state.wave,
                };
                relic.effect.execute(id, target, &mut self.bus)?;
            }
            TriggerResponse::Reset => {
                relic.effect.end(&mut self.state.player.caster, &mut self.bus);
            }
            TriggerResponse::Ignore => {}
        }
        Ok(())
    }

    fn end_effect(&mut self, id: RelicId) {
        if let Some(relic) = self.relics.get_mut(id) {
            relic.effect.end(&mut self.state.player.caster, &mut self.bus);
        }
    }

    // ===== player actions =====

    /// Casts the selected spell from the player's position toward `target`.
    pub fn cast_player_spell<F: Battlefield + ?Sized>(
        &mut self,
        target: Vec2,
        field: &mut F,
    ) -> Result<CastOutcome, CombatError> {
        let origin = self.state.player.position;
        let outcome = self.state.player.caster.cast(origin, target, self.state.now)?;
        if let CastOutcome::Cast(plan) = &outcome {
            self.run_steps(&plan.spell_name, plan.steps.clone(), field)?;
        }
        Ok(outcome)
    }

    pub fn select_spell(&mut self, index: usize) -> Result<(), CombatError> {
        Ok(self.state.player.caster.select(index)?)
    }

    /// Gives the player a spell, replacing the selected one when all slots are full.
    pub fn add_spell(&mut self, spell: Spell) -> Option<Spell> {
        self.state.player.caster.add_spell(spell)
    }

    pub fn remove_spell(&mut self, index: usize) -> Option<Spell> {
        self.state.player.caster.remove_spell(index)
    }

    /// Moves the player, publishing a move event when the position changes.
    pub fn move_player(&mut self, to: Vec2) -> Result<(), CombatError> {
        let from = self.state.player.position;
        self.state.player.position = to;
        if from == to {
            return Ok(());
        }
        self.publish(CombatEvent::PlayerMove { from, to });
        Ok(())
    }

    /// Applies `damage` to the player. Returns the health actually lost.
    pub fn damage_player(&mut self, damage: Damage) -> Result<i32, CombatError> {
        let dealt = self.state.player.health.deplete(damage.amount);
        self.publish(CombatEvent::Damage {
            target: EntityId::PLAYER,
            amount: dealt,
            kind: damage.kind,
        });
        self.publish(CombatEvent::PlayerDamageTaken { amount: dealt });
        Ok(dealt)
    }

    fn run_steps<F: Battlefield + ?Sized>(
        &mut self,
        spell_name: &str,
        steps: Vec<CastStep>,
        field: &mut F,
    ) -> Result<(), CombatError> {
        let team = self.state.player.caster.team();
        let origin = self.state.player.position;
        for step in steps {
            match step {
                CastStep::Announce => self.publish(CombatEvent::SpellCast {
                    spell: spell_name.to_owned(),
                }),
                CastStep::Launch {
                    direction,
                    speed,
                    trajectory,
                    sprite,
                    damage,
                    mode,
                    lifetime_secs,
                } => {
                    let id = self
                        .projectiles
                        .track(ActiveProjectile::new(team, damage, mode));
                    field.launch(ProjectileLaunch {
                        id,
                        team,
                        origin,
                        direction,
                        speed,
                        trajectory,
                        sprite,
                        lifetime_secs,
                    });
                }
                CastStep::Nova {
                    radius,
                    knockback,
                    damage,
                } => self.nova(origin, radius, knockback, damage, team, field)?,
                CastStep::Defer { delay_ms, steps } => self.scheduler.schedule_once(
                    self.state.now + delay_ms,
                    TaskOwner::Caster,
                    Task::DeferredCast {
                        spell_name: spell_name.to_owned(),
                        steps,
                    },
                ),
            }
        }
        Ok(())
    }

    fn nova<F: Battlefield + ?Sized>(
        &mut self,
        origin: Vec2,
        radius: f32,
        force: f32,
        damage: Damage,
        team: Team,
        field: &mut F,
    ) -> Result<(), CombatError> {
        let targets: Vec<EntityId> = field
            .targets_within(origin, radius)
            .into_iter()
            .filter(|id| field.team_of(*id).is_some_and(|t| team.opposes(t)))
            .collect();
        for target in targets {
            if let Some(position) = field.position_of(target) {
                field.apply_knockback(target, (position - origin).normalized() * force);
            }
            self.strike(target, damage, team, field)?;
        }
        Ok(())
    }

    /// Damages `target` on behalf of `attacker`, routing hits on the player to
    /// the engine's own health meter.
    fn strike<F: Battlefield + ?Sized>(
        &mut self,
        target: EntityId,
        damage: Damage,
        attacker: Team,
        field: &mut F,
    ) -> Result<(), CombatError> {
        if target.is_player() {
            self.damage_player(damage)?;
            return Ok(());
        }
        let report = field.apply_damage(target, damage);
        self.publish(CombatEvent::Damage {
            target,
            amount: report.dealt,
            kind: damage.kind,
        });
        if report.killed {
            self.publish(CombatEvent::EnemyKilled {
                killer: attacker,
                killed: target,
            });
        }
        Ok(())
    }

    // ===== projectiles =====

    /// Resolves a collision reported by the battlefield.
    ///
    /// Unknown projectile ids resolve to nothing.
    pub fn projectile_hit<F: Battlefield + ?Sized>(
        &mut self,
        projectile: ProjectileId,
        target: EntityId,
        impact: Vec2,
        field: &mut F,
    ) -> Result<HitResolution, CombatError> {
        let Some(active) = self.projectiles.get_mut(projectile) else {
            return Ok(HitResolution::default());
        };
        let team = active.team;
        let resolution = active.on_hit(target, impact, &*field);

        if resolution.spent {
            self.projectiles.release(projectile);
            field.despawn(projectile);
        }
        for strike in &resolution.strikes {
            self.strike(strike.target, strike.damage, team, field)?;
        }
        if let Some((at, burst)) = resolution.burst {
            self.burst(at, burst, team, field);
        }
        Ok(resolution)
    }

    fn burst<F: Battlefield + ?Sized>(&mut self, at: Vec2, burst: BurstSpec, team: Team, field: &mut F) {
        for i in 0..burst.count {
            let angle = i as f32 * std::f32::consts::TAU / burst.count as f32;
            let id = self
                .projectiles
                .track(ActiveProjectile::new(team, burst.damage, HitMode::Direct));
            field.launch(ProjectileLaunch {
                id,
                team,
                origin: at,
                direction: Vec2::from_angle(angle),
                speed: burst.speed,
                trajectory: Trajectory::Straight,
                sprite: burst.sprite,
                lifetime_secs: Some(burst.lifetime_secs),
            });
        }
    }

    /// Forgets a projectile the battlefield removed on its own.
    pub fn projectile_expired(&mut self, projectile: ProjectileId) -> bool {
        self.projectiles.release(projectile).is_some()
    }

    // ===== clock =====

    /// Advances the clock by `dt_ms`, running every task that comes due in
    /// deadline order.
    pub fn advance<F: Battlefield + ?Sized>(
        &mut self,
        dt_ms: u64,
        field: &mut F,
    ) -> Result<(), CombatError> {
        let until = self.state.now + dt_ms;
        while let Some(DueTask { at, task, .. }) = self.scheduler.pop_due(until) {
            self.state.now = self.state.now.max(at);
            self.run_task(task, field)?;
        }
        self.state.now = until;
        Ok(())
    }

    fn run_task<F: Battlefield + ?Sized>(&mut self, task: Task, field: &mut F) -> Result<(), CombatError> {
        match task {
            Task::RegenerateMana => {
                self.state.player.caster.regenerate();
            }
            Task::PollStandStill(id) => {
                let position = self.state.player.position;
                let (poll_ms, tolerance) = (
                    self.config.stand_still_poll_ms,
                    self.config.stand_still_tolerance,
                );
                let still = self
                    .relics
                    .get_mut(id)
                    .and_then(|relic| relic.trigger.poll(position, poll_ms, tolerance));
                if let Some(duration_secs) = still {
                    self.publish(CombatEvent::PlayerStandStill { duration_secs });
                }
            }
            Task::DeferredCast { spell_name, steps } => {
                self.run_steps(&spell_name, steps, field)?;
            }
        }
        Ok(())
    }

    // ===== relics =====

    /// Takes ownership of a relic and activates its trigger.
    pub fn add_relic(&mut self, definition: RelicDefinition) -> RelicId {
        let stand_still = definition.trigger.is_stand_still();
        let id = self.relics.insert(Relic::new(definition), &mut self.bus);
        if stand_still {
            self.scheduler.schedule_every(
                self.state.now,
                self.config.stand_still_poll_ms,
                TaskOwner::Relic(id),
                Task::PollStandStill(id),
            );
        }
        id
    }

    /// Removes one relic, reverting its temporary effect.
    ///
    /// A next-spell bonus it already staged stays on the caster.
    pub fn remove_relic(&mut self, id: RelicId) -> Result<RelicDefinition, CombatError> {
        let relic = self
            .relics
            .remove(id, &mut self.state.player.caster, &mut self.bus)
            .ok_or(CombatError::UnknownRelic(id))?;
        self.scheduler.cancel_owner(TaskOwner::Relic(id));
        Ok(relic.definition().clone())
    }

    /// Removes every relic, clears any staged next-spell bonus and cancels
    /// relic tasks.
    pub fn clear_relics(&mut self) -> usize {
        let removed = self
            .relics
            .clear(&mut self.state.player.caster, &mut self.bus);
        for id in &removed {
            self.scheduler.cancel_owner(TaskOwner::Relic(*id));
        }
        self.state.player.caster.clear_pending_bonus();
        removed.len()
    }

    // ===== waves =====

    pub fn start_wave(&mut self, wave: u32) -> Result<(), CombatError> {
        self.state.wave = wave;
        let power = self.state.player.caster.power();
        self.state.player.caster.update_power_and_wave(power, wave);
        self.publish(CombatEvent::WaveStart { wave });
        Ok(())
    }

    pub fn complete_wave(&mut self) -> Result<(), CombatError> {
        self.publish(CombatEvent::WaveComplete {
            wave: self.state.wave,
        });
        Ok(())
    }

    /// Folds a wave's class stats into the player.
    ///
    /// Applied as a delta against the previously applied class stats, so gains
    /// from relics survive. Raised maxima are granted as current value too.
    pub fn apply_class_stats(&mut self, stats: &ClassStats) {
        let baseline = self.state.baseline;
        let player = &mut self.state.player;

        player.caster.add_power(stats.spell_power - baseline.spell_power);
        player.caster.set_regeneration(stats.mana_regeneration);

        let health_delta = stats.health - baseline.health;
        player.health.raise_maximum(health_delta);
        player.health.restore(health_delta);

        let mana_delta = stats.mana - baseline.mana;
        let mana = player.caster.mana_mut();
        mana.raise_maximum(mana_delta);
        mana.restore(mana_delta);

        self.state.baseline = ClassBaseline::from_stats(stats);
    }

    /// Replaces the player, e.g. when a new run starts.
    ///
    /// Active temporary effects are reverted against the old caster first and
    /// the old caster's tasks are cancelled before the new caster's start.
    pub fn reset_player(&mut self, player: PlayerState) {
        let ids: Vec<RelicId> = self.relics.iter().map(|(id, _)| id).collect();
        for id in ids {
            self.end_effect(id);
        }
        self.scheduler.cancel_owner(TaskOwner::Caster);
        self.projectiles.clear();
        self.state = CombatState {
            now: self.state.now,
            ..CombatState::new(player)
        };
        self.start_regeneration();
    }

    pub fn snapshot(&self) -> CombatSnapshot {
        let player = &self.state.player;
        let caster = &player.caster;
        CombatSnapshot {
            now: self.state.now,
            wave: self.state.wave,
            health: player.health,
            mana: caster.mana(),
            spell_power: caster.power(),
            pending_bonus: caster.pending_bonus(),
            position: player.position,
            selected: caster.selected_index(),
            spells: caster
                .spells()
                .iter()
                .map(|spell| SpellSummary {
                    name: spell.name(),
                    rarity: spell.rarity(),
                    ready: spell.is_ready(self.state.now),
                    mana_cost: spell.stats().ok().map(|s| s.mana_cost),
                })
                .collect(),
            relics: self.relics.names(),
            live_projectiles: self.projectiles.len(),
        }
    }
}

#[cfg(test)]
mod tests;
