//! A minimal 2D battlefield for headless runs.
//!
//! The arena moves projectiles and enemies in straight lines, detects
//! overlaps, and reports them as [`ArenaEvent`]s. The session feeds those
//! back into the combat engine, which decides what they mean.

use std::collections::BTreeMap;
use std::f32::consts::TAU;

use rand::Rng;
use rand::rngs::StdRng;

use game_core::{
    Battlefield, Damage, DamageReport, EntityId, ProjectileId, ProjectileLaunch, SpawnLocation,
    SpawnPlan, Team, Trajectory, Vec2,
};

/// Something the arena noticed while stepping.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum ArenaEvent {
    /// A projectile overlaps a combatant of the opposing team.
    Collision {
        projectile: ProjectileId,
        target: EntityId,
        impact: Vec2,
    },
    /// A projectile outlived its lifetime or left the arena.
    Expired(ProjectileId),
    /// An enemy touching the player is ready to strike.
    Contact { enemy: EntityId, damage: i32 },
}

/// A live enemy.
#[derive(Clone, Debug, PartialEq)]
pub struct Enemy {
    pub id: EntityId,
    pub name: String,
    pub sprite: u32,
    pub position: Vec2,
    pub hp: i32,
    pub max_hp: i32,
    pub speed: f32,
    pub damage: i32,
    attack_ready_in_ms: u64,
}

#[derive(Clone, Copy, Debug)]
struct Flight {
    team: Team,
    position: Vec2,
    direction: Vec2,
    speed: f32,
    trajectory: Trajectory,
    age_secs: f32,
    lifetime_secs: Option<f32>,
}

#[derive(Debug)]
pub struct Arena {
    player: Vec2,
    enemies: BTreeMap<EntityId, Enemy>,
    flights: BTreeMap<ProjectileId, Flight>,
    next_enemy: u32,
    rng: StdRng,
}

impl Arena {
    /// Distance at which a projectile touches a combatant.
    pub const HIT_RADIUS: f32 = 0.75;
    /// Distance at which an enemy can strike the player.
    pub const CONTACT_RADIUS: f32 = 1.0;
    /// Milliseconds between two strikes of the same enemy.
    pub const ATTACK_INTERVAL_MS: u64 = 1_000;
    /// Distance from the player at which enemies appear.
    pub const SPAWN_RADIUS: f32 = 15.0;
    /// Projectiles farther than this from the player are dropped.
    pub const EXTENT: f32 = 60.0;
    /// Radians per second a spiraling projectile turns.
    const SPIRAL_RATE: f32 = 6.0;
    /// Radians per second a homing projectile can turn.
    const HOMING_RATE: f32 = 4.0;

    pub fn new(rng: StdRng) -> Self {
        Self {
            player: Vec2::ZERO,
            enemies: BTreeMap::new(),
            flights: BTreeMap::new(),
            next_enemy: 1,
            rng,
        }
    }

    pub fn player_position(&self) -> Vec2 {
        self.player
    }

    pub fn set_player_position(&mut self, position: Vec2) {
        self.player = position;
    }

    pub fn enemies(&self) -> impl Iterator<Item = &Enemy> {
        self.enemies.values()
    }

    pub fn enemy(&self, id: EntityId) -> Option<&Enemy> {
        self.enemies.get(&id)
    }

    pub fn living_enemies(&self) -> usize {
        self.enemies.len()
    }

    pub fn projectiles_in_flight(&self) -> usize {
        self.flights.len()
    }

    /// The enemy closest to `from`.
    pub fn nearest_enemy(&self, from: Vec2) -> Option<&Enemy> {
        self.enemies
            .values()
            .min_by(|a, b| from.distance(a.position).total_cmp(&from.distance(b.position)))
    }

    /// Spawns `count` enemies described by `plan`.
    pub fn spawn(&mut self, plan: &SpawnPlan, count: u32) -> Vec<EntityId> {
        (0..count)
            .map(|_| {
                let id = EntityId(self.next_enemy);
                self.next_enemy += 1;
                let angle = self.spawn_angle(&plan.location);
                let position = self.player + Vec2::from_angle(angle) * Self::SPAWN_RADIUS;
                self.enemies.insert(
                    id,
                    Enemy {
                        id,
                        name: plan.enemy.clone(),
                        sprite: plan.sprite,
                        position,
                        hp: plan.hp.max(1),
                        max_hp: plan.hp.max(1),
                        speed: plan.speed.max(0) as f32,
                        damage: plan.damage.max(0),
                        attack_ready_in_ms: 0,
                    },
                );
                id
            })
            .collect()
    }

    /// Spawn points are arranged in three named arcs around the player.
    fn spawn_angle(&mut self, location: &SpawnLocation) -> f32 {
        let third = TAU / 3.0;
        let arc = match location {
            SpawnLocation::RandomOf(kind) => match kind.as_str() {
                "RED" => Some(0.0),
                "GREEN" => Some(third),
                "BLUE" => Some(2.0 * third),
                _ => None,
            },
            SpawnLocation::Random => None,
        };
        match arc {
            Some(start) => start + self.rng.gen_range(0.0..third),
            None => self.rng.gen_range(0.0..TAU),
        }
    }

    /// Removes every enemy and projectile.
    pub fn clear(&mut self) {
        self.enemies.clear();
        self.flights.clear();
    }

    /// Moves everything by `dt_ms` and reports what happened.
    pub fn step(&mut self, dt_ms: u64) -> Vec<ArenaEvent> {
        let dt = dt_ms as f32 / 1_000.0;
        let mut events = Vec::new();

        let ids: Vec<ProjectileId> = self.flights.keys().copied().collect();
        for id in ids {
            let homing_target = self.flights.get(&id).and_then(|flight| {
                (flight.trajectory == Trajectory::Homing)
                    .then(|| self.nearest_hostile(flight.team, flight.position))
                    .flatten()
            });
            let Some(flight) = self.flights.get_mut(&id) else {
                continue;
            };
            steer(flight, homing_target, dt);
            flight.position = flight.position + flight.direction * (flight.speed * dt);
            flight.age_secs += dt;

            let expired = flight.lifetime_secs.is_some_and(|life| flight.age_secs >= life)
                || flight.position.distance(self.player) > Self::EXTENT;
            if expired {
                self.flights.remove(&id);
                events.push(ArenaEvent::Expired(id));
                continue;
            }

            let (team, position) = (flight.team, flight.position);
            for target in self.targets_within(position, Self::HIT_RADIUS) {
                if self.team_of(target).is_some_and(|other| team.opposes(other)) {
                    events.push(ArenaEvent::Collision {
                        projectile: id,
                        target,
                        impact: position,
                    });
                }
            }
        }

        let player = self.player;
        for enemy in self.enemies.values_mut() {
            let offset = player - enemy.position;
            let distance = offset.length();
            if distance > Self::CONTACT_RADIUS {
                let travel = (enemy.speed * dt).min(distance - Self::CONTACT_RADIUS);
                enemy.position = enemy.position + offset.normalized() * travel;
            }
            enemy.attack_ready_in_ms = enemy.attack_ready_in_ms.saturating_sub(dt_ms);
            if enemy.position.distance(player) <= Self::CONTACT_RADIUS + 1e-3
                && enemy.attack_ready_in_ms == 0
            {
                enemy.attack_ready_in_ms = Self::ATTACK_INTERVAL_MS;
                events.push(ArenaEvent::Contact {
                    enemy: enemy.id,
                    damage: enemy.damage,
                });
            }
        }
        events
    }

    fn nearest_hostile(&self, team: Team, from: Vec2) -> Option<Vec2> {
        match team {
            Team::Player => self.nearest_enemy(from).map(|enemy| enemy.position),
            Team::Monsters => Some(self.player),
        }
    }
}

fn steer(flight: &mut Flight, target: Option<Vec2>, dt: f32) {
    match flight.trajectory {
        Trajectory::Straight => {}
        Trajectory::Spiraling => {
            let angle = flight.direction.angle() + Arena::SPIRAL_RATE * dt;
            flight.direction = Vec2::from_angle(angle);
        }
        Trajectory::Homing => {
            let Some(target) = target else { return };
            let wanted = (target - flight.position).angle();
            let current = flight.direction.angle();
            let mut turn = (wanted - current).rem_euclid(TAU);
            if turn > TAU / 2.0 {
                turn -= TAU;
            }
            let max_turn = Arena::HOMING_RATE * dt;
            flight.direction = Vec2::from_angle(current + turn.clamp(-max_turn, max_turn));
        }
    }
}

impl Battlefield for Arena {
    fn team_of(&self, target: EntityId) -> Option<Team> {
        if target == EntityId::PLAYER {
            Some(Team::Player)
        } else {
            self.enemies.get(&target).map(|_| Team::Monsters)
        }
    }

    fn position_of(&self, target: EntityId) -> Option<Vec2> {
        if target == EntityId::PLAYER {
            Some(self.player)
        } else {
            self.enemies.get(&target).map(|enemy| enemy.position)
        }
    }

    fn targets_within(&self, center: Vec2, radius: f32) -> Vec<EntityId> {
        let mut targets: Vec<EntityId> = self
            .enemies
            .values()
            .filter(|enemy| center.distance(enemy.position) <= radius)
            .map(|enemy| enemy.id)
            .collect();
        if center.distance(self.player) <= radius {
            targets.push(EntityId::PLAYER);
        }
        targets
    }

    /// Player health lives in the engine; only enemies are damaged here.
    fn apply_damage(&mut self, target: EntityId, damage: Damage) -> DamageReport {
        let Some(enemy) = self.enemies.get_mut(&target) else {
            return DamageReport::default();
        };
        let dealt = damage.amount.clamp(0, enemy.hp);
        enemy.hp -= dealt;
        let killed = enemy.hp == 0;
        if killed {
            self.enemies.remove(&target);
        }
        DamageReport { dealt, killed }
    }

    fn apply_knockback(&mut self, target: EntityId, impulse: Vec2) {
        if let Some(enemy) = self.enemies.get_mut(&target) {
            enemy.position = enemy.position + impulse;
        }
    }

    fn launch(&mut self, projectile: ProjectileLaunch) {
        self.flights.insert(
            projectile.id,
            Flight {
                team: projectile.team,
                position: projectile.origin,
                direction: projectile.direction,
                speed: projectile.speed,
                trajectory: projectile.trajectory,
                age_secs: 0.0,
                lifetime_secs: projectile.lifetime_secs,
            },
        );
    }

    fn despawn(&mut self, projectile: ProjectileId) {
        self.flights.remove(&projectile);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use game_core::DamageKind;
    use rand::SeedableRng;

    fn plan(hp: i32, speed: i32) -> SpawnPlan {
        SpawnPlan {
            enemy: "zombie".into(),
            sprite: 0,
            hp,
            speed,
            damage: 5,
            delay_secs: 2.0,
            groups: vec![1],
            location: SpawnLocation::RandomOf("RED".into()),
        }
    }

    fn arena() -> Arena {
        Arena::new(StdRng::seed_from_u64(1))
    }

    #[test]
    fn enemies_spawn_on_their_arc_and_walk_to_the_player() {
        let mut arena = arena();
        let id = arena.spawn(&plan(20, 10), 1)[0];
        let start = arena.enemy(id).unwrap().position;
        assert!((start.length() - Arena::SPAWN_RADIUS).abs() < 1e-3);
        assert!((0.0..TAU / 3.0).contains(&start.angle().rem_euclid(TAU)));

        let mut contacts = 0;
        for _ in 0..30 {
            contacts += arena
                .step(100)
                .iter()
                .filter(|e| matches!(e, ArenaEvent::Contact { damage: 5, .. }))
                .count();
        }
        // 14 units at 10/s, then one strike per second.
        assert_eq!(contacts, 2);
    }

    #[test]
    fn projectiles_collide_with_enemies_and_expire() {
        let mut arena = arena();
        let id = arena.spawn(&plan(20, 0), 1)[0];
        let target = arena.enemy(id).unwrap().position;
        let launch = |id, lifetime| ProjectileLaunch {
            id: ProjectileId(id),
            team: Team::Player,
            origin: Vec2::ZERO,
            direction: target.normalized(),
            speed: 30.0,
            trajectory: Trajectory::Straight,
            sprite: 0,
            lifetime_secs: lifetime,
        };
        arena.launch(launch(1, None));
        arena.launch(launch(2, Some(0.1)));

        let events: Vec<ArenaEvent> = (0..6).flat_map(|_| arena.step(100)).collect();
        assert!(events.contains(&ArenaEvent::Expired(ProjectileId(2))));
        assert!(events.iter().any(|e| matches!(
            e,
            ArenaEvent::Collision { projectile: ProjectileId(1), target, .. } if *target == id
        )));
    }

    #[test]
    fn lethal_damage_removes_the_enemy() {
        let mut arena = arena();
        let id = arena.spawn(&plan(20, 0), 1)[0];
        let report = arena.apply_damage(id, Damage::new(50, DamageKind::Arcane));
        assert_eq!(report, DamageReport { dealt: 20, killed: true });
        assert_eq!(arena.team_of(id), None);
        assert_eq!(arena.living_enemies(), 0);
    }
}
