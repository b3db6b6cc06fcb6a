//! Projectile bookkeeping and per-hit resolution.
//!
//! A projectile is launched with a [`HitMode`] that decides what happens when
//! the battlefield reports a collision. Pierce and chain hit sets live on the
//! projectile itself, so they only ever span a single cast.

use std::collections::{BTreeMap, BTreeSet};

use super::battlefield::Battlefield;
use super::damage::Damage;
use crate::state::{EntityId, ProjectileId, Team, Vec2};

/// Flight path requested from the battlefield.
#[derive(
    Clone, Copy, Debug, Default, PartialEq, Eq, Hash, strum::Display, strum::EnumString,
)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum Trajectory {
    #[default]
    Straight,
    Homing,
    Spiraling,
}

/// Secondary burst released by a blast projectile on impact.
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct BurstSpec {
    pub count: u32,
    pub damage: Damage,
    pub speed: f32,
    pub lifetime_secs: f32,
    pub sprite: u32,
}

/// What a projectile does when it touches a combatant.
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum HitMode {
    /// Damage the first enemy touched, then disappear.
    Direct,
    /// Damage the first enemy touched and release a radial burst.
    Burst(BurstSpec),
    /// Pass through up to `max_hits` distinct enemies, decaying per hit.
    Pierce { max_hits: u32, reduction: f32 },
    /// Jump from the first enemy to the nearest un-hit enemies in range.
    Chain {
        max_chains: u32,
        range: f32,
        reduction: f32,
    },
}

/// Launch request handed to the battlefield.
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ProjectileLaunch {
    pub id: ProjectileId,
    pub team: Team,
    pub origin: Vec2,
    /// Unit direction of travel.
    pub direction: Vec2,
    pub speed: f32,
    pub trajectory: Trajectory,
    pub sprite: u32,
    /// Seconds before the projectile expires on its own; `None` lives until it hits.
    pub lifetime_secs: Option<f32>,
}

/// Damage to apply to one target as a consequence of a hit.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Strike {
    pub target: EntityId,
    pub damage: Damage,
    pub position: Vec2,
}

/// Everything a single collision produced.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct HitResolution {
    pub strikes: Vec<Strike>,
    /// Burst released at the impact point, if any.
    pub burst: Option<(Vec2, BurstSpec)>,
    /// Whether the projectile is spent.
    pub spent: bool,
}

impl HitResolution {
    fn ignored() -> Self {
        Self::default()
    }
}

/// A projectile the engine is tracking between launch and despawn.
#[derive(Clone, Debug, PartialEq)]
pub struct ActiveProjectile {
    pub team: Team,
    pub damage: Damage,
    pub mode: HitMode,
    hits: BTreeSet<EntityId>,
}

impl ActiveProjectile {
    pub fn new(team: Team, damage: Damage, mode: HitMode) -> Self {
        Self {
            team,
            damage,
            mode,
            hits: BTreeSet::new(),
        }
    }

    /// Targets already damaged by this projectile.
    pub fn hits(&self) -> &BTreeSet<EntityId> {
        &self.hits
    }

    /// Resolves a collision with `target` at `impact`.
    ///
    /// Friendly or already-hit targets are ignored and leave the projectile in flight.
    pub fn on_hit(
        &mut self,
        target: EntityId,
        impact: Vec2,
        field: &(impl Battlefield + ?Sized),
    ) -> HitResolution {
        let hostile = field
            .team_of(target)
            .is_some_and(|team| self.team.opposes(team));
        if !hostile || self.hits.contains(&target) {
            return HitResolution::ignored();
        }

        let position = field.position_of(target).unwrap_or(impact);
        self.hits.insert(target);
        let first = Strike {
            target,
            damage: self.damage,
            position,
        };

        match self.mode {
            HitMode::Direct => HitResolution {
                strikes: vec![first],
                burst: None,
                spent: true,
            },
            HitMode::Burst(spec) => HitResolution {
                strikes: vec![first],
                burst: Some((impact, spec)),
                spent: true,
            },
            HitMode::Pierce {
                max_hits,
                reduction,
            } => {
                self.damage = self.damage.decayed(reduction);
                HitResolution {
                    strikes: vec![first],
                    burst: None,
                    spent: self.hits.len() >= max_hits as usize,
                }
            }
            HitMode::Chain {
                max_chains,
                range,
                reduction,
            } => {
                let mut strikes = vec![first];
                let mut from = position;
                let mut damage = self.damage;
                for _ in 0..max_chains {
                    let Some((next, next_pos)) = self.nearest_unhit(from, range, field) else {
                        break;
                    };
                    damage = damage.decayed(reduction);
                    self.hits.insert(next);
                    strikes.push(Strike {
                        target: next,
                        damage,
                        position: next_pos,
                    });
                    from = next_pos;
                }
                HitResolution {
                    strikes,
                    burst: None,
                    spent: true,
                }
            }
        }
    }

    fn nearest_unhit(
        &self,
        from: Vec2,
        range: f32,
        field: &(impl Battlefield + ?Sized),
    ) -> Option<(EntityId, Vec2)> {
        field
            .targets_within(from, range)
            .into_iter()
            .filter(|id| !self.hits.contains(id))
            .filter(|id| field.team_of(*id).is_some_and(|t| self.team.opposes(t)))
            .filter_map(|id| field.position_of(id).map(|pos| (id, pos)))
            .min_by(|(a_id, a), (b_id, b)| {
                from.distance(*a)
                    .total_cmp(&from.distance(*b))
                    .then(a_id.cmp(b_id))
            })
    }
}

/// Live projectiles keyed by id, with id allocation.
#[derive(Clone, Debug, Default)]
pub struct ProjectileTracker {
    next_id: u64,
    live: BTreeMap<ProjectileId, ActiveProjectile>,
}

impl ProjectileTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers `projectile` and returns its freshly allocated id.
    pub fn track(&mut self, projectile: ActiveProjectile) -> ProjectileId {
        let id = ProjectileId(self.next_id);
        self.next_id += 1;
        self.live.insert(id, projectile);
        id
    }

    pub fn get_mut(&mut self, id: ProjectileId) -> Option<&mut ActiveProjectile> {
        self.live.get_mut(&id)
    }

    pub fn release(&mut self, id: ProjectileId) -> Option<ActiveProjectile> {
        self.live.remove(&id)
    }

    pub fn len(&self) -> usize {
        self.live.len()
    }

    pub fn is_empty(&self) -> bool {
        self.live.is_empty()
    }

    pub fn clear(&mut self) {
        self.live.clear();
    }
}
