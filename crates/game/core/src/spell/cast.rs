//! Cast planning: folds a spell's layers into a flat list of steps.
//!
//! Planning is pure. The engine executes the resulting [`CastPlan`] against a
//! battlefield, scheduling any deferred steps on its own clock.

use super::kind::SpellKind;
use super::layer::LayerBehavior;
use super::{Spell, SpellContext};
use crate::combat::{BurstSpec, Damage, HitMode, Trajectory};
use crate::formula::FormulaError;
use crate::state::{Tick, Vec2};
use crate::stats::ModifierSet;

/// Stats of one cast after every modifier has been folded in.
#[derive(Clone, Debug, PartialEq)]
pub struct ResolvedStats {
    pub damage: Damage,
    pub mana_cost: i32,
    pub cooldown_secs: f32,
    pub speed: f32,
    pub trajectory: Trajectory,
    /// The flattened set the values above were computed with.
    pub modifiers: ModifierSet,
}

/// One thing the engine has to do to carry out a cast.
#[derive(Clone, Debug, PartialEq)]
pub enum CastStep {
    /// A concrete cast happened; publish a spell-cast event.
    Announce,
    /// Launch a projectile from the caster's position.
    Launch {
        direction: Vec2,
        speed: f32,
        trajectory: Trajectory,
        sprite: u32,
        damage: Damage,
        mode: HitMode,
        lifetime_secs: Option<f32>,
    },
    /// Damage every hostile within `radius` of the caster and push it away.
    Nova {
        radius: f32,
        knockback: f32,
        damage: Damage,
    },
    /// Run `steps` after `delay_ms`.
    Defer { delay_ms: u64, steps: Vec<CastStep> },
}

/// Everything a successful cast produces.
#[derive(Clone, Debug, PartialEq)]
pub struct CastPlan {
    pub spell_name: String,
    pub stats: ResolvedStats,
    pub steps: Vec<CastStep>,
}

impl CastPlan {
    /// Concrete casts in this plan, deferred ones included.
    pub fn cast_count(&self) -> usize {
        fn count(steps: &[CastStep]) -> usize {
            steps
                .iter()
                .map(|step| match step {
                    CastStep::Announce => 1,
                    CastStep::Defer { steps, .. } => count(steps),
                    _ => 0,
                })
                .sum()
        }
        count(&self.steps)
    }
}

/// Kind formulas evaluated once per cast.
enum KindParams {
    Bolt,
    Blast(BurstSpec),
    Nova { radius: f32, knockback: f32 },
    Spray {
        count: u32,
        spread: f32,
        lifetime: f32,
    },
}

impl KindParams {
    fn resolve(
        kind: &SpellKind,
        context: SpellContext,
        power_bonus: i32,
        modifiers: &ModifierSet,
    ) -> Result<Self, FormulaError> {
        let ints = context.int_bindings(power_bonus);
        let floats = context.float_bindings(power_bonus);
        Ok(match kind {
            SpellKind::Bolt => KindParams::Bolt,
            SpellKind::Blast {
                count,
                secondary_damage,
                secondary_speed,
                secondary_lifetime,
                secondary_sprite,
            } => {
                let damage = modifiers.damage.apply_int(secondary_damage.eval_int(&ints)?);
                KindParams::Blast(BurstSpec {
                    count: count.eval_int(&ints)?.max(0) as u32,
                    damage: Damage::new(damage, Default::default()),
                    speed: secondary_speed.eval_float(&floats)?,
                    lifetime_secs: secondary_lifetime.eval_float(&floats)?,
                    sprite: *secondary_sprite,
                })
            }
            SpellKind::Nova { radius, knockback } => KindParams::Nova {
                radius: radius.eval_float(&floats)?,
                knockback: knockback.eval_float(&floats)?,
            },
            SpellKind::Spray {
                count,
                spread,
                lifetime,
            } => KindParams::Spray {
                count: count.eval_int(&ints)?.max(0) as u32,
                spread: spread.eval_float(&floats)?,
                lifetime: lifetime.eval_float(&floats)?,
            },
        })
    }
}

struct Planner<'a> {
    spell: &'a Spell,
    stats: &'a ResolvedStats,
    params: KindParams,
}

impl Planner<'_> {
    /// Steps for the spell with only the innermost `depth` layers applied.
    fn plan(&self, depth: usize, direction: Vec2) -> Vec<CastStep> {
        let Some(layer) = depth.checked_sub(1).and_then(|i| self.spell.layers.get(i)) else {
            return self.base_cast(direction);
        };
        let inner = depth - 1;
        match layer.behavior {
            LayerBehavior::Stat => self.plan(inner, direction),
            LayerBehavior::Repeat { delay_secs } => {
                let mut steps = self.plan(inner, direction);
                steps.push(CastStep::Defer {
                    delay_ms: Tick::millis_from_secs(delay_secs),
                    steps: self.plan(inner, direction),
                });
                steps
            }
            LayerBehavior::Split { angle_degrees } => {
                let half = angle_degrees.to_radians() / 2.0;
                let mut steps = self.plan(inner, rotate(direction, half));
                steps.extend(self.plan(inner, rotate(direction, -half)));
                steps
            }
            LayerBehavior::Pierce {
                max_hits,
                reduction,
            } => self.single_shot(direction, HitMode::Pierce {
                max_hits,
                reduction,
            }),
            LayerBehavior::Chain {
                max_chains,
                range,
                reduction,
            } => self.single_shot(direction, HitMode::Chain {
                max_chains,
                range,
                reduction,
            }),
        }
    }

    fn single_shot(&self, direction: Vec2, mode: HitMode) -> Vec<CastStep> {
        vec![CastStep::Announce, self.launch(direction, mode, None)]
    }

    fn launch(&self, direction: Vec2, mode: HitMode, lifetime_secs: Option<f32>) -> CastStep {
        CastStep::Launch {
            direction,
            speed: self.stats.speed,
            trajectory: self.stats.trajectory,
            sprite: self.spell.base.sprite,
            damage: self.stats.damage,
            mode,
            lifetime_secs,
        }
    }

    fn base_cast(&self, direction: Vec2) -> Vec<CastStep> {
        let mut steps = vec![CastStep::Announce];
        match &self.params {
            KindParams::Bolt => steps.push(self.launch(direction, HitMode::Direct, None)),
            KindParams::Blast(burst) => {
                let mut burst = *burst;
                burst.damage.kind = self.stats.damage.kind;
                steps.push(self.launch(direction, HitMode::Burst(burst), None));
            }
            KindParams::Nova { radius, knockback } => steps.push(CastStep::Nova {
                radius: *radius,
                knockback: *knockback,
                damage: self.stats.damage,
            }),
            KindParams::Spray {
                count,
                spread,
                lifetime,
            } => {
                for i in 0..*count {
                    let offset = spray_offset(i, *count, *spread);
                    steps.push(self.launch(
                        rotate(direction, offset),
                        HitMode::Direct,
                        Some(*lifetime),
                    ));
                }
            }
        }
        steps
    }
}

/// Angular offset of projectile `i` of `count` across `spread` radians.
fn spray_offset(i: u32, count: u32, spread: f32) -> f32 {
    if count <= 1 {
        return 0.0;
    }
    (i as f32 / (count - 1) as f32 - 0.5) * spread
}

fn rotate(direction: Vec2, radians: f32) -> Vec2 {
    let length = direction.length();
    let length = if length <= f32::EPSILON { 1.0 } else { length };
    Vec2::from_angle(direction.angle() + radians) * length
}

impl Spell {
    /// Plans a cast toward `target` from `origin`.
    ///
    /// Does not touch the cooldown; [`crate::caster::SpellCaster::cast`] does.
    pub fn plan_cast(
        &self,
        origin: Vec2,
        target: Vec2,
        external: &ModifierSet,
        power_bonus: i32,
    ) -> Result<CastPlan, FormulaError> {
        let stats = self.stats_with(external, power_bonus)?;
        let params = KindParams::resolve(&self.base.kind, self.context, power_bonus, &stats.modifiers)?;
        let direction = (target - origin).normalized();
        let steps = Planner {
            spell: self,
            stats: &stats,
            params,
        }
        .plan(self.layers.len(), direction);
        Ok(CastPlan {
            spell_name: self.name(),
            stats,
            steps,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::spell::{BaseSpell, ModifierKind};

    fn spell(kind: SpellKind) -> Spell {
        let mut spell = Spell::new(BaseSpell::new("Test", kind));
        spell.set_context(10, 1);
        spell
    }

    fn plan(spell: &Spell) -> CastPlan {
        spell
            .plan_cast(Vec2::ZERO, Vec2::new(10.0, 0.0), &ModifierSet::new(), 0)
            .unwrap()
    }

    fn launches(steps: &[CastStep]) -> Vec<(Vec2, HitMode, Option<f32>)> {
        steps
            .iter()
            .filter_map(|step| match step {
                CastStep::Launch {
                    direction,
                    mode,
                    lifetime_secs,
                    ..
                } => Some((*direction, *mode, *lifetime_secs)),
                _ => None,
            })
            .collect()
    }

    #[test]
    fn bolt_fires_one_direct_projectile() {
        let plan = plan(&spell(SpellKind::Bolt));
        assert_eq!(plan.cast_count(), 1);
        let shots = launches(&plan.steps);
        assert_eq!(shots.len(), 1);
        assert_eq!(shots[0].1, HitMode::Direct);
        assert!((shots[0].0.x - 1.0).abs() < 1e-6);
    }

    #[test]
    fn spray_fans_symmetrically() {
        let plan = plan(&spell(SpellKind::spray()));
        let shots = launches(&plan.steps);
        assert_eq!(shots.len(), 7);
        let angles: Vec<f32> = shots.iter().map(|(d, _, _)| d.angle()).collect();
        assert!((angles[0] + 0.15).abs() < 1e-5);
        assert!(angles[3].abs() < 1e-5);
        assert!((angles[6] - 0.15).abs() < 1e-5);
        assert!(shots.iter().all(|(_, _, life)| *life == Some(0.1)));
    }

    #[test]
    fn single_projectile_spray_has_no_offset() {
        assert_eq!(spray_offset(0, 1, 0.3), 0.0);
    }

    #[test]
    fn blast_secondaries_fold_damage_modifiers() {
        let blast = spell(SpellKind::blast()).wrapped(ModifierKind::DamageAmp.default_layer());
        let plan = plan(&blast);
        let shots = launches(&plan.steps);
        let HitMode::Burst(burst) = shots[0].1 else {
            panic!("expected a burst projectile, got {:?}", shots[0].1);
        };
        assert_eq!(burst.count, 8);
        // 5 * 1.5 = 7.5, rounded
        assert_eq!(burst.damage.amount, 8);
        assert_eq!(plan.stats.damage.amount, 15);
    }

    #[test]
    fn doubler_defers_a_second_cast() {
        let doubled = spell(SpellKind::Bolt).wrapped(ModifierKind::Doubler.default_layer());
        let plan = plan(&doubled);
        assert_eq!(plan.cast_count(), 2);
        let deferred = plan.steps.iter().find_map(|step| match step {
            CastStep::Defer { delay_ms, steps } => Some((*delay_ms, steps.len())),
            _ => None,
        });
        assert_eq!(deferred, Some((500, 2)));
    }

    #[test]
    fn splitter_rotates_both_ways() {
        let split = spell(SpellKind::Bolt).wrapped(ModifierKind::Splitter.default_layer());
        let shots = launches(&plan(&split).steps);
        let angles: Vec<f32> = shots.iter().map(|(d, _, _)| d.angle().to_degrees()).collect();
        assert_eq!(angles.len(), 2);
        assert!((angles[0] - 5.0).abs() < 1e-3);
        assert!((angles[1] + 5.0).abs() < 1e-3);
    }

    #[test]
    fn pierce_is_terminal_over_inner_layers() {
        let nested = spell(SpellKind::spray())
            .wrapped(ModifierKind::Splitter.default_layer())
            .wrapped(ModifierKind::Piercing.default_layer());
        let plan = plan(&nested);
        assert_eq!(plan.cast_count(), 1);
        let shots = launches(&plan.steps);
        assert_eq!(shots.len(), 1);
        assert!(matches!(shots[0].1, HitMode::Pierce { max_hits: 3, .. }));
    }

    #[test]
    fn split_around_doubler_casts_four_times() {
        let nested = spell(SpellKind::Bolt)
            .wrapped(ModifierKind::Doubler.default_layer())
            .wrapped(ModifierKind::Splitter.default_layer());
        assert_eq!(plan(&nested).cast_count(), 4);
    }

    #[test]
    fn nova_carries_radius_and_force() {
        let plan = plan(&spell(SpellKind::nova()));
        assert!(plan.steps.contains(&CastStep::Nova {
            radius: 5.0,
            knockback: 10.0,
            damage: Damage::new(10, Default::default()),
        }));
    }
}
