//! Gameplay events and the synchronous bus relics listen on.
mod bus;

pub use bus::{EventBus, Listener, Subscription, SubscriptionId};

use crate::combat::DamageKind;
use crate::state::{EntityId, Team, Vec2};

/// Named channel an event is published on.
#[derive(
    Clone,
    Copy,
    Debug,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    strum::Display,
    strum::EnumIter,
    strum::AsRefStr,
)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[strum(serialize_all = "kebab-case")]
pub enum Channel {
    Damage,
    PlayerDamageTaken,
    EnemyKilled,
    SpellCast,
    PlayerMove,
    PlayerStandStill,
    WaveComplete,
    WaveStart,
}

/// Something that happened during combat.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(tag = "type", rename_all = "snake_case"))]
pub enum CombatEvent {
    /// Any combatant lost health.
    Damage {
        target: EntityId,
        amount: i32,
        kind: DamageKind,
    },
    PlayerDamageTaken { amount: i32 },
    EnemyKilled { killer: Team, killed: EntityId },
    SpellCast { spell: String },
    PlayerMove { from: Vec2, to: Vec2 },
    /// The player has not moved for `duration_secs`.
    PlayerStandStill { duration_secs: f32 },
    WaveComplete { wave: u32 },
    WaveStart { wave: u32 },
}

impl CombatEvent {
    pub fn channel(&self) -> Channel {
        match self {
            CombatEvent::Damage { .. } => Channel::Damage,
            CombatEvent::PlayerDamageTaken { .. } => Channel::PlayerDamageTaken,
            CombatEvent::EnemyKilled { .. } => Channel::EnemyKilled,
            CombatEvent::SpellCast { .. } => Channel::SpellCast,
            CombatEvent::PlayerMove { .. } => Channel::PlayerMove,
            CombatEvent::PlayerStandStill { .. } => Channel::PlayerStandStill,
            CombatEvent::WaveComplete { .. } => Channel::WaveComplete,
            CombatEvent::WaveStart { .. } => Channel::WaveStart,
        }
    }
}
