use arrayvec::ArrayVec;

use crate::config::CombatConfig;
use crate::events::{Channel, CombatEvent, EventBus, Listener, Subscription};
use crate::state::{RelicId, Team, Vec2};

/// The condition a relic reacts to.
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum TriggerKind {
    OnDamageTaken,
    /// Fires only for kills made by the player's team.
    OnKill,
    OnStandStill { duration_secs: f32 },
    OnSpellCast,
    OnWaveComplete,
}

impl TriggerKind {
    pub const DEFAULT_STAND_STILL_SECS: f32 = 3.0;

    /// Channels this trigger listens on.
    pub fn channels(&self) -> &'static [Channel] {
        match self {
            TriggerKind::OnDamageTaken => &[Channel::PlayerDamageTaken],
            TriggerKind::OnKill => &[Channel::EnemyKilled],
            TriggerKind::OnStandStill { .. } => &[Channel::PlayerStandStill, Channel::PlayerMove],
            TriggerKind::OnSpellCast => &[Channel::SpellCast],
            TriggerKind::OnWaveComplete => &[Channel::WaveComplete],
        }
    }

    pub fn is_stand_still(&self) -> bool {
        matches!(self, TriggerKind::OnStandStill { .. })
    }
}

/// What a trigger wants done in response to an event.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TriggerResponse {
    /// Execute the relic's effect.
    Fire,
    /// The player moved: end the relic's temporary effect.
    Reset,
    Ignore,
}

/// Displacement sampler behind the stand-still trigger.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct StandStillTracker {
    last_sample: Option<Vec2>,
    still_ms: u64,
}

impl StandStillTracker {
    /// Records a position sample taken `interval_ms` after the previous one.
    ///
    /// Returns how long the player has been still, in seconds, once that
    /// reaches `required_secs`; it keeps returning on every later still sample.
    pub fn sample(
        &mut self,
        position: Vec2,
        interval_ms: u64,
        tolerance: f32,
        required_secs: f32,
    ) -> Option<f32> {
        let moved = self
            .last_sample
            .is_none_or(|last| last.distance(position) >= tolerance);
        self.last_sample = Some(position);
        if moved {
            self.still_ms = 0;
            return None;
        }
        self.still_ms = self.still_ms.saturating_add(interval_ms);
        let still_secs = self.still_ms as f32 / 1_000.0;
        (still_secs >= required_secs).then_some(still_secs)
    }

    pub fn reset(&mut self) {
        self.still_ms = 0;
    }

    pub fn still_ms(&self) -> u64 {
        self.still_ms
    }
}

/// A trigger plus the bus subscriptions it holds while active.
#[derive(Debug)]
pub struct Trigger {
    kind: TriggerKind,
    subscriptions: ArrayVec<Subscription, { CombatConfig::MAX_TRIGGER_CHANNELS }>,
    tracker: StandStillTracker,
}

impl Trigger {
    pub fn new(kind: TriggerKind) -> Self {
        Self {
            kind,
            subscriptions: ArrayVec::new(),
            tracker: StandStillTracker::default(),
        }
    }

    pub fn kind(&self) -> TriggerKind {
        self.kind
    }

    pub fn is_active(&self) -> bool {
        !self.subscriptions.is_empty()
    }

    /// Subscribes on behalf of `relic`. Returns false if already active.
    pub fn activate(&mut self, relic: RelicId, bus: &mut EventBus) -> bool {
        if self.is_active() {
            return false;
        }
        for channel in self.kind.channels() {
            self.subscriptions
                .push(bus.subscribe(*channel, Listener::Trigger(relic)));
        }
        self.tracker = StandStillTracker::default();
        true
    }

    /// Releases every subscription. Returns false if already inactive.
    pub fn deactivate(&mut self, bus: &mut EventBus) -> bool {
        if !self.is_active() {
            return false;
        }
        for subscription in self.subscriptions.drain(..) {
            bus.unsubscribe(subscription);
        }
        true
    }

    /// Decides how to react to `event`.
    pub fn respond(&mut self, event: &CombatEvent) -> TriggerResponse {
        use TriggerResponse::{Fire, Ignore, Reset};

        match (self.kind, event) {
            (TriggerKind::OnDamageTaken, CombatEvent::PlayerDamageTaken { .. }) => Fire,
            (TriggerKind::OnKill, CombatEvent::EnemyKilled { killer, .. }) => {
                if *killer == Team::Player { Fire } else { Ignore }
            }
            (
                TriggerKind::OnStandStill { duration_secs },
                CombatEvent::PlayerStandStill {
                    duration_secs: still,
                },
            ) => {
                if *still >= duration_secs { Fire } else { Ignore }
            }
            (TriggerKind::OnStandStill { .. }, CombatEvent::PlayerMove { .. }) => {
                self.tracker.reset();
                Reset
            }
            (TriggerKind::OnSpellCast, CombatEvent::SpellCast { .. }) => Fire,
            (TriggerKind::OnWaveComplete, CombatEvent::WaveComplete { .. }) => Fire,
            _ => Ignore,
        }
    }

    /// Feeds a poll sample to the stand-still tracker.
    ///
    /// Returns the still duration to publish, if any. Other kinds never publish.
    pub fn poll(&mut self, position: Vec2, interval_ms: u64, tolerance: f32) -> Option<f32> {
        let TriggerKind::OnStandStill { duration_secs } = self.kind else {
            return None;
        };
        self.tracker
            .sample(position, interval_ms, tolerance, duration_secs)
    }

    pub fn tracker(&self) -> &StandStillTracker {
        &self.tracker
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::EntityId;

    #[test]
    fn deactivate_twice_is_deactivate_once() {
        let mut bus = EventBus::new();
        let mut trigger = Trigger::new(TriggerKind::OnStandStill { duration_secs: 3.0 });
        assert!(trigger.activate(RelicId(0), &mut bus));
        assert!(!trigger.activate(RelicId(0), &mut bus));
        assert_eq!(bus.len(), 2);

        assert!(trigger.deactivate(&mut bus));
        assert!(!trigger.deactivate(&mut bus));
        assert!(bus.is_empty());
    }

    #[test]
    fn kills_count_only_for_the_player_team() {
        let mut trigger = Trigger::new(TriggerKind::OnKill);
        let by_player = CombatEvent::EnemyKilled {
            killer: Team::Player,
            killed: EntityId(4),
        };
        let by_monster = CombatEvent::EnemyKilled {
            killer: Team::Monsters,
            killed: EntityId(4),
        };
        assert_eq!(trigger.respond(&by_player), TriggerResponse::Fire);
        assert_eq!(trigger.respond(&by_monster), TriggerResponse::Ignore);
    }

    #[test]
    fn stand_still_fires_once_duration_is_reached() {
        let mut trigger = Trigger::new(TriggerKind::OnStandStill { duration_secs: 0.3 });
        let here = Vec2::new(1.0, 1.0);
        // First sample only establishes the reference point.
        assert_eq!(trigger.poll(here, 100, 0.1), None);
        assert_eq!(trigger.poll(here, 100, 0.1), None);
        assert_eq!(trigger.poll(here, 100, 0.1), None);
        assert!(trigger.poll(here, 100, 0.1).is_some());
        assert!(trigger.poll(here, 100, 0.1).is_some());

        assert_eq!(trigger.poll(Vec2::new(2.0, 1.0), 100, 0.1), None);
        assert_eq!(trigger.tracker().still_ms(), 0);
    }

    #[test]
    fn player_move_resets_stand_still() {
        let mut trigger = Trigger::new(TriggerKind::OnStandStill { duration_secs: 3.0 });
        let moved = CombatEvent::PlayerMove {
            from: Vec2::ZERO,
            to: Vec2::new(1.0, 0.0),
        };
        assert_eq!(trigger.respond(&moved), TriggerResponse::Reset);
        let short = CombatEvent::PlayerStandStill { duration_secs: 1.0 };
        assert_eq!(trigger.respond(&short), TriggerResponse::Ignore);
    }
}
