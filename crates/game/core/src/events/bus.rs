use std::collections::HashMap;

use super::Channel;
use crate::state::RelicId;

/// Who to notify when an event arrives.
///
/// Listeners are data; the engine routes them to the owning relic.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Listener {
    /// The relic's trigger.
    Trigger(RelicId),
    /// The end condition of the relic's temporary effect.
    EffectEnd(RelicId),
}

/// Identifier of one subscription on the bus.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct SubscriptionId(u64);

/// Handle returned by [`EventBus::subscribe`].
///
/// Not `Clone`: releasing consumes it, so a subscription cannot be released twice.
#[must_use = "dropping a subscription handle leaks the listener on the bus"]
#[derive(Debug, PartialEq, Eq)]
pub struct Subscription {
    id: SubscriptionId,
    channel: Channel,
}

impl Subscription {
    pub fn id(&self) -> SubscriptionId {
        self.id
    }

    pub fn channel(&self) -> Channel {
        self.channel
    }
}

/// Synchronous publish/subscribe hub keyed by [`Channel`].
#[derive(Debug, Default)]
pub struct EventBus {
    next_id: u64,
    channels: HashMap<Channel, Vec<(SubscriptionId, Listener)>>,
}

impl EventBus {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn subscribe(&mut self, channel: Channel, listener: Listener) -> Subscription {
        let id = SubscriptionId(self.next_id);
        self.next_id += 1;
        self.channels.entry(channel).or_default().push((id, listener));
        Subscription { id, channel }
    }

    /// Releases `subscription`. Returns false if the bus no longer knew it.
    pub fn unsubscribe(&mut self, subscription: Subscription) -> bool {
        let Some(listeners) = self.channels.get_mut(&subscription.channel) else {
            return false;
        };
        let before = listeners.len();
        listeners.retain(|(id, _)| *id != subscription.id);
        before != listeners.len()
    }

    pub fn is_subscribed(&self, channel: Channel, id: SubscriptionId) -> bool {
        self.channels
            .get(&channel)
            .is_some_and(|listeners| listeners.iter().any(|(sid, _)| *sid == id))
    }

    /// Copy of the listener list for `channel`, in subscription order.
    ///
    /// Dispatch iterates this copy and re-checks [`EventBus::is_subscribed`]
    /// before each call, so listeners may come and go mid-dispatch.
    pub fn snapshot(&self, channel: Channel) -> Vec<(SubscriptionId, Listener)> {
        self.channels.get(&channel).cloned().unwrap_or_default()
    }

    pub fn listener_count(&self, channel: Channel) -> usize {
        self.channels.get(&channel).map_or(0, Vec::len)
    }

    /// Total live subscriptions across every channel.
    pub fn len(&self) -> usize {
        self.channels.values().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
