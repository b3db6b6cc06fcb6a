//! Cloneable façade for issuing commands to the runtime.
//!
//! [`RuntimeHandle`] hides channel plumbing and offers async helpers for
//! driving the run or streaming events from specific topics.
use std::collections::HashMap;

use tokio::sync::{broadcast, mpsc, oneshot};

use game_core::{CastOutcome, Damage, EntityId, HitResolution, ProjectileId, RelicId, Vec2};

use super::errors::{Result, RuntimeError};
use crate::events::{Event, EventBus, Topic};
use crate::session::RunSnapshot;
use crate::workers::Command;

/// Client-facing handle to interact with the runtime
#[derive(Clone)]
pub struct RuntimeHandle {
    command_tx: mpsc::Sender<Command>,
    event_bus: EventBus,
}

impl RuntimeHandle {
    pub(crate) fn new(command_tx: mpsc::Sender<Command>, event_bus: EventBus) -> Self {
        Self {
            command_tx,
            event_bus,
        }
    }

    async fn request<T>(
        &self,
        command: impl FnOnce(oneshot::Sender<Result<T>>) -> Command,
    ) -> Result<T> {
        let (reply_tx, reply_rx) = oneshot::channel();

        self.command_tx
            .send(command(reply_tx))
            .await
            .map_err(|_| RuntimeError::CommandChannelClosed)?;

        reply_rx.await.map_err(RuntimeError::ReplyChannelClosed)?
    }

    /// Cast the selected spell toward `target`.
    pub async fn cast(&self, target: Vec2) -> Result<CastOutcome> {
        self.request(|reply| Command::Cast { target, reply }).await
    }

    pub async fn select_spell(&self, index: usize) -> Result<()> {
        self.request(|reply| Command::SelectSpell { index, reply })
            .await
    }

    pub async fn move_player(&self, to: Vec2) -> Result<()> {
        self.request(|reply| Command::MovePlayer { to, reply }).await
    }

    /// Report a collision detected by the caller.
    pub async fn report_hit(
        &self,
        projectile: ProjectileId,
        target: EntityId,
        impact: Vec2,
    ) -> Result<HitResolution> {
        self.request(|reply| Command::ReportHit {
            projectile,
            target,
            impact,
            reply,
        })
        .await
    }

    /// Damage the player, returning the amount actually dealt.
    pub async fn damage_player(&self, damage: Damage) -> Result<i32> {
        self.request(|reply| Command::DamagePlayer { damage, reply })
            .await
    }

    /// Advance the simulation clock by `dt_ms` milliseconds.
    pub async fn advance(&self, dt_ms: u64) -> Result<()> {
        self.request(|reply| Command::Advance { dt_ms, reply }).await
    }

    /// End the current wave right away.
    pub async fn complete_wave(&self) -> Result<()> {
        self.request(|reply| Command::CompleteWave { reply }).await
    }

    /// Start the next wave, returning its number.
    pub async fn next_wave(&self) -> Result<u32> {
        self.request(|reply| Command::NextWave { reply }).await
    }

    pub async fn choose_relic(&self, name: impl Into<String>) -> Result<RelicId> {
        let name = name.into();
        self.request(|reply| Command::ChooseRelic { name, reply })
            .await
    }

    /// Subscribe to events from a specific topic
    ///
    /// # Topics
    ///
    /// - `Topic::Combat` - casts, hits, kills and relic triggers
    /// - `Topic::Wave` - wave starts, clears and the end of the run
    /// - `Topic::Reward` - spells granted and relic offers
    pub fn subscribe(&self, topic: Topic) -> broadcast::Receiver<Event> {
        self.event_bus.subscribe(topic)
    }

    /// Subscribe to multiple topics at once
    pub fn subscribe_multiple(&self, topics: &[Topic]) -> HashMap<Topic, broadcast::Receiver<Event>> {
        self.event_bus.subscribe_multiple(topics)
    }

    /// Query the current run (read-only snapshot)
    pub async fn query_snapshot(&self) -> Result<RunSnapshot> {
        let (reply_tx, reply_rx) = oneshot::channel();

        self.command_tx
            .send(Command::QuerySnapshot { reply: reply_tx })
            .await
            .map_err(|_| RuntimeError::CommandChannelClosed)?;

        reply_rx.await.map_err(RuntimeError::ReplyChannelClosed)
    }

    pub fn event_bus(&self) -> &EventBus {
        &self.event_bus
    }
}
