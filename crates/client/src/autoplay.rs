//! A simple autopilot that plays a run through [`RuntimeHandle`].
//!
//! Each step it aims the selected spell at the nearest enemy, then lets the
//! clock run. Between waves it takes the first relic on offer and moves on.

use std::time::Duration;

use tokio::sync::broadcast::error::RecvError;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use game_core::{CastOutcome, Vec2};
use runtime::{Event, Result, RunSnapshot, RunStatus, RuntimeHandle, Topic};

use crate::config::ClientConfig;

pub struct Autopilot {
    handle: RuntimeHandle,
    config: ClientConfig,
}

impl Autopilot {
    pub fn new(handle: RuntimeHandle, config: ClientConfig) -> Self {
        Self { handle, config }
    }

    /// Plays until the run ends or a configured limit is reached, returning
    /// the last snapshot.
    pub async fn run(&self) -> Result<RunSnapshot> {
        let mut elapsed_ms = 0u64;
        loop {
            let snapshot = self.handle.query_snapshot().await?;
            match snapshot.status {
                RunStatus::Over(outcome) => {
                    info!(?outcome, wave = snapshot.combat.wave, "run over");
                    return Ok(snapshot);
                }
                RunStatus::BetweenWaves => {
                    if let Some(relic) = snapshot.relic_offer.first() {
                        self.handle.choose_relic(relic.clone()).await?;
                    }
                    if self
                        .config
                        .max_waves
                        .is_some_and(|limit| snapshot.combat.wave >= limit)
                    {
                        info!(wave = snapshot.combat.wave, "wave limit reached");
                        return self.handle.query_snapshot().await;
                    }
                    self.handle.next_wave().await?;
                }
                RunStatus::InWave => {
                    if elapsed_ms >= self.config.max_secs.saturating_mul(1_000) {
                        warn!(elapsed_ms, "time limit reached");
                        return Ok(snapshot);
                    }
                    if let Some(target) = nearest_enemy(&snapshot) {
                        let outcome = self.handle.cast(target).await?;
                        if let CastOutcome::Rejected(reason) = outcome {
                            debug!(?reason, "holding fire");
                        }
                    }
                    self.wait().await?;
                    elapsed_ms += self.config.step_ms;
                }
            }
        }
    }

    async fn wait(&self) -> Result<()> {
        match self.config.tick_ms {
            Some(_) => {
                tokio::time::sleep(Duration::from_millis(self.config.step_ms)).await;
                Ok(())
            }
            None => self.handle.advance(self.config.step_ms).await,
        }
    }
}

fn nearest_enemy(snapshot: &RunSnapshot) -> Option<Vec2> {
    let from = snapshot.combat.position;
    snapshot
        .enemies
        .iter()
        .map(|enemy| enemy.position)
        .min_by(|a, b| from.distance(*a).total_cmp(&from.distance(*b)))
}

/// Logs every wave and reward event, and combat events at debug level.
pub fn spawn_event_logger(handle: &RuntimeHandle) -> Vec<JoinHandle<()>> {
    handle
        .subscribe_multiple(&[Topic::Combat, Topic::Wave, Topic::Reward])
        .into_iter()
        .map(|(topic, mut rx)| {
            tokio::spawn(async move {
                loop {
                    match rx.recv().await {
                        Ok(Event::Combat(event)) => debug!(target: "spellwave::combat", ?event),
                        Ok(event) => info!(target: "spellwave::events", %topic, ?event),
                        Err(RecvError::Lagged(skipped)) => {
                            warn!(%topic, skipped, "event logger lagged");
                        }
                        Err(RecvError::Closed) => break,
                    }
                }
            })
        })
        .collect()
}
