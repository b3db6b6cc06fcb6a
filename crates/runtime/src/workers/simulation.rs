//! Simulation worker that owns the authoritative [`RunSession`].
//!
//! Receives commands from [`crate::RuntimeHandle`], applies them to the
//! session, and publishes whatever the session emitted to the [`EventBus`].

use std::time::Duration;

use tokio::sync::{mpsc, oneshot};
use tokio::time::{Interval, MissedTickBehavior};
use tracing::{debug, warn};

use game_core::{CastOutcome, Damage, EntityId, HitResolution, ProjectileId, RelicId, Vec2};

use crate::api::Result;
use crate::events::EventBus;
use crate::session::{RunSession, RunSnapshot, RunStatus};

/// Commands that can be sent to the simulation worker
pub enum Command {
    Cast {
        target: Vec2,
        reply: oneshot::Sender<Result<CastOutcome>>,
    },
    SelectSpell {
        index: usize,
        reply: oneshot::Sender<Result<()>>,
    },
    MovePlayer {
        to: Vec2,
        reply: oneshot::Sender<Result<()>>,
    },
    /// A collision detected by the client rather than the arena.
    ReportHit {
        projectile: ProjectileId,
        target: EntityId,
        impact: Vec2,
        reply: oneshot::Sender<Result<HitResolution>>,
    },
    DamagePlayer {
        damage: Damage,
        reply: oneshot::Sender<Result<i32>>,
    },
    Advance {
        dt_ms: u64,
        reply: oneshot::Sender<Result<()>>,
    },
    CompleteWave {
        reply: oneshot::Sender<Result<()>>,
    },
    NextWave {
        reply: oneshot::Sender<Result<u32>>,
    },
    ChooseRelic {
        name: String,
        reply: oneshot::Sender<Result<RelicId>>,
    },
    /// Query the current run (read-only).
    QuerySnapshot { reply: oneshot::Sender<RunSnapshot> },
}

/// Background task that processes gameplay commands.
pub struct SimulationWorker {
    session: RunSession,
    command_rx: mpsc::Receiver<Command>,
    event_bus: EventBus,
    tick_ms: Option<u64>,
}

impl SimulationWorker {
    pub fn new(
        session: RunSession,
        command_rx: mpsc::Receiver<Command>,
        event_bus: EventBus,
        tick_ms: Option<u64>,
    ) -> Self {
        let snapshot = session.snapshot();
        tracing::info!(
            class = %snapshot.class,
            level = %snapshot.level,
            tick_ms = ?tick_ms,
            "SimulationWorker initialized"
        );

        let mut worker = Self {
            session,
            command_rx,
            event_bus,
            tick_ms: tick_ms.filter(|&ms| ms > 0),
        };
        // Wave 1 was started while building the session.
        worker.publish_events();
        worker
    }

    /// Main worker loop. Ends when every handle has been dropped.
    pub async fn run(mut self) {
        let mut ticker = self.tick_ms.map(|ms| {
            let mut interval = tokio::time::interval(Duration::from_millis(ms));
            interval.set_missed_tick_behavior(MissedTickBehavior::Skip);
            interval
        });

        loop {
            tokio::select! {
                cmd = self.command_rx.recv() => match cmd {
                    Some(cmd) => self.handle_command(cmd),
                    None => break,
                },
                _ = next_tick(&mut ticker) => self.handle_tick(),
            }
        }
        debug!(target: "runtime::worker", "command channel closed, worker stopping");
    }

    fn handle_tick(&mut self) {
        let Some(dt_ms) = self.tick_ms else {
            return;
        };
        if matches!(self.session.status(), RunStatus::Over(_)) {
            return;
        }
        if let Err(error) = self.session.advance(dt_ms) {
            warn!(target: "runtime::worker", %error, "tick failed");
        }
        self.publish_events();
    }

    fn handle_command(&mut self, cmd: Command) {
        match cmd {
            Command::Cast { target, reply } => {
                let result = self.session.cast(target);
                self.respond("Cast", reply, result);
            }
            Command::SelectSpell { index, reply } => {
                let result = self.session.select_spell(index);
                self.respond("SelectSpell", reply, result);
            }
            Command::MovePlayer { to, reply } => {
                let result = self.session.move_player(to);
                self.respond("MovePlayer", reply, result);
            }
            Command::ReportHit {
                projectile,
                target,
                impact,
                reply,
            } => {
                let result = self.session.report_hit(projectile, target, impact);
                self.respond("ReportHit", reply, result);
            }
            Command::DamagePlayer { damage, reply } => {
                let result = self.session.damage_player(damage);
                self.respond("DamagePlayer", reply, result);
            }
            Command::Advance { dt_ms, reply } => {
                let result = self.session.advance(dt_ms);
                self.respond("Advance", reply, result);
            }
            Command::CompleteWave { reply } => {
                let result = self.session.complete_wave();
                self.respond("CompleteWave", reply, result);
            }
            Command::NextWave { reply } => {
                let result = self.session.next_wave();
                self.respond("NextWave", reply, result);
            }
            Command::ChooseRelic { name, reply } => {
                let result = self.session.choose_relic(&name);
                self.respond("ChooseRelic", reply, result);
            }
            Command::QuerySnapshot { reply } => {
                if reply.send(self.session.snapshot()).is_err() {
                    debug!(target: "runtime::worker", "QuerySnapshot reply channel closed (caller dropped)");
                }
            }
        }
    }

    /// Publishes pending events before replying, so subscribers see the
    /// consequences of a command no later than its caller.
    fn respond<T>(&mut self, command: &str, reply: oneshot::Sender<Result<T>>, result: Result<T>) {
        if let Err(error) = &result {
            debug!(target: "runtime::worker", command, %error, "command failed");
        }
        self.publish_events();
        if reply.send(result).is_err() {
            debug!(target: "runtime::worker", command, "reply channel closed (caller dropped)");
        }
    }

    fn publish_events(&mut self) {
        for event in self.session.drain_events() {
            self.event_bus.publish(event);
        }
    }
}

async fn next_tick(ticker: &mut Option<Interval>) {
    match ticker {
        Some(interval) => {
            interval.tick().await;
        }
        None => std::future::pending::<()>().await,
    }
}
