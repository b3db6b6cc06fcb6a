//! Unified error types surfaced by the runtime API.
//!
//! Wraps failures from worker coordination and the combat engine so clients
//! can bubble them up with consistent context.
use thiserror::Error;
use tokio::sync::oneshot;

use game_core::{CombatError, FormulaError};

pub type Result<T> = std::result::Result<T, RuntimeError>;

#[derive(Debug, Error)]
pub enum RuntimeError {
    #[error("simulation worker command channel closed")]
    CommandChannelClosed,

    #[error("simulation worker reply channel closed")]
    ReplyChannelClosed(#[source] oneshot::error::RecvError),

    #[error("simulation worker join failed")]
    WorkerJoin(#[source] tokio::task::JoinError),

    #[error("runtime requires content to be configured before building")]
    MissingContent,

    #[error("level `{0}` is not defined")]
    UnknownLevel(String),

    #[error("enemy `{0}` is not defined")]
    UnknownEnemy(String),

    #[error("no relic offer is pending")]
    NoRelicOffer,

    #[error("relic `{0}` is not part of the current offer")]
    UnknownRelicChoice(String),

    #[error("the wave is still in progress")]
    WaveInProgress,

    #[error("the run is over")]
    RunOver,

    #[error(transparent)]
    Combat(#[from] CombatError),

    #[error(transparent)]
    Formula(#[from] FormulaError),
}
