//! Worker tasks that back the runtime orchestration.
//!
//! The simulation worker owns the run session and executes player commands
//! one at a time, optionally advancing the clock on a fixed tick.

mod simulation;

pub use simulation::{Command, SimulationWorker};
