//! Event payloads published by the run session.

use serde::Serialize;

use game_core::SpawnPlan;

/// How a run ended.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RunOutcome {
    Victory,
    Defeat,
}

/// Wave lifecycle.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum WaveEvent {
    Started { wave: u32, spawns: Vec<SpawnPlan> },
    Cleared { wave: u32 },
    Finished { wave: u32, outcome: RunOutcome },
}

/// Rewards handed out between waves.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum RewardEvent {
    SpellGranted {
        spell: String,
        replaced: Option<String>,
    },
    RelicsOffered {
        wave: u32,
        relics: Vec<String>,
    },
    RelicChosen {
        relic: String,
    },
}
