//! Client configuration read from the process environment.
use std::env;
use std::path::PathBuf;

/// Everything the client needs to start and drive a run.
#[derive(Clone, Debug, PartialEq)]
pub struct ClientConfig {
    pub data_dir: PathBuf,
    pub class: String,
    pub level: String,
    pub seed: u64,
    /// Let the runtime tick on its own clock instead of advancing it by hand.
    pub tick_ms: Option<u64>,
    /// Simulated milliseconds between two autopilot decisions.
    pub step_ms: u64,
    /// Stop after this many cleared waves.
    pub max_waves: Option<u32>,
    /// Stop after this much simulated time.
    pub max_secs: u64,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from("data"),
            class: "mage".to_owned(),
            level: "Easy".to_owned(),
            seed: 0,
            tick_ms: None,
            step_ms: 100,
            max_waves: None,
            max_secs: 3_600,
        }
    }
}

impl ClientConfig {
    /// Construct configuration from process environment variables.
    ///
    /// Environment variables:
    /// - `SPELLWAVE_DATA_DIR` - Content directory (default: `data`)
    /// - `SPELLWAVE_CLASS` - Class to play (default: mage)
    /// - `SPELLWAVE_LEVEL` - Level to play (default: Easy)
    /// - `SPELLWAVE_SEED` - Random seed (default: 0)
    /// - `SPELLWAVE_TICK_MS` - Real-time tick period; unset drives the clock by hand
    /// - `SPELLWAVE_STEP_MS` - Autopilot decision period (default: 100)
    /// - `SPELLWAVE_WAVES` - Stop after this many waves (default: play to the end)
    /// - `SPELLWAVE_MAX_SECS` - Simulated time limit (default: 3600)
    pub fn from_env() -> Self {
        let mut config = Self::default();

        if let Ok(dir) = env::var("SPELLWAVE_DATA_DIR") {
            config.data_dir = PathBuf::from(dir);
        }
        if let Ok(class) = env::var("SPELLWAVE_CLASS") {
            config.class = class;
        }
        if let Ok(level) = env::var("SPELLWAVE_LEVEL") {
            config.level = level;
        }
        if let Some(seed) = read_env::<u64>("SPELLWAVE_SEED") {
            config.seed = seed;
        }
        config.tick_ms = read_env::<u64>("SPELLWAVE_TICK_MS").filter(|&ms| ms > 0);
        if let Some(step) = read_env::<u64>("SPELLWAVE_STEP_MS") {
            config.step_ms = step.max(1);
        }
        config.max_waves = read_env::<u32>("SPELLWAVE_WAVES");
        if let Some(secs) = read_env::<u64>("SPELLWAVE_MAX_SECS") {
            config.max_secs = secs;
        }

        config
    }
}

fn read_env<T>(key: &str) -> Option<T>
where
    T: std::str::FromStr,
{
    env::var(key).ok()?.parse().ok()
}
