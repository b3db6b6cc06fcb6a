//! Spellwave client binary.
//!
//! Composition root: loads content, builds the runtime, and lets the
//! autopilot play one run. The final snapshot is printed as JSON on stdout;
//! logs go to stderr.
//!
//! ```bash
//! SPELLWAVE_LEVEL=Medium SPELLWAVE_SEED=7 RUST_LOG=spellwave=debug cargo run -p spellwave-client
//! ```

use anyhow::{Context, Result};

use game_content::ContentFactory;
use runtime::{Runtime, RuntimeConfig};
use spellwave_client::{Autopilot, ClientConfig, spawn_event_logger};

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .with_writer(std::io::stderr)
        .init();

    let config = ClientConfig::from_env();
    tracing::info!(
        data_dir = %config.data_dir.display(),
        class = %config.class,
        level = %config.level,
        seed = config.seed,
        "Starting Spellwave client"
    );

    let content = ContentFactory::new(&config.data_dir)
        .load_bundle()
        .with_context(|| format!("loading content from {}", config.data_dir.display()))?;

    let runtime = Runtime::builder()
        .config(RuntimeConfig {
            tick_interval_ms: config.tick_ms,
            ..RuntimeConfig::default()
        })
        .content(content)
        .class(config.class.clone())
        .level(config.level.clone())
        .seed(config.seed)
        .build()
        .await?;

    let loggers = spawn_event_logger(&runtime.handle());
    let snapshot = Autopilot::new(runtime.handle(), config).run().await?;

    println!("{}", serde_json::to_string_pretty(&snapshot)?);

    runtime.shutdown().await?;
    for logger in loggers {
        logger.await.context("event logger task failed")?;
    }
    tracing::info!("Client shutdown complete");
    Ok(())
}
