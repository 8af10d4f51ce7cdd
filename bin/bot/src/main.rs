//! saffron-bot: the console-driven recipe assistant.

mod config;
mod console;

use crate::config::BotConfig;
use saffron_dialogue::Engine;
use saffron_store::{MemoryStore, RecordStore};
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Load configuration from environment
    let config = BotConfig::from_env().expect("failed to load configuration");
    tracing::info!("Loaded configuration");

    let store: Arc<dyn RecordStore> =
        Arc::new(MemoryStore::with_admins(config.admin_actor_ids()));

    let mut engine = Engine::new();
    saffron_flows::register_all(&mut engine, &store).expect("failed to register flows");
    let engine = Arc::new(engine);

    // Spawn the periodic idle-session sweep when configured. Sessions are
    // volatile either way; this only bounds how long abandoned ones
    // linger.
    if config.sweep.enabled {
        let sweep_engine = engine.clone();
        let interval_secs = config.sweep.interval_seconds;
        let max_idle = chrono::Duration::seconds(config.sweep.max_idle_seconds);
        tokio::spawn(async move {
            let mut interval =
                tokio::time::interval(std::time::Duration::from_secs(interval_secs));
            loop {
                interval.tick().await;
                let removed = sweep_engine.sweep_idle(max_idle);
                if removed > 0 {
                    tracing::debug!(removed, "periodic session sweep");
                }
            }
        });
    }

    console::run(engine, config.actor)
        .await
        .expect("console loop failed");
}
