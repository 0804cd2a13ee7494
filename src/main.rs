//! Tidy Buffer demo
//!
//! Loads a buffer configuration from the environment, runs a short
//! write/read workload against it and prints the resulting statistics as JSON.

use anyhow::{Context, Result};
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use tidy_buffer::{Buffer, BufferConfig, SingleSlot};

/// Number of payloads written by the demo workload
const DEMO_WRITES: usize = 25;

fn main() -> Result<()> {
    // Defaults to "info" level, can be overridden with RUST_LOG env var
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "tidy_buffer=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = BufferConfig::from_env();
    info!(
        "Configuration loaded: target_length={}, capacity={}, ttl={}s, access_limit={}",
        config.target_length, config.capacity, config.ttl_seconds, config.access_limit
    );

    let buffer: Buffer<String> =
        Buffer::new(config).context("failed to build buffer from environment config")?;

    let keys: Vec<i64> = (0..DEMO_WRITES)
        .map(|i| buffer.write(format!("message-{i}")))
        .collect();
    info!("Wrote {} payloads, {} resident", keys.len(), buffer.len());

    let readable = keys.iter().filter(|key| buffer.read(**key).is_some()).count();
    if readable < keys.len() {
        warn!(
            "{} of {} keys were trimmed or expired",
            keys.len() - readable,
            keys.len()
        );
    }

    let slot: SingleSlot<String> =
        SingleSlot::new(config).context("failed to build single slot")?;
    let first = slot.write("first".to_string());
    let second = slot.write("second".to_string());
    info!(
        "Single slot: key {} readable={}, key {} readable={}",
        first,
        slot.exist(first),
        second,
        slot.exist(second)
    );

    let stats = serde_json::to_string_pretty(&buffer.stats()).context("failed to encode stats")?;
    println!("{stats}");

    Ok(())
}
