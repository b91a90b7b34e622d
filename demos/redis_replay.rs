//! # Redis Replay Demo
//!
//! Runs the canonical store-then-replay scenario against a Redis server.
//!
//! ⚠️ Building the cache flushes the selected Redis database. Point it at a
//! scratch database.
//!
//! Run with:
//! ```bash
//! RECALL_REDIS_URL=redis://127.0.0.1:6379/15 cargo run --example redis_replay --features redis
//! ```

use recall::prelude::*;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> RecallResult<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_target(false))
        .init();

    let config = RedisConfig::from_env();
    info!(url = %config.url, "Connecting");

    let store = RedisStore::connect(&config).await?;
    let cache = Cache::new(store).await?;

    let k1 = cache.store("foo").await?;
    let k2 = cache.store(42).await?;

    info!(
        first = ?cache.get_as_string(&k1).await?,
        second = ?cache.get_as_integer(&k2).await?,
        "Read back"
    );

    let trace = replay(cache.backend(), cache.store_identity()).await?;
    trace
        .print()
        .map_err(|e| RecallError::generic(e.to_string()))?;

    Ok(())
}
