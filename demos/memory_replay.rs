//! # Memory Replay Demo
//!
//! Stores a few values in an in-process cache and prints the replayed call
//! history, then does the same with the combined history layout and a
//! failing custom operation.
//!
//! Run with:
//! ```bash
//! cargo run --example memory_replay
//! ```
//!
//! To see the instrumentation events as well:
//! ```bash
//! RUST_LOG=debug cargo run --example memory_replay
//! ```

use recall::prelude::*;
use recall::{StoreData, replay_with_layout};
use tracing::{info, info_span};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Divides two integers, failing on a zero divisor
struct Divide {
    identity: OperationIdentity,
}

#[async_trait]
impl<S: KeyValueStore + ?Sized> Operation<S> for Divide {
    type Input = (i64, i64);
    type Output = i64;

    fn identity(&self) -> &OperationIdentity {
        &self.identity
    }

    async fn call(&self, _store: &S, input: Self::Input) -> RecallResult<i64> {
        let (a, b) = input;
        a.checked_div(b)
            .ok_or_else(|| RecallError::generic(format!("cannot divide {a} by {b}")))
    }
}

fn setup_tracing() {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| "warn".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_target(false))
        .init();
}

#[tokio::main]
async fn main() -> RecallResult<()> {
    setup_tracing();

    // Paired history through the cache
    {
        info!("Storing values in a fresh cache");

        let cache = Cache::new(MemoryStore::new()).await?;
        cache.store("foo").await?;
        cache.store(42).await?;
        cache.store(3.5).await?;
        cache.store(b"raw".to_vec()).await?;

        cache
            .replay(cache.store_identity())
            .await?
            .print()
            .map_err(|e| RecallError::generic(e.to_string()))?;
    }

    println!();

    // Combined history with a span around every cache call
    {
        let config = CacheConfig::new()
            .with_history_layout(HistoryLayout::Combined)
            .with_tracing_span(info_span!("demo_cache", layout = "combined"));
        let cache = Cache::with_config(MemoryStore::new(), config).await?;

        let key = cache.store("it's here").await?;
        println!("stored under {key}: {:?}", cache.get_as_string(&key).await?);

        println!("{}", cache.replay(cache.store_identity()).await?);
    }

    println!();

    // A custom operation sharing one store with the cache's own
    {
        let store = MemoryStore::new();
        let divide = Divide {
            identity: OperationIdentity::new("Calculator.divide"),
        }
        .recorded_with(HistoryLayout::Combined)
        .counted();

        for (a, b) in [(10, 2), (7, 0), (9, 3)] {
            match divide.call(&store, (a, b)).await {
                Ok(quotient) => info!(a, b, quotient, "Divided"),
                Err(error) => info!(a, b, %error, "Division failed"),
            }
        }

        let store_data = StoreData::new("Cache.store").recorded().counted();
        store_data.call(&store, (StoreValue::from("shared"),)).await?;

        let identity = OperationIdentity::new("Calculator.divide");
        println!(
            "{}",
            replay_with_layout(&store, &identity, HistoryLayout::Combined).await?
        );
        println!("{}", replay(&store, &"Cache.store".into()).await?);
    }

    Ok(())
}
