//! Memo Cache demo
//!
//! Wraps two small computations with bounded caches and shows which calls
//! are served from the cache and which recompute.

use std::time::Duration;

use anyhow::{anyhow, Context};
use serde_json::{json, Map, Value};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use memo_cache::config::{DEFAULT_LOG_FILTER, LOG_ENV_VAR};
use memo_cache::{CallKey, Lookup, MemoConfig, Memoized, SharedMemoized};

/// Entry point for the demo.
///
/// # Startup Sequence
/// 1. Initialize tracing subscriber for logging
/// 2. Load configuration from environment variables
/// 3. Replay the `square` and `product` call sequences
/// 4. Run concurrent callers against a shared cache
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // RUST_LOG wins over MEMO_LOG; defaults to "memo_cache=info"
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .or_else(|_| tracing_subscriber::EnvFilter::try_from_env(LOG_ENV_VAR))
                .unwrap_or_else(|_| DEFAULT_LOG_FILTER.into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = MemoConfig::from_env();
    info!(
        "Configuration loaded: capacity={}",
        config
            .capacity
            .map(|c| c.to_string())
            .unwrap_or_else(|| "unbounded".to_string())
    );

    run_square(&config)?;
    run_product(&config)?;
    run_shared(&config).await?;

    Ok(())
}

/// Single positional argument: 4, 5, 4 (hit), 6, 4 (evicted, recomputed).
fn run_square(config: &MemoConfig) -> anyhow::Result<()> {
    let mut square = Memoized::named(
        "square",
        |a: &i64| {
            info!("computing square({})", a);
            format!("{}^2 = {}", a, a * a)
        },
        config.capacity,
    );

    for a in [4, 5, 4, 6, 4] {
        print_lookup(&square.invoke_traced(a));
    }

    for (a, entry) in square.store().iter() {
        println!(
            "cached square({}) inserted {}ms ago",
            a,
            entry.age().num_milliseconds()
        );
    }
    println!("square stats: {}", serde_json::to_string(&square.stats())?);
    Ok(())
}

/// Two positional arguments through dynamic keys: (2,4), (2,4) hit, (1,4), (1,6), (2,4).
fn run_product(config: &MemoConfig) -> anyhow::Result<()> {
    let mut product = Memoized::named(
        "product",
        |key: &CallKey| -> anyhow::Result<String> {
            let a = key
                .arg(0)
                .and_then(|a| a.as_i64())
                .ok_or_else(|| anyhow!("product{} needs an integer first argument", key))?;
            let b = key
                .arg(1)
                .and_then(|b| b.as_i64())
                .ok_or_else(|| anyhow!("product{} needs an integer second argument", key))?;
            info!("computing product({}, {})", a, b);
            Ok(format!("{} * {} = {}", a, b, a * b))
        },
        config.capacity,
    );

    let no_kwargs = Map::new();
    for (a, b) in [(2, 4), (2, 4), (1, 4), (1, 6), (2, 4)] {
        let lookup = product.call_traced(&[json!(a), json!(b)], &no_kwargs)?;
        print_lookup(&lookup);
    }

    // Failures reach the caller and are not cached
    let bad: [Value; 1] = [json!("two")];
    if let Err(err) = product.call_traced(&bad, &no_kwargs) {
        println!("error: {:#}", err);
    }

    println!("product stats: {}", serde_json::to_string(&product.stats())?);
    Ok(())
}

/// Concurrent callers on one cache: each signature computes once.
async fn run_shared(config: &MemoConfig) -> anyhow::Result<()> {
    let slow_cube: SharedMemoized<u64, u64, _> = SharedMemoized::named(
        "slow_cube",
        |n: u64| async move {
            info!("computing slow_cube({})", n);
            tokio::time::sleep(Duration::from_millis(50)).await;
            n * n * n
        },
        config.capacity,
    );

    let mut handles = Vec::new();
    for n in [3u64, 3, 3, 4] {
        let cube = slow_cube.clone();
        handles.push(tokio::spawn(async move { (n, cube.invoke(n).await) }));
    }

    for handle in handles {
        let (n, cubed) = handle.await.context("shared cache task panicked")?;
        println!("{}^3 = {}", n, cubed);
    }

    let stats = slow_cube.stats().await;
    println!("slow_cube stats: {}", serde_json::to_string_pretty(&stats)?);
    Ok(())
}

fn print_lookup(lookup: &Lookup<String>) {
    match lookup {
        Lookup::Hit(value) => println!("from cache: {}", value),
        Lookup::Miss(value) => println!("{}", value),
    }
}
