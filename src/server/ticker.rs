use crate::cache::Pool;
use crate::config::Config;
use crate::utils::clock::now_seconds;
use crate::utils::system::MemoryReader;
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio::time::{interval_at, Instant, MissedTickBehavior};
use tracing::{debug, info};

const TICK_PERIOD: Duration = Duration::from_secs(5);

/// Spawns the periodic housekeeping task: memory-pressure eviction plus
/// unconditional stale-entry sweeping, on a drift-resistant 5 second clock.
pub fn spawn_ticker(pool: Pool, config: Arc<Config>) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut reader = MemoryReader::new();
        let mut ticker = interval_at(Instant::now() + TICK_PERIOD, TICK_PERIOD);
        // Scheduling is driven off the previous fire time, not completion
        // time, so a slow tick never compounds drift into the next one.
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

        let hard_limit_bytes = config.cache.memorylimit.saturating_mul(1024 * 1024);
        let soft_limit_bytes = (hard_limit_bytes as f64 * 0.75) as u64;

        loop {
            ticker.tick().await;
            let usage = reader.current_usage_bytes();
            run_tick(&pool, usage, soft_limit_bytes, hard_limit_bytes, config.logging.verbosity).await;
        }
    })
}

/// The eviction-policy decision itself, decoupled from how `usage` was read.
/// Taking `usage` as a caller-supplied value (the same way `Pool`'s
/// operations take a caller-supplied `now`) lets tests force it above and
/// below the soft/hard limits without touching real process memory.
async fn run_tick(pool: &Pool, usage: u64, soft_limit_bytes: u64, hard_limit_bytes: u64, verbosity: u8) {
    if usage >= hard_limit_bytes {
        let removed = pool.flush().await;
        if verbosity >= 1 {
            info!(usage, hard_limit_bytes, ?removed, "hard memory limit hit, flushed pool");
        }
    } else if usage >= soft_limit_bytes {
        let removed = pool.clear_least_recently_used().await;
        if verbosity >= 1 {
            info!(usage, soft_limit_bytes, removed, "soft memory limit hit, evicted LRU entries");
        }
    }

    let stale_removed = pool.clear_stale(now_seconds()).await;
    if verbosity >= 2 {
        let items = pool.item_count().await;
        debug!(usage, stale_removed, items, "tick complete");
    }
}
