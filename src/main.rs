//! wirebuf - Entry Point
//!
//! Drives a configured buffer pool through a synthetic acquire/dispose
//! workload and reports how often it reused memory.

use anyhow::{Context, Result};
use std::path::PathBuf;
use std::time::Instant;
use tracing::info;

use wirebuf::{BufferPool, Config, VERSION};

fn main() -> Result<()> {
    // Parse command line arguments
    let config_path = std::env::args()
        .nth(1)
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from("wirebuf.toml"));

    // Load configuration
    let config = Config::load(&config_path)
        .with_context(|| format!("Failed to load config from {:?}", config_path))?;

    // Initialize tracing/logging
    wirebuf::util::init_tracing(&config.logging)?;

    info!(
        version = VERSION,
        config_path = ?config_path,
        "Starting wirebuf"
    );

    // Initialize metrics if enabled
    if config.metrics.enabled {
        wirebuf::metrics::init_metrics(&config.metrics)?;
        info!(
            bind_addr = %config.metrics.bind_addr,
            "Metrics endpoint started"
        );
    }

    let mut pool = config.pool.build();
    info!(
        allocator = ?config.pool.allocator,
        strategy = ?config.pool.strategy,
        size = config.pool.size,
        capacity = config.pool.capacity,
        "Pool ready"
    );

    let started = Instant::now();
    run_workload(pool.as_mut(), &config);
    let elapsed = started.elapsed();

    let stats = pool.stats();
    pool.close();

    let bytes = config.workload.iterations as f64
        * config.workload.burst as f64
        * config.pool.size as f64;
    info!(
        elapsed_ms = elapsed.as_millis() as u64,
        throughput_mb_s = bytes / elapsed.as_secs_f64().max(f64::EPSILON) / (1 << 20) as f64,
        hits = stats.hits,
        misses = stats.misses,
        returns = stats.returns,
        drops = stats.drops,
        "Workload finished"
    );

    let snapshot = wirebuf::metrics::METRICS.snapshot();
    info!(metrics = ?snapshot, "Final metrics");

    Ok(())
}

/// Acquire `burst` buffers, touch them, then hand them all back, per round
fn run_workload(pool: &mut dyn BufferPool, config: &Config) {
    let mut held = Vec::with_capacity(config.workload.burst);

    for round in 0..config.workload.iterations {
        for _ in 0..config.workload.burst {
            let mut buffer = pool.acquire(config.pool.size);
            buffer[0] = round as u8;
            held.push(buffer);
        }
        for buffer in held.drain(..) {
            pool.dispose(buffer);
        }
    }
}
