//! Prometheus metrics exporter
//!
//! HTTP endpoint for Prometheus scraping.

use anyhow::Result;
use metrics::{counter, describe_counter, describe_gauge, gauge};
use metrics_exporter_prometheus::PrometheusBuilder;
use std::thread;
use std::time::Duration;

use super::counters::{MetricsSnapshot, METRICS};
use crate::config::MetricsConfig;

const SYNC_INTERVAL: Duration = Duration::from_secs(1);

/// Initialize the Prometheus metrics exporter
pub fn init_metrics(config: &MetricsConfig) -> Result<()> {
    // Register metric descriptions
    describe_counter!("wirebuf_heap_allocations", "Buffers allocated from the heap");
    describe_counter!("wirebuf_mapped_allocations", "Buffers allocated as anonymous mappings");
    describe_counter!("wirebuf_unmaps", "Mappings returned to the OS");
    describe_counter!("wirebuf_unmap_failures", "Failed unmap calls");
    describe_gauge!("wirebuf_mapped_bytes", "Bytes currently mapped");
    describe_counter!("wirebuf_pool_hits", "Pool requests served from cache");
    describe_counter!("wirebuf_pool_misses", "Pool requests that allocated fresh");
    describe_counter!("wirebuf_pool_returns", "Buffers retained by a pool on dispose");
    describe_counter!("wirebuf_pool_drops", "Buffers a pool released to its allocator");

    // Build and install the Prometheus exporter
    PrometheusBuilder::new()
        .with_http_listener(config.bind_addr)
        .install()?;

    // Background thread syncing atomic counters into the metrics facade
    thread::Builder::new()
        .name("wirebuf-metrics".into())
        .spawn(sync_metrics_loop)?;

    Ok(())
}

fn sync_metrics_loop() {
    let mut last_snapshot = MetricsSnapshot::default();

    loop {
        thread::sleep(SYNC_INTERVAL);

        let snapshot = METRICS.snapshot();
        publish_deltas(&last_snapshot, &snapshot);
        last_snapshot = snapshot;
    }
}

/// Push the difference between two snapshots into the metrics facade
fn publish_deltas(last: &MetricsSnapshot, now: &MetricsSnapshot) {
    let deltas = [
        ("wirebuf_heap_allocations", last.heap_allocations, now.heap_allocations),
        ("wirebuf_mapped_allocations", last.mapped_allocations, now.mapped_allocations),
        ("wirebuf_unmaps", last.unmaps, now.unmaps),
        ("wirebuf_unmap_failures", last.unmap_failures, now.unmap_failures),
        ("wirebuf_pool_hits", last.pool_hits, now.pool_hits),
        ("wirebuf_pool_misses", last.pool_misses, now.pool_misses),
        ("wirebuf_pool_returns", last.pool_returns, now.pool_returns),
        ("wirebuf_pool_drops", last.pool_drops, now.pool_drops),
    ];

    for (name, before, after) in deltas {
        let delta = after.saturating_sub(before);
        if delta > 0 {
            counter!(name).increment(delta);
        }
    }

    gauge!("wirebuf_mapped_bytes").set(now.mapped_bytes as f64);
}
