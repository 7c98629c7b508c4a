//! Configuration management
//!
//! Handles loading and validating pool and workload configuration from TOML
//! files.

use anyhow::{Context, Result};
use serde::Deserialize;
use std::net::SocketAddr;
use std::path::Path;

use crate::alloc::AllocatorKind;
use crate::pool::{build_pool, BufferPool, PoolStrategy};

/// Root configuration structure
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub pool: PoolConfig,
    #[serde(default)]
    pub workload: WorkloadConfig,
    #[serde(default)]
    pub metrics: MetricsConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Buffer pool configuration
#[derive(Debug, Clone, Deserialize)]
pub struct PoolConfig {
    /// Allocator backend: "heap" or "mapped"
    #[serde(default = "default_allocator")]
    pub allocator: AllocatorKind,
    /// Reuse strategy: "single" or "fixed"
    #[serde(default = "default_strategy")]
    pub strategy: PoolStrategy,
    /// Nominal buffer size in bytes
    #[serde(default = "default_buffer_size")]
    pub size: usize,
    /// Free-list capacity (fixed strategy)
    #[serde(default = "default_capacity")]
    pub capacity: usize,
}

impl PoolConfig {
    /// Build the configured pool
    pub fn build(&self) -> Box<dyn BufferPool> {
        build_pool(self.allocator, self.strategy, self.size, self.capacity)
    }
}

/// Synthetic workload driven by the binary
#[derive(Debug, Clone, Deserialize)]
pub struct WorkloadConfig {
    /// Number of acquire/dispose rounds
    #[serde(default = "default_iterations")]
    pub iterations: u64,
    /// Buffers held at once per round
    #[serde(default = "default_burst")]
    pub burst: usize,
}

impl Default for WorkloadConfig {
    fn default() -> Self {
        Self {
            iterations: default_iterations(),
            burst: default_burst(),
        }
    }
}

/// Metrics configuration
#[derive(Debug, Clone, Deserialize)]
pub struct MetricsConfig {
    /// Enable metrics endpoint
    #[serde(default)]
    pub enabled: bool,
    /// Metrics server bind address
    #[serde(default = "default_metrics_addr")]
    pub bind_addr: SocketAddr,
}

impl Default for MetricsConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            bind_addr: default_metrics_addr(),
        }
    }
}

/// Logging configuration
#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    /// Log level
    #[serde(default = "default_log_level")]
    pub level: String,
    /// Output format: "json" or "pretty"
    #[serde(default = "default_log_format")]
    pub format: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
        }
    }
}

// Default value functions
fn default_allocator() -> AllocatorKind { AllocatorKind::Heap }
fn default_strategy() -> PoolStrategy { PoolStrategy::Fixed }
fn default_buffer_size() -> usize { 4 << 10 }
fn default_capacity() -> usize { 32 }
fn default_iterations() -> u64 { 10_000 }
fn default_burst() -> usize { 8 }
fn default_metrics_addr() -> SocketAddr { SocketAddr::from(([127, 0, 0, 1], 9090)) }
fn default_log_level() -> String { "info".to_string() }
fn default_log_format() -> String { "json".to_string() }

impl Config {
    /// Load configuration from a TOML file
    pub fn load(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {:?}", path))?;

        Self::parse(&contents)
    }

    /// Parse and validate configuration from TOML text
    pub fn parse(contents: &str) -> Result<Self> {
        let config: Config = toml::from_str(contents)
            .with_context(|| "Failed to parse config file")?;

        config.validate()?;
        Ok(config)
    }

    /// Validate configuration values
    fn validate(&self) -> Result<()> {
        if self.pool.size == 0 {
            anyhow::bail!("pool.size must be > 0");
        }
        if !self.pool.allocator.is_supported() {
            anyhow::bail!("allocator {:?} is not supported on this platform", self.pool.allocator);
        }
        if self.workload.iterations == 0 {
            anyhow::bail!("workload.iterations must be > 0");
        }
        if self.workload.burst == 0 {
            anyhow::bail!("workload.burst must be > 0");
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_minimal_config_uses_defaults() {
        let config = Config::parse("[pool]\n").unwrap();
        assert_eq!(config.pool.allocator, AllocatorKind::Heap);
        assert_eq!(config.pool.strategy, PoolStrategy::Fixed);
        assert_eq!(config.pool.size, 4096);
        assert_eq!(config.pool.capacity, 32);
        assert_eq!(config.workload.burst, 8);
        assert!(!config.metrics.enabled);
        assert_eq!(config.logging.format, "json");
    }

    #[test]
    fn test_full_config() {
        let config = Config::parse(
            r#"
            [pool]
            allocator = "heap"
            strategy = "single"
            size = 128
            capacity = 4

            [workload]
            iterations = 5
            burst = 1

            [metrics]
            enabled = true
            bind_addr = "0.0.0.0:9100"

            [logging]
            level = "debug"
            format = "pretty"
            "#,
        )
        .unwrap();

        assert_eq!(config.pool.strategy, PoolStrategy::Single);
        assert_eq!(config.workload.iterations, 5);
        assert_eq!(config.metrics.bind_addr.port(), 9100);
        assert_eq!(config.logging.level, "debug");

        let mut pool = config.pool.build();
        let buf = pool.acquire(config.pool.size);
        assert_eq!(buf.len(), 128);
        pool.dispose(buf);
        assert_eq!(pool.cached(), 1);
    }

    #[test]
    fn test_rejects_zero_size() {
        let err = Config::parse("[pool]\nsize = 0\n").unwrap_err();
        assert!(err.to_string().contains("pool.size"));
    }

    #[test]
    fn test_rejects_zero_burst() {
        assert!(Config::parse("[pool]\n[workload]\nburst = 0\n").is_err());
    }

    #[test]
    fn test_rejects_unknown_strategy() {
        assert!(Config::parse("[pool]\nstrategy = \"slab\"\n").is_err());
    }

    #[test]
    fn test_load_missing_file() {
        let err = Config::load(Path::new("/nonexistent/wirebuf.toml")).unwrap_err();
        assert!(format!("{:#}", err).contains("Failed to read config file"));
    }
}
