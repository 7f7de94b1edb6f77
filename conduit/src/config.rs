//! Tunables for the scheduler and the worker pool.
//!
//! All fields have defaults, so an empty TOML document is a valid config.
//!
//! ```toml
//! [scheduler]
//! worker_threads = 2
//!
//! [pool]
//! workers = 3
//! job_capacity = 5
//! result_capacity = 5
//! ```

use crate::error::ConfigError;
use serde::Deserialize;
use std::fs;
use std::path::Path;

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct Config {
    pub scheduler: SchedulerConfig,
    pub pool: PoolConfig,
}

/// Settings for the [`Scheduler`](crate::asynchronous::Scheduler) runtime.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct SchedulerConfig {
    /// Number of OS threads tasks are multiplexed onto.
    pub worker_threads: usize,
    pub thread_name: String,
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        SchedulerConfig {
            worker_threads: num_cpus::get(),
            thread_name: String::from("conduit-worker"),
        }
    }
}

/// Settings for a worker pool run through `process_all`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct PoolConfig {
    pub workers: usize,
    pub job_capacity: usize,
    pub result_capacity: usize,
}

impl Default for PoolConfig {
    fn default() -> Self {
        PoolConfig {
            workers: 3,
            job_capacity: 5,
            result_capacity: 5,
        }
    }
}

impl Config {
    pub fn from_toml_str(source: &str) -> Result<Self, ConfigError> {
        let config: Config = toml::from_str(source)?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let source = fs::read_to_string(path)?;
        Self::from_toml_str(&source)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.scheduler.worker_threads == 0 {
            return Err(ConfigError::Invalid(
                "scheduler.worker_threads must be at least 1".into(),
            ));
        }
        if self.pool.workers == 0 {
            return Err(ConfigError::Invalid(
                "pool.workers must be at least 1".into(),
            ));
        }
        Ok(())
    }
}
