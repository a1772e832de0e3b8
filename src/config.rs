//! World and worker pool configuration.

use std::time::Duration;

use serde::Deserialize;

use crate::error::ConfigError;

/// Tuning knobs for a `World` and its mesh worker pool.
///
/// Every field has a default, so a JSON document only needs the fields it
/// overrides:
///
/// ```
/// use voxel_mesher::config::WorldConfig;
///
/// let config = WorldConfig::from_json(r#"{ "worker_count": 2 }"#).unwrap();
/// assert_eq!(config.worker_count, 2);
/// assert_eq!(config.input_queue_capacity, None);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct WorldConfig {
    /// Number of mesh worker threads.
    pub worker_count: usize,
    /// Capacity of the chunk-to-mesh request queue; `None` is unbounded.
    pub input_queue_capacity: Option<usize>,
    /// Capacity of the finished-mesh queue; `None` uses `worker_count`.
    pub output_queue_capacity: Option<usize>,
    /// Vertices each scratch buffer can hold before its first growth.
    pub scratch_initial_vertices: usize,
    /// How long workers block on a wait before rechecking for shutdown.
    pub poll_interval_ms: u64,
}

impl Default for WorldConfig {
    fn default() -> Self {
        Self {
            worker_count: 3,
            input_queue_capacity: None,
            output_queue_capacity: None,
            scratch_initial_vertices: 16 * 1024,
            poll_interval_ms: 50,
        }
    }
}

impl WorldConfig {
    /// Parses and validates a configuration from JSON.
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Rejects values the worker pool cannot run with.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.worker_count == 0 {
            return Err(ConfigError::Invalid {
                field: "worker_count",
                reason: "at least one worker is required".to_string(),
            });
        }
        if self.output_queue_capacity == Some(0) {
            return Err(ConfigError::Invalid {
                field: "output_queue_capacity",
                reason: "must be positive".to_string(),
            });
        }
        if self.input_queue_capacity == Some(0) {
            return Err(ConfigError::Invalid {
                field: "input_queue_capacity",
                reason: "must be positive".to_string(),
            });
        }
        if self.poll_interval_ms == 0 {
            return Err(ConfigError::Invalid {
                field: "poll_interval_ms",
                reason: "must be positive".to_string(),
            });
        }
        Ok(())
    }

    /// Effective output queue capacity.
    pub fn output_capacity(&self) -> usize {
        self.output_queue_capacity.unwrap_or(self.worker_count)
    }

    /// `poll_interval_ms` as a `Duration`.
    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }
}
