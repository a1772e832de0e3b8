//! Error types for the meshing pipeline.
//!
//! Queue and scratch-buffer errors are routine signals from non-blocking or
//! timed operations. `WorldError::NoChunk` is the only error a caller is
//! expected to surface from normal world access.

use cgmath::Point3;
use thiserror::Error;

use crate::engine_state::rendering::meshing::tessellation_buffer::ScratchState;

/// Errors raised by world operations.
#[derive(Debug, Error)]
pub enum WorldError {
    /// A non-safe accessor addressed a chunk that is not loaded.
    #[error("no chunk loaded at chunk coordinate ({}, {}, {})", .position.x, .position.y, .position.z)]
    NoChunk {
        /// The chunk coordinate that was looked up.
        position: Point3<i32>,
    },

    /// A mesh worker thread could not be created.
    #[error("failed to spawn mesh worker {index}: {source}")]
    WorkerSpawn {
        /// Index of the worker in the pool.
        index: usize,
        /// The underlying OS error.
        #[source]
        source: std::io::Error,
    },

    /// The world configuration was rejected.
    #[error(transparent)]
    Config(#[from] ConfigError),
}

/// Errors raised by `JobQueue` operations.
#[derive(Error)]
pub enum QueueError<T> {
    /// A non-blocking or timed put found the queue full. The item is handed back.
    #[error("queue is full")]
    Full(T),

    /// A non-blocking get found the queue empty.
    #[error("queue is empty")]
    Empty,

    /// A timed operation ran out of time.
    #[error("queue operation timed out")]
    Timeout,

    /// The other side of the queue no longer exists.
    #[error("queue is disconnected")]
    Disconnected,
}

impl<T> QueueError<T> {
    /// Recovers the rejected item from a `Full` error.
    pub fn into_inner(self) -> Option<T> {
        match self {
            QueueError::Full(item) => Some(item),
            _ => None,
        }
    }
}

// Manual impl so `T` needs no `Debug` bound.
impl<T> std::fmt::Debug for QueueError<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            QueueError::Full(_) => f.write_str("Full(..)"),
            QueueError::Empty => f.write_str("Empty"),
            QueueError::Timeout => f.write_str("Timeout"),
            QueueError::Disconnected => f.write_str("Disconnected"),
        }
    }
}

/// Errors raised by `TessellationBuffer` operations.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ScratchError {
    /// The buffer was released and can no longer be used.
    #[error("tessellation buffer has been released")]
    Released,

    /// The buffer was not in the state the operation requires.
    #[error("tessellation buffer is {actual:?}, expected {expected:?}")]
    WrongState {
        /// State the operation requires.
        expected: ScratchState,
        /// State the buffer was in.
        actual: ScratchState,
    },
}

/// Errors raised while loading configuration or resource tables.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The JSON document could not be parsed.
    #[error("malformed configuration: {0}")]
    Parse(#[from] serde_json::Error),

    /// A value parsed but is not usable.
    #[error("invalid configuration value for `{field}`: {reason}")]
    Invalid {
        /// The offending field.
        field: &'static str,
        /// Why it was rejected.
        reason: String,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_no_chunk_message_names_coordinate() {
        let error = WorldError::NoChunk {
            position: Point3::new(-1, 0, 4),
        };
        assert_eq!(error.to_string(), "no chunk loaded at chunk coordinate (-1, 0, 4)");
    }

    #[test]
    fn test_full_hands_item_back() {
        let error: QueueError<String> = QueueError::Full("job".to_string());
        assert_eq!(format!("{error:?}"), "Full(..)");
        assert_eq!(error.into_inner().as_deref(), Some("job"));
        assert!(QueueError::<String>::Empty.into_inner().is_none());
    }
}
