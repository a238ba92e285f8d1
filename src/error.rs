//! Configuration errors
//!
//! The per-frame path never fails; only loading a config or a hand-written
//! schedule can be rejected.

use std::path::PathBuf;

use thiserror::Error;

/// A timing table that cannot drive a monotonic phase
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ScheduleError {
    #[error("schedule has no phases")]
    Empty,

    #[error("phase `{name}` has invalid duration {duration_ms}ms")]
    InvalidDuration { name: String, duration_ms: f64 },

    #[error("phase `{name}` has invalid start {start_ms}ms")]
    InvalidStart { name: String, start_ms: f64 },

    /// Starts must be non-decreasing so phase index order is time order
    #[error("phase `{name}` starts at {start_ms}ms, before the previous phase at {previous_ms}ms")]
    OutOfOrder {
        name: String,
        start_ms: f64,
        previous_ms: f64,
    },

    #[error("schedule has {0} phases, more than a phase value can address")]
    TooManyPhases(usize),
}

/// Errors that can occur when loading intro configuration
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Failed to read config file
    #[error("failed to read config file at {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    /// Failed to parse JSON
    #[error("failed to parse config: {0}")]
    Parse(#[from] serde_json::Error),

    /// Schedule rejected by validation
    #[error("invalid schedule: {0}")]
    Schedule(#[from] ScheduleError),
    /// Quality preset name not recognised
    #[error("unknown quality preset `{0}` (expected low, medium or high)")]
    UnknownPreset(String),

    /// Malformed command line
    #[error("{0}")]
    Usage(String),
}
