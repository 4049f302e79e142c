//! Error types for the object pool
//!
//! Exhaustion on the plain `take` path is reported as `None`, not as an
//! error. These variants back the fallible convenience APIs.

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PoolError {
    #[error("Pool is exhausted - no free instance and cap of {cap} reached")]
    Exhausted { cap: usize },

    #[error("Cannot spawn {requested} instances ({free} free, cap {cap})")]
    InsufficientCapacity {
        requested: usize,
        free: usize,
        cap: usize,
    },

    #[error("Failed to export metrics: {0}")]
    MetricsExport(String),
}

pub type PoolResult<T> = Result<T, PoolError>;
