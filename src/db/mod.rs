//! Database access layer.
//!
//! This module provides:
//! - Connection pool lifecycle ([`pool`])
//! - Parameterized statement execution ([`executor`])
//! - Bind-parameter translation ([`params`])
//! - Row-to-record decoding ([`types`])

pub mod executor;
pub mod params;
pub mod pool;
pub mod types;

pub use pool::Database;
