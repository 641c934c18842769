//! Session Aggregation Store
//!
//! Holds, per session, a mapping from device identifier to cumulative
//! magnitude history and derived risk state; merges each decoded frame into
//! that history and persists it through a string key-value collaborator.

mod aggregate;
mod kv;
mod store;

pub use aggregate::{DeviceHistory, SessionAggregate};
pub use kv::{JsonFileStore, KeyValueStore, MemoryStore};
pub use store::{DeviceSeries, SessionContext, SessionStore};

use thiserror::Error;

/// Storage errors
#[derive(Debug, Error)]
pub enum StoreError {
    /// Underlying key-value storage read or write failed
    #[error("Persistence unavailable: {0}")]
    Unavailable(String),

    /// Stored payload could not be serialized or parsed
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}
