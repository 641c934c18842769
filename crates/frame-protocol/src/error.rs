//! Frame Protocol Error Types

use thiserror::Error;

/// Errors that can occur while acquiring or decoding a telemetry frame
#[derive(Debug, Error)]
pub enum FrameError {
    /// Frame length does not match the configured device count
    #[error("Malformed frame: expected {expected} bytes, got {actual}")]
    MalformedFrame { expected: usize, actual: usize },

    /// Transport connection error
    #[error("Connection error: {0}")]
    Connection(String),

    /// Timeout waiting for a frame
    #[error("Timed out waiting for frame after {0}ms")]
    Timeout(u64),

    /// Device identifier string could not be parsed
    #[error("Invalid device identifier: {0}")]
    InvalidDeviceId(String),
}

impl From<std::io::Error> for FrameError {
    fn from(err: std::io::Error) -> Self {
        FrameError::Connection(err.to_string())
    }
}
