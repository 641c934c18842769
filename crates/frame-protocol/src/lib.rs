//! Helmet Telemetry Frame Protocol
//!
//! This crate provides the binary frame layout spoken by the helmet sensor
//! units, a pure decoder from raw bytes to per-device sample slots, and an
//! async TCP client for acquiring frames over the local wireless link.

mod client;
mod device;
mod error;
mod frame;

pub use client::FrameClient;
pub use device::DeviceId;
pub use error::FrameError;
pub use frame::{decode_frame, expected_frame_len, DeviceSlot, RawSample};

/// Frame layout constants
pub mod layout {
    /// Samples reported per sensor per frame
    pub const SAMPLES_PER_SENSOR: usize = 1000;
    /// Bytes per sample (X, Y, Z raw counts)
    pub const SAMPLE_BYTES: usize = 3;
    /// Bytes per sensor block (accelerometer or gyroscope)
    pub const SENSOR_BLOCK_BYTES: usize = SAMPLES_PER_SENSOR * SAMPLE_BYTES;
    /// Bytes per device slot (accelerometer block + gyroscope block)
    pub const DEVICE_BLOCK_BYTES: usize = 2 * SENSOR_BLOCK_BYTES;
    /// Bytes per device identifier in the trailing section
    pub const DEVICE_ID_BYTES: usize = 6;
}
