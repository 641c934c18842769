//! Telemetry Frame Decoding
//!
//! A frame carries, for each of `num_devices` device slots, a 6000-byte
//! block: 3000 bytes of accelerometer samples followed by 3000 bytes of
//! gyroscope samples, each sample three unsigned byte counts (X, Y, Z).
//! After all device blocks comes one 6-byte device identifier per slot, in
//! slot order. Slot-to-identifier association is positional.

use crate::device::DeviceId;
use crate::error::FrameError;
use crate::layout::{DEVICE_BLOCK_BYTES, DEVICE_ID_BYTES, SAMPLE_BYTES, SENSOR_BLOCK_BYTES};
use serde::{Deserialize, Serialize};

/// One raw sample: unsigned X, Y, Z counts
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawSample {
    pub x: u8,
    pub y: u8,
    pub z: u8,
}

/// Decoded device slot: identifier plus 1000 accelerometer and 1000
/// gyroscope samples in encounter order
#[derive(Debug, Clone)]
pub struct DeviceSlot {
    /// Identifier from the trailing section, positionally matched
    pub id: DeviceId,
    /// Accelerometer samples (length 1000)
    pub accel_samples: Vec<RawSample>,
    /// Gyroscope samples (length 1000)
    pub gyro_samples: Vec<RawSample>,
}

/// Total frame length for a given device count
pub fn expected_frame_len(num_devices: usize) -> usize {
    num_devices * DEVICE_BLOCK_BYTES + num_devices * DEVICE_ID_BYTES
}

/// Decode a raw frame into per-device slots.
///
/// Pure function: no I/O, deterministic given identical bytes. Fails with
/// [`FrameError::MalformedFrame`] if the buffer length does not match the
/// device count exactly; a malformed frame is dropped whole, never
/// partially decoded.
pub fn decode_frame(buf: &[u8], num_devices: usize) -> Result<Vec<DeviceSlot>, FrameError> {
    let expected = expected_frame_len(num_devices);
    if buf.len() != expected {
        return Err(FrameError::MalformedFrame {
            expected,
            actual: buf.len(),
        });
    }

    let id_base = num_devices * DEVICE_BLOCK_BYTES;
    let mut slots = Vec::with_capacity(num_devices);

    for slot_index in 0..num_devices {
        let block_start = slot_index * DEVICE_BLOCK_BYTES;
        let block = &buf[block_start..block_start + DEVICE_BLOCK_BYTES];

        let accel_samples = read_samples(&block[..SENSOR_BLOCK_BYTES]);
        let gyro_samples = read_samples(&block[SENSOR_BLOCK_BYTES..]);

        let id_start = id_base + slot_index * DEVICE_ID_BYTES;
        let mut id_bytes = [0u8; DEVICE_ID_BYTES];
        id_bytes.copy_from_slice(&buf[id_start..id_start + DEVICE_ID_BYTES]);

        slots.push(DeviceSlot {
            id: DeviceId::new(id_bytes),
            accel_samples,
            gyro_samples,
        });
    }

    Ok(slots)
}

fn read_samples(block: &[u8]) -> Vec<RawSample> {
    block
        .chunks_exact(SAMPLE_BYTES)
        .map(|c| RawSample {
            x: c[0],
            y: c[1],
            z: c[2],
        })
        .collect()
}
