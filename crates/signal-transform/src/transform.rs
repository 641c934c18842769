//! Raw Count to Magnitude Conversion
//!
//! Axes are flattened into one scalar stream: each axis reading becomes an
//! independent magnitude so the risk model treats every axis sample as a
//! separate acceleration event. Angular acceleration comes from a forward
//! finite difference between consecutive gyroscope samples; the final
//! sample differences against itself, pinning the boundary to zero.

use frame_protocol::DeviceSlot;
use serde::{Deserialize, Serialize};

/// Transform configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TransformConfig {
    /// Standard gravity divisor for accelerometer counts (m/s²)
    pub gravity: f64,
    /// Gyroscope sampling interval (seconds)
    pub gyro_sample_interval_s: f64,
}

impl Default for TransformConfig {
    fn default() -> Self {
        Self {
            gravity: 9.81,
            gyro_sample_interval_s: 0.001,
        }
    }
}

/// Calibrated per-axis magnitude streams for one device slot
#[derive(Debug, Clone, PartialEq)]
pub struct MagnitudeSeries {
    /// Acceleration magnitudes, three scalars (x, y, z) per accel sample
    pub accel: Vec<f64>,
    /// Angular-acceleration magnitudes, three scalars per gyro sample
    pub angular: Vec<f64>,
}

/// Transform a decoded slot into magnitude streams.
///
/// Pure function of the slot's raw samples; no calibration state is carried
/// between frames.
pub fn transform_slot(slot: &DeviceSlot, config: &TransformConfig) -> MagnitudeSeries {
    let mut accel = Vec::with_capacity(slot.accel_samples.len() * 3);
    for sample in &slot.accel_samples {
        // Raw counts are unsigned, so the scaled values are already
        // non-negative magnitudes.
        accel.push(sample.x as f64 / config.gravity);
        accel.push(sample.y as f64 / config.gravity);
        accel.push(sample.z as f64 / config.gravity);
    }

    let mut angular = Vec::with_capacity(slot.gyro_samples.len() * 3);
    for (k, sample) in slot.gyro_samples.iter().enumerate() {
        let next = slot.gyro_samples.get(k + 1).unwrap_or(sample);
        let dt = config.gyro_sample_interval_s;
        angular.push(((next.x as f64 - sample.x as f64) / dt).abs());
        angular.push(((next.y as f64 - sample.y as f64) / dt).abs());
        angular.push(((next.z as f64 - sample.z as f64) / dt).abs());
    }

    MagnitudeSeries { accel, angular }
}
