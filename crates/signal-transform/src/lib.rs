//! Signal Transform
//!
//! Converts raw per-device sample counts into physically meaningful
//! acceleration and angular-acceleration magnitudes.

mod transform;

pub use transform::{transform_slot, MagnitudeSeries, TransformConfig};
