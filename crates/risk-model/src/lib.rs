//! Injury Risk Model
//!
//! Classifies acceleration magnitudes into severity tiers and computes a
//! compounding probabilistic risk score over a device's full accumulated
//! magnitude history.

mod model;

pub use model::{classify, RiskAssessment, RiskConfig, RiskLabel};
