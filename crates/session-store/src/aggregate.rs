//! Per-Device History and Session Aggregates

use frame_protocol::DeviceId;
use risk_model::{classify, RiskConfig, RiskLabel};
use serde::{Deserialize, Serialize};
use signal_transform::MagnitudeSeries;
use std::collections::HashMap;

/// Cumulative record for one device within a session.
///
/// `magnitudes` is the flat scored stream: every acceleration scalar from
/// every merged frame, followed (per merge) by that frame's angular
/// scalars. The risk model consumes this stream uniformly. `angular` keeps
/// the angular portion on its own for the presentation row. Tier counts,
/// score, and label are derived values, fully recomputed from `magnitudes`
/// on every merge.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DeviceHistory {
    /// Append-only scored magnitude stream (acceleration then angular,
    /// per merge)
    pub magnitudes: Vec<f64>,
    /// Angular-acceleration magnitudes only
    pub angular: Vec<f64>,
    /// Magnitudes in the low severity tier
    pub low_count: usize,
    /// Magnitudes in the mid severity tier
    pub mid_count: usize,
    /// Magnitudes in the high severity tier
    pub high_count: usize,
    /// Compounded risk score in [0, 100]
    pub risk_score: f64,
    /// Label derived from the score
    pub risk_label: RiskLabel,
}

impl DeviceHistory {
    /// Append one frame's magnitude streams: acceleration scalars first,
    /// then angular scalars, into the shared scored stream.
    pub fn append(&mut self, series: &MagnitudeSeries) {
        self.magnitudes.extend_from_slice(&series.accel);
        self.magnitudes.extend_from_slice(&series.angular);
        self.angular.extend_from_slice(&series.angular);
    }

    /// Recompute tier counts, score, and label over the full stream.
    pub fn reclassify(&mut self, config: &RiskConfig) {
        let assessment = classify(&self.magnitudes, config);
        self.low_count = assessment.low_count;
        self.mid_count = assessment.mid_count;
        self.high_count = assessment.high_count;
        self.risk_score = assessment.risk_score;
        self.risk_label = assessment.risk_label;
        debug_assert!(self.low_count + self.mid_count + self.high_count <= self.magnitudes.len());
    }
}

/// All device histories for one session, plus the first-seen roster.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SessionAggregate {
    /// Device identifier → cumulative history
    pub devices: HashMap<DeviceId, DeviceHistory>,
    /// Device identifiers in first-seen order
    pub roster: Vec<DeviceId>,
}

impl SessionAggregate {
    /// Get the history for a device, creating an empty one (and extending
    /// the roster) the first time the device is seen.
    pub fn history_mut(&mut self, id: DeviceId) -> &mut DeviceHistory {
        if !self.roster.contains(&id) {
            self.roster.push(id);
        }
        self.devices.entry(id).or_default()
    }

    /// Number of devices seen this session
    pub fn device_count(&self) -> usize {
        self.roster.len()
    }

    pub fn is_empty(&self) -> bool {
        self.roster.is_empty()
    }
}
