//! Severity Tiers and Risk Scoring
//!
//! The model is always recomputed over the entire supplied history, never
//! incrementally: classification stays idempotent and re-derivable from the
//! stored magnitudes at any time. The score combines per-event injury
//! probabilities as a survival product (noisy-OR), so it only grows as
//! qualifying magnitudes accumulate, and multiplication order cannot change
//! the result.

use serde::{Deserialize, Serialize};
use tracing::debug;

/// Risk model configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RiskConfig {
    /// Lower bound of the low severity tier (exclusive)
    pub low_tier_min: f64,
    /// Lower bound of the mid severity tier (inclusive)
    pub mid_tier_min: f64,
    /// Lower bound of the high severity tier (inclusive)
    pub high_tier_min: f64,
    /// Magnitude below which an event contributes no risk
    pub risk_onset: f64,
    /// Magnitude at which the injury curve saturates to 100%
    pub curve_saturation: f64,
}

impl Default for RiskConfig {
    fn default() -> Self {
        Self {
            low_tier_min: 35.9,
            mid_tier_min: 46.5,
            high_tier_min: 52.0,
            risk_onset: 25.0,
            curve_saturation: 89.0,
        }
    }
}

/// Categorical risk label derived from the risk score
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum RiskLabel {
    #[default]
    Low,
    Med,
    High,
    VeryHigh,
}

impl RiskLabel {
    /// Get the display string shown to trainers
    pub fn as_str(&self) -> &'static str {
        match self {
            RiskLabel::Low => "Low",
            RiskLabel::Med => "Med",
            RiskLabel::High => "High",
            RiskLabel::VeryHigh => "V. high",
        }
    }

    /// Derive the label from a risk score in [0, 100].
    ///
    /// Cut points are inclusive toward the higher label (exactly 10 is Med,
    /// exactly 25 is High). A score of exactly 40 matches no explicit band
    /// and resolves to Low; callers wanting a different boundary policy must
    /// not rely on this fallthrough.
    pub fn from_score(score: f64) -> Self {
        if score < 10.0 {
            RiskLabel::Low
        } else if score < 25.0 {
            RiskLabel::Med
        } else if score < 40.0 {
            RiskLabel::High
        } else if score > 40.0 {
            RiskLabel::VeryHigh
        } else {
            RiskLabel::Low
        }
    }
}

/// Result of classifying a magnitude history
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RiskAssessment {
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

/// Classify a full magnitude history.
///
/// Pure function: two histories with identical magnitude sequences always
/// yield identical assessments. Magnitudes below the low tier fall in no
/// tier; magnitudes at or below the risk onset contribute no score.
pub fn classify(history: &[f64], config: &RiskConfig) -> RiskAssessment {
    let mut low_count = 0;
    let mut mid_count = 0;
    let mut high_count = 0;

    for &v in history {
        if v > config.low_tier_min && v < config.mid_tier_min {
            low_count += 1;
        } else if v >= config.mid_tier_min && v < config.high_tier_min {
            mid_count += 1;
        } else if v >= config.high_tier_min {
            high_count += 1;
        }
    }

    let mut survival = 1.0_f64;
    for &v in history {
        if v > config.risk_onset {
            let raw = if v < config.curve_saturation {
                injury_curve(v)
            } else {
                100.0
            };
            let raw = raw.min(100.0);
            survival *= 1.0 - raw / 100.0;
        }
    }
    let risk_score = (1.0 - survival) * 100.0;

    debug!(
        "Classified {} magnitudes: tiers {}/{}/{}, score {:.2}",
        history.len(),
        low_count,
        mid_count,
        high_count,
        risk_score
    );

    RiskAssessment {
        low_count,
        mid_count,
        high_count,
        risk_score,
        risk_label: RiskLabel::from_score(risk_score),
    }
}

/// Injury probability (percent) for a single acceleration magnitude.
///
/// Cubic fit to the concussion-probability reference data, valid below the
/// saturation magnitude.
fn injury_curve(v: f64) -> f64 {
    -0.0004 * v.powi(3) + 0.0631 * v.powi(2) - 2.1851 * v + 21.545
}
