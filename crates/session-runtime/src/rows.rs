//! Presentation Rows
//!
//! One row per device, ordered by descending risk score so the most
//! at-risk player sits at the top of the team table.

use frame_protocol::DeviceId;
use serde::Serialize;
use session_store::SessionAggregate;

/// Per-device output row consumed by the presentation layer
#[derive(Debug, Clone, Serialize)]
pub struct DeviceRow {
    /// Device identifier (colon-hex)
    pub id: DeviceId,
    /// Magnitudes in the low severity tier
    pub low_count: usize,
    /// Magnitudes in the mid severity tier
    pub mid_count: usize,
    /// Magnitudes in the high severity tier
    pub high_count: usize,
    /// Display label for the risk score
    pub risk_label: String,
    /// Compounded risk score in [0, 100]
    pub risk_score: f64,
    /// Full scored magnitude stream (acceleration and angular)
    pub magnitudes: Vec<f64>,
    /// Angular-acceleration magnitudes only
    pub angular: Vec<f64>,
}

/// Build rows from a session aggregate, ordered by descending risk score.
/// Ties keep first-seen roster order.
pub fn rows_from(aggregate: &SessionAggregate) -> Vec<DeviceRow> {
    let mut rows: Vec<DeviceRow> = aggregate
        .roster
        .iter()
        .filter_map(|id| aggregate.devices.get(id).map(|history| (id, history)))
        .map(|(id, history)| DeviceRow {
            id: *id,
            low_count: history.low_count,
            mid_count: history.mid_count,
            high_count: history.high_count,
            risk_label: history.risk_label.as_str().to_string(),
            risk_score: history.risk_score,
            magnitudes: history.magnitudes.clone(),
            angular: history.angular.clone(),
        })
        .collect();

    rows.sort_by(|a, b| b.risk_score.total_cmp(&a.risk_score));
    rows
}

#[cfg(test)]
mod tests {
    use super::*;
    use session_store::DeviceHistory;

    fn aggregate_with_scores(scores: &[(u8, f64)]) -> SessionAggregate {
        let mut aggregate = SessionAggregate::default();
        for &(byte, score) in scores {
            let history = aggregate.history_mut(DeviceId::new([byte; 6]));
            *history = DeviceHistory {
                risk_score: score,
                ..Default::default()
            };
        }
        aggregate
    }

    #[test]
    fn test_rows_ordered_by_descending_risk() {
        let aggregate = aggregate_with_scores(&[(1, 5.0), (2, 80.0), (3, 22.0)]);
        let rows = rows_from(&aggregate);
        let order: Vec<u8> = rows.iter().map(|r| r.id.as_bytes()[0]).collect();
        assert_eq!(order, vec![2, 3, 1]);
    }

    #[test]
    fn test_ties_keep_roster_order() {
        let aggregate = aggregate_with_scores(&[(7, 10.0), (4, 10.0), (9, 10.0)]);
        let rows = rows_from(&aggregate);
        let order: Vec<u8> = rows.iter().map(|r| r.id.as_bytes()[0]).collect();
        assert_eq!(order, vec![7, 4, 9]);
    }

    #[test]
    fn test_row_carries_label_string() {
        let aggregate = aggregate_with_scores(&[(1, 0.0)]);
        let rows = rows_from(&aggregate);
        assert_eq!(rows[0].risk_label, "Low");
    }
}
