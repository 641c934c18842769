//! Session Lifecycle Ledger
//!
//! Tracks which session the pipeline merges into and keeps an append-only
//! archive of ended sessions. Ending a session is a read-only snapshot of
//! its aggregate, never a mutation: the stored history stays exactly as the
//! last merge left it.

use chrono::{DateTime, Utc};
use session_store::{SessionAggregate, SessionContext};
use tracing::info;

/// A session that has ended, frozen at its final aggregate
#[derive(Debug, Clone)]
pub struct ArchivedSession {
    /// Session name
    pub name: String,
    /// When the session ended
    pub ended_at: DateTime<Utc>,
    /// Final aggregate snapshot (copy, independent of the live store)
    pub snapshot: SessionAggregate,
}

/// Owns the active session context and the archive of ended sessions
#[derive(Debug)]
pub struct SessionLedger {
    context: SessionContext,
    archive: Vec<ArchivedSession>,
}

impl SessionLedger {
    /// Start (or resume) a live session; merges will persist.
    pub fn start(session: &str) -> Self {
        info!("Starting session '{}'", session);
        Self {
            context: SessionContext::new(session),
            archive: Vec::new(),
        }
    }

    /// Open a historical session for viewing; merges are previewed in
    /// memory but never written back.
    pub fn open_read_only(session: &str) -> Self {
        info!("Opening session '{}' read-only", session);
        Self {
            context: SessionContext::read_only(session),
            archive: Vec::new(),
        }
    }

    /// The context passed by reference into every merge
    pub fn context(&self) -> &SessionContext {
        &self.context
    }

    /// Re-point the pipeline at another session.
    pub fn switch_to(&mut self, session: &str, modifications_enabled: bool) {
        info!(
            "Switching active session '{}' -> '{}'",
            self.context.active_session, session
        );
        self.context = SessionContext {
            active_session: session.to_string(),
            modifications_enabled,
        };
    }

    /// End the active session: archive a copy of its final aggregate and
    /// freeze the context so nothing is written until another session
    /// starts.
    pub fn end_session(&mut self, final_snapshot: SessionAggregate) {
        let name = self.context.active_session.clone();
        info!(
            "Ending session '{}' with {} devices",
            name,
            final_snapshot.device_count()
        );
        self.archive.push(ArchivedSession {
            name,
            ended_at: Utc::now(),
            snapshot: final_snapshot,
        });
        self.context.modifications_enabled = false;
    }

    /// Ended sessions, oldest first
    pub fn archive(&self) -> &[ArchivedSession] {
        &self.archive
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use frame_protocol::DeviceId;
    use session_store::{DeviceSeries, MemoryStore, SessionStore};
    use signal_transform::MagnitudeSeries;

    fn slot(accel: Vec<f64>) -> DeviceSeries {
        DeviceSeries {
            id: DeviceId::new([1; 6]),
            series: MagnitudeSeries {
                accel,
                angular: vec![],
            },
        }
    }

    #[test]
    fn test_end_session_freezes_context() {
        let mut ledger = SessionLedger::start("week-3");
        assert!(ledger.context().modifications_enabled);

        ledger.end_session(SessionAggregate::default());
        assert!(!ledger.context().modifications_enabled);
        assert_eq!(ledger.archive().len(), 1);
        assert_eq!(ledger.archive()[0].name, "week-3");
    }

    #[test]
    fn test_archive_snapshot_is_independent_of_store() {
        let store = SessionStore::new(MemoryStore::new());
        let mut ledger = SessionLedger::start("week-3");

        let aggregate = store.merge(ledger.context(), &[slot(vec![40.0])]).unwrap();
        ledger.end_session(aggregate);

        // Later merges under the same name (e.g. a new week-3 run) must not
        // reach into the archived copy.
        ledger.switch_to("week-3", true);
        store.merge(ledger.context(), &[slot(vec![60.0])]).unwrap();

        let archived = &ledger.archive()[0].snapshot;
        let history = &archived.devices[&DeviceId::new([1; 6])];
        assert_eq!(history.magnitudes, vec![40.0]);
        assert_eq!(history.high_count, 0);
    }

    #[test]
    fn test_switch_repoints_active_session() {
        let mut ledger = SessionLedger::start("a");
        ledger.switch_to("b", true);
        assert_eq!(ledger.context().active_session, "b");
        assert!(ledger.context().modifications_enabled);
    }
}
