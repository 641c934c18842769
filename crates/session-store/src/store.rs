//! Session Store: Frame Merging and Persistence
//!
//! `merge` is the sole mutator of a session's aggregate. It loads the
//! last-persisted state, appends the new frame's magnitudes per device,
//! reclassifies over the full history, and writes back. When the session
//! context has modifications disabled, the updated view is still returned
//! but never written, so historical sessions stay frozen on disk.

use crate::aggregate::SessionAggregate;
use crate::kv::KeyValueStore;
use crate::StoreError;
use frame_protocol::DeviceId;
use risk_model::RiskConfig;
use signal_transform::MagnitudeSeries;
use tracing::{debug, info};

/// Explicit per-call session state.
///
/// Replaces ambient "current session" / "network check" flags: every core
/// call receives the active session name and the modification gate by
/// reference, so nothing couples through hidden globals.
#[derive(Debug, Clone)]
pub struct SessionContext {
    /// Session whose aggregate merges target
    pub active_session: String,
    /// Whether merges are written back to persistent storage
    pub modifications_enabled: bool,
}

impl SessionContext {
    /// Context for a live session (merges persist)
    pub fn new(session: &str) -> Self {
        Self {
            active_session: session.to_string(),
            modifications_enabled: true,
        }
    }

    /// Context for viewing a historical session (merges are previewed in
    /// memory, never written)
    pub fn read_only(session: &str) -> Self {
        Self {
            active_session: session.to_string(),
            modifications_enabled: false,
        }
    }
}

/// One device's transformed series from a decoded frame
#[derive(Debug, Clone)]
pub struct DeviceSeries {
    pub id: DeviceId,
    pub series: MagnitudeSeries,
}

/// Suffix of the roster key family
const ROSTER_KEY_SUFFIX: &str = "_macList";

/// Session-scoped aggregation store over a key-value backend
pub struct SessionStore<S> {
    kv: S,
    risk_config: RiskConfig,
}

impl<S: KeyValueStore> SessionStore<S> {
    /// Create a store over the given backend with default risk thresholds
    pub fn new(kv: S) -> Self {
        Self {
            kv,
            risk_config: RiskConfig::default(),
        }
    }

    /// Create a store with custom risk thresholds
    pub fn with_risk_config(kv: S, risk_config: RiskConfig) -> Self {
        Self { kv, risk_config }
    }

    /// Access the underlying backend
    pub fn kv(&self) -> &S {
        &self.kv
    }

    /// Load the aggregate persisted for `session`, empty if none.
    pub fn load(&self, session: &str) -> Result<SessionAggregate, StoreError> {
        let devices: std::collections::HashMap<DeviceId, crate::DeviceHistory> =
            match self.kv.get(session)? {
                Some(payload) => serde_json::from_str(&payload)?,
                None => Default::default(),
            };
        let roster = match self.kv.get(&roster_key(session))? {
            Some(payload) => serde_json::from_str(&payload)?,
            None => {
                // Roster key lost or never written: rebuild in a stable
                // order so enumeration stays deterministic.
                let mut ids: Vec<DeviceId> = devices.keys().copied().collect();
                ids.sort();
                ids
            }
        };
        Ok(SessionAggregate { devices, roster })
    }

    /// Load only the device roster for `session` (enumeration without the
    /// full histories).
    pub fn load_roster(&self, session: &str) -> Result<Vec<DeviceId>, StoreError> {
        match self.kv.get(&roster_key(session))? {
            Some(payload) => Ok(serde_json::from_str(&payload)?),
            None => Ok(Vec::new()),
        }
    }

    /// Merge one decoded frame's transformed slots into the session's
    /// aggregate.
    ///
    /// Always computes and returns the updated aggregate; persists it only
    /// when the context allows modifications. On a write failure the
    /// persisted state is the last successful merge, and the next call
    /// recovers by re-reading it.
    pub fn merge(
        &self,
        ctx: &SessionContext,
        slots: &[DeviceSeries],
    ) -> Result<SessionAggregate, StoreError> {
        let mut aggregate = self.load(&ctx.active_session)?;

        for slot in slots {
            let history = aggregate.history_mut(slot.id);
            history.append(&slot.series);
            history.reclassify(&self.risk_config);
        }

        if ctx.modifications_enabled {
            self.persist(&ctx.active_session, &aggregate)?;
            debug!(
                "Merged {} slots into session '{}' ({} devices)",
                slots.len(),
                ctx.active_session,
                aggregate.device_count()
            );
        } else {
            info!(
                "Modifications disabled; merge into '{}' computed but not persisted",
                ctx.active_session
            );
        }

        Ok(aggregate)
    }

    fn persist(&self, session: &str, aggregate: &SessionAggregate) -> Result<(), StoreError> {
        let devices = serde_json::to_string(&aggregate.devices)?;
        let roster = serde_json::to_string(&aggregate.roster)?;
        self.kv.set(session, &devices)?;
        self.kv.set(&roster_key(session), &roster)?;
        Ok(())
    }
}

fn roster_key(session: &str) -> String {
    format!("{}{}", session, ROSTER_KEY_SUFFIX)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::kv::MemoryStore;
    use std::sync::atomic::{AtomicBool, Ordering};

    fn series(accel: Vec<f64>) -> MagnitudeSeries {
        MagnitudeSeries {
            accel,
            angular: vec![0.5],
        }
    }

    fn slot(id_byte: u8, accel: Vec<f64>) -> DeviceSeries {
        DeviceSeries {
            id: DeviceId::new([id_byte; 6]),
            series: series(accel),
        }
    }

    #[test]
    fn test_merge_accumulates_across_frames() {
        let store = SessionStore::new(MemoryStore::new());
        let ctx = SessionContext::new("practice-1");

        store.merge(&ctx, &[slot(1, vec![40.0])]).unwrap();
        let aggregate = store.merge(&ctx, &[slot(1, vec![47.0])]).unwrap();

        let history = &aggregate.devices[&DeviceId::new([1; 6])];
        assert_eq!(history.magnitudes, vec![40.0, 0.5, 47.0, 0.5]);
        assert_eq!(history.angular, vec![0.5, 0.5]);
        assert_eq!(history.low_count, 1);
        assert_eq!(history.mid_count, 1);
    }

    #[test]
    fn test_same_identifier_maps_to_same_history() {
        let store = SessionStore::new(MemoryStore::new());
        let ctx = SessionContext::new("practice-1");

        store.merge(&ctx, &[slot(9, vec![40.0]), slot(3, vec![1.0])]).unwrap();
        let aggregate = store.merge(&ctx, &[slot(9, vec![41.0])]).unwrap();

        assert_eq!(aggregate.device_count(), 2);
        let history = &aggregate.devices[&DeviceId::new([9; 6])];
        assert_eq!(history.low_count, 2);
    }

    #[test]
    fn test_risk_recomputed_from_full_history() {
        let store = SessionStore::new(MemoryStore::new());
        let ctx = SessionContext::new("practice-1");

        let first = store.merge(&ctx, &[slot(1, vec![40.0])]).unwrap();
        let second = store.merge(&ctx, &[slot(1, vec![40.0])]).unwrap();

        let id = DeviceId::new([1; 6]);
        assert!(second.devices[&id].risk_score > first.devices[&id].risk_score);
    }

    #[test]
    fn test_disabled_modifications_leave_storage_untouched() {
        let store = SessionStore::new(MemoryStore::new());
        let live = SessionContext::new("practice-1");
        store.merge(&live, &[slot(1, vec![40.0])]).unwrap();

        let before_devices = store.kv().get("practice-1").unwrap();
        let before_roster = store.kv().get("practice-1_macList").unwrap();

        let frozen = SessionContext::read_only("practice-1");
        let preview = store.merge(&frozen, &[slot(1, vec![60.0])]).unwrap();
        store.merge(&frozen, &[slot(2, vec![55.0])]).unwrap();

        // The preview reflects the merge...
        assert_eq!(preview.devices[&DeviceId::new([1; 6])].high_count, 1);
        // ...but persisted bytes are identical before and after.
        assert_eq!(store.kv().get("practice-1").unwrap(), before_devices);
        assert_eq!(store.kv().get("practice-1_macList").unwrap(), before_roster);
    }

    #[test]
    fn test_roster_persisted_separately() {
        let store = SessionStore::new(MemoryStore::new());
        let ctx = SessionContext::new("practice-1");
        store.merge(&ctx, &[slot(2, vec![1.0]), slot(1, vec![1.0])]).unwrap();

        let roster = store.load_roster("practice-1").unwrap();
        assert_eq!(roster, vec![DeviceId::new([2; 6]), DeviceId::new([1; 6])]);
    }

    /// Backend whose writes can be forced to fail
    struct FlakyStore {
        inner: MemoryStore,
        fail_writes: AtomicBool,
    }

    impl FlakyStore {
        fn new() -> Self {
            Self {
                inner: MemoryStore::new(),
                fail_writes: AtomicBool::new(false),
            }
        }
    }

    impl KeyValueStore for FlakyStore {
        fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
            self.inner.get(key)
        }

        fn set(&self, key: &str, value: &str) -> Result<(), StoreError> {
            if self.fail_writes.load(Ordering::SeqCst) {
                return Err(StoreError::Unavailable("disk full".to_string()));
            }
            self.inner.set(key, value)
        }
    }

    #[test]
    fn test_failed_write_recovers_on_next_merge() {
        let store = SessionStore::new(FlakyStore::new());
        let ctx = SessionContext::new("practice-1");
        store.merge(&ctx, &[slot(1, vec![40.0])]).unwrap();

        store.kv().fail_writes.store(true, Ordering::SeqCst);
        assert!(matches!(
            store.merge(&ctx, &[slot(1, vec![47.0])]),
            Err(StoreError::Unavailable(_))
        ));

        // The failed merge is lost; the next successful one starts from the
        // last persisted state.
        store.kv().fail_writes.store(false, Ordering::SeqCst);
        let aggregate = store.merge(&ctx, &[slot(1, vec![53.0])]).unwrap();
        let history = &aggregate.devices[&DeviceId::new([1; 6])];
        assert_eq!(history.magnitudes, vec![40.0, 0.5, 53.0, 0.5]);
        assert_eq!(history.mid_count, 0);
        assert_eq!(history.high_count, 1);
    }
}
