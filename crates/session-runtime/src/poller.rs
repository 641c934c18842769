//! Frame Poller
//!
//! One logical pipeline per running instance: acquire a frame, decode it,
//! transform each slot, merge into the active session, expose rows. The
//! loop runs on a fixed interval; a tick that fires while a cycle is still
//! in flight is skipped, so two merges can never run concurrently against
//! the same session aggregate. Dropped frames are tolerated indefinitely:
//! each frame only adds to cumulative history.

use crate::rows::{rows_from, DeviceRow};
use frame_protocol::{decode_frame, FrameClient};
use session_store::{DeviceSeries, KeyValueStore, SessionContext, SessionStore};
use signal_transform::{transform_slot, TransformConfig};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::time::MissedTickBehavior;
use tracing::{debug, info, warn};

/// Configuration for the frame poller
#[derive(Debug, Clone)]
pub struct PollerConfig {
    /// Poll interval (default: 1 second)
    pub interval: Duration,
    /// Signal transform parameters
    pub transform: TransformConfig,
}

impl Default for PollerConfig {
    fn default() -> Self {
        Self {
            interval: Duration::from_secs(1),
            transform: TransformConfig::default(),
        }
    }
}

/// Handle for stopping a running poller from another task
#[derive(Debug, Clone)]
pub struct PollerHandle {
    running: Arc<AtomicBool>,
}

impl PollerHandle {
    /// Request the poll loop to stop after the current cycle
    pub fn stop(&self) {
        self.running.store(false, Ordering::SeqCst);
    }
}

/// Polling pipeline driver
pub struct FramePoller {
    config: PollerConfig,
    running: Arc<AtomicBool>,
}

impl FramePoller {
    /// Create a new poller
    pub fn new(config: PollerConfig) -> Self {
        Self {
            config,
            running: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Get a stop handle for this poller
    pub fn handle(&self) -> PollerHandle {
        PollerHandle {
            running: Arc::clone(&self.running),
        }
    }

    /// Check if the poll loop is running
    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::SeqCst)
    }

    /// Run the poll loop until stopped.
    ///
    /// Each cycle that fails (transport, malformed frame, persistence) is
    /// logged and dropped; the aggregate stays at its last merged state and
    /// the loop waits for the next tick. Dropping this future abandons any
    /// in-flight acquisition without merging its result.
    pub async fn run<S: KeyValueStore>(
        &mut self,
        client: &mut FrameClient,
        store: &SessionStore<S>,
        ctx: &SessionContext,
        row_tx: mpsc::Sender<Vec<DeviceRow>>,
    ) {
        info!(
            "Starting frame poller for session '{}' at {:?} intervals",
            ctx.active_session, self.config.interval
        );
        self.running.store(true, Ordering::SeqCst);

        let mut interval = tokio::time::interval(self.config.interval);
        interval.set_missed_tick_behavior(MissedTickBehavior::Skip);

        while self.running.load(Ordering::SeqCst) {
            interval.tick().await;
            if !self.running.load(Ordering::SeqCst) {
                break;
            }

            let frame = match client.acquire_frame().await {
                Ok(frame) => frame,
                Err(e) => {
                    warn!("Frame acquisition failed, waiting for next tick: {}", e);
                    continue;
                }
            };

            let slots = match decode_frame(&frame, client.num_devices()) {
                Ok(slots) => slots,
                Err(e) => {
                    warn!("Dropping frame: {}", e);
                    continue;
                }
            };

            let series: Vec<DeviceSeries> = slots
                .iter()
                .map(|slot| DeviceSeries {
                    id: slot.id,
                    series: transform_slot(slot, &self.config.transform),
                })
                .collect();

            let aggregate = match store.merge(ctx, &series) {
                Ok(aggregate) => aggregate,
                Err(e) => {
                    warn!("Merge failed, aggregate unchanged: {}", e);
                    continue;
                }
            };

            let rows = rows_from(&aggregate);
            debug!("Poll cycle produced {} rows", rows.len());
            if row_tx.try_send(rows).is_err() {
                debug!("Row consumer not keeping up, batch dropped");
            }
        }

        info!("Frame poller stopped");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use session_store::MemoryStore;

    #[tokio::test(start_paused = true)]
    async fn test_poll_cycles_accumulate_history() {
        let mut client = FrameClient::mock(2);
        let store = SessionStore::new(MemoryStore::new());
        let ctx = SessionContext::new("scrimmage");
        let (tx, mut rx) = mpsc::channel(8);

        let mut poller = FramePoller::new(PollerConfig {
            interval: Duration::from_millis(10),
            transform: TransformConfig::default(),
        });
        let handle = poller.handle();

        let task = tokio::spawn(async move {
            poller.run(&mut client, &store, &ctx, tx).await;
        });

        let first = rx.recv().await.unwrap();
        let second = rx.recv().await.unwrap();
        handle.stop();
        task.await.unwrap();

        assert_eq!(first.len(), 2);
        assert_eq!(second.len(), 2);
        // Two devices per mock frame, 3000 accel + 3000 angular scalars
        // each, accumulating across cycles.
        assert_eq!(first[0].magnitudes.len(), 6000);
        assert_eq!(second[0].magnitudes.len(), 12000);
        // Rows come out ordered by risk.
        assert!(second[0].risk_score >= second[1].risk_score);
    }

    #[tokio::test(start_paused = true)]
    async fn test_stop_ends_the_loop() {
        let mut client = FrameClient::mock(1);
        let store = SessionStore::new(MemoryStore::new());
        let ctx = SessionContext::new("scrimmage");
        let (tx, mut rx) = mpsc::channel(1);

        let mut poller = FramePoller::new(PollerConfig::default());
        let handle = poller.handle();
        let task = tokio::spawn(async move {
            poller.run(&mut client, &store, &ctx, tx).await;
        });

        let _ = rx.recv().await;
        handle.stop();
        task.await.unwrap();
    }
}
