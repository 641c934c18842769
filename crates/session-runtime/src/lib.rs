//! Impact Monitor Runtime
//!
//! Owns the acquire → decode → transform → merge → expose poll cycle,
//! session lifecycle (start/resume/end with an archive of ended sessions),
//! and the per-device presentation rows consumed by the UI layer.

mod ledger;
mod poller;
mod rows;

pub use ledger::{ArchivedSession, SessionLedger};
pub use poller::{FramePoller, PollerConfig, PollerHandle};
pub use rows::{rows_from, DeviceRow};

use tracing::Level;
use tracing_subscriber::FmtSubscriber;

/// Initialize logging
pub fn init_logging() {
    let subscriber = FmtSubscriber::builder()
        .with_max_level(Level::INFO)
        .with_target(true)
        .finish();

    tracing::subscriber::set_global_default(subscriber)
        .expect("Failed to set tracing subscriber");
}
