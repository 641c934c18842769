//! Helmet Impact Pipeline - Main Entry Point

use frame_protocol::FrameClient;
use session_runtime::{init_logging, DeviceRow, FramePoller, PollerConfig, SessionLedger};
use session_store::{JsonFileStore, SessionStore};
use tokio::sync::mpsc;
use tracing::info;

/// Device slots carried per frame by the current sensor bridge firmware
const NUM_DEVICES: usize = 2;

fn env_or(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    init_logging();

    info!("=== Impact Pipeline v{} ===", env!("CARGO_PKG_VERSION"));

    let host = env_or("IMPACT_HOST", "192.168.4.1");
    let port: u16 = env_or("IMPACT_PORT", "80").parse()?;
    let session = env_or("IMPACT_SESSION", "default");
    let store_path = env_or("IMPACT_STORE", "impact-sessions.json");

    info!(
        "Polling {}:{} into session '{}' (store: {})",
        host, port, session, store_path
    );

    let mut client = FrameClient::new(&host, port, NUM_DEVICES);
    let store = SessionStore::new(JsonFileStore::new(&store_path));
    let ledger = SessionLedger::start(&session);

    let (row_tx, mut row_rx) = mpsc::channel::<Vec<DeviceRow>>(8);
    tokio::spawn(async move {
        while let Some(rows) = row_rx.recv().await {
            for row in &rows {
                info!(
                    "{}  low={} mid={} high={}  risk={:.1} ({})",
                    row.id, row.low_count, row.mid_count, row.high_count, row.risk_score,
                    row.risk_label
                );
            }
        }
    });

    let mut poller = FramePoller::new(PollerConfig::default());
    poller
        .run(&mut client, &store, ledger.context(), row_tx)
        .await;

    Ok(())
}
