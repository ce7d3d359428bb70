//! Quotebook sync daemon.
//!
//! Loads the durable quote store and keeps it reconciled with a remote endpoint
//! until Ctrl+C. Internally it wires together:
//!
//! - `SyncService`: two cancellable scheduled tasks: one fetches a batch of
//!   remote records and merges those whose identifier is not yet present, the
//!   other pushes every local quote to the endpoint (fire-and-forget).
//! - An event loop: a crossbeam `select!` over the service's `SyncEvent`s and a
//!   shutdown channel fed by the Ctrl+C handler.
//!
//! Failures of a single round are logged and reported as `SyncEvent::Failed`; the
//! daemon keeps running and the local store stays unchanged for that round.
#![warn(missing_docs)]
mod args;
mod stats;

use crate::args::Args;
use crate::stats::SyncStats;
use clap::Parser;
use crossbeam_channel::{bounded, select, unbounded};
use log::{info, warn};
use quotebook_common::QuoteError;
use quotebook_common::QuoteStore;
use quotebook_common::Result;
use quotebook_common::config::AppConfig;
use quotebook_common::sync::{HttpRemote, SyncEvent, SyncService};
use std::sync::{Arc, Mutex};

fn main() -> Result<(), QuoteError> {
    init_logger();
    let args = Args::parse();
    let config = AppConfig::resolve(args.data_dir.clone(), None)?;
    let sync_config = args.sync_config();

    let store = QuoteStore::load(config.open_durable()?)?;
    info!(
        "Loaded {} quotes from {}",
        store.len(),
        config.storage_path().display()
    );
    let store = Arc::new(Mutex::new(store));
    let remote = Arc::new(HttpRemote::new(&sync_config.endpoint, sync_config.timeout)?);

    let (shutdown_tx, shutdown_rx) = bounded::<()>(1);
    ctrlc::set_handler(move || {
        let _ = shutdown_tx.try_send(());
    })
    .map_err(|e| QuoteError::Format(format!("Error setting Ctrl+C handler: {}", e)))?;

    let (events_tx, events_rx) = unbounded::<SyncEvent>();
    let service = SyncService::start(
        Arc::clone(&store),
        remote,
        &sync_config,
        !args.no_push,
        events_tx,
    )?;
    info!(
        "Syncing with {} every {:?} (push every {:?}). Press Ctrl+C to exit.",
        sync_config.endpoint, sync_config.fetch_interval, sync_config.push_interval
    );

    let mut stats = SyncStats::default();
    loop {
        select! {
            recv(events_rx) -> msg => match msg {
                Ok(event) => {
                    if let SyncEvent::Failed(reason) = &event {
                        warn!("Sync round failed: {}", reason);
                    }
                    stats.record(&event);
                }
                Err(_) => break,
            },
            recv(shutdown_rx) -> _ => {
                info!("Ctrl+C received. Shutting down sync...");
                break;
            }
        }
    }

    service.stop();
    info!(
        "Sync stopped: {} fetches, {} quotes merged, {} pushed, {} failures. {} quotes stored.",
        stats.fetches,
        stats.merged,
        stats.pushed,
        stats.failures + stats.push_failures,
        store.lock()?.len()
    );
    Ok(())
}

fn init_logger() {
    env_logger::Builder::new()
        .filter_level(log::LevelFilter::Info)
        .parse_default_env()
        .init();
}
