//! Command-line arguments for the sync daemon.
use std::path::PathBuf;
use std::time::Duration;

use clap::Parser;
use quotebook_common::config::{
    DEFAULT_BATCH_SIZE, DEFAULT_ENDPOINT, DEFAULT_FETCH_INTERVAL_SECS, DEFAULT_PUSH_INTERVAL_SECS,
    SyncConfig,
};

/// Parsed command-line arguments.
#[derive(Debug, Parser)]
#[command(
    version,
    about = "Periodically reconciles local quotes with a remote endpoint",
    long_about = None
)]
pub struct Args {
    /// Directory holding the durable quote storage.
    #[clap(long)]
    pub data_dir: Option<PathBuf>,

    /// Remote endpoint used for fetching and pushing.
    #[clap(long, default_value = DEFAULT_ENDPOINT)]
    pub endpoint: String,

    /// Remote records fetched per round.
    #[clap(long, default_value_t = DEFAULT_BATCH_SIZE)]
    pub limit: usize,

    /// Seconds between fetch-and-merge rounds.
    #[clap(long, default_value_t = DEFAULT_FETCH_INTERVAL_SECS)]
    pub fetch_interval_secs: u64,

    /// Seconds between pushes of local quotes.
    #[clap(long, default_value_t = DEFAULT_PUSH_INTERVAL_SECS)]
    pub push_interval_secs: u64,

    /// Only fetch; never push local quotes.
    #[clap(long)]
    pub no_push: bool,
}

impl Args {
    /// Sync settings derived from the flags.
    pub fn sync_config(&self) -> SyncConfig {
        SyncConfig {
            endpoint: self.endpoint.clone(),
            batch_size: self.limit,
            fetch_interval: Duration::from_secs(self.fetch_interval_secs.max(1)),
            push_interval: Duration::from_secs(self.push_interval_secs.max(1)),
            ..SyncConfig::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let args = Args::parse_from(["quotebook_sync"]);
        let config = args.sync_config();
        assert_eq!(config.endpoint, DEFAULT_ENDPOINT);
        assert_eq!(config.batch_size, DEFAULT_BATCH_SIZE);
        assert_eq!(config.fetch_interval, Duration::from_secs(DEFAULT_FETCH_INTERVAL_SECS));
        assert!(!args.no_push);
    }

    #[test]
    fn test_zero_interval_is_clamped() {
        let args =
            Args::parse_from(["quotebook_sync", "--fetch-interval-secs", "0", "--limit", "2"]);
        let config = args.sync_config();
        assert_eq!(config.fetch_interval, Duration::from_secs(1));
        assert_eq!(config.batch_size, 2);
    }
}
