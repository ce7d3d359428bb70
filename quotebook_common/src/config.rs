//! Runtime configuration shared by the CLI and the sync daemon.
//!
//! Paths default to the platform data directory (via `directories`) and the OS
//! temp directory; both binaries override them from their command-line flags.
use std::env;
use std::path::PathBuf;
use std::time::Duration;

use directories::ProjectDirs;

use crate::error::QuoteError;
use crate::result::Result;
use crate::storage::FileStore;

/// Environment variable overriding the data directory.
pub const DATA_DIR_ENV: &str = "QUOTEBOOK_DATA_DIR";
/// Durable storage file name inside the data directory.
pub const STORAGE_FILE: &str = "storage.json";
/// Session storage file name inside the temp directory.
pub const SESSION_FILE: &str = "quotebook-session.json";

/// Placeholder endpoint used for remote sync.
pub const DEFAULT_ENDPOINT: &str = "https://jsonplaceholder.typicode.com/posts";
/// Number of remote records fetched per sync.
pub const DEFAULT_BATCH_SIZE: usize = 5;
/// Seconds between remote fetches.
pub const DEFAULT_FETCH_INTERVAL_SECS: u64 = 30;
/// Seconds between pushes of local quotes.
pub const DEFAULT_PUSH_INTERVAL_SECS: u64 = 60;

/// Where quotes and session state are kept.
#[derive(Debug, Clone)]
pub struct AppConfig {
    /// Directory holding the durable storage file.
    pub data_dir: PathBuf,
    /// Session storage file.
    pub session_file: PathBuf,
}

impl AppConfig {
    /// Resolves paths: explicit values first, then `QUOTEBOOK_DATA_DIR`, then
    /// platform defaults.
    pub fn resolve(data_dir: Option<PathBuf>, session_file: Option<PathBuf>) -> Result<Self> {
        let data_dir = match data_dir.or_else(|| env::var_os(DATA_DIR_ENV).map(PathBuf::from)) {
            Some(dir) => dir,
            None => default_data_dir()?,
        };
        let session_file = session_file.unwrap_or_else(|| env::temp_dir().join(SESSION_FILE));
        Ok(Self {
            data_dir,
            session_file,
        })
    }

    /// Path of the durable storage file.
    pub fn storage_path(&self) -> PathBuf {
        self.data_dir.join(STORAGE_FILE)
    }

    /// Opens the durable store.
    pub fn open_durable(&self) -> Result<FileStore> {
        FileStore::open(self.storage_path())
    }

    /// Opens the session store.
    pub fn open_session(&self) -> Result<FileStore> {
        FileStore::open(&self.session_file)
    }
}

/// Platform data directory, e.g. `~/.local/share/quotebook` on Linux.
pub fn default_data_dir() -> Result<PathBuf> {
    ProjectDirs::from("com", "Quotebook", "quotebook")
        .map(|dirs| dirs.data_dir().to_path_buf())
        .ok_or_else(|| QuoteError::DataDir("no home directory found".to_string()))
}

/// Remote sync settings.
#[derive(Debug, Clone)]
pub struct SyncConfig {
    /// Endpoint used for both GET and POST.
    pub endpoint: String,
    /// Records requested per fetch.
    pub batch_size: usize,
    /// Interval between fetch-and-merge runs.
    pub fetch_interval: Duration,
    /// Interval between pushes of local quotes.
    pub push_interval: Duration,
    /// `userId` attached to pushed records.
    pub user_id: u64,
    /// HTTP request timeout.
    pub timeout: Duration,
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            endpoint: DEFAULT_ENDPOINT.to_string(),
            batch_size: DEFAULT_BATCH_SIZE,
            fetch_interval: Duration::from_secs(DEFAULT_FETCH_INTERVAL_SECS),
            push_interval: Duration::from_secs(DEFAULT_PUSH_INTERVAL_SECS),
            user_id: 1,
            timeout: Duration::from_secs(10),
        }
    }
}
