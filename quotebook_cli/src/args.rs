//! Command-line arguments for the quotebook CLI.
//!
//! This module defines the CLI interface using `clap`. See `main` for end-to-end usage.
use std::path::PathBuf;

use clap::{Parser, Subcommand};
use quotebook_common::transfer::DEFAULT_EXPORT_FILE;

/// Parsed command-line arguments.
#[derive(Debug, Parser)]
#[command(version, about, long_about = None)]
pub struct Args {
    /// Directory holding the durable quote storage (defaults to the platform data dir
    /// or `QUOTEBOOK_DATA_DIR`).
    #[clap(long, global = true)]
    pub data_dir: Option<PathBuf>,

    /// Session storage file (defaults to a file in the OS temp dir).
    #[clap(long, global = true)]
    pub session_file: Option<PathBuf>,

    /// Action to perform.
    #[command(subcommand)]
    pub command: Command,
}

/// Supported actions.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Show a random quote, honouring the saved category filter.
    Show {
        /// Category to pick from (`all` for every quote). Defaults to the saved filter.
        #[clap(long)]
        category: Option<String>,
    },
    /// Show the quote displayed last in this session.
    Last,
    /// Add a new quote.
    Add {
        /// Quote text.
        #[clap(long)]
        text: String,
        /// Quote category.
        #[clap(long)]
        category: String,
    },
    /// List quotes, honouring the saved category filter.
    List {
        /// Category to list (`all` for every quote). Defaults to the saved filter.
        #[clap(long)]
        category: Option<String>,
    },
    /// List the distinct categories.
    Categories,
    /// Select and remember a category filter (`all` clears it).
    Filter {
        /// Category name or `all`.
        category: String,
    },
    /// Export every quote to a JSON file.
    Export {
        /// Destination file.
        #[clap(long, default_value = DEFAULT_EXPORT_FILE)]
        out: PathBuf,
    },
    /// Import quotes from a JSON file.
    Import {
        /// JSON file holding an array of `{text, category}` objects.
        path: PathBuf,
    },
    /// Run one sync round against the remote endpoint.
    Sync {
        /// Remote endpoint URL.
        #[clap(long)]
        endpoint: Option<String>,
        /// Number of remote records to fetch.
        #[clap(long)]
        limit: Option<usize>,
        /// Only fetch; do not push local quotes.
        #[clap(long)]
        no_push: bool,
    },
}
