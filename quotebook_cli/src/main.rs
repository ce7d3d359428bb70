//! Quotebook CLI: shows random quotes, adds new ones, filters by category,
//! imports/exports JSON files and runs one-shot syncs with the remote endpoint.
//! Quotes are kept in a durable JSON store; the last shown quote is remembered
//! in a session store in the OS temp directory.
//!
//! Usage example (CLI):
//! ```bash
//! quotebook add --text "Simplicity is prerequisite for reliability." --category Engineering
//! quotebook filter Engineering
//! quotebook show
//! quotebook export --out ./quotes.json
//! quotebook import ./more-quotes.json
//! quotebook sync --limit 5
//! ```
#![warn(missing_docs)]
mod args;
mod commands;

use crate::args::Args;
use crate::commands::App;
use clap::Parser;
use quotebook_common::Result;
use quotebook_common::config::AppConfig;
use std::io;
use std::process;

fn main() {
    init_logger();
    let args = Args::parse();

    if let Err(e) = run(args) {
        eprintln!("Error: {}", e);
        process::exit(1);
    }
}

fn run(args: Args) -> Result<()> {
    let config = AppConfig::resolve(args.data_dir, args.session_file)?;
    let mut app = App::open(&config)?;
    let mut stdout = io::stdout().lock();
    app.run(args.command, &mut stdout)
}

fn init_logger() {
    env_logger::Builder::new()
        .filter_level(log::LevelFilter::Warn)
        .parse_default_env()
        .init();
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args_in(dir: &std::path::Path, command: &[&str]) -> Args {
        let data_dir = dir.join("data");
        let session = dir.join("session.json");
        let mut argv = vec![
            "quotebook".to_string(),
            "--data-dir".to_string(),
            data_dir.display().to_string(),
            "--session-file".to_string(),
            session.display().to_string(),
        ];
        argv.extend(command.iter().map(|s| s.to_string()));
        Args::try_parse_from(argv).unwrap()
    }

    #[test]
    fn test_run_reports_readable_error() {
        let dir = tempfile::tempdir().unwrap();
        let args = args_in(dir.path(), &["add", "--text", " ", "--category", "Life"]);
        let err = run(args).unwrap_err();
        let shown = format!("Error: {}", err);
        assert!(shown.starts_with("Error: Please fill in both the quote and the category"));
        assert!(!shown.contains("EmptyField"));
    }

    #[test]
    fn test_run_succeeds_for_valid_command() {
        let dir = tempfile::tempdir().unwrap();
        let args = args_in(dir.path(), &["add", "--text", "Stay curious", "--category", "Life"]);
        run(args).unwrap();
        run(args_in(dir.path(), &["filter", "Life"])).unwrap();
        assert!(run(args_in(dir.path(), &["filter", "Unknown"])).is_err());
    }
}
