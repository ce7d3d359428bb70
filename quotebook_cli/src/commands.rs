//! Execution of CLI commands against the persisted quote store.
//!
//! `App::open` loads the durable and session stores once per invocation and
//! `App::run` applies one command, writing user-facing text to the provided
//! writer.
use std::io::Write;

use log::{debug, warn};
use quotebook_common::config::{AppConfig, SyncConfig};
use quotebook_common::display::{self, EMPTY_MESSAGE, Shown};
use quotebook_common::filter::{self, CategoryFilter};
use quotebook_common::storage::{FileStore, KeyValueStore};
use quotebook_common::sync::remote::{HttpRemote, RemoteClient};
use quotebook_common::sync::service::{merge_remote, push_local};
use quotebook_common::transfer;
use quotebook_common::{QuoteError, QuoteStore, Result};

use crate::args::Command;

/// Loaded state for one CLI invocation.
pub struct App<D: KeyValueStore, S: KeyValueStore> {
    store: QuoteStore<D>,
    session: S,
}

impl App<FileStore, FileStore> {
    /// Opens the durable and session stores described by `config`.
    pub fn open(config: &AppConfig) -> Result<Self> {
        let store = QuoteStore::load(config.open_durable()?)?;
        let session = config.open_session()?;
        debug!(
            "Loaded {} quotes from {}",
            store.len(),
            config.storage_path().display()
        );
        Ok(Self::new(store, session))
    }
}

impl<D: KeyValueStore, S: KeyValueStore> App<D, S> {
    /// Wraps already loaded stores.
    pub fn new(store: QuoteStore<D>, session: S) -> Self {
        Self { store, session }
    }

    /// The quote collection.
    pub fn store(&self) -> &QuoteStore<D> {
        &self.store
    }

    /// Applies `command`, writing its output to `out`.
    pub fn run<W: Write>(&mut self, command: Command, out: &mut W) -> Result<()> {
        match command {
            Command::Show { category } => self.show(category.as_deref(), out),
            Command::Last => self.last(out),
            Command::Add { text, category } => {
                let quote = self.store.add(&text, &category)?;
                writeln!(out, "Quote added successfully!")?;
                writeln!(out, "{}", quote.render())?;
                Ok(())
            }
            Command::List { category } => self.list(category.as_deref(), out),
            Command::Categories => {
                for category in filter::categories(self.store.quotes()) {
                    writeln!(out, "{}", category)?;
                }
                Ok(())
            }
            Command::Filter { category } => self.select_filter(&category, out),
            Command::Export { out: path } => {
                transfer::export_to_file(self.store.quotes(), &path)?;
                writeln!(out, "Exported {} quotes to {}", self.store.len(), path.display())?;
                Ok(())
            }
            Command::Import { path } => {
                let count = transfer::import_from_file(&mut self.store, &path)?;
                writeln!(out, "{} quotes imported successfully!", count)?;
                Ok(())
            }
            Command::Sync {
                endpoint,
                limit,
                no_push,
            } => {
                let mut config = SyncConfig::default();
                if let Some(endpoint) = endpoint {
                    config.endpoint = endpoint;
                }
                if let Some(limit) = limit {
                    config.batch_size = limit;
                }
                let remote = HttpRemote::new(&config.endpoint, config.timeout)?;
                self.sync(&remote, &config, !no_push, out)
            }
        }
    }

    /// Explicit category when given, otherwise the remembered selection.
    fn active_filter(&self, category: Option<&str>) -> Result<CategoryFilter> {
        match category {
            Some(raw) => Ok(raw.parse().unwrap_or_default()),
            None => filter::restore_selected(self.store.storage(), self.store.quotes()),
        }
    }

    fn show<W: Write>(&mut self, category: Option<&str>, out: &mut W) -> Result<()> {
        let active = self.active_filter(category)?;
        let mut rng = rand::rng();
        match display::show_random(&self.store, &active, &mut self.session, &mut rng)? {
            Shown::Quote { quote, .. } => writeln!(out, "{}", quote.render())?,
            Shown::Empty => writeln!(out, "{}", EMPTY_MESSAGE)?,
        }
        Ok(())
    }

    fn last<W: Write>(&self, out: &mut W) -> Result<()> {
        match display::restore_last(&self.store, &self.session)? {
            Some((_, quote)) => writeln!(out, "{}", quote.render())?,
            None => writeln!(out, "No quote shown yet in this session.")?,
        }
        Ok(())
    }

    fn list<W: Write>(&self, category: Option<&str>, out: &mut W) -> Result<()> {
        let active = self.active_filter(category)?;
        let quotes = filter::apply(self.store.quotes(), &active);
        if quotes.is_empty() {
            writeln!(out, "{}", EMPTY_MESSAGE)?;
        }
        for quote in quotes {
            writeln!(out, "{}", quote.render())?;
        }
        Ok(())
    }

    fn select_filter<W: Write>(&mut self, raw: &str, out: &mut W) -> Result<()> {
        let selected: CategoryFilter = raw.parse().unwrap_or_default();
        if let CategoryFilter::Category(category) = &selected {
            if !self.store.quotes().iter().any(|q| &q.category == category) {
                return Err(QuoteError::Format(format!("Unknown category: {}", category)));
            }
        }
        filter::save_selected(self.store.storage_mut(), &selected)?;
        let shown = filter::apply(self.store.quotes(), &selected).len();
        writeln!(out, "Filter set to {} ({} quotes)", selected, shown)?;
        Ok(())
    }

    /// One fetch-and-merge round, followed by a push of local quotes.
    pub fn sync<R, W>(
        &mut self,
        remote: &R,
        config: &SyncConfig,
        push: bool,
        out: &mut W,
    ) -> Result<()>
    where
        R: RemoteClient + ?Sized,
        W: Write,
    {
        let posts = remote.fetch_batch(config.batch_size)?;
        let added = merge_remote(&mut self.store, posts)?;
        writeln!(out, "Quotes synced with server: {} new", added)?;

        if push {
            let report = push_local(self.store.quotes(), remote, config.user_id);
            if report.failed > 0 {
                warn!("{} quotes could not be pushed", report.failed);
            }
            writeln!(out, "Pushed {} quotes ({} failed)", report.sent, report.failed)?;
        }
        Ok(())
    }
}
