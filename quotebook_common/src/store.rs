//! Owned quote collection and its persistence.
//!
//! `QuoteStore` holds the in-memory quote sequence together with the durable
//! storage it is saved to. Every mutation first reloads the sequence, so
//! records written by another process sharing the storage are kept, then
//! re-persists the full sequence under [`StorageKey::Quotes`].
use log::{debug, info, warn};

use crate::quote::{Quote, default_quotes, next_local_id};
use crate::result::Result;
use crate::storage::{KeyValueStore, StorageKey};

/// Quote sequence plus the storage backing it.
#[derive(Debug)]
pub struct QuoteStore<S: KeyValueStore> {
    quotes: Vec<Quote>,
    storage: S,
}

impl<S: KeyValueStore> QuoteStore<S> {
    /// Loads the persisted sequence from `storage`.
    ///
    /// Falls back to the built-in defaults when nothing is stored or the stored
    /// value is not a valid quote array.
    pub fn load(storage: S) -> Result<Self> {
        let quotes = read_quotes(&storage)?;
        Ok(Self { quotes, storage })
    }

    /// Replaces the in-memory sequence with what storage currently holds.
    pub fn reload(&mut self) -> Result<()> {
        self.storage.reload()?;
        self.quotes = read_quotes(&self.storage)?;
        Ok(())
    }

    /// Serializes the full sequence into storage.
    pub fn save(&mut self) -> Result<()> {
        let json = serde_json::to_string(&self.quotes)?;
        self.storage.set(StorageKey::Quotes, &json)
    }

    /// Validates and appends a user-entered quote with a fresh local id.
    pub fn add(&mut self, text: &str, category: &str) -> Result<Quote> {
        self.reload()?;
        let id = next_local_id(self.max_local_id());
        let quote = Quote::with_id(id, text, category)?;
        self.push_and_save(vec![quote.clone()])?;
        info!("Quote added: {}", quote.render());
        Ok(quote)
    }

    /// Appends one record and saves.
    pub fn append(&mut self, quote: Quote) -> Result<()> {
        self.extend(std::iter::once(quote))
    }

    /// Reloads, appends many records and saves.
    ///
    /// If saving fails the in-memory sequence is rolled back.
    pub fn extend(&mut self, quotes: impl IntoIterator<Item = Quote>) -> Result<()> {
        self.reload()?;
        self.push_and_save(quotes)
    }

    fn push_and_save(&mut self, quotes: impl IntoIterator<Item = Quote>) -> Result<()> {
        let before = self.quotes.len();
        self.quotes.extend(quotes);
        if let Err(e) = self.save() {
            self.quotes.truncate(before);
            return Err(e);
        }
        Ok(())
    }

    /// All quotes in insertion order.
    pub fn quotes(&self) -> &[Quote] {
        &self.quotes
    }

    /// Quote at `index`, if present.
    pub fn get(&self, index: usize) -> Option<&Quote> {
        self.quotes.get(index)
    }

    /// Number of quotes.
    pub fn len(&self) -> usize {
        self.quotes.len()
    }

    /// `true` when there are no quotes.
    pub fn is_empty(&self) -> bool {
        self.quotes.is_empty()
    }

    /// `true` when some quote already carries `id`.
    pub fn contains_id(&self, id: u64) -> bool {
        self.quotes.iter().any(|q| q.id == Some(id))
    }

    /// Identifiers currently present.
    pub fn ids(&self) -> impl Iterator<Item = u64> + '_ {
        self.quotes.iter().filter_map(|q| q.id)
    }

    fn max_local_id(&self) -> Option<u64> {
        self.quotes
            .iter()
            .filter(|q| q.is_local())
            .filter_map(|q| q.id)
            .max()
    }

    /// Backing storage.
    pub fn storage(&self) -> &S {
        &self.storage
    }

    /// Mutable access to the backing storage.
    pub fn storage_mut(&mut self) -> &mut S {
        &mut self.storage
    }
}

fn read_quotes<S: KeyValueStore>(storage: &S) -> Result<Vec<Quote>> {
    let quotes = match storage.get(StorageKey::Quotes)? {
        Some(json) => match serde_json::from_str::<Vec<Quote>>(&json) {
            Ok(quotes) => {
                debug!("Loaded {} quotes from storage", quotes.len());
                quotes
            }
            Err(e) => {
                warn!("Stored quotes are malformed, using defaults: {}", e);
                default_quotes()
            }
        },
        None => {
            debug!("No stored quotes found, using defaults");
            default_quotes()
        }
    };
    Ok(quotes)
}
