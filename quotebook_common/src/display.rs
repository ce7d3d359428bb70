//! Random quote selection and restoring the last shown quote.
use log::debug;
use rand::Rng;

use crate::filter::CategoryFilter;
use crate::quote::Quote;
use crate::result::Result;
use crate::storage::{KeyValueStore, StorageKey};
use crate::store::QuoteStore;

/// Message shown when the filtered collection is empty.
pub const EMPTY_MESSAGE: &str = "No quotes available. Please add one!";

/// Outcome of [`show_random`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Shown {
    /// A quote was picked; `index` is its position in the full collection.
    Quote {
        /// Position in the full collection.
        index: usize,
        /// The picked quote.
        quote: Quote,
    },
    /// Nothing matched the filter.
    Empty,
}

/// Picks one element uniformly at random, or `None` when `candidates` is empty.
pub fn pick_random<'a, T, R: Rng>(candidates: &'a [T], rng: &mut R) -> Option<&'a T> {
    if candidates.is_empty() {
        return None;
    }
    candidates.get(rng.random_range(0..candidates.len()))
}

/// Picks a random quote passing `filter` and remembers its index in `session`.
pub fn show_random<S, T, R>(
    store: &QuoteStore<S>,
    filter: &CategoryFilter,
    session: &mut T,
    rng: &mut R,
) -> Result<Shown>
where
    S: KeyValueStore,
    T: KeyValueStore,
    R: Rng,
{
    let candidates: Vec<usize> = store
        .quotes()
        .iter()
        .enumerate()
        .filter(|(_, q)| filter.matches(q))
        .map(|(i, _)| i)
        .collect();

    let Some(&index) = pick_random(&candidates, rng) else {
        debug!("No quotes match filter {}", filter);
        return Ok(Shown::Empty);
    };
    session.set(StorageKey::LastQuoteIndex, &index.to_string())?;
    let quote = store.quotes()[index].clone();
    Ok(Shown::Quote { index, quote })
}

/// Returns the quote shown last in this session, if it still exists.
pub fn restore_last<'a, S, T>(
    store: &'a QuoteStore<S>,
    session: &T,
) -> Result<Option<(usize, &'a Quote)>>
where
    S: KeyValueStore,
    T: KeyValueStore,
{
    let Some(raw) = session.get(StorageKey::LastQuoteIndex)? else {
        return Ok(None);
    };
    let Ok(index) = raw.trim().parse::<usize>() else {
        debug!("Ignoring invalid stored quote index {:?}", raw);
        return Ok(None);
    };
    Ok(store.get(index).map(|quote| (index, quote)))
}
