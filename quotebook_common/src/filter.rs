//! Category filtering and the persisted filter selection.
use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

use log::debug;

use crate::quote::Quote;
use crate::result::Result;
use crate::storage::{KeyValueStore, StorageKey};

/// Keyword selecting the unfiltered collection.
pub const ALL: &str = "all";

/// Active category filter.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum CategoryFilter {
    /// No filtering.
    #[default]
    All,
    /// Only quotes whose category equals the given name.
    Category(String),
}

impl CategoryFilter {
    /// `true` when `quote` passes the filter.
    pub fn matches(&self, quote: &Quote) -> bool {
        match self {
            CategoryFilter::All => true,
            CategoryFilter::Category(category) => quote.category == *category,
        }
    }
}

impl FromStr for CategoryFilter {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        let trimmed = s.trim();
        if trimmed.is_empty() || trimmed.eq_ignore_ascii_case(ALL) {
            Ok(CategoryFilter::All)
        } else {
            Ok(CategoryFilter::Category(trimmed.to_string()))
        }
    }
}

impl fmt::Display for CategoryFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CategoryFilter::All => f.write_str(ALL),
            CategoryFilter::Category(category) => f.write_str(category),
        }
    }
}

/// Distinct categories present in `quotes`, sorted.
pub fn categories(quotes: &[Quote]) -> Vec<String> {
    quotes
        .iter()
        .map(|q| q.category.clone())
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect()
}

/// Quotes passing `filter`, in their original order.
pub fn apply<'a>(quotes: &'a [Quote], filter: &CategoryFilter) -> Vec<&'a Quote> {
    quotes.iter().filter(|q| filter.matches(q)).collect()
}

/// Persists the selected filter.
pub fn save_selected<S: KeyValueStore>(storage: &mut S, filter: &CategoryFilter) -> Result<()> {
    storage.set(StorageKey::SelectedCategory, &filter.to_string())
}

/// Restores the persisted filter.
///
/// Falls back to [`CategoryFilter::All`] when nothing is stored or the stored
/// category no longer exists in `quotes`.
pub fn restore_selected<S: KeyValueStore>(storage: &S, quotes: &[Quote]) -> Result<CategoryFilter> {
    let Some(raw) = storage.get(StorageKey::SelectedCategory)? else {
        return Ok(CategoryFilter::All);
    };
    let filter: CategoryFilter = raw.parse().unwrap_or_default();
    match &filter {
        CategoryFilter::Category(category) if !quotes.iter().any(|q| &q.category == category) => {
            debug!("Stored category {} no longer present, showing all", category);
            Ok(CategoryFilter::All)
        }
        _ => Ok(filter),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::quote::default_quotes;
    use crate::storage::MemoryStore;

    fn sample() -> Vec<Quote> {
        let mut quotes = default_quotes();
        quotes.push(Quote::new("Keep going.", "Motivation").unwrap());
        quotes
    }

    #[test]
    fn test_parse_filter() {
        assert_eq!("all".parse::<CategoryFilter>().unwrap(), CategoryFilter::All);
        assert_eq!("ALL".parse::<CategoryFilter>().unwrap(), CategoryFilter::All);
        assert_eq!(
            " Life ".parse::<CategoryFilter>().unwrap(),
            CategoryFilter::Category("Life".into())
        );
        assert_eq!(CategoryFilter::Category("Life".into()).to_string(), "Life");
    }

    #[test]
    fn test_categories_are_distinct_and_sorted() {
        assert_eq!(categories(&sample()), vec!["Creativity", "Life", "Motivation"]);
        assert!(categories(&[]).is_empty());
    }

    #[test]
    fn test_apply_category_returns_exact_subset() {
        let quotes = sample();
        let filtered = apply(&quotes, &CategoryFilter::Category("Motivation".into()));
        assert_eq!(filtered.len(), 2);
        assert!(filtered.iter().all(|q| q.category == "Motivation"));
        assert_eq!(filtered[1].text, "Keep going.");

        let none = apply(&quotes, &CategoryFilter::Category("motivation".into()));
        assert!(none.is_empty());
    }

    #[test]
    fn test_apply_all_restores_full_sequence() {
        let quotes = sample();
        let all = apply(&quotes, &CategoryFilter::All);
        assert_eq!(all.len(), quotes.len());
        assert!(all.iter().zip(&quotes).all(|(a, b)| *a == b));
    }

    #[test]
    fn test_selection_round_trip() {
        let quotes = sample();
        let mut storage = MemoryStore::new();
        assert_eq!(restore_selected(&storage, &quotes).unwrap(), CategoryFilter::All);

        let life = CategoryFilter::Category("Life".into());
        save_selected(&mut storage, &life).unwrap();
        assert_eq!(restore_selected(&storage, &quotes).unwrap(), life);

        save_selected(&mut storage, &CategoryFilter::All).unwrap();
        assert_eq!(restore_selected(&storage, &quotes).unwrap(), CategoryFilter::All);
    }

    #[test]
    fn test_restore_falls_back_when_category_vanished() {
        let mut storage = MemoryStore::new();
        save_selected(&mut storage, &CategoryFilter::Category("Gone".into())).unwrap();
        assert_eq!(restore_selected(&storage, &sample()).unwrap(), CategoryFilter::All);
    }
}
