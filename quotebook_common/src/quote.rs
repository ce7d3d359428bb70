//! Quote data model.
//!
//! A `Quote` is a text/category pair with an optional identifier. Identifiers are
//! split into two ranges: quotes created on this machine use millisecond UTC
//! timestamps, quotes merged from the remote endpoint live at or above
//! [`REMOTE_ID_BASE`].
use chrono::Utc;
use serde::{Deserialize, Serialize};

use crate::error::QuoteError;
use crate::result::Result;

/// First identifier of the synthetic range assigned to remote quotes.
pub const REMOTE_ID_BASE: u64 = 1_000_000_000_000_000;

/// A single quote.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Quote {
    /// Unique identifier; absent for default and legacy records.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<u64>,
    /// Quote text.
    pub text: String,
    /// Category label used for filtering.
    pub category: String,
}

impl Quote {
    /// Builds a user-entered quote, trimming both fields.
    ///
    /// Fails with [`QuoteError::EmptyField`] when either field is blank.
    pub fn new(text: &str, category: &str) -> Result<Self> {
        let text = text.trim();
        let category = category.trim();
        if text.is_empty() {
            return Err(QuoteError::EmptyField("text"));
        }
        if category.is_empty() {
            return Err(QuoteError::EmptyField("category"));
        }
        Ok(Quote {
            id: None,
            text: text.to_string(),
            category: category.to_string(),
        })
    }

    /// Same as [`Quote::new`] with an identifier attached.
    pub fn with_id(id: u64, text: &str, category: &str) -> Result<Self> {
        let mut quote = Self::new(text, category)?;
        quote.id = Some(id);
        Ok(quote)
    }

    /// `true` when the quote originates from this machine (no id, or an id
    /// below the remote range).
    pub fn is_local(&self) -> bool {
        self.id.is_none_or(|id| id < REMOTE_ID_BASE)
    }

    /// Human-readable one-line form: `"text" [category]`.
    pub fn render(&self) -> String {
        format!("\"{}\" [{}]", self.text, self.category)
    }
}

/// Next local identifier: the current UTC time in milliseconds, bumped past
/// `last` so identifiers stay strictly increasing.
pub fn next_local_id(last: Option<u64>) -> u64 {
    let now = Utc::now().timestamp_millis().max(0) as u64;
    match last {
        Some(last) if last >= now => last + 1,
        _ => now,
    }
}

/// Built-in collection used when nothing has been persisted yet.
pub fn default_quotes() -> Vec<Quote> {
    vec![
        Quote {
            id: None,
            text: "The only limit to our realization of tomorrow is our doubts of today.".into(),
            category: "Motivation".into(),
        },
        Quote {
            id: None,
            text: "Creativity is intelligence having fun.".into(),
            category: "Creativity".into(),
        },
        Quote {
            id: None,
            text: "Life is what happens when you're busy making other plans.".into(),
            category: "Life".into(),
        },
    ]
}
