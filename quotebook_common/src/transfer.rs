//! JSON import and export of the quote collection.
//!
//! Exported files are pretty-printed arrays of `{id?, text, category}` objects.
//! Imports accept the same shape and are validated as a whole before anything
//! is appended, so a rejected file leaves the store untouched.
use std::fs;
use std::path::Path;

use log::info;
use serde_json::Value;

use crate::error::QuoteError;
use crate::quote::Quote;
use crate::result::Result;
use crate::storage::KeyValueStore;
use crate::store::QuoteStore;

/// File name suggested for exports.
pub const DEFAULT_EXPORT_FILE: &str = "quotes.json";

/// Serializes `quotes` as a pretty-printed JSON array.
pub fn export_json(quotes: &[Quote]) -> Result<String> {
    Ok(serde_json::to_string_pretty(quotes)?)
}

/// Writes `quotes` to `path` as JSON.
pub fn export_to_file(quotes: &[Quote], path: &Path) -> Result<()> {
    let json = export_json(quotes)?;
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)?;
    }
    fs::write(path, json)?;
    info!("Exported {} quotes to {}", quotes.len(), path.display());
    Ok(())
}

/// Parses and validates an imported JSON document.
///
/// The document must be an array whose elements are objects with string `text`
/// and `category` fields. An `id` is kept when it is a non-negative integer.
pub fn parse_import(json: &str) -> Result<Vec<Quote>> {
    let value: Value = serde_json::from_str(json)?;
    let Value::Array(items) = value else {
        return Err(QuoteError::InvalidImport(
            "Expected an array of quotes".to_string(),
        ));
    };

    items
        .iter()
        .enumerate()
        .map(|(index, item)| parse_item(index, item))
        .collect()
}

fn parse_item(index: usize, item: &Value) -> Result<Quote> {
    let invalid = |reason: &str| {
        QuoteError::InvalidImport(format!(
            "Invalid quote format in imported data (item {}): {}",
            index, reason
        ))
    };

    let object = item.as_object().ok_or_else(|| invalid("not an object"))?;
    let text = object
        .get("text")
        .and_then(Value::as_str)
        .ok_or_else(|| invalid("`text` must be a string"))?;
    let category = object
        .get("category")
        .and_then(Value::as_str)
        .ok_or_else(|| invalid("`category` must be a string"))?;
    let id = match object.get("id") {
        None | Some(Value::Null) => None,
        Some(id) => Some(
            id.as_u64()
                .ok_or_else(|| invalid("`id` must be a non-negative integer"))?,
        ),
    };

    Ok(Quote {
        id,
        text: text.to_string(),
        category: category.to_string(),
    })
}

/// Imports a JSON document into `store`, returning the number of quotes added.
pub fn import_json<S: KeyValueStore>(store: &mut QuoteStore<S>, json: &str) -> Result<usize> {
    let imported = parse_import(json)?;
    let count = imported.len();
    store.extend(imported)?;
    info!("Imported {} quotes", count);
    Ok(count)
}

/// Reads `path` and imports it into `store`.
pub fn import_from_file<S: KeyValueStore>(store: &mut QuoteStore<S>, path: &Path) -> Result<usize> {
    let json = fs::read_to_string(path)?;
    import_json(store, &json)
}
