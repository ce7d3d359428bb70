//!
//! Core types and operations shared by the quotebook CLI and the sync daemon.
//!
//! This crate aggregates:
//! - `error`: unified error type `QuoteError` used across the workspace.
//! - `result`: handy `Result<T, QuoteError>` alias.
//! - `quote`: the `Quote` record and identifier rules.
//! - `storage`: durable and session key-value stores.
//! - `store`: the owned, persisted quote collection.
//! - `filter`: category listing, filtering and the remembered selection.
//! - `display`: random selection and last-shown restoration.
//! - `transfer`: JSON import and export.
//! - `config`: paths and sync settings.
//! - `sync`: remote merge/push and the scheduled sync service.
#![warn(missing_docs)]
pub mod config;
pub mod display;
pub mod error;
pub mod filter;
pub mod quote;
pub mod result;
pub mod storage;
pub mod store;
pub mod sync;
pub mod transfer;

pub use error::QuoteError;
pub use quote::Quote;
pub use result::Result;
pub use store::QuoteStore;
