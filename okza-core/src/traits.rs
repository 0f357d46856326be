//! Trait definitions for Okza.

use crate::models::SearchHistoryEntry;

/// Append-only storage for completed searches.
///
/// Implementors must never rewrite or drop an existing entry; the only
/// destructive operation a ledger offers is clearing the whole store, and
/// that is not part of this trait.
pub trait SearchLedger: Send + Sync {
    /// Error produced by the underlying storage.
    type Error: std::error::Error + Send + Sync + 'static;

    /// Appends one entry.
    ///
    /// # Errors
    ///
    /// Returns the storage error if the entry could not be persisted.
    fn append(&self, entry: &SearchHistoryEntry) -> Result<(), Self::Error>;

    /// Returns entries newest first, keeping at most `limit` when given.
    ///
    /// # Errors
    ///
    /// Returns the storage error if the store exists but cannot be read.
    fn snapshot(&self, limit: Option<usize>) -> Result<Vec<SearchHistoryEntry>, Self::Error>;
}
