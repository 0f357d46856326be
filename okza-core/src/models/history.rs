//! Search history entries.

use chrono::{DateTime, Local, NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};

/// Format used when writing timestamps to the history store.
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Additional layouts accepted when reading timestamps back.
const ALTERNATE_FORMATS: &[&str] = &["%Y-%m-%dT%H:%M:%S", "%Y-%m-%d %H:%M:%S%.f", "%Y-%m-%d %H:%M"];

/// One completed search.
///
/// Entries are never modified once written. A timestamp that could not be
/// parsed is stored as [`NaiveDateTime::MIN`] so that it orders before every
/// real timestamp.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchHistoryEntry {
    /// Keyword that was searched.
    pub keyword: String,
    /// Local time of the search.
    pub timestamp: NaiveDateTime,
}

impl SearchHistoryEntry {
    /// Creates an entry with an explicit timestamp.
    pub fn new(keyword: impl Into<String>, timestamp: NaiveDateTime) -> Self {
        Self {
            keyword: keyword.into(),
            timestamp,
        }
    }

    /// Creates an entry stamped with the current local time.
    pub fn now(keyword: impl Into<String>) -> Self {
        Self::new(keyword, Local::now().naive_local())
    }

    /// Creates an entry from raw stored values, coercing a bad timestamp.
    pub fn from_raw(keyword: impl Into<String>, raw_timestamp: &str) -> Self {
        Self::new(keyword, parse_timestamp(raw_timestamp))
    }

    /// Returns false when the stored timestamp could not be parsed.
    pub fn has_known_timestamp(&self) -> bool {
        self.timestamp != NaiveDateTime::MIN
    }

    /// Formats the timestamp the way the store writes it.
    ///
    /// Unparsable timestamps render as an empty string.
    pub fn formatted_timestamp(&self) -> String {
        if self.has_known_timestamp() {
            self.timestamp.format(TIMESTAMP_FORMAT).to_string()
        } else {
            String::new()
        }
    }
}

/// Parses a stored timestamp, falling back to [`NaiveDateTime::MIN`].
fn parse_timestamp(raw: &str) -> NaiveDateTime {
    let raw = raw.trim();

    if let Ok(ts) = NaiveDateTime::parse_from_str(raw, TIMESTAMP_FORMAT) {
        return ts;
    }
    for format in ALTERNATE_FORMATS {
        if let Ok(ts) = NaiveDateTime::parse_from_str(raw, format) {
            return ts;
        }
    }
    if let Ok(ts) = DateTime::parse_from_rfc3339(raw) {
        return ts.with_timezone(&Local).naive_local();
    }
    if let Some(ts) = NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
    {
        return ts;
    }

    NaiveDateTime::MIN
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_store_format() {
        let entry = SearchHistoryEntry::from_raw("casque", "2025-03-14 09:26:53");
        assert!(entry.has_known_timestamp());
        assert_eq!(entry.formatted_timestamp(), "2025-03-14 09:26:53");
    }

    #[test]
    fn test_parse_alternate_formats() {
        for raw in ["2025-03-14T09:26:53", "2025-03-14 09:26", "2025-03-14"] {
            let entry = SearchHistoryEntry::from_raw("x", raw);
            assert!(entry.has_known_timestamp(), "Failed for {raw}");
        }
    }

    #[test]
    fn test_unparsable_timestamp_is_oldest() {
        let bad = SearchHistoryEntry::from_raw("x", "yesterday-ish");
        let good = SearchHistoryEntry::from_raw("y", "1970-01-01 00:00:00");

        assert!(!bad.has_known_timestamp());
        assert!(bad.timestamp < good.timestamp);
        assert_eq!(bad.formatted_timestamp(), "");
    }
}
