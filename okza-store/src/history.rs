//! Search history ledger.
//!
//! A CSV file with the header `recherche,timestamp`, one row per completed
//! search. Rows are only ever appended; the whole file can be cleared.
//!
//! Each append encodes the full row first and hands it to a single
//! `write_all` on a file opened in append mode, so concurrent appenders
//! never interleave partial rows. A new file appears atomically with its
//! header and first row already in it, so only the creator writes the
//! header. An existing empty file is renamed away and recreated the same
//! way; rows are never appended to a file without a header.

use std::fs::{self, OpenOptions};
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};

use okza_core::{SearchHistoryEntry, SearchLedger};
use tracing::{debug, info, instrument};

use crate::error::StoreError;

/// Column header of the ledger file.
pub const HEADER: [&str; 2] = ["recherche", "timestamp"];

// ============================================================================
// History Ledger
// ============================================================================

/// CSV-backed [`SearchLedger`].
#[derive(Debug, Clone)]
pub struct HistoryLedger {
    path: PathBuf,
}

impl HistoryLedger {
    /// Creates a ledger stored at `path`. Nothing is touched on disk yet.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Returns the ledger file path.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Appends one entry, creating the file with its header if needed.
    ///
    /// # Errors
    ///
    /// Returns an error if the directory or file cannot be written.
    #[instrument(skip(self, entry), fields(path = %self.path.display()))]
    pub fn append(&self, entry: &SearchHistoryEntry) -> Result<(), StoreError> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }

        let timestamp = entry.formatted_timestamp();
        let mut rows = encode_row(&[entry.keyword.as_str(), timestamp.as_str()])?;

        loop {
            match fs::metadata(&self.path) {
                Ok(meta) if meta.len() > 0 => {
                    OpenOptions::new().append(true).open(&self.path)?.write_all(&rows)?;
                    break;
                }
                Ok(_) => self.reclaim_empty(&mut rows)?,
                Err(e) if e.kind() == ErrorKind::NotFound => {
                    if self.create_with(&rows)? {
                        break;
                    }
                }
                Err(e) => return Err(e.into()),
            }
        }

        debug!(keyword = %entry.keyword, "Recorded search");
        Ok(())
    }

    /// Creates the ledger holding the header and `row`.
    ///
    /// The content is staged in a private file and hard-linked into place,
    /// so the ledger never exists without its header. Returns `false` if
    /// the ledger already exists.
    fn create_with(&self, row: &[u8]) -> Result<bool, StoreError> {
        let staged = self.staging_path();
        fs::write(&staged, with_header(row)?)?;

        let linked = match fs::hard_link(&staged, &self.path) {
            Ok(()) => Ok(true),
            Err(e) if e.kind() == ErrorKind::AlreadyExists => Ok(false),
            Err(e) => Err(e),
        };
        let _ = fs::remove_file(&staged);

        match linked {
            Ok(created) => {
                if created {
                    debug!("Created history file");
                }
                Ok(created)
            }
            // Filesystems without hard links fall back to a plain exclusive create,
            // which leaves the file briefly empty before its first write.
            Err(_) => match OpenOptions::new().write(true).create_new(true).open(&self.path) {
                Ok(mut file) => {
                    file.write_all(&with_header(row)?)?;
                    Ok(true)
                }
                Err(e) if e.kind() == ErrorKind::AlreadyExists => Ok(false),
                Err(e) => Err(e.into()),
            },
        }
    }

    /// Moves an empty ledger file out of the way so the next pass creates
    /// it with its header.
    ///
    /// Only one appender can win the rename. Rows that reached the file in
    /// the meantime are carried over in front of `rows`.
    fn reclaim_empty(&self, rows: &mut Vec<u8>) -> Result<(), StoreError> {
        let aside = self.staging_path();
        match fs::rename(&self.path, &aside) {
            Ok(()) => {}
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(()),
            Err(e) => return Err(e.into()),
        }

        let carried = fs::read(&aside)?;
        fs::remove_file(&aside)?;
        if !carried.is_empty() {
            debug!("Carrying rows from a reclaimed history file");
            let header = encode_row(&HEADER)?;
            let body = carried.strip_prefix(header.as_slice()).unwrap_or(&carried);
            let mut merged = body.to_vec();
            merged.append(rows);
            *rows = merged;
        }
        Ok(())
    }

    fn staging_path(&self) -> PathBuf {
        static COUNTER: AtomicU64 = AtomicU64::new(0);
        let n = COUNTER.fetch_add(1, Ordering::Relaxed);
        let mut name = self.path.file_name().unwrap_or_default().to_os_string();
        name.push(format!(".{}.{n}.tmp", std::process::id()));
        self.path.with_file_name(name)
    }

    /// Returns entries newest first, keeping at most `limit` when given.
    ///
    /// A missing file is an empty history. Rows whose timestamp does not
    /// parse are kept and sort after every dated row.
    ///
    /// # Errors
    ///
    /// Returns an error if the file exists but cannot be read as CSV.
    pub fn snapshot(&self, limit: Option<usize>) -> Result<Vec<SearchHistoryEntry>, StoreError> {
        let mut reader = match csv::ReaderBuilder::new()
            .has_headers(true)
            .flexible(true)
            .from_path(&self.path)
        {
            Ok(reader) => reader,
            Err(e) if is_not_found(&e) => return Ok(Vec::new()),
            Err(e) => return Err(e.into()),
        };

        let headers = reader.headers()?.clone();
        let keyword_col = headers.iter().position(|h| h.trim() == HEADER[0]).unwrap_or(0);
        let timestamp_col = headers.iter().position(|h| h.trim() == HEADER[1]).unwrap_or(1);

        let mut entries = Vec::new();
        for record in reader.records() {
            let record = record?;
            let keyword = record.get(keyword_col).unwrap_or_default();
            let raw = record.get(timestamp_col).unwrap_or_default();
            entries.push(SearchHistoryEntry::from_raw(keyword, raw));
        }

        // Stable, so equal timestamps keep file order.
        entries.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));

        if let Some(limit) = limit {
            entries.truncate(limit);
        }
        Ok(entries)
    }

    /// Removes the ledger file. A missing file is not an error.
    ///
    /// # Errors
    ///
    /// Returns an error if the file exists but cannot be removed.
    pub fn clear(&self) -> Result<(), StoreError> {
        match fs::remove_file(&self.path) {
            Ok(()) => {
                info!(path = %self.path.display(), "History cleared");
                Ok(())
            }
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}

impl SearchLedger for HistoryLedger {
    type Error = StoreError;

    fn append(&self, entry: &SearchHistoryEntry) -> Result<(), StoreError> {
        HistoryLedger::append(self, entry)
    }

    fn snapshot(&self, limit: Option<usize>) -> Result<Vec<SearchHistoryEntry>, StoreError> {
        HistoryLedger::snapshot(self, limit)
    }
}

/// Encodes one CSV row, including the line terminator.
fn encode_row(fields: &[&str]) -> Result<Vec<u8>, StoreError> {
    let mut writer = csv::WriterBuilder::new()
        .has_headers(false)
        .from_writer(Vec::new());
    writer.write_record(fields)?;
    writer
        .into_inner()
        .map_err(|e| StoreError::Io(e.into_error()))
}

/// Prefixes an encoded row with the encoded header.
fn with_header(row: &[u8]) -> Result<Vec<u8>, StoreError> {
    let mut buf = encode_row(&HEADER)?;
    buf.extend_from_slice(row);
    Ok(buf)
}

fn is_not_found(err: &csv::Error) -> bool {
    matches!(err.kind(), csv::ErrorKind::Io(e) if e.kind() == ErrorKind::NotFound)
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use std::sync::Arc;
    use tempfile::TempDir;

    fn at(day: u32, hour: u32) -> chrono::NaiveDateTime {
        NaiveDate::from_ymd_opt(2025, 3, day)
            .unwrap()
            .and_hms_opt(hour, 0, 0)
            .unwrap()
    }

    fn ledger(dir: &TempDir) -> HistoryLedger {
        HistoryLedger::new(dir.path().join("data").join("previous_results.csv"))
    }

    #[test]
    fn test_append_writes_header_once() {
        let dir = TempDir::new().unwrap();
        let ledger = ledger(&dir);

        ledger.append(&SearchHistoryEntry::new("casque", at(1, 9))).unwrap();
        ledger.append(&SearchHistoryEntry::new("clavier, sans fil", at(2, 9))).unwrap();

        let content = fs::read_to_string(ledger.path()).unwrap();
        assert_eq!(
            content,
            "recherche,timestamp\ncasque,2025-03-01 09:00:00\n\"clavier, sans fil\",2025-03-02 09:00:00\n"
        );
    }

    #[test]
    fn test_snapshot_newest_first_with_limit() {
        let dir = TempDir::new().unwrap();
        let ledger = ledger(&dir);

        for (kw, day) in [("a", 1), ("b", 3), ("c", 2), ("d", 4)] {
            ledger.append(&SearchHistoryEntry::new(kw, at(day, 12))).unwrap();
        }

        let all: Vec<_> = ledger.snapshot(None).unwrap().into_iter().map(|e| e.keyword).collect();
        assert_eq!(all, vec!["d", "b", "c", "a"]);

        let top: Vec<_> = ledger.snapshot(Some(3)).unwrap().into_iter().map(|e| e.keyword).collect();
        assert_eq!(top, vec!["d", "b", "c"]);

        assert_eq!(ledger.snapshot(None).unwrap(), ledger.snapshot(None).unwrap());
    }

    #[test]
    fn test_equal_timestamps_keep_file_order() {
        let dir = TempDir::new().unwrap();
        let ledger = ledger(&dir);

        for kw in ["first", "second", "third"] {
            ledger.append(&SearchHistoryEntry::new(kw, at(5, 8))).unwrap();
        }

        let order: Vec<_> = ledger.snapshot(None).unwrap().into_iter().map(|e| e.keyword).collect();
        assert_eq!(order, vec!["first", "second", "third"]);
    }

    #[test]
    fn test_unparsable_timestamp_sorts_last() {
        let dir = TempDir::new().unwrap();
        let ledger = ledger(&dir);
        fs::create_dir_all(ledger.path().parent().unwrap()).unwrap();
        fs::write(
            ledger.path(),
            "recherche,timestamp\nbroken,yesterday\nok,2025-03-01 10:00:00\n",
        )
        .unwrap();

        let entries = ledger.snapshot(None).unwrap();
        assert_eq!(entries[0].keyword, "ok");
        assert_eq!(entries[1].keyword, "broken");
        assert!(!entries[1].has_known_timestamp());
    }

    #[test]
    fn test_empty_file_gets_header() {
        let dir = TempDir::new().unwrap();
        let ledger = ledger(&dir);
        fs::create_dir_all(ledger.path().parent().unwrap()).unwrap();
        fs::write(ledger.path(), "").unwrap();

        ledger.append(&SearchHistoryEntry::new("casque", at(1, 9))).unwrap();
        let content = fs::read_to_string(ledger.path()).unwrap();
        assert!(content.starts_with("recherche,timestamp\n"));
        assert_eq!(ledger.snapshot(None).unwrap().len(), 1);
    }

    #[test]
    fn test_concurrent_appends_to_empty_file_write_one_header() {
        let dir = TempDir::new().unwrap();
        let ledger = Arc::new(ledger(&dir));
        fs::create_dir_all(ledger.path().parent().unwrap()).unwrap();
        fs::write(ledger.path(), "").unwrap();

        let barrier = Arc::new(std::sync::Barrier::new(8));
        let handles: Vec<_> = (0..8)
            .map(|t| {
                let ledger = Arc::clone(&ledger);
                let barrier = Arc::clone(&barrier);
                std::thread::spawn(move || {
                    barrier.wait();
                    ledger
                        .append(&SearchHistoryEntry::new(format!("kw-{t}"), at(1, 9)))
                        .unwrap();
                })
            })
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }

        let content = fs::read_to_string(ledger.path()).unwrap();
        assert!(content.starts_with("recherche,timestamp\n"));
        assert_eq!(content.matches("recherche,timestamp").count(), 1);
        assert_eq!(ledger.snapshot(None).unwrap().len(), 8);

        let leftovers = fs::read_dir(ledger.path().parent().unwrap()).unwrap().count();
        assert_eq!(leftovers, 1);
    }

    #[test]
    fn test_clear() {
        let dir = TempDir::new().unwrap();
        let ledger = ledger(&dir);

        ledger.clear().unwrap();
        assert!(ledger.snapshot(None).unwrap().is_empty());

        ledger.append(&SearchHistoryEntry::new("casque", at(1, 9))).unwrap();
        ledger.clear().unwrap();
        assert!(ledger.snapshot(None).unwrap().is_empty());
        assert!(!ledger.path().exists());
    }

    #[test]
    fn test_concurrent_appends_keep_rows_whole() {
        let dir = TempDir::new().unwrap();
        let ledger = Arc::new(ledger(&dir));

        let handles: Vec<_> = (0..8)
            .map(|t| {
                let ledger = Arc::clone(&ledger);
                std::thread::spawn(move || {
                    for i in 0..25 {
                        let entry = SearchHistoryEntry::new(format!("kw-{t}-{i}"), at(1, 9));
                        ledger.append(&entry).unwrap();
                    }
                })
            })
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }

        let content = fs::read_to_string(ledger.path()).unwrap();
        assert_eq!(content.matches("recherche,timestamp").count(), 1);
        assert_eq!(ledger.snapshot(None).unwrap().len(), 200);
    }
}
