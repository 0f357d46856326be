//! Keyword input files.
//!
//! A CSV file whose header row names a `keyword` column. Used by
//! `okza submit --from-csv`.

use std::path::Path;

use tracing::debug;

use crate::error::StoreError;

/// Name of the keyword column.
pub const KEYWORD_COLUMN: &str = "keyword";

/// Reads every non-empty keyword from the `keyword` column, in file order.
///
/// # Errors
///
/// Returns an error if the file cannot be read, or
/// [`StoreError::Config`] if it has no `keyword` column.
pub fn read_keywords(path: &Path) -> Result<Vec<String>, StoreError> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .trim(csv::Trim::All)
        .from_path(path)?;

    let column = reader
        .headers()?
        .iter()
        .position(|h| h == KEYWORD_COLUMN)
        .ok_or_else(|| {
            StoreError::Config(format!(
                "{} has no '{KEYWORD_COLUMN}' column",
                path.display()
            ))
        })?;

    let mut keywords = Vec::new();
    for record in reader.records() {
        if let Some(keyword) = record?.get(column).filter(|k| !k.is_empty()) {
            keywords.push(keyword.to_string());
        }
    }

    debug!(path = %path.display(), count = keywords.len(), "Read keywords");
    Ok(keywords)
}

/// Reads the first keyword of the file.
///
/// # Errors
///
/// Same as [`read_keywords`], plus [`StoreError::NoKeyword`] for a file
/// without any keyword row.
pub fn first_keyword(path: &Path) -> Result<String, StoreError> {
    read_keywords(path)?
        .into_iter()
        .next()
        .ok_or_else(|| StoreError::NoKeyword(path.to_path_buf()))
}
