//! Store error types.

use std::path::PathBuf;

use thiserror::Error;

/// Errors that can occur in the store.
#[derive(Debug, Error)]
pub enum StoreError {
    /// IO error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// CSV encoding or decoding error.
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// Serialization error.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Configuration error.
    #[error("Configuration error: {0}")]
    Config(String),

    /// No job receipt has been written yet.
    #[error("No job receipt at {}", .0.display())]
    NoReceipt(PathBuf),

    /// A keyword file has no usable keyword.
    #[error("No keyword found in {}", .0.display())]
    NoKeyword(PathBuf),
}

impl StoreError {
    /// Returns true if the error means the file simply does not exist.
    pub fn is_not_found(&self) -> bool {
        match self {
            StoreError::Io(e) => e.kind() == std::io::ErrorKind::NotFound,
            StoreError::NoReceipt(_) => true,
            _ => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_not_found_classification() {
        let missing = StoreError::Io(std::io::Error::from(std::io::ErrorKind::NotFound));
        assert!(missing.is_not_found());
        assert!(StoreError::NoReceipt(PathBuf::from("x")).is_not_found());
        assert!(!StoreError::Config("bad".into()).is_not_found());
    }
}
