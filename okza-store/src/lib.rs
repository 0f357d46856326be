// Lint configuration for this crate
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::must_use_candidate)]

//! # Okza Store
//!
//! Everything Okza keeps on disk.
//!
//! This crate provides:
//!
//! - **HistoryLedger**: The append-only CSV log of completed searches
//! - **JobReceipt**: The last submitted job, for later `status`/`fetch` runs
//! - **Config**: User configuration with defaults for every field
//! - **Persistence**: Default paths and JSON file helpers
//! - **Keywords**: Keyword input files for batch submission
//!
//! ## Usage
//!
//! ```ignore
//! use okza_core::SearchHistoryEntry;
//! use okza_store::{Config, HistoryLedger};
//!
//! let config = Config::load()?;
//! let ledger = HistoryLedger::new(config.history.resolved_path());
//!
//! ledger.append(&SearchHistoryEntry::now("casque audio"))?;
//! for entry in ledger.snapshot(config.history.limit())? {
//!     println!("{} {}", entry.formatted_timestamp(), entry.keyword);
//! }
//! ```

pub mod config;
pub mod error;
pub mod history;
pub mod keywords;
pub mod persistence;
pub mod receipt;

pub use config::{ApiConfig, Config, HistoryConfig, PollingConfig, RankingConfig};
pub use error::StoreError;
pub use history::HistoryLedger;
pub use keywords::{first_keyword, read_keywords};
pub use persistence::{
    default_cache_dir, default_config_dir, default_config_path, default_data_dir,
    default_history_path, default_receipt_path, load_json, save_json,
};
pub use receipt::JobReceipt;
