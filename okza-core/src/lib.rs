// Lint configuration for this crate
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::must_use_candidate)]

//! # Okza Core
//!
//! Core types, models, and traits for the Okza merchant search tool.
//!
//! This crate provides the foundational abstractions used across all other
//! Okza crates, including:
//!
//! - Domain models (jobs, items, history entries, credentials)
//! - Price coercion and the deterministic price ranking
//! - Error types
//! - The trait implemented by history ledgers
//!
//! ## Key Types
//!
//! ### Job Types
//! - [`Job`] - A submitted provider job
//! - [`JobId`] - Opaque provider-assigned identifier
//! - [`JobStatus`] - Readiness derived from one status response
//!
//! ### Result Types
//! - [`Item`] - One product listing
//! - [`UnpricedPolicy`] - Where items without a usable price are ranked
//!
//! ### History Types
//! - [`SearchHistoryEntry`] - One completed search
//! - [`SearchLedger`] - Append-only storage for history entries

pub mod error;
pub mod models;
pub mod rank;
pub mod traits;

// Re-export error types
pub use error::CoreError;

// Re-export all model types
pub use models::{
    // Credentials
    Credentials,
    // History
    SearchHistoryEntry,
    TIMESTAMP_FORMAT,
    // Items
    Item,
    coerce_price,
    // Jobs
    Job,
    JobId,
    JobStatus,
};

// Re-export ranking
pub use rank::{UnpricedPolicy, rank_items, rank_items_with};

// Re-export traits
pub use traits::SearchLedger;
