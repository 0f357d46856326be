//! Domain models for Okza.
//!
//! ## Submodules
//!
//! - [`job`] - Job types (Job, JobId, JobStatus)
//! - [`item`] - Product listings and price coercion
//! - [`history`] - Search history entries
//! - [`credentials`] - Provider credentials and the Basic auth header

mod credentials;
mod history;
mod item;
mod job;

// Re-export everything at the models level
pub use credentials::Credentials;
pub use history::{SearchHistoryEntry, TIMESTAMP_FORMAT};
pub use item::{Item, coerce_price};
pub use job::{Job, JobId, JobStatus};
