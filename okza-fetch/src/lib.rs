// Lint configuration for this crate
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::must_use_candidate)]

//! # Okza Fetch
//!
//! Provider job client and search flow for Okza.
//!
//! ## Building Blocks
//!
//! - [`client::HttpClient`] - `reqwest` wrapper with timeouts and error mapping
//! - [`api::JobApi`] - Seam over the provider's submit and status endpoints
//! - [`api::MerchantApiClient`] - HTTPS implementation of [`api::JobApi`]
//! - [`submit::JobSubmitter`] - Creates a job for a keyword
//! - [`poll::PollingMonitor`] - Bounded, cancellable status polling
//! - [`extract`] - Defensive navigation of status responses
//!
//! ## Search Pipeline
//!
//! [`pipeline::SearchPipeline`] ties the pieces together and is driven by
//! [`context::SearchSettings`] and a per-invocation
//! [`context::SearchSession`].
//!
//! ## Example
//!
//! ```ignore
//! use okza_core::Credentials;
//! use okza_fetch::{SearchPipeline, SearchSession, SearchSettings};
//!
//! let session = SearchSession::new(&Credentials::from_env()?);
//! let pipeline = SearchPipeline::from_settings(SearchSettings::default())?;
//!
//! let report = pipeline.run(&session, "casque audio", |p| {
//!     eprintln!("{}%", p.percent());
//! }).await?;
//! ```

pub mod api;
pub mod client;
pub mod context;
pub mod error;
pub mod extract;
pub mod pipeline;
pub mod poll;
pub mod submit;

#[cfg(test)]
mod testing;

pub use api::{JobApi, JobRequest, MerchantApiClient};
pub use client::HttpClient;
pub use context::{ApiSettings, PollSettings, SearchSession, SearchSettings, SearchSettingsBuilder};
pub use error::{ExtractionError, FetchError};
pub use pipeline::{ResultSet, SearchOutcome, SearchPipeline, SearchReport};
pub use poll::{PollOutcome, PollProgress, PollingMonitor};
pub use submit::JobSubmitter;

// Re-export the cancellation token so callers need not depend on tokio-util.
pub use tokio_util::sync::CancellationToken;
