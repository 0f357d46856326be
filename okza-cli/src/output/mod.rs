//! Output formatting for CLI.

pub mod export;
mod json;
mod text;

pub use json::JsonFormatter;
pub use text::TextFormatter;
