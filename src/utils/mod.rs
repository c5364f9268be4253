//! Shared utilities.

pub mod filename;

pub use filename::{display_extension, sanitize_filename};
