//! Command-line interface for the `tender` binary.

mod commands;

pub use commands::{is_verbose, run};
