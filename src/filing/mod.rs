//! Filing engine: document classification and path/name resolution.
//!
//! `classifier` maps a filename plus upload context to a [`Category`];
//! `resolver` maps a category to a folder path and generated display name,
//! consulting live document counts for sequence numbers.

pub mod classifier;
pub mod resolver;

pub use classifier::{classify, Category};
pub use resolver::{FilingPathResolver, PreviewFiling, ResolvedFiling};
