//! Batch operations
//!
//! Each engine runs past per-item failures and returns an aggregated report.
//! Arguments that are invalid as a whole (bad spec, bad pattern, an escaping
//! path) are rejected before the first change.

mod glob_delete;
mod regex_rename;
mod sequence;

pub use glob_delete::GlobDeleter;
pub use regex_rename::RegexRenamer;
pub use sequence::SequenceEngine;
