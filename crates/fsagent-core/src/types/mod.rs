//! Core type definitions for FsAgent
//!
//! Outcomes returned by the sandboxed operations. None of these are persisted;
//! they are built per call and handed back to whoever invoked the tool.

mod batch_types;
mod operation_types;
mod rename_types;
mod tool_types;

pub use batch_types::*;
pub use operation_types::*;
pub use rename_types::*;
pub use tool_types::*;
