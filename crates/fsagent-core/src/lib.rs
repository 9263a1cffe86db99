//! FsAgent Core Library
//!
//! This crate provides the operations an agent may perform on the local
//! machine, all confined to a single sandbox folder:
//! - Path containment for every argument, symlinks included
//! - Single-file and single-folder operations
//! - Numbered sequences, regex renames and glob deletes with per-item reports
//! - A restricted arithmetic evaluator
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                     fsagent-core                            │
//! ├─────────────────────────────────────────────────────────────┤
//! │  sandbox/      - Root guard, file/folder ops, listings      │
//! │  bulk/         - Sequences, regex rename, glob delete       │
//! │  calc/         - Arithmetic lexer, parser, evaluator        │
//! │  tools/        - Typed tool calls and async dispatch        │
//! │  types/        - Shared type definitions                    │
//! │  config.rs     - Sandbox configuration                      │
//! │  error.rs      - Error types                                │
//! └─────────────────────────────────────────────────────────────┘
//! ```

pub mod bulk;
pub mod calc;
pub mod config;
pub mod error;
pub mod sandbox;
pub mod tools;
pub mod types;

// Re-export commonly used types
pub use config::SandboxConfig;
pub use error::{CalcError, Error, ErrorKind, Result, SandboxError};
pub use types::*;

// Re-export operation components
pub use bulk::{GlobDeleter, RegexRenamer, SequenceEngine};
pub use calc::Calculator;
pub use sandbox::{FileOps, FolderOps, Listing, Sandbox, SandboxGuard};

// Re-export the registry
pub use tools::{tool_definitions, ToolCall, Toolbox};
