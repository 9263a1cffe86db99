//! Error types for FsAgent Core

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Main error type for FsAgent operations
#[derive(Error, Debug)]
pub enum Error {
    #[error("Sandbox error: {0}")]
    Sandbox(#[from] SandboxError),

    #[error("Calculator error: {0}")]
    Calc(#[from] CalcError),

    #[error("Invalid arguments: {0}")]
    InvalidArguments(String),

    #[error("Unknown tool: {0}")]
    UnknownTool(String),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Internal error: {0}")]
    Internal(String),
}

/// Sandbox/filesystem errors
#[derive(Error, Debug)]
pub enum SandboxError {
    #[error("Path {path:?} escapes the sandbox root {root:?}")]
    PathEscape { path: String, root: PathBuf },

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Already exists: {0}")]
    Collision(String),

    #[error("Wrong entry type: {0}")]
    WrongType(String),

    #[error("Folder is not empty: {0} (use recursive=true)")]
    NotEmpty(String),

    #[error("File {path} is {size} bytes; exceeds limit {limit}")]
    TooLarge { path: String, size: u64, limit: u64 },

    #[error("Invalid pattern: {0}")]
    InvalidPattern(String),

    #[error("Invalid path: {0}")]
    InvalidPath(String),

    #[error("OS error on {path:?}: {source}")]
    Os {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Arithmetic evaluation errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CalcError {
    #[error("Invalid expression: {0}")]
    InvalidExpression(String),

    #[error("Division by zero")]
    DivisionByZero,

    #[error("Result is not a finite real number")]
    NonFinite,
}

/// Flat error classification, safe to copy into reports and serialize
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    PathEscape,
    NotFound,
    Collision,
    WrongType,
    NotEmpty,
    TooLarge,
    InvalidPattern,
    InvalidPath,
    OsFailure,
    InvalidExpression,
    DivisionByZero,
    NonFinite,
    InvalidArguments,
    UnknownTool,
    Internal,
}

impl Error {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Error::Sandbox(e) => e.kind(),
            Error::Calc(CalcError::InvalidExpression(_)) => ErrorKind::InvalidExpression,
            Error::Calc(CalcError::DivisionByZero) => ErrorKind::DivisionByZero,
            Error::Calc(CalcError::NonFinite) => ErrorKind::NonFinite,
            Error::InvalidArguments(_) | Error::Json(_) => ErrorKind::InvalidArguments,
            Error::UnknownTool(_) => ErrorKind::UnknownTool,
            Error::Internal(_) => ErrorKind::Internal,
        }
    }
}

impl SandboxError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            SandboxError::PathEscape { .. } => ErrorKind::PathEscape,
            SandboxError::NotFound(_) => ErrorKind::NotFound,
            SandboxError::Collision(_) => ErrorKind::Collision,
            SandboxError::WrongType(_) => ErrorKind::WrongType,
            SandboxError::NotEmpty(_) => ErrorKind::NotEmpty,
            SandboxError::TooLarge { .. } => ErrorKind::TooLarge,
            SandboxError::InvalidPattern(_) => ErrorKind::InvalidPattern,
            SandboxError::InvalidPath(_) => ErrorKind::InvalidPath,
            SandboxError::Os { .. } => ErrorKind::OsFailure,
        }
    }

    /// Wrap an unexpected I/O error with the path it happened on
    pub fn os(path: impl AsRef<Path>, source: std::io::Error) -> Self {
        SandboxError::Os {
            path: path.as_ref().to_path_buf(),
            source,
        }
    }
}

impl From<regex::Error> for Error {
    fn from(err: regex::Error) -> Self {
        Error::Sandbox(SandboxError::InvalidPattern(err.to_string()))
    }
}

impl From<glob::PatternError> for Error {
    fn from(err: glob::PatternError) -> Self {
        Error::Sandbox(SandboxError::InvalidPattern(err.to_string()))
    }
}

impl serde::Serialize for Error {
    fn serialize<S>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(&self.to_string())
    }
}

/// Result type alias using our Error type
pub type Result<T> = std::result::Result<T, Error>;
