//! Tool descriptions and outputs handed to the host

use crate::error::{Error, ErrorKind};
use serde::{Deserialize, Serialize};

/// Advertised shape of one tool
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolDefinition {
    pub name: String,
    pub description: String,
    /// JSON Schema of the arguments object
    pub parameters: serde_json::Value,
}

/// Output from a tool execution.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolOutput {
    /// Whether the tool execution was successful.
    pub success: bool,

    /// Text to relay to the user or model.
    pub content: String,

    /// Error classification when `success` is false.
    pub error_kind: Option<ErrorKind>,

    /// Optional structured data.
    pub data: Option<serde_json::Value>,
}

impl ToolOutput {
    /// Create a successful text output.
    pub fn text(content: impl Into<String>) -> Self {
        Self {
            success: true,
            content: content.into(),
            error_kind: None,
            data: None,
        }
    }

    /// Attach structured data.
    pub fn with_data(mut self, data: serde_json::Value) -> Self {
        self.data = Some(data);
        self
    }

    /// Create a failed output from an error.
    pub fn error(err: &Error) -> Self {
        Self {
            success: false,
            content: err.to_string(),
            error_kind: Some(err.kind()),
            data: None,
        }
    }
}
