//! Single-operation outcomes and directory entries

use serde::{Deserialize, Serialize};

/// Outcome of one filesystem action
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct OperationResult {
    /// Human-readable summary
    pub message: String,
    /// Sandbox-relative paths the action touched
    pub paths: Vec<String>,
}

impl OperationResult {
    pub fn success(message: impl Into<String>, paths: Vec<String>) -> Self {
        Self {
            message: message.into(),
            paths,
        }
    }
}

/// Entry shown by directory listings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EntryInfo {
    /// Sandbox-relative path
    pub path: String,
    pub name: String,
    pub is_dir: bool,
    pub size: Option<u64>,
    pub modified: Option<chrono::DateTime<chrono::Utc>>,
}

/// Format a byte count with 1024-based units
pub fn format_size(bytes: u64) -> String {
    const UNITS: [&str; 5] = ["B", "KB", "MB", "GB", "TB"];

    let mut value = bytes as f64;
    for unit in UNITS {
        if value < 1024.0 {
            return format!("{:.0} {}", value, unit);
        }
        value /= 1024.0;
    }
    format!("{:.0} PB", value)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_size() {
        assert_eq!(format_size(0), "0 B");
        assert_eq!(format_size(1023), "1023 B");
        assert_eq!(format_size(2048), "2 KB");
        assert_eq!(format_size(5 * 1024 * 1024), "5 MB");
    }
}
