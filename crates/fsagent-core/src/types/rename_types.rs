//! Regex rename plans

use super::BatchReport;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// One proposed rename
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct RenamePair {
    /// Sandbox-relative original path
    pub original: String,
    /// Sandbox-relative proposed path
    pub proposed: String,
    #[serde(skip)]
    pub(crate) source: PathBuf,
    #[serde(skip)]
    pub(crate) target: PathBuf,
}

impl RenamePair {
    pub fn source(&self) -> &std::path::Path {
        &self.source
    }

    pub fn target(&self) -> &std::path::Path {
        &self.target
    }
}

/// Ordered renames computed without touching the filesystem.
///
/// Pairs are ordered contents-first: an entry inside a folder always comes
/// before the folder itself, so applying them in order never invalidates a
/// later pair's source path.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct RenamePlan {
    pub base: String,
    pub pattern: String,
    pub replacement: String,
    pub dry_run: bool,
    pub pairs: Vec<RenamePair>,
}

impl RenamePlan {
    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }

    /// `(original, proposed)` mapping in plan order
    pub fn mapping(&self) -> Vec<(String, String)> {
        self.pairs
            .iter()
            .map(|p| (p.original.clone(), p.proposed.clone()))
            .collect()
    }

    pub fn listing(&self) -> String {
        self.pairs
            .iter()
            .map(|p| format!("{} -> {}", p.original, p.proposed))
            .collect::<Vec<_>>()
            .join("\n")
    }
}

/// Result of `bulk_rename_regex`: the plan, plus the applied report unless it was a dry run
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct RenameReport {
    pub plan: RenamePlan,
    pub applied: Option<BatchReport>,
}

impl RenameReport {
    pub fn summary(&self) -> String {
        if self.plan.is_empty() {
            return "No matches.".to_string();
        }

        match &self.applied {
            None => format!("Preview (no changes):\n{}", self.plan.listing()),
            Some(report) => report.summary(),
        }
    }
}
