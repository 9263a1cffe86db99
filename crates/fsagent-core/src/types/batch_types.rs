//! Numeric sequences and aggregated batch reports

use crate::error::{Error, ErrorKind, Result};
use serde::{Deserialize, Serialize};
use std::fmt::Write as _;

/// A numeric series of names: `prefix + pad(i) + suffix` for every i in `start..=end`
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct SequenceSpec {
    pub prefix: String,
    pub suffix: String,
    pub start: u64,
    pub end: u64,
    /// Zero-pad width; 0 disables padding
    pub zero_pad: usize,
    /// Initial content for created files (ignored for folders)
    pub content: Option<String>,
}

impl SequenceSpec {
    pub fn new(prefix: impl Into<String>, suffix: impl Into<String>, start: u64, end: u64) -> Self {
        Self {
            prefix: prefix.into(),
            suffix: suffix.into(),
            start,
            end,
            zero_pad: 0,
            content: None,
        }
    }

    pub fn with_zero_pad(mut self, width: usize) -> Self {
        self.zero_pad = width;
        self
    }

    pub fn with_content(mut self, content: impl Into<String>) -> Self {
        self.content = Some(content.into());
        self
    }

    /// Name for index `i`
    pub fn name_for(&self, i: u64) -> String {
        format!("{}{}{}", self.prefix, pad_index(i, self.zero_pad), self.suffix)
    }

    pub fn indices(&self) -> std::ops::RangeInclusive<u64> {
        self.start..=self.end
    }

    /// Reject ranges that are reversed, too large, or too wide for the pad width
    pub fn validate(&self, max_items: usize) -> Result<()> {
        validate_range(self.start, self.end, self.zero_pad, max_items)
    }
}

/// Rename a numeric series from one prefix/suffix pair to another
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct SequenceRename {
    pub old_prefix: String,
    pub old_suffix: String,
    pub new_prefix: String,
    pub new_suffix: String,
    pub start: u64,
    pub end: u64,
    pub zero_pad: usize,
    /// Replace existing targets instead of reporting a collision
    pub overwrite: bool,
}

impl SequenceRename {
    pub fn old_spec(&self) -> SequenceSpec {
        SequenceSpec::new(&self.old_prefix, &self.old_suffix, self.start, self.end)
            .with_zero_pad(self.zero_pad)
    }

    pub fn new_spec(&self) -> SequenceSpec {
        SequenceSpec::new(&self.new_prefix, &self.new_suffix, self.start, self.end)
            .with_zero_pad(self.zero_pad)
    }

    pub fn validate(&self, max_items: usize) -> Result<()> {
        validate_range(self.start, self.end, self.zero_pad, max_items)
    }
}

fn pad_index(i: u64, width: usize) -> String {
    if width == 0 {
        i.to_string()
    } else {
        format!("{:0width$}", i, width = width)
    }
}

fn validate_range(start: u64, end: u64, zero_pad: usize, max_items: usize) -> Result<()> {
    if start > end {
        return Err(Error::InvalidArguments(format!(
            "start ({}) must not be greater than end ({})",
            start, end
        )));
    }

    let count = (end - start).saturating_add(1);
    if count > max_items as u64 {
        return Err(Error::InvalidArguments(format!(
            "sequence covers {} items; the limit is {}",
            count, max_items
        )));
    }

    let needed = end.to_string().len();
    if zero_pad > 0 && zero_pad < needed {
        return Err(Error::InvalidArguments(format!(
            "zero_pad {} is too narrow for index {}; use at least {} (or 0 for no padding)",
            zero_pad, end, needed
        )));
    }

    Ok(())
}

/// Outcome of one item of a batch
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum ItemOutcome {
    Succeeded,
    Skipped { reason: String },
    Failed { kind: ErrorKind, message: String },
}

impl ItemOutcome {
    pub fn failed(err: &Error) -> Self {
        Self::Failed {
            kind: err.kind(),
            message: err.to_string(),
        }
    }
}

/// One line of a batch report
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct BatchItem {
    /// Sequence index, when the batch is index driven
    pub index: Option<u64>,
    /// Original path for renames
    pub source: Option<String>,
    /// Sandbox-relative path the item acted on
    pub target: String,
    pub outcome: ItemOutcome,
}

/// Aggregated report of a batch operation that ran past per-item failures
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct BatchReport {
    pub operation: String,
    pub items: Vec<BatchItem>,
}

impl BatchReport {
    pub fn new(operation: impl Into<String>) -> Self {
        Self {
            operation: operation.into(),
            items: Vec::new(),
        }
    }

    pub fn push(&mut self, index: Option<u64>, source: Option<String>, target: String, outcome: ItemOutcome) {
        self.items.push(BatchItem {
            index,
            source,
            target,
            outcome,
        });
    }

    pub fn succeeded(&self) -> usize {
        self.count(|o| matches!(o, ItemOutcome::Succeeded))
    }

    pub fn skipped(&self) -> usize {
        self.count(|o| matches!(o, ItemOutcome::Skipped { .. }))
    }

    pub fn failed(&self) -> usize {
        self.count(|o| matches!(o, ItemOutcome::Failed { .. }))
    }

    /// Item recorded for a given sequence index
    pub fn item_for_index(&self, index: u64) -> Option<&BatchItem> {
        self.items.iter().find(|item| item.index == Some(index))
    }

    fn count(&self, pred: impl Fn(&ItemOutcome) -> bool) -> usize {
        self.items.iter().filter(|item| pred(&item.outcome)).count()
    }

    /// Human-readable report, one line per item
    pub fn summary(&self) -> String {
        let mut out = format!(
            "{}: {} succeeded, {} skipped, {} failed",
            self.operation,
            self.succeeded(),
            self.skipped(),
            self.failed()
        );

        for item in &self.items {
            let label = match &item.source {
                Some(source) => format!("{} -> {}", source, item.target),
                None => item.target.clone(),
            };
            let _ = match &item.outcome {
                ItemOutcome::Succeeded => write!(out, "\n  [ok] {}", label),
                ItemOutcome::Skipped { reason } => write!(out, "\n  [skipped] {}: {}", label, reason),
                ItemOutcome::Failed { message, .. } => write!(out, "\n  [failed] {}: {}", label, message),
            };
        }

        out
    }
}
