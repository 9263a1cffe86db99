//! Dispatch of tool calls onto the sandbox

use super::call::ToolCall;
use crate::bulk::{GlobDeleter, RegexRenamer, SequenceEngine};
use crate::calc::Calculator;
use crate::error::{Error, Result};
use crate::sandbox::{FileOps, FolderOps, Listing, Sandbox};
use crate::types::{OperationResult, SequenceRename, SequenceSpec, ToolOutput};
use serde_json::{json, Value};
use std::sync::Arc;
use tracing::{debug, warn};

/// Executes tool calls against one opened sandbox
#[derive(Debug, Clone)]
pub struct Toolbox {
    sandbox: Arc<Sandbox>,
}

impl Toolbox {
    pub fn new(sandbox: Sandbox) -> Self {
        Self {
            sandbox: Arc::new(sandbox),
        }
    }

    pub fn sandbox(&self) -> &Sandbox {
        &self.sandbox
    }

    /// Run a call on the blocking pool.
    ///
    /// Failures come back as `success == false` outputs carrying the error
    /// text and kind.
    pub async fn execute(&self, call: ToolCall) -> ToolOutput {
        let name = call.name();
        let sandbox = Arc::clone(&self.sandbox);

        let result = tokio::task::spawn_blocking(move || dispatch(&sandbox, call))
            .await
            .map_err(|e| Error::Internal(format!("{} task failed: {}", name, e)))
            .and_then(|r| r);

        match result {
            Ok(output) => output,
            Err(e) => {
                warn!("Tool {} failed: {}", name, e);
                ToolOutput::error(&e)
            }
        }
    }

    /// Parse a tool name plus JSON arguments, then execute
    pub async fn execute_named(&self, name: &str, args: Value) -> ToolOutput {
        match ToolCall::from_parts(name, args) {
            Ok(call) => self.execute(call).await,
            Err(e) => {
                warn!("Rejected call to {}: {}", name, e);
                ToolOutput::error(&e)
            }
        }
    }
}

/// Run a call synchronously
pub fn dispatch(sandbox: &Sandbox, call: ToolCall) -> Result<ToolOutput> {
    let guard = sandbox.guard();
    let config = sandbox.config();
    debug!("Dispatching {}", call.name());

    match call {
        ToolCall::Calculator(args) => {
            let value = Calculator::evaluate(&args.expression)?;
            Ok(ToolOutput::text(format!("{:?}", value)).with_data(json!({ "result": value })))
        }
        ToolCall::ListDir(args) => {
            let content = Listing::render(guard, &args.path, args.tree, args.max_depth)?;
            let output = ToolOutput::text(content);
            if !guard.resolve(&args.path)?.is_dir() {
                return Ok(output);
            }
            let entries = Listing::entries(guard, &args.path)?;
            Ok(output.with_data(json!({ "entries": entries })))
        }
        ToolCall::ReadFile(args) => {
            let limit = args.max_bytes.unwrap_or(config.max_read_bytes);
            let content = FileOps::read(guard, &args.path, limit)?;
            Ok(ToolOutput::text(content))
        }
        ToolCall::WriteFile(args) => operation(FileOps::write(guard, &args.path, &args.content)?),
        ToolCall::AppendFile(args) => operation(FileOps::append(guard, &args.path, &args.content)?),
        ToolCall::CopyFile(args) => operation(FileOps::copy(guard, &args.src, &args.dst, args.overwrite)?),
        ToolCall::MoveFile(args) => operation(FileOps::move_path(guard, &args.src, &args.dst, args.overwrite)?),
        ToolCall::CreateFile(args) => operation(FileOps::create(guard, &args.path, &args.content)?),
        ToolCall::CreateFilesSequence(args) => {
            let spec = SequenceSpec::from(args);
            let report = SequenceEngine::create_files(guard, &spec, config.max_batch_items)?;
            Ok(ToolOutput::text(report.summary()).with_data(serde_json::to_value(&report)?))
        }
        ToolCall::RenameFile(args) => operation(FileOps::rename(guard, &args.old_path, &args.new_path)?),
        ToolCall::RenameFilesSequence(args) => {
            let rename = SequenceRename::from(args);
            let report = SequenceEngine::rename_files(guard, &rename, config.max_batch_items)?;
            Ok(ToolOutput::text(report.summary()).with_data(serde_json::to_value(&report)?))
        }
        ToolCall::DeleteFile(args) => operation(FileOps::delete(guard, &args.path)?),
        ToolCall::DeleteGlob(args) => {
            let report = GlobDeleter::delete(guard, &args.pattern)?;
            let content = if report.items.is_empty() {
                "No files matched.".to_string()
            } else {
                report.summary()
            };
            Ok(ToolOutput::text(content).with_data(serde_json::to_value(&report)?))
        }
        ToolCall::CreateFolder(args) => operation(FolderOps::create(guard, &args.path, args.exist_ok)?),
        ToolCall::CreateFoldersSequence(args) => {
            let spec = SequenceSpec::from(args);
            let report = SequenceEngine::create_folders(guard, &spec, config.max_batch_items)?;
            Ok(ToolOutput::text(report.summary()).with_data(serde_json::to_value(&report)?))
        }
        ToolCall::DeleteFolder(args) => operation(FolderOps::delete(guard, &args.path, args.recursive)?),
        ToolCall::BulkRenameRegex(args) => {
            let report = RegexRenamer::bulk_rename(
                guard,
                &args.base_path,
                &args.pattern,
                &args.replacement,
                args.include_subdirs,
                args.test_only,
            )?;
            Ok(ToolOutput::text(report.summary()).with_data(serde_json::to_value(&report)?))
        }
    }
}

fn operation(result: OperationResult) -> Result<ToolOutput> {
    let data = serde_json::to_value(&result)?;
    Ok(ToolOutput::text(result.message).with_data(data))
}
