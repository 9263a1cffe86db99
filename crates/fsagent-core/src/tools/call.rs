//! Typed tool invocations

use super::definitions::tool_definitions;
use crate::error::{Error, Result};
use crate::types::{SequenceRename, SequenceSpec};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

/// One operation request with its arguments
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "tool", content = "args", rename_all = "snake_case")]
pub enum ToolCall {
    Calculator(CalculatorArgs),
    ListDir(ListDirArgs),
    ReadFile(ReadFileArgs),
    WriteFile(ContentArgs),
    AppendFile(ContentArgs),
    CopyFile(TransferArgs),
    MoveFile(TransferArgs),
    CreateFile(CreateFileArgs),
    CreateFilesSequence(SequenceArgs),
    RenameFile(RenameFileArgs),
    RenameFilesSequence(RenameSequenceArgs),
    DeleteFile(PathArgs),
    DeleteGlob(GlobArgs),
    CreateFolder(CreateFolderArgs),
    CreateFoldersSequence(SequenceArgs),
    DeleteFolder(DeleteFolderArgs),
    BulkRenameRegex(BulkRenameArgs),
}

impl ToolCall {
    /// Build a call from a tool name and a JSON arguments object.
    ///
    /// `null` arguments count as an empty object so tools whose arguments are
    /// all optional can be called bare.
    pub fn from_parts(name: &str, args: Value) -> Result<Self> {
        if !tool_definitions().iter().any(|def| def.name == name) {
            return Err(Error::UnknownTool(name.to_string()));
        }

        let args = if args.is_null() { json!({}) } else { args };
        if !args.is_object() {
            return Err(Error::InvalidArguments(format!(
                "{} expects a JSON object of arguments",
                name
            )));
        }

        serde_json::from_value(json!({ "tool": name, "args": args }))
            .map_err(|e| Error::InvalidArguments(format!("{}: {}", name, e)))
    }

    pub fn name(&self) -> &'static str {
        match self {
            ToolCall::Calculator(_) => "calculator",
            ToolCall::ListDir(_) => "list_dir",
            ToolCall::ReadFile(_) => "read_file",
            ToolCall::WriteFile(_) => "write_file",
            ToolCall::AppendFile(_) => "append_file",
            ToolCall::CopyFile(_) => "copy_file",
            ToolCall::MoveFile(_) => "move_file",
            ToolCall::CreateFile(_) => "create_file",
            ToolCall::CreateFilesSequence(_) => "create_files_sequence",
            ToolCall::RenameFile(_) => "rename_file",
            ToolCall::RenameFilesSequence(_) => "rename_files_sequence",
            ToolCall::DeleteFile(_) => "delete_file",
            ToolCall::DeleteGlob(_) => "delete_glob",
            ToolCall::CreateFolder(_) => "create_folder",
            ToolCall::CreateFoldersSequence(_) => "create_folders_sequence",
            ToolCall::DeleteFolder(_) => "delete_folder",
            ToolCall::BulkRenameRegex(_) => "bulk_rename_regex",
        }
    }
}

fn default_true() -> bool {
    true
}

fn default_dot() -> String {
    ".".to_string()
}

fn default_depth() -> usize {
    2
}

fn default_one() -> u64 {
    1
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CalculatorArgs {
    pub expression: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ListDirArgs {
    #[serde(default = "default_dot")]
    pub path: String,
    #[serde(default = "default_true")]
    pub tree: bool,
    #[serde(default = "default_depth")]
    pub max_depth: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReadFileArgs {
    pub path: String,
    /// Falls back to the sandbox's configured limit
    #[serde(default)]
    pub max_bytes: Option<u64>,
}

/// Arguments of `write_file` and `append_file`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContentArgs {
    pub path: String,
    pub content: String,
}

/// Arguments of `copy_file` and `move_file`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TransferArgs {
    pub src: String,
    pub dst: String,
    #[serde(default)]
    pub overwrite: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CreateFileArgs {
    pub path: String,
    #[serde(default)]
    pub content: String,
}

/// Arguments of `create_files_sequence` and `create_folders_sequence`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SequenceArgs {
    pub prefix: String,
    #[serde(default)]
    pub suffix: String,
    #[serde(default = "default_one")]
    pub start: u64,
    #[serde(default = "default_one")]
    pub end: u64,
    #[serde(default)]
    pub zero_pad: usize,
    #[serde(default)]
    pub content: Option<String>,
}

impl From<SequenceArgs> for SequenceSpec {
    fn from(args: SequenceArgs) -> Self {
        let spec = SequenceSpec::new(args.prefix, args.suffix, args.start, args.end).with_zero_pad(args.zero_pad);
        match args.content {
            Some(content) => spec.with_content(content),
            None => spec,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RenameFileArgs {
    pub old_path: String,
    pub new_path: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RenameSequenceArgs {
    pub old_prefix: String,
    #[serde(default)]
    pub old_suffix: String,
    pub new_prefix: String,
    #[serde(default)]
    pub new_suffix: String,
    pub start: u64,
    pub end: u64,
    #[serde(default)]
    pub zero_pad: usize,
    #[serde(default)]
    pub overwrite: bool,
}

impl From<RenameSequenceArgs> for SequenceRename {
    fn from(args: RenameSequenceArgs) -> Self {
        SequenceRename {
            old_prefix: args.old_prefix,
            old_suffix: args.old_suffix,
            new_prefix: args.new_prefix,
            new_suffix: args.new_suffix,
            start: args.start,
            end: args.end,
            zero_pad: args.zero_pad,
            overwrite: args.overwrite,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PathArgs {
    pub path: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GlobArgs {
    pub pattern: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CreateFolderArgs {
    pub path: String,
    #[serde(default = "default_true")]
    pub exist_ok: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DeleteFolderArgs {
    pub path: String,
    #[serde(default)]
    pub recursive: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BulkRenameArgs {
    pub base_path: String,
    pub pattern: String,
    pub replacement: String,
    #[serde(default = "default_true")]
    pub include_subdirs: bool,
    #[serde(default)]
    pub test_only: bool,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_defaults_are_filled_in() {
        let call = ToolCall::from_parts("list_dir", Value::Null).unwrap();
        assert_eq!(
            call,
            ToolCall::ListDir(ListDirArgs {
                path: ".".to_string(),
                tree: true,
                max_depth: 2,
            })
        );

        let call = ToolCall::from_parts("create_folder", json!({"path": "docs"})).unwrap();
        assert_eq!(
            call,
            ToolCall::CreateFolder(CreateFolderArgs {
                path: "docs".to_string(),
                exist_ok: true,
            })
        );

        let call = ToolCall::from_parts(
            "bulk_rename_regex",
            json!({"base_path": ".", "pattern": "a", "replacement": "b"}),
        )
        .unwrap();
        assert_eq!(
            call,
            ToolCall::BulkRenameRegex(BulkRenameArgs {
                base_path: ".".to_string(),
                pattern: "a".to_string(),
                replacement: "b".to_string(),
                include_subdirs: true,
                test_only: false,
            })
        );
    }

    #[test]
    fn test_name_matches_tag() {
        let cases = [
            ("calculator", json!({"expression": "1+1"})),
            ("delete_glob", json!({"pattern": "*.tmp"})),
            ("rename_files_sequence", json!({"old_prefix": "a", "new_prefix": "b", "start": 1, "end": 2})),
            ("move_file", json!({"src": "a", "dst": "b"})),
        ];
        for (name, args) in cases {
            let call = ToolCall::from_parts(name, args).unwrap();
            assert_eq!(call.name(), name);
            assert_eq!(serde_json::to_value(&call).unwrap()["tool"], name);
        }
    }

    #[test]
    fn test_unknown_tool_and_bad_arguments() {
        let err = ToolCall::from_parts("format_disk", json!({})).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::UnknownTool);

        let err = ToolCall::from_parts("read_file", json!({})).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidArguments);

        let err = ToolCall::from_parts("create_files_sequence", json!({"prefix": "a", "start": -1})).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidArguments);

        let err = ToolCall::from_parts("delete_file", json!(["a.txt"])).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidArguments);
    }

    #[test]
    fn test_sequence_args_convert() {
        let call = ToolCall::from_parts(
            "create_files_sequence",
            json!({"prefix": "file_", "suffix": ".txt", "start": 1, "end": 3, "zero_pad": 2}),
        )
        .unwrap();
        let ToolCall::CreateFilesSequence(args) = call else {
            panic!("wrong variant");
        };
        let spec = SequenceSpec::from(args);
        assert_eq!(spec.name_for(3), "file_03.txt");
        assert_eq!(spec.content, None);
    }
}
