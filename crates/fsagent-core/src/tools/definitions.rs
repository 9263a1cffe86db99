//! Tool descriptions advertised to a model

use crate::types::ToolDefinition;
use serde_json::{json, Value};

fn def(name: &str, description: &str, parameters: Value) -> ToolDefinition {
    ToolDefinition {
        name: name.to_string(),
        description: description.to_string(),
        parameters,
    }
}

fn string(description: &str) -> Value {
    json!({ "type": "string", "description": description })
}

fn boolean(description: &str, default: bool) -> Value {
    json!({ "type": "boolean", "description": description, "default": default })
}

fn integer(description: &str) -> Value {
    json!({ "type": "integer", "minimum": 0, "description": description })
}

fn sequence_params(what: &str, with_content: bool) -> Value {
    let mut properties = json!({
        "prefix": string(&format!("Text before the index in each {} name", what)),
        "suffix": string("Text after the index, e.g. an extension"),
        "start": integer("First index (inclusive)"),
        "end": integer("Last index (inclusive)"),
        "zero_pad": integer("Pad indices with zeros to this width; 0 disables padding"),
    });
    if with_content {
        properties["content"] = string("Initial content of every created file");
    }
    json!({
        "type": "object",
        "properties": properties,
        "required": ["prefix", "start", "end"]
    })
}

/// Every tool with its JSON-schema parameters
pub fn tool_definitions() -> Vec<ToolDefinition> {
    vec![
        def(
            "calculator",
            "Evaluate an arithmetic expression (+ - * / % ** and parentheses)",
            json!({
                "type": "object",
                "properties": { "expression": string("Expression such as (12 * 3.5) / 7") },
                "required": ["expression"]
            }),
        ),
        def(
            "list_dir",
            "List a folder inside the sandbox, flat or as a tree",
            json!({
                "type": "object",
                "properties": {
                    "path": string("Folder to list, relative to the sandbox root"),
                    "tree": boolean("Render an indented tree instead of a flat listing", true),
                    "max_depth": integer("How many levels the tree descends"),
                }
            }),
        ),
        def(
            "read_file",
            "Read a text file; files above max_bytes are refused",
            json!({
                "type": "object",
                "properties": {
                    "path": string("File to read"),
                    "max_bytes": integer("Largest file size accepted"),
                },
                "required": ["path"]
            }),
        ),
        def(
            "write_file",
            "Create or overwrite a file with the given content",
            json!({
                "type": "object",
                "properties": {
                    "path": string("File to write"),
                    "content": string("Full new content"),
                },
                "required": ["path", "content"]
            }),
        ),
        def(
            "append_file",
            "Append content to an existing file",
            json!({
                "type": "object",
                "properties": {
                    "path": string("File to append to"),
                    "content": string("Text to append"),
                },
                "required": ["path", "content"]
            }),
        ),
        def(
            "copy_file",
            "Copy a file to a new path",
            json!({
                "type": "object",
                "properties": {
                    "src": string("File to copy"),
                    "dst": string("Destination path"),
                    "overwrite": boolean("Replace an existing destination", false),
                },
                "required": ["src", "dst"]
            }),
        ),
        def(
            "move_file",
            "Move a file or folder to a new path",
            json!({
                "type": "object",
                "properties": {
                    "src": string("Entry to move"),
                    "dst": string("Destination path"),
                    "overwrite": boolean("Replace an existing destination of the same kind", false),
                },
                "required": ["src", "dst"]
            }),
        ),
        def(
            "create_file",
            "Create a new file; fails if it already exists",
            json!({
                "type": "object",
                "properties": {
                    "path": string("File to create"),
                    "content": string("Initial content"),
                },
                "required": ["path"]
            }),
        ),
        def(
            "create_files_sequence",
            "Create numbered files prefix + index + suffix for every index in start..=end",
            sequence_params("file", true),
        ),
        def(
            "rename_file",
            "Rename a file or folder; fails if the new path exists",
            json!({
                "type": "object",
                "properties": {
                    "old_path": string("Current path"),
                    "new_path": string("New path"),
                },
                "required": ["old_path", "new_path"]
            }),
        ),
        def(
            "rename_files_sequence",
            "Rename numbered files from one prefix/suffix pair to another",
            json!({
                "type": "object",
                "properties": {
                    "old_prefix": string("Current prefix"),
                    "old_suffix": string("Current suffix"),
                    "new_prefix": string("New prefix"),
                    "new_suffix": string("New suffix"),
                    "start": integer("First index (inclusive)"),
                    "end": integer("Last index (inclusive)"),
                    "zero_pad": integer("Zero-pad width used by both names; 0 disables padding"),
                    "overwrite": boolean("Replace existing targets", false),
                },
                "required": ["old_prefix", "new_prefix", "start", "end"]
            }),
        ),
        def(
            "delete_file",
            "Delete a single file",
            json!({
                "type": "object",
                "properties": { "path": string("File to delete") },
                "required": ["path"]
            }),
        ),
        def(
            "delete_glob",
            "Delete every file matching a glob pattern (folders are skipped)",
            json!({
                "type": "object",
                "properties": { "pattern": string("Pattern relative to the sandbox root, e.g. **/*.tmp") },
                "required": ["pattern"]
            }),
        ),
        def(
            "create_folder",
            "Create a folder and any missing parents",
            json!({
                "type": "object",
                "properties": {
                    "path": string("Folder to create"),
                    "exist_ok": boolean("Succeed when the folder already exists", true),
                },
                "required": ["path"]
            }),
        ),
        def(
            "create_folders_sequence",
            "Create numbered folders prefix + index + suffix for every index in start..=end",
            sequence_params("folder", false),
        ),
        def(
            "delete_folder",
            "Delete a folder; non-empty folders need recursive=true",
            json!({
                "type": "object",
                "properties": {
                    "path": string("Folder to delete"),
                    "recursive": boolean("Delete the folder with everything in it", false),
                },
                "required": ["path"]
            }),
        ),
        def(
            "bulk_rename_regex",
            "Rename entries whose name matches a regex; test_only previews without changes",
            json!({
                "type": "object",
                "properties": {
                    "base_path": string("Folder to search"),
                    "pattern": string("Regular expression matched against entry names"),
                    "replacement": string("Replacement; $1, ${name} and \\1 refer to groups"),
                    "include_subdirs": boolean("Search nested folders too", true),
                    "test_only": boolean("Only report what would be renamed", false),
                },
                "required": ["base_path", "pattern", "replacement"]
            }),
        ),
    ]
}
