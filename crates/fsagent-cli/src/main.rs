//! FsAgent command-line host
//!
//! Opens the sandbox and runs one tool call through the registry.
//!
//! ```bash
//! fsagent tools
//! fsagent --sandbox ./work call create_files_sequence '{"prefix": "file_", "suffix": ".txt", "start": 1, "end": 3}'
//! fsagent call calculator '{"expression": "(12 * 3.5) / 7"}'
//! ```

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use fsagent_core::{tool_definitions, Sandbox, SandboxConfig, ToolOutput, Toolbox};
use serde_json::Value;
use std::path::PathBuf;
use std::process::ExitCode;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Sandboxed file and arithmetic tools
#[derive(Parser, Debug)]
#[command(author, version, about)]
struct Cli {
    /// Sandbox root (overrides SANDBOX_DIR)
    #[arg(long, global = true)]
    sandbox: Option<PathBuf>,

    /// Default read_file limit in bytes (overrides FSAGENT_MAX_READ_BYTES)
    #[arg(long, global = true)]
    max_read_bytes: Option<u64>,

    /// Print results as JSON
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// List the available tools
    Tools,
    /// Invoke one tool
    Call {
        /// Tool name, e.g. read_file
        tool: String,
        /// Arguments as a JSON object
        args: Option<String>,
    },
}

#[tokio::main]
async fn main() -> Result<ExitCode> {
    // Logs go to stderr; stdout carries only results
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();
    run(cli, SandboxConfig::from_env).await
}

/// `load` supplies the settings the flags are applied on top of
async fn run(cli: Cli, load: impl FnOnce() -> fsagent_core::Result<SandboxConfig>) -> Result<ExitCode> {
    match cli.command {
        Command::Tools => {
            let definitions = tool_definitions();
            if cli.json {
                println!("{}", serde_json::to_string_pretty(&definitions)?);
            } else {
                for def in definitions {
                    println!("{:<24} {}", def.name, def.description);
                }
            }
            Ok(ExitCode::SUCCESS)
        }
        Command::Call { ref tool, ref args } => {
            let config = apply_flags(&cli, load()?);
            let sandbox = Sandbox::open(config).context("failed to open sandbox")?;
            info!("Starting FsAgent in {:?}", sandbox.guard().root());

            let args = parse_args(args.as_deref())?;
            let output = Toolbox::new(sandbox).execute_named(tool, args).await;
            print_output(&output, cli.json)?;

            Ok(if output.success {
                ExitCode::SUCCESS
            } else {
                ExitCode::FAILURE
            })
        }
    }
}

/// Command-line flags on top of the environment settings
fn apply_flags(cli: &Cli, mut config: SandboxConfig) -> SandboxConfig {
    if let Some(root) = &cli.sandbox {
        config.root = root.clone();
    }
    if let Some(limit) = cli.max_read_bytes {
        config = config.with_max_read_bytes(limit);
    }
    config
}

fn parse_args(raw: Option<&str>) -> Result<Value> {
    match raw.map(str::trim) {
        None | Some("") => Ok(Value::Null),
        Some(text) => serde_json::from_str(text).context("tool arguments must be valid JSON"),
    }
}

fn print_output(output: &ToolOutput, json: bool) -> Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(output)?);
    } else if output.success {
        println!("{}", output.content);
    } else {
        eprintln!("Error: {}", output.content);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use tempfile::tempdir;

    #[test]
    fn test_parse_call_command() {
        let cli = Cli::try_parse_from([
            "fsagent",
            "--sandbox",
            "/tmp/box",
            "call",
            "read_file",
            r#"{"path": "a.txt"}"#,
        ])
        .unwrap();

        assert_eq!(cli.sandbox, Some(PathBuf::from("/tmp/box")));
        match cli.command {
            Command::Call { tool, args } => {
                assert_eq!(tool, "read_file");
                assert_eq!(parse_args(args.as_deref()).unwrap(), json!({"path": "a.txt"}));
            }
            other => panic!("unexpected command {:?}", other),
        }
    }

    #[test]
    fn test_parse_args() {
        assert_eq!(parse_args(None).unwrap(), Value::Null);
        assert_eq!(parse_args(Some("  ")).unwrap(), Value::Null);
        assert!(parse_args(Some("{not json")).is_err());
    }

    #[test]
    fn test_flags_override_config() {
        let cli = Cli::try_parse_from(["fsagent", "--sandbox", "here", "--max-read-bytes", "10", "tools"]).unwrap();
        let base = SandboxConfig::new("elsewhere").with_max_batch_items(5);
        let config = apply_flags(&cli, base);
        assert_eq!(config.root, PathBuf::from("here"));
        assert_eq!(config.max_read_bytes, 10);
        assert_eq!(config.max_batch_items, 5);

        let bare = Cli::try_parse_from(["fsagent", "tools"]).unwrap();
        let config = apply_flags(&bare, SandboxConfig::new("elsewhere"));
        assert_eq!(config.root, PathBuf::from("elsewhere"));
    }

    #[tokio::test]
    async fn test_call_runs_in_sandbox() {
        let dir = tempdir().unwrap();
        let root = dir.path().display().to_string();
        let cli = Cli::try_parse_from([
            "fsagent",
            "--sandbox",
            root.as_str(),
            "call",
            "create_file",
            r#"{"path": "hello.txt", "content": "hi"}"#,
        ])
        .unwrap();

        let code = run(cli, || Ok(SandboxConfig::default())).await.unwrap();

        assert_eq!(code, ExitCode::SUCCESS);
        assert_eq!(std::fs::read_to_string(dir.path().join("hello.txt")).unwrap(), "hi");
    }
}
