//! CLI argument definitions.
//!
//! The main entry point is the [`Cli`] struct.

use clap::{Parser, Subcommand};
use clap_complete::Shell;
use std::path::PathBuf;

use crate::config::{ExecutionMode, SettingsOverrides};

/// FluxLoop environment resolution and command dispatch.
#[derive(Debug, Parser)]
#[command(name = "fluxloop-env")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Workspace folder (repeatable; defaults to the current directory)
    #[arg(short, long = "workspace", global = true, value_name = "DIR")]
    pub workspaces: Vec<PathBuf>,

    /// Execution mode override (auto, workspace, global, custom)
    #[arg(long, global = true, env = "FLUXLOOP_EXECUTION_MODE")]
    pub execution_mode: Option<ExecutionMode>,

    /// Python interpreter override
    #[arg(long, global = true, value_name = "PATH", env = "FLUXLOOP_PYTHON_PATH")]
    pub python_path: Option<String>,

    /// Show verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Minimal output
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Disable colored output
    #[arg(long, global = true)]
    pub no_color: bool,

    /// Enable debug logging
    #[arg(long, global = true)]
    pub debug: bool,

    #[command(subcommand)]
    pub command: Commands,
}

impl Cli {
    /// Workspace folders, defaulting to `cwd`.
    pub fn folders(&self, cwd: PathBuf) -> Vec<PathBuf> {
        if self.workspaces.is_empty() {
            vec![cwd]
        } else {
            self.workspaces.clone()
        }
    }

    /// Settings overrides from the global flags.
    pub fn overrides(&self) -> SettingsOverrides {
        SettingsOverrides {
            execution_mode: self.execution_mode,
            python_path: self.python_path.clone(),
        }
    }
}

/// Available subcommands.
#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Show the active execution environment
    Env(EnvArgs),

    /// Check a directory for a usable FluxLoop environment
    Check(CheckArgs),

    /// Launch the FluxLoop CLI in this terminal
    Run(RunArgs),

    /// Run any command through the active environment and capture its output
    Exec(ExecArgs),

    /// Ask the FluxLoop documentation index a question
    Query(QueryArgs),

    /// Show readiness of the FluxLoop tools
    Status(StatusArgs),

    /// Get integration guidance for a file from Flux Agent
    Agent(AgentArgs),

    /// Manage registered FluxLoop projects
    #[command(subcommand)]
    Project(ProjectCommands),

    /// Generate shell completions
    Completions(CompletionsArgs),
}

/// Arguments for the `env` command.
#[derive(Debug, Clone, Default, clap::Args)]
pub struct EnvArgs {
    /// Print the descriptor as JSON
    #[arg(long)]
    pub json: bool,

    /// Ignore the cache and resolve again
    #[arg(long)]
    pub refresh: bool,
}

/// Arguments for the `check` command.
#[derive(Debug, Clone, Default, clap::Args)]
pub struct CheckArgs {
    /// Directory to check (defaults to the resolved source root)
    pub path: Option<PathBuf>,

    /// Print the report as JSON
    #[arg(long)]
    pub json: bool,
}

/// Arguments for the `run` command.
#[derive(Debug, Clone, Default, clap::Args)]
pub struct RunArgs {
    /// Working directory (defaults to the active project)
    #[arg(long, value_name = "DIR")]
    pub cwd: Option<PathBuf>,

    /// Arguments passed to the FluxLoop CLI
    #[arg(trailing_var_arg = true, allow_hyphen_values = true)]
    pub args: Vec<String>,
}

/// Arguments for the `exec` command.
#[derive(Debug, Clone, clap::Args)]
pub struct ExecArgs {
    /// Working directory (defaults to the active project)
    #[arg(long, value_name = "DIR")]
    pub cwd: Option<PathBuf>,

    /// Logical command name, e.g. fluxloop, fluxloop-mcp or python3
    pub command: String,

    /// Arguments for the command
    #[arg(trailing_var_arg = true, allow_hyphen_values = true)]
    pub args: Vec<String>,
}

/// Arguments for the `query` command.
#[derive(Debug, Clone, clap::Args)]
pub struct QueryArgs {
    /// Question for the documentation index
    #[arg(required = true, num_args = 1..)]
    pub text: Vec<String>,
}

impl QueryArgs {
    pub fn query(&self) -> String {
        self.text.join(" ")
    }
}

/// Arguments for the `status` command.
#[derive(Debug, Clone, Default, clap::Args)]
pub struct StatusArgs {
    /// Print statuses as JSON
    #[arg(long)]
    pub json: bool,
}

/// Arguments for the `agent` command.
#[derive(Debug, Clone, clap::Args)]
pub struct AgentArgs {
    /// File to get guidance for
    pub file: PathBuf,

    /// Limit the selection to lines START:END (1-based, inclusive)
    #[arg(long, value_name = "START:END", value_parser = parse_line_range)]
    pub lines: Option<(usize, usize)>,

    /// Print the suggestion as JSON
    #[arg(long)]
    pub json: bool,
}

/// Parse `A:B` into an inclusive line range.
pub fn parse_line_range(value: &str) -> Result<(usize, usize), String> {
    let (start, end) = value
        .split_once(':')
        .ok_or_else(|| format!("expected START:END, got '{}'", value))?;
    let start: usize = start
        .trim()
        .parse()
        .map_err(|_| format!("invalid start line '{}'", start))?;
    let end: usize = end
        .trim()
        .parse()
        .map_err(|_| format!("invalid end line '{}'", end))?;
    if start == 0 || end < start {
        return Err(format!("invalid line range '{}'", value));
    }
    Ok((start, end))
}

/// `project` subcommands.
#[derive(Debug, Clone, Subcommand)]
pub enum ProjectCommands {
    /// Register a project directory
    Add(ProjectAddArgs),

    /// List registered projects
    List(ProjectListArgs),

    /// Make a project active (by id, name or path)
    Use(ProjectUseArgs),

    /// Forget a registered project
    Remove(ProjectRemoveArgs),
}

#[derive(Debug, Clone, clap::Args)]
pub struct ProjectAddArgs {
    /// Project directory
    pub path: PathBuf,

    /// Display name (defaults to the directory name)
    #[arg(long)]
    pub name: Option<String>,

    /// Source root, relative to the project directory
    #[arg(long, value_name = "DIR")]
    pub source_root: Option<String>,

    /// Do not make the project active
    #[arg(long)]
    pub no_activate: bool,
}

#[derive(Debug, Clone, Default, clap::Args)]
pub struct ProjectListArgs {
    /// Print projects as JSON
    #[arg(long)]
    pub json: bool,
}

#[derive(Debug, Clone, clap::Args)]
pub struct ProjectUseArgs {
    /// Project id, name or path; omit to pick interactively
    pub project: Option<String>,

    /// Clear the active project
    #[arg(long, conflicts_with = "project")]
    pub none: bool,
}

#[derive(Debug, Clone, clap::Args)]
pub struct ProjectRemoveArgs {
    /// Project id, name or path
    pub project: String,
}

/// Arguments for the `completions` command.
#[derive(Debug, Clone, clap::Args)]
pub struct CompletionsArgs {
    /// Shell to generate completions for
    pub shell: Shell,
}
