//! CLI command definitions and handlers

pub mod index;
pub mod trace;

use crate::core::config::Config;
use crate::core::error::Result;
use clap::{Args, Parser, Subcommand};
use std::path::{Path, PathBuf};

const LONG_ABOUT: &str = r#"
Static dependency tracing and refactor planning for component trees.

Works from a prebuilt file-level dependency index
(.cache/deptrace/file-deps.json under the project root).

TRACE:
    deptrace trace <entry>               Direct, transitive and reverse deps
    deptrace trace Foo --pick-first      Resolve ties by path order
    deptrace trace Foo --choose <path>   Resolve a tie and remember the pick
    deptrace plan <entry>                Trace plus relocation plan

INDEX:
    deptrace info                        Index age and rebuild advice
    deptrace clear-choices               Forget remembered picks

EXIT CODES:
    0 ok, 2 ambiguous target, 3 index failure, 4 resolver failure,
    5 refactor blocked, 6 timeout
"#;

/// Static dependency tracer and refactor planner
#[derive(Parser, Debug)]
#[command(name = "deptrace")]
#[command(author, version)]
#[command(about = "Static dependency tracer and refactor planner")]
#[command(long_about = LONG_ABOUT)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Configuration file (default: $DEPTRACE_HOME/config.toml)
    #[arg(long, global = true, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Debug logging to stderr
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Trace a file's dependencies
    #[command(visible_alias = "t")]
    #[command(after_help = "EXAMPLES:
    deptrace trace src/views/Dashboard.tsx
    deptrace trace UserTable --json
    deptrace trace Foo --pick-first --depth 2")]
    Trace(TraceArgs),

    /// Trace a file and plan its relocation
    #[command(visible_alias = "p")]
    Plan(TraceArgs),

    /// Show dependency index status
    Info(InfoArgs),

    /// Forget remembered disambiguation choices
    ClearChoices(RootArgs),
}

impl Commands {
    /// Whether failures should be reported as JSON
    pub fn wants_json(&self) -> bool {
        match self {
            Commands::Trace(args) | Commands::Plan(args) => args.json,
            Commands::Info(args) => args.json,
            Commands::ClearChoices(_) => false,
        }
    }
}

/// Arguments shared by `trace` and `plan`
#[derive(Args, Debug, Clone)]
pub struct TraceArgs {
    /// File reference: absolute path, partial path, or bare name
    pub entry: String,

    /// Project root holding src/ (default: current directory)
    #[arg(short, long)]
    pub root: Option<PathBuf>,

    /// Index file (default: <root>/.cache/deptrace/file-deps.json)
    #[arg(long, value_name = "PATH")]
    pub index: Option<PathBuf>,

    /// Reject indexes older than this (milliseconds)
    #[arg(long, value_name = "MS")]
    pub max_age_ms: Option<u64>,

    /// Resolve ties by taking the first candidate
    #[arg(long)]
    pub pick_first: bool,

    /// Resolve a tie to this path and remember it
    #[arg(long, value_name = "PATH")]
    pub choose: Option<String>,

    /// Compute a relocation plan
    #[arg(long)]
    pub plan: bool,

    /// Block plans with unresolved mixed-usage risk
    #[arg(long)]
    pub strict: bool,

    /// Limit transitive traversal depth
    #[arg(long, value_name = "N")]
    pub depth: Option<usize>,

    /// Overall trace deadline (milliseconds, 0 disables)
    #[arg(long, value_name = "MS")]
    pub timeout_ms: Option<u64>,

    /// JSON output
    #[arg(long)]
    pub json: bool,
}

/// Arguments for the info command
#[derive(Args, Debug, Clone)]
pub struct InfoArgs {
    /// Project root (default: current directory)
    #[arg(short, long)]
    pub root: Option<PathBuf>,

    /// Index file (default: <root>/.cache/deptrace/file-deps.json)
    #[arg(long, value_name = "PATH")]
    pub index: Option<PathBuf>,

    /// JSON output
    #[arg(long)]
    pub json: bool,
}

/// Arguments naming only a project root
#[derive(Args, Debug, Clone)]
pub struct RootArgs {
    /// Project root (default: current directory)
    #[arg(short, long)]
    pub root: Option<PathBuf>,
}

/// Load configuration from an explicit file or the default location
pub fn load_config(path: Option<&Path>) -> Result<Config> {
    match path {
        Some(path) => Config::load_from(path),
        None => Config::load(),
    }
}

/// The given root, or the current directory
pub fn project_root(root: Option<PathBuf>) -> Result<PathBuf> {
    match root {
        Some(root) => Ok(root),
        None => Ok(std::env::current_dir()?),
    }
}

/// Dispatch a parsed command; returns the process exit code
pub async fn run(cli: Cli) -> Result<i32> {
    let config = load_config(cli.config.as_deref())?;
    match cli.command {
        Commands::Trace(args) => trace::run(args, config, false).await,
        Commands::Plan(args) => trace::run(args, config, true).await,
        Commands::Info(args) => index::info(args, config),
        Commands::ClearChoices(args) => index::clear_choices(args),
    }
}
