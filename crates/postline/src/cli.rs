//! Clap derive structures for the `postline` CLI.
//!
//! Defines the command tree, global flags, and shared types.

use std::path::PathBuf;
use std::time::Duration;

use clap::{Args, Parser, Subcommand, ValueEnum};

// ── Top-Level CLI ────────────────────────────────────────────────────

/// postline -- browse and search a remote record collection
#[derive(Debug, Parser)]
#[command(
    name = "postline",
    version,
    about = "Browse, search, and refresh a remote record collection",
    long_about = "Fetches a record collection from an HTTP endpoint, filters it by a\n\
        case-insensitive title search, and remembers the search between runs.\n\n\
        Use `watch` for an interactive session or `list` for one-shot output.",
    propagate_version = true,
    subcommand_required = true,
    arg_required_else_help = true
)]
pub struct Cli {
    #[command(flatten)]
    pub global: GlobalOpts,

    #[command(subcommand)]
    pub command: Command,
}

// ── Global Options ───────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct GlobalOpts {
    /// Endpoint profile to use
    #[arg(long, short = 'p', env = "POSTLINE_PROFILE", global = true)]
    pub profile: Option<String>,

    /// Collection URL (overrides profile)
    #[arg(long, short = 'e', env = "POSTLINE_ENDPOINT", global = true)]
    pub endpoint: Option<String>,

    /// Bearer token sent with every fetch
    #[arg(long, env = "POSTLINE_API_TOKEN", global = true, hide_env_values = true)]
    pub api_token: Option<String>,

    /// File holding the persisted search query
    #[arg(long, env = "POSTLINE_STATE_FILE", global = true)]
    pub state_file: Option<PathBuf>,

    /// Output format [default: config `defaults.output`, else table]
    #[arg(long, short = 'o', env = "POSTLINE_OUTPUT", global = true)]
    pub output: Option<OutputFormat>,

    /// When to use color output [default: config `defaults.color`, else auto]
    #[arg(long, global = true)]
    pub color: Option<ColorMode>,

    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(long, short = 'v', action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress non-error output
    #[arg(long, short = 'q', global = true)]
    pub quiet: bool,

    /// Accept invalid TLS certificates
    #[arg(long, short = 'k', env = "POSTLINE_INSECURE", global = true)]
    pub insecure: bool,

    /// Request timeout in seconds
    #[arg(long, env = "POSTLINE_TIMEOUT", global = true)]
    pub timeout: Option<u64>,

    /// Quiet period before a search edit is saved (e.g. "300ms")
    #[arg(long, value_parser = humantime::parse_duration, global = true)]
    pub debounce: Option<Duration>,
}

impl GlobalOpts {
    pub fn output_format(&self) -> OutputFormat {
        self.output.unwrap_or_default()
    }

    pub fn color_mode(&self) -> ColorMode {
        self.color.unwrap_or_default()
    }
}

// ── Output & Color Enums ─────────────────────────────────────────────

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Pretty table (default, interactive)
    #[default]
    Table,
    /// Pretty-printed JSON
    Json,
    /// Compact single-line JSON
    JsonCompact,
    /// YAML
    Yaml,
    /// Plain text, one value per line (scripting)
    Plain,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum ColorMode {
    /// Auto-detect (color if terminal is interactive)
    #[default]
    Auto,
    /// Always emit color codes
    Always,
    /// Never emit color codes
    Never,
}

// ── Top-Level Command Enum ───────────────────────────────────────────

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Fetch the collection once and print the filtered view
    #[command(alias = "ls")]
    List(ListArgs),

    /// Interactive session: type to search, `:r` to refresh, `:q` to quit
    #[command(alias = "w")]
    Watch(WatchArgs),

    /// Inspect or change the persisted search query
    Query(QueryArgs),

    /// Manage CLI configuration and profiles
    Config(ConfigArgs),

    /// Generate shell completions
    Completions(CompletionsArgs),
}

// ── list ─────────────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct ListArgs {
    /// Replace the persisted search before listing
    #[arg(long, short = 's')]
    pub query: Option<String>,

    /// Issue a user refresh after the initial fetch
    #[arg(long)]
    pub pull: bool,
}

// ── watch ────────────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct WatchArgs {
    /// Maximum body characters shown per row
    #[arg(long, default_value = "48")]
    pub body_width: usize,
}

// ── query ────────────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct QueryArgs {
    #[command(subcommand)]
    pub command: QueryCommand,
}

#[derive(Debug, Subcommand)]
pub enum QueryCommand {
    /// Print the persisted query
    Show,

    /// Persist a new query
    Set {
        /// Search text
        text: String,
    },

    /// Persist an empty query
    Clear,
}

// ── config ───────────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub command: ConfigCommand,
}

#[derive(Debug, Subcommand)]
pub enum ConfigCommand {
    /// Create initial config file with guided setup
    Init,

    /// Display current configuration (tokens masked)
    Show,

    /// Print the config and state file locations
    Path,
}

// ── completions ──────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct CompletionsArgs {
    /// Shell to generate completions for
    pub shell: clap_complete::Shell,
}
