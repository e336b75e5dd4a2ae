//! Clap derive structures for the `mihoctl` CLI.
//!
//! Defines the command tree, global flags, and shared types.

use clap::{Args, Parser, Subcommand, ValueEnum};

// ── Top-Level CLI ────────────────────────────────────────────────────

/// mihoctl -- drive a running mihomo daemon from the shell
#[derive(Debug, Parser)]
#[command(
    name = "mihoctl",
    version,
    author,
    about = "Control a mihomo proxy daemon from the command line",
    long_about = "Headless access to mihomo's external controller: list proxy groups,\n\
        switch the selected node, run latency tests, and inspect connections\n\
        and rules. Run `mihoctl-tui` for the interactive dashboard.",
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
    /// External controller address (overrides config)
    #[arg(long, short = 'a', env = "MIHOCTL_API_ADDRESS", global = true)]
    pub api_address: Option<String>,

    /// Controller secret (overrides config)
    #[arg(long, env = "MIHOCTL_SECRET", global = true, hide_env_values = true)]
    pub secret: Option<String>,

    /// Request and probe timeout in milliseconds (overrides config)
    #[arg(long, global = true)]
    pub timeout: Option<u64>,

    /// Output format
    #[arg(long, short = 'o', default_value = "table", global = true)]
    pub output: OutputFormat,

    /// When to use color output
    #[arg(long, default_value = "auto", global = true)]
    pub color: ColorMode,

    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(long, short = 'v', action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress non-error output
    #[arg(long, short = 'q', global = true)]
    pub quiet: bool,
}

// ── Output & Color Enums ─────────────────────────────────────────────

#[derive(Debug, Clone, ValueEnum)]
pub enum OutputFormat {
    /// Pretty table (default, interactive)
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

#[derive(Debug, Clone, ValueEnum)]
pub enum ColorMode {
    /// Auto-detect (color if terminal is interactive)
    Auto,
    /// Always emit color codes
    Always,
    /// Never emit color codes
    Never,
}

// ── Top-Level Command Enum ───────────────────────────────────────────

#[derive(Debug, Subcommand)]
pub enum Command {
    /// List proxy groups, or the members of one group
    #[command(alias = "ls")]
    List {
        /// Group to expand
        group: Option<String>,
    },

    /// Switch a selector group to another member
    Select {
        /// Group name
        group: String,
        /// Member to select
        proxy: String,
    },

    /// Measure latency through one proxy
    Test(TestArgs),

    /// Measure latency for every member of a group
    TestGroup(TestGroupArgs),

    /// Show active connections
    #[command(alias = "conns")]
    Connections,

    /// Close one connection, or all of them
    Close(CloseArgs),

    /// Show routing rules in match order
    Rules,

    /// Show daemon version and traffic totals
    Status,

    /// Manage the mihoctl configuration file
    Config(ConfigArgs),

    /// Generate shell completions
    Completions(CompletionsArgs),
}

// ── Command Arguments ────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct TestArgs {
    /// Proxy (or group) name
    pub proxy: String,

    /// Probe URL (overrides config)
    #[arg(long)]
    pub url: Option<String>,
}

#[derive(Debug, Args)]
pub struct TestGroupArgs {
    /// Group name
    pub group: String,

    /// Probe URL (overrides config)
    #[arg(long)]
    pub url: Option<String>,
}

#[derive(Debug, Args)]
pub struct CloseArgs {
    /// Connection ID
    #[arg(required_unless_present = "all")]
    pub id: Option<String>,

    /// Close every active connection
    #[arg(long, conflicts_with = "id")]
    pub all: bool,
}

#[derive(Debug, Args)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub command: ConfigCommand,
}

#[derive(Debug, Subcommand)]
pub enum ConfigCommand {
    /// Create the config file with guided setup
    Init,

    /// Display the current resolved configuration
    Show,

    /// Set a configuration value
    Set {
        /// Config key: api_address, secret, test_url, timeout
        key: String,

        /// Value to set
        value: String,
    },

    /// Print the config file location
    Path,
}

#[derive(Debug, Args)]
pub struct CompletionsArgs {
    /// Shell to generate completions for
    pub shell: clap_complete::Shell,
}
