//! Clap derive structures for the `truckgate` CLI.
//!
//! Defines the complete command tree, global flags, and shared types.

use clap::{Args, Parser, Subcommand, ValueEnum};

// ── Top-Level CLI ────────────────────────────────────────────────────

/// truckgate -- operator console for the truck gate detection backend
#[derive(Debug, Parser)]
#[command(
    name = "truckgate",
    version,
    about = "Run and monitor truck gate detection sessions",
    long_about = "Operator CLI for the truck gate backend.\n\n\
        Starts camera + detection sessions, shows live gate decisions,\n\
        and manages the plate whitelist.",
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
    /// Backend profile to use
    #[arg(long, short = 'p', env = "TRUCKGATE_PROFILE", global = true)]
    pub profile: Option<String>,

    /// Backend URL (overrides profile)
    #[arg(long, short = 'b', env = "TRUCKGATE_BACKEND", global = true)]
    pub backend: Option<String>,

    /// API key for an authenticating proxy
    #[arg(long, env = "TRUCKGATE_API_KEY", global = true, hide_env = true)]
    pub api_key: Option<String>,

    /// Output format
    #[arg(
        long,
        short = 'o',
        env = "TRUCKGATE_OUTPUT",
        default_value = "table",
        global = true
    )]
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

    /// Skip confirmation prompts
    #[arg(long, short = 'y', global = true)]
    pub yes: bool,

    /// Accept self-signed TLS certificates
    #[arg(long, short = 'k', env = "TRUCKGATE_INSECURE", global = true)]
    pub insecure: bool,

    /// Request timeout in seconds (overrides profile)
    #[arg(long, env = "TRUCKGATE_TIMEOUT", global = true)]
    pub timeout: Option<u64>,
}

// ── Output & Color Enums ─────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
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

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
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
    /// List capture devices
    #[command(alias = "cam")]
    Cameras(CamerasArgs),

    /// Run a detection session and show gate decisions live
    #[command(alias = "mon")]
    Monitor(MonitorArgs),

    /// Manage the plate whitelist
    #[command(alias = "plate")]
    Plates(PlatesArgs),

    /// Show backend component health
    Health,

    /// Manage CLI configuration and profiles
    Config(ConfigArgs),

    /// Generate shell completions
    Completions(CompletionsArgs),
}

// ── Cameras ──────────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct CamerasArgs {
    #[command(subcommand)]
    pub command: CamerasCommand,
}

#[derive(Debug, Subcommand)]
pub enum CamerasCommand {
    /// List cameras the backend can open
    #[command(alias = "ls")]
    List,
}

// ── Monitor ──────────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct MonitorArgs {
    /// Camera to open (defaults to the profile's default_camera)
    #[arg(long, short = 'c')]
    pub camera: Option<u32>,

    /// Stop automatically after this many seconds
    #[arg(long, short = 'd')]
    pub duration: Option<u64>,

    /// Poll interval in milliseconds (overrides config)
    #[arg(long)]
    pub poll_interval: Option<u64>,
}

// ── Plates ───────────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct PlatesArgs {
    #[command(subcommand)]
    pub command: PlatesCommand,
}

#[derive(Debug, Subcommand)]
pub enum PlatesCommand {
    /// List whitelisted plates, newest first
    #[command(alias = "ls")]
    List {
        /// Only show plates containing this text
        #[arg(long, short = 's')]
        search: Option<String>,
    },

    /// Whitelist a plate (e.g. "34 ABC 1234")
    Add {
        /// Plate number; spaces and case are normalized
        plate: String,
    },

    /// Remove a plate by number or record ID
    #[command(alias = "rm")]
    Remove {
        /// Plate number or record ID
        plate: String,
    },

    /// Check whether a plate would be granted access
    Check {
        /// Plate number
        plate: String,
    },
}

// ── Config ───────────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub command: ConfigCommand,
}

#[derive(Debug, Subcommand)]
pub enum ConfigCommand {
    /// Interactive configuration wizard
    Init,

    /// Show the current configuration
    Show,

    /// Print the config file path
    Path,

    /// Set a profile value
    Set {
        /// Key (backend, api_key_env, insecure, timeout, ca_cert, default_camera)
        key: String,
        /// Value
        value: String,
    },

    /// List configured profiles
    Profiles,

    /// Set the default profile
    SetDefault {
        /// Profile name
        name: String,
    },

    /// Store the profile's API key in the system keyring
    SetKey {
        /// Profile name (defaults to the active profile)
        #[arg(long)]
        profile: Option<String>,
    },
}

// ── Completions ──────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct CompletionsArgs {
    /// Shell to generate completions for
    pub shell: clap_complete::Shell,
}
