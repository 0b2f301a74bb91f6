//! Clap derive structures for the `geoblink` CLI.
//!
//! Defines the command tree, global flags, and shared enums.

use clap::{Args, Parser, Subcommand, ValueEnum};

// ── Top-Level CLI ────────────────────────────────────────────────────

/// geoblink -- fleet monitoring for GPS trackers from the command line
#[derive(Debug, Parser)]
#[command(
    name = "geoblink",
    version,
    about = "Monitor a GPS tracker fleet from the command line",
    long_about = "A CLI client for the geoblink tracker platform.\n\n\
        Authenticates via SMS one-time codes and keeps a live local cache\n\
        of the account's devices; `watch` renders the cache as it updates.",
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
    /// Platform profile to use
    #[arg(long, short = 'p', env = "GEOBLINK_PROFILE", global = true)]
    pub profile: Option<String>,

    /// Platform base URL (overrides profile)
    #[arg(long, short = 's', env = "GEOBLINK_SERVER", global = true)]
    pub server: Option<String>,

    /// Output format
    #[arg(
        long,
        short = 'o',
        env = "GEOBLINK_OUTPUT",
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

    /// Accept self-signed TLS certificates
    #[arg(long, short = 'k', env = "GEOBLINK_INSECURE", global = true)]
    pub insecure: bool,

    /// Request timeout in seconds (overrides profile)
    #[arg(long, env = "GEOBLINK_TIMEOUT", global = true)]
    pub timeout: Option<u64>,
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
    /// Log in with an SMS one-time code
    Login {
        /// Account phone number (prompted if omitted)
        phone: Option<String>,
    },

    /// Forget the stored session for the active profile
    Logout,

    /// Query the device fleet
    #[command(alias = "dev", alias = "d")]
    Devices(DevicesArgs),

    /// Fetch the remote device list into the local cache once
    Sync,

    /// Live fleet view, refreshed periodically
    Watch {
        /// Seconds between refreshes (overrides profile)
        #[arg(long, short = 'i')]
        interval: Option<u64>,
    },

    /// List notification feed entries
    #[command(alias = "notif")]
    Notifications {
        /// Max entries to show
        #[arg(long, short = 'l', default_value = "50")]
        limit: usize,
    },

    /// Generate shell completions
    Completions(CompletionsArgs),
}

// ── Devices ──────────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct DevicesArgs {
    #[command(subcommand)]
    pub command: DevicesCommand,
}

#[derive(Debug, Subcommand)]
pub enum DevicesCommand {
    /// List all devices on the account
    #[command(alias = "ls")]
    List,

    /// Show one device in detail
    Show {
        /// Device IMEI or display name
        device: String,
    },

    /// Find a device by name, IMEI fragment, or registration plate
    Search {
        /// Search query
        query: String,
    },

    /// Attach a new tracker to the account
    Bind {
        /// 15-digit tracker IMEI
        imei: String,

        /// Display name for the new tracker
        #[arg(long, short = 'n')]
        name: Option<String>,
    },
}

// ── Completions ──────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct CompletionsArgs {
    /// Shell to generate completions for
    pub shell: clap_complete::Shell,
}
