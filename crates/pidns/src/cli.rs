//! Clap derive structures for the `pidns` CLI.
//!
//! Defines the complete command tree, global flags, and shared types.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};

// ── Top-Level CLI ────────────────────────────────────────────────────

/// pidns -- admin panel for a PiDNS ad-blocking appliance
#[derive(Debug, Parser)]
#[command(
    name = "pidns",
    version,
    about = "Administer a PiDNS ad-blocker from the command line",
    long_about = "Manage blacklist and whitelist entries, block-list subscriptions,\n\
        query statistics, and the network device dashboard of a PiDNS appliance.",
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
    /// Appliance profile to use
    #[arg(long, short = 'p', env = "PIDNS_PROFILE", global = true)]
    pub profile: Option<String>,

    /// Admin API URL (overrides profile)
    #[arg(long, short = 'u', env = "PIDNS_URL", global = true)]
    pub url: Option<String>,

    /// Network dashboard URL (overrides profile)
    #[arg(long, env = "PIDNS_DASHBOARD_URL", global = true)]
    pub dashboard_url: Option<String>,

    /// Admin username
    #[arg(long, env = "PIDNS_USERNAME", global = true, hide_env = true)]
    pub username: Option<String>,

    /// Admin password
    #[arg(long, env = "PIDNS_PASSWORD", global = true, hide_env_values = true)]
    pub password: Option<String>,

    /// Output format
    #[arg(
        long,
        short = 'o',
        env = "PIDNS_OUTPUT",
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

    /// Accept invalid TLS certificates
    #[arg(long, short = 'k', env = "PIDNS_INSECURE", global = true)]
    pub insecure: bool,

    /// Request timeout in seconds (overrides profile)
    #[arg(long, env = "PIDNS_TIMEOUT", global = true)]
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
    /// Manage blacklisted domains
    #[command(alias = "bl")]
    Blacklist(EntriesArgs),

    /// Manage whitelisted domains
    #[command(alias = "wl")]
    Whitelist(EntriesArgs),

    /// Manage block-list subscriptions
    #[command(alias = "lists")]
    Blocklists(BlocklistsArgs),

    /// Query DNS statistics
    Stats(StatsArgs),

    /// Show devices on the local network
    #[command(alias = "dev")]
    Devices(DevicesArgs),

    /// Manage CLI configuration and profiles
    Config(ConfigArgs),

    /// Generate shell completions
    Completions(CompletionsArgs),
}

// ── Blacklist / Whitelist ────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct EntriesArgs {
    #[command(subcommand)]
    pub command: EntriesCommand,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum EntryStatus {
    #[default]
    Any,
    Active,
    Expired,
}

#[derive(Debug, Subcommand)]
pub enum EntriesCommand {
    /// List entries
    #[command(alias = "ls")]
    List {
        /// Only entries in this category
        #[arg(long, short = 'c')]
        category: Option<String>,

        /// Filter by expiry status
        #[arg(long, short = 's', default_value = "any")]
        status: EntryStatus,

        /// Case-insensitive search over domain and notes
        #[arg(long)]
        search: Option<String>,
    },

    /// Add a domain
    Add {
        domain: String,

        #[arg(long, short = 'c', default_value = "custom")]
        category: String,

        /// Expiry as local `YYYY-MM-DDTHH:MM` or RFC 3339
        #[arg(long)]
        expires: Option<String>,

        #[arg(long)]
        notes: Option<String>,
    },

    /// Edit an existing entry
    Edit {
        id: String,

        #[arg(long)]
        domain: Option<String>,

        #[arg(long, short = 'c')]
        category: Option<String>,

        /// New expiry as local `YYYY-MM-DDTHH:MM` or RFC 3339
        #[arg(long, conflicts_with = "clear_expiry")]
        expires: Option<String>,

        #[arg(long)]
        notes: Option<String>,

        /// Remove the expiry date
        #[arg(long)]
        clear_expiry: bool,
    },

    /// Show one entry as stored on the appliance
    Show { id: String },

    /// Delete an entry
    #[command(alias = "rm")]
    Delete { id: String },

    /// Import newline-separated domains
    Import {
        /// Read domains from a file
        #[arg(long, short = 'f', conflicts_with = "data", required_unless_present = "data")]
        file: Option<PathBuf>,

        /// Domains given inline, one per line
        #[arg(long)]
        data: Option<String>,

        #[arg(long, short = 'c', default_value = "custom")]
        category: String,

        /// Show what would be imported without sending anything
        #[arg(long)]
        preview: bool,
    },

    /// Export the full list as JSON
    Export {
        /// Directory to write into
        #[arg(long, short = 'd', default_value = ".")]
        dir: PathBuf,

        /// Also copy the exported JSON to the clipboard
        #[arg(long)]
        copy: bool,
    },

    /// Remove all expired entries
    Cleanup,

    /// Check whether domains are on this list
    Check {
        #[arg(required = true)]
        domains: Vec<String>,
    },

    /// Categories offered for new entries
    Categories,

    /// Entry counts: total, active, expired and per category
    Stats,
}

// ── Block lists ──────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct BlocklistsArgs {
    #[command(subcommand)]
    pub command: BlocklistsCommand,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum ListStatus {
    #[default]
    Any,
    Enabled,
    Disabled,
}

#[derive(Debug, Subcommand)]
pub enum BlocklistsCommand {
    /// List subscriptions
    #[command(alias = "ls")]
    List {
        #[arg(long, short = 'c')]
        category: Option<String>,

        #[arg(long, short = 's', default_value = "any")]
        status: ListStatus,
    },

    /// Subscribe to a custom block list
    Add {
        /// Where the list is downloaded from
        source: String,

        #[arg(long)]
        name: String,

        #[arg(long, short = 'c', default_value = "custom")]
        category: String,

        #[arg(long)]
        description: Option<String>,
    },

    /// Show the catalog of predefined block lists
    Catalog,

    /// Subscribe to a predefined block list by URL
    AddPredefined { url: String },

    /// Show one subscription as stored on the appliance
    Show { id: String },

    /// Change a subscription's settings
    Edit {
        id: String,

        #[arg(long)]
        name: Option<String>,

        #[arg(long, short = 'c')]
        category: Option<String>,

        #[arg(long)]
        description: Option<String>,

        /// Turn the subscription on
        #[arg(long, conflicts_with = "disable")]
        enable: bool,

        /// Turn the subscription off
        #[arg(long)]
        disable: bool,
    },

    /// Enable or disable a subscription
    Toggle { id: String },

    /// Re-download one block list
    Update { id: String },

    /// Re-download every enabled block list
    UpdateAll,

    /// Remove a subscription
    #[command(alias = "rm")]
    Delete { id: String },

    /// Categories offered for subscriptions
    Categories,

    /// Subscription and domain totals
    Stats,
}

// ── Statistics ───────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct StatsArgs {
    /// Day window for overview, domains, clients and performance
    #[arg(long, default_value_t = 7, global = true)]
    pub period: u32,

    #[command(subcommand)]
    pub command: StatsCommand,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum StatsExportFormat {
    #[default]
    Json,
    Csv,
}

#[derive(Debug, Subcommand)]
pub enum StatsCommand {
    /// Totals, block rate and service status
    Overview,

    /// Recent queries, newest first
    Queries {
        /// Only blocked queries
        #[arg(long)]
        blocked_only: bool,

        /// Page number, starting at 1
        #[arg(long, default_value_t = 1)]
        page: u64,

        #[arg(long, default_value_t = 50)]
        page_size: u32,
    },

    /// Most queried domains
    Domains {
        #[arg(long, short = 'l', default_value_t = 20)]
        limit: u32,

        #[arg(long)]
        blocked_only: bool,
    },

    /// Most active clients
    Clients {
        #[arg(long, short = 'l', default_value_t = 20)]
        limit: u32,
    },

    /// Hourly query volume
    Hourly {
        #[arg(long, default_value_t = 24)]
        hours: u32,
    },

    /// Blocked queries per block list
    Performance,

    /// Per-day totals from the rollup table
    Summary {
        #[arg(long, default_value_t = 30)]
        days: u32,
    },

    /// Size and time span of the stored statistics
    Health,

    /// Download stored statistics
    Export {
        #[arg(long, short = 'f', default_value = "json")]
        format: StatsExportFormat,

        #[arg(long, default_value_t = 30)]
        days: u32,

        #[arg(long, short = 'd', default_value = ".")]
        dir: PathBuf,
    },

    /// Delete stored statistics
    Clear {
        /// Only delete rows older than this many days
        #[arg(long)]
        days: Option<u32>,
    },
}

// ── Devices ──────────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct DevicesArgs {
    /// Keep refreshing until interrupted
    #[arg(long, short = 'w')]
    pub watch: bool,

    /// Seconds between refreshes in watch mode (overrides config)
    #[arg(long)]
    pub interval: Option<u64>,

    #[command(subcommand)]
    pub command: Option<DevicesCommand>,
}

#[derive(Debug, Subcommand)]
pub enum DevicesCommand {
    /// Re-read the DHCP lease file on the appliance
    Reload,

    /// Save a snapshot of the dashboard
    Screenshot {
        /// File or directory to write to
        #[arg(long, default_value = ".")]
        out: PathBuf,
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

    /// Show the current configuration (secrets redacted)
    Show,

    /// List configured profiles
    Profiles,

    /// Set the default profile
    Use { name: String },

    /// Store the active profile's password in the system keyring
    SetPassword,
}

// ── Completions ──────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct CompletionsArgs {
    /// Shell to generate completions for
    pub shell: clap_complete::Shell,
}

#[cfg(test)]
mod tests {
    use clap::CommandFactory;

    use super::*;

    #[test]
    fn command_tree_is_consistent() {
        Cli::command().debug_assert();
    }
}
