//! Clap derive structures for the `lvslb` CLI.
//!
//! Defines the command tree, global flags, and shared types.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};

// ── Top-Level CLI ────────────────────────────────────────────────────

/// lvslb -- declarative IPVS virtual servers on LVS load balancers
#[derive(Debug, Parser)]
#[command(
    name = "lvslb",
    version,
    about = "Reconcile IPVS virtual servers on LVS load balancers",
    long_about = "Declare a virtual server and its real-server pool in a TOML or JSON\n\
        file, then apply it to a load-balancer control endpoint. lvslb tracks\n\
        the applied record in a local state file and decides between in-place\n\
        modification and remove-then-create replacement on every change.",
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
    #[arg(long, short = 'p', env = "LVSLB_PROFILE", global = true)]
    pub profile: Option<String>,

    /// Control endpoint host (overrides profile)
    #[arg(long, env = "LVSLB_HOST", global = true)]
    pub host: Option<String>,

    /// Control endpoint port (overrides profile)
    #[arg(long, env = "LVSLB_PORT", global = true)]
    pub port: Option<u16>,

    /// Talk to the endpoint over TLS
    #[arg(long, env = "LVSLB_HTTPS", global = true)]
    pub https: bool,

    /// Skip TLS certificate verification
    #[arg(long, short = 'k', env = "LVSLB_INSECURE", global = true)]
    pub insecure: bool,

    /// Basic-auth login (password from LVSLB_PASSWORD or the keyring)
    #[arg(long, env = "LVSLB_LOGIN", global = true)]
    pub login: Option<String>,

    /// Request timeout in seconds
    #[arg(long, env = "LVSLB_TIMEOUT", global = true)]
    pub timeout: Option<u64>,

    /// Output format
    #[arg(
        long,
        short = 'o',
        env = "LVSLB_OUTPUT",
        default_value = "table",
        global = true
    )]
    pub output: OutputFormat,

    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(long, short = 'v', action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress non-error output
    #[arg(long, short = 'q', global = true)]
    pub quiet: bool,

    /// Skip confirmation prompts
    #[arg(long, short = 'y', global = true)]
    pub yes: bool,
}

// ── Output Enum ──────────────────────────────────────────────────────

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

// ── Top-Level Command Enum ───────────────────────────────────────────

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Create or update a virtual server from a definition file
    Apply(ApplyArgs),

    /// Read a virtual server back from the endpoint
    #[command(alias = "get")]
    Show(ShowArgs),

    /// Remove the tracked virtual server
    #[command(alias = "rm")]
    Destroy(DestroyArgs),

    /// Print the actions `apply` would issue, without contacting the endpoint
    Plan(PlanArgs),

    /// Check a definition file offline
    Validate(ValidateArgs),

    /// Manage CLI configuration and profiles
    Config(ConfigArgs),

    /// Generate shell completions
    Completions(CompletionsArgs),
}

// ── Lifecycle Arguments ──────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct StateArgs {
    /// State file (default: <FILE>.state.json)
    #[arg(long)]
    pub state: Option<PathBuf>,
}

#[derive(Debug, Args)]
pub struct ApplyArgs {
    /// Virtual-server definition (.toml or .json)
    pub file: PathBuf,

    #[command(flatten)]
    pub state: StateArgs,
}

#[derive(Debug, Args)]
pub struct ShowArgs {
    /// Virtual-server definition; read only when nothing is tracked
    pub file: Option<PathBuf>,

    #[command(flatten)]
    pub state: StateArgs,
}

#[derive(Debug, Args)]
pub struct DestroyArgs {
    /// Definition the state file sits next to
    pub file: Option<PathBuf>,

    #[command(flatten)]
    pub state: StateArgs,
}

#[derive(Debug, Args)]
pub struct PlanArgs {
    /// Virtual-server definition (.toml or .json)
    pub file: PathBuf,

    #[command(flatten)]
    pub state: StateArgs,
}

#[derive(Debug, Args)]
pub struct ValidateArgs {
    /// Virtual-server definition (.toml or .json)
    pub file: PathBuf,
}

// ── Config ───────────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub command: ConfigCommand,
}

#[derive(Debug, Subcommand)]
pub enum ConfigCommand {
    /// Display current configuration (secrets masked)
    Show,

    /// Print the config file path
    Path,

    /// Store a password in the system keyring
    SetPassword {
        /// Profile name
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

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn command_tree_is_consistent() {
        Cli::command().debug_assert();
    }
}
