//! Clap derive structures for the `unifi2netbox` CLI.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

use unifi2netbox_config::DEFAULT_CONFIG_PATH;

/// unifi2netbox -- mirror UniFi controller devices into NetBox
#[derive(Debug, Parser)]
#[command(
    name = "unifi2netbox",
    version,
    about = "Synchronize UniFi controller devices into NetBox",
    long_about = "Reads sites and devices from one or more UniFi controllers and creates\n\
        the matching devices, interfaces, and IP addresses in NetBox.\n\n\
        Credentials are read from UNIFI_USERNAME, UNIFI_PASSWORD,\n\
        UNIFI_MFA_SECRET and NETBOX_TOKEN (a .env file is honoured).",
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

#[derive(Debug, Args)]
pub struct GlobalOpts {
    /// Path to the YAML configuration file
    #[arg(
        long,
        short = 'c',
        env = "UNIFI2NETBOX_CONFIG",
        default_value = DEFAULT_CONFIG_PATH,
        global = true
    )]
    pub config: PathBuf,

    /// Directory for the per-level log files
    #[arg(long, default_value = "logs", global = true)]
    pub log_dir: PathBuf,

    /// Increase verbosity (-v debug, -vv trace)
    #[arg(long, short = 'v', action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Reconcile every configured controller into NetBox
    Sync(SyncArgs),

    /// Extract created device and IP address ids from a sync log
    Audit(AuditArgs),

    /// Generate shell completions
    Completions(CompletionsArgs),
}

#[derive(Debug, Args)]
pub struct SyncArgs {
    /// Gather every device first, then reconcile them in one global pool
    #[arg(long)]
    pub flat: bool,
}

#[derive(Debug, Args)]
pub struct AuditArgs {
    /// Log file written by a previous sync (usually logs/info.log)
    pub log_file: PathBuf,

    /// Print the ids as JSON
    #[arg(long)]
    pub json: bool,
}

#[derive(Debug, Args)]
pub struct CompletionsArgs {
    /// Target shell
    pub shell: clap_complete::Shell,
}
