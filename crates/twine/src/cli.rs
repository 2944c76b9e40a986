//! CLI argument parsing with clap

use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

/// Twine command-line tool
#[derive(Parser, Debug)]
#[command(name = "twine")]
#[command(author, version = crate::version::VERSION, about, long_about = None)]
pub struct Cli {
    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress output
    #[arg(short, long, global = true)]
    pub quiet: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Show version information
    Version(VersionArgs),

    /// Upgrade twine to the latest or a specific release
    Upgrade(UpgradeArgs),
}

#[derive(Args, Debug)]
pub struct VersionArgs {
    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

#[derive(Args, Debug)]
pub struct UpgradeArgs {
    /// Check for updates only
    #[arg(long, conflicts_with_all = ["list", "target_version"])]
    pub check: bool,

    /// List available versions
    #[arg(long)]
    pub list: bool,

    /// Install a specific release tag
    #[arg(long = "version", value_name = "TAG")]
    pub target_version: Option<String>,

    /// Binary to replace (defaults to the running executable)
    #[arg(long, value_name = "PATH")]
    pub install_path: Option<PathBuf>,

    /// Output the result as JSON
    #[arg(long)]
    pub json: bool,
}
