use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

#[derive(Parser)]
#[command(
    name = "recdiff",
    about = "recdiff: audited structural diff for JSON records",
    version
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[arg(long, global = true, default_value = "text")]
    pub format: OutputFormat,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
    Text,
    Json,
}

#[derive(Subcommand)]
pub enum Command {
    /// Diff two JSON documents and print the edit script
    Diff(DiffArgs),
    /// Diff every source/target pair in a JSON array file
    Batch(BatchArgs),
    /// Show the pointers whose values are unchanged
    Unchanged(UnchangedArgs),
    /// Run only the attribute guard against a source document
    Check(CheckArgs),
}

#[derive(Args)]
pub struct DiffArgs {
    pub source: PathBuf,
    pub target: PathBuf,
    /// TOML configuration file (limits, identity attributes, guards)
    #[arg(long)]
    pub config: Option<PathBuf>,
}

#[derive(Args)]
pub struct BatchArgs {
    pub file: PathBuf,
    #[arg(long)]
    pub config: Option<PathBuf>,
}

#[derive(Args)]
pub struct UnchangedArgs {
    pub source: PathBuf,
    pub target: PathBuf,
}

#[derive(Args)]
pub struct CheckArgs {
    pub source: PathBuf,
    #[arg(long)]
    pub config: Option<PathBuf>,
}
