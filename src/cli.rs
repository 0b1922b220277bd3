use clap::{Args as ClapArgs, Parser, Subcommand};
use std::path::PathBuf;

use crate::storage::types::TierRequest;

/// glacier-restore - list, restore and copy archived S3 objects in bulk
#[derive(Debug, Parser)]
#[command(author, version, about, long_about = None)]
pub struct Args {
    /// JSON config file (defaults to ./glacier-restore.json when present)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Print the keys in a bucket, optionally only those in given storage classes
    List(ListArgs),
    /// Read keys from stdin and request their restoration
    Restore(RestoreArgs),
    /// Read keys from stdin and print `aws s3 cp` commands for those not yet exported
    GenCopyCommands(CopyArgs),
}

#[derive(Debug, ClapArgs)]
pub struct ListArgs {
    /// Bucket to list
    pub container: String,
    /// Key prefix, no leading slash; empty lists everything
    #[arg(long, default_value = "")]
    pub prefix: String,
    /// Only print objects in this storage class (repeatable), e.g. GLACIER, STANDARD_IA
    #[arg(long = "storage_class", short = 'c')]
    pub storage_class: Vec<String>,
}

#[derive(Debug, ClapArgs)]
pub struct RestoreArgs {
    /// Bucket holding the archived objects
    pub container: String,
    /// Number of parallel restore requests [default: 30]
    #[arg(long, short)]
    pub jobs: Option<usize>,
    /// Prepended verbatim to every key read from stdin; include any trailing slash yourself
    #[arg(long, default_value = "")]
    pub prefix: String,
    /// Expedited, Standard, Bulk or Fastest [default: Bulk]
    #[arg(long)]
    pub tier: Option<TierRequest>,
    /// Per-call timeout in seconds, 0 disables it [default: 300]
    #[arg(long)]
    pub timeout_secs: Option<u64>,
    /// Print the completed count every N completions [default: 100]
    #[arg(long)]
    pub progress_every: Option<usize>,
}

#[derive(Debug, ClapArgs)]
pub struct CopyArgs {
    /// Bucket the restored objects are copied from
    pub container: String,
    /// Local directory the copies land in [default: export]
    #[arg(long)]
    pub export_dir: Option<PathBuf>,
}
