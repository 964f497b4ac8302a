use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

#[derive(Parser)]
#[command(
    name = "repostat",
    about = "Working-tree change summaries and staging for git repositories",
    version
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Settings file (TOML). Defaults to the user config directory.
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

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
    /// Show the change summary for a file or directory
    Status(StatusArgs),
    /// Resolve many paths concurrently through the worker pool
    Scan(ScanArgs),
    /// Report whether a path has changes to stage
    CanStage(PathArgs),
    /// Stage a file (a missing file stages its deletion)
    Stage(PathArgs),
    /// Reset a file's index entry to HEAD
    Unstage(PathArgs),
    /// Stage a directory's files
    StageDir(StageDirArgs),
}

#[derive(Args)]
pub struct StatusArgs {
    pub path: PathBuf,
    /// Treat the path as a single file even if it does not exist
    #[arg(long)]
    pub file: bool,
}

#[derive(Args)]
pub struct ScanArgs {
    #[arg(required = true)]
    pub paths: Vec<PathBuf>,
}

#[derive(Args)]
pub struct PathArgs {
    pub path: PathBuf,
}

#[derive(Args)]
pub struct StageDirArgs {
    pub path: PathBuf,
    /// Stage the whole subtree, deletions included
    #[arg(short, long)]
    pub recursive: bool,
}
