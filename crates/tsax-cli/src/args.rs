use clap::Parser;
use std::path::PathBuf;

/// CLI arguments for the tsax binary.
#[derive(Parser, Debug)]
#[command(
    name = "tsax",
    version,
    about = "Extract action schemas from a TypeScript project"
)]
pub struct CliArgs {
    /// Project root to scan. Defaults to the current directory.
    pub project_root: Option<PathBuf>,

    /// Output file, relative to the project root.
    #[arg(long)]
    pub out: Option<PathBuf>,

    /// Print names of files that are part of the scan and then stop.
    #[arg(long = "listFiles", alias = "list-files")]
    pub list_files: bool,

    /// Pretty-print the JSON output (the default).
    #[arg(long, conflicts_with = "compact")]
    pub pretty: bool,

    /// Emit compact JSON instead of pretty-printed output.
    #[arg(long)]
    pub compact: bool,
}
