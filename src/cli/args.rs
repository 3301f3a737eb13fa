use std::path::PathBuf;

use clap::Parser;

use crate::Commands;

/// Main CLI application arguments and command structure
#[derive(Parser, Debug)]
#[clap(
    name = "notedex",
    version,
    about = "Plain-text notes with a cached index of titles, tags and dates"
)]
pub struct Cli {
    /// Directory holding config.json, the indexes and the trash
    #[clap(long, value_parser)]
    pub store: Option<PathBuf>,

    /// Override the configured note directory for this invocation
    #[clap(long, value_parser)]
    pub notes_dir: Option<PathBuf>,

    /// Verbose output mode
    #[clap(short, long)]
    pub verbose: bool,

    /// Subcommands for the notedex application
    #[clap(subcommand)]
    pub command: Commands,
}
