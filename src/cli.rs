// src/cli.rs

use clap::Parser;
use std::path::PathBuf;

/// Command-line interface options for mbox-degoogle.
#[derive(Parser, Debug)]
#[command(
    name = "mbox-degoogle",
    version,
    about = "Repair a Google Takeout mbox export into a standard mbox",
    long_about = None
)]
pub struct Cli {
    /// Takeout archive to read
    pub input: PathBuf,

    /// Where to write the repaired mbox
    pub output: PathBuf,
}
