// src/main.rs

use clap::Parser;
use env_logger::Builder;
use eyre::Result;
use log::{error, LevelFilter};

use mbox_degoogle::cfg::config::load_or_default;
use mbox_degoogle::cli::Cli;
use mbox_degoogle::Degoogler;

fn main() -> Result<()> {
    let cli = Cli::parse();

    Builder::new()
        .filter_level(LevelFilter::Info)
        .parse_default_env()
        .try_init()
        .ok();

    let config = load_or_default()?;
    let degoogler = Degoogler::new(&config)?;

    match degoogler.process_file(&cli.input, &cli.output) {
        Ok(summary) => {
            summary.report();
            Ok(())
        }
        Err(e) => {
            error!("Error processing mbox file: {}", e);
            Err(e)
        }
    }
}
