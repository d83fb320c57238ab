//! extflash - External SPI NOR flash tool
//!
//! Drives the `extflash-core` driver against an emulated chip backed by an
//! image file. The same read, program and erase paths the firmware uses run
//! here, so an image prepared on the host matches what a board would write.

mod backend;
mod cli;
mod commands;
mod config;

use clap::Parser;
use cli::{Cli, Commands};
use config::BoardConfig;

/// Logger for the given `-v` count; RUST_LOG applies when no flag is given
fn log_builder(verbose: u8) -> env_logger::Builder {
    let mut builder =
        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"));
    match verbose {
        0 => {}
        1 => {
            builder.filter_level(log::LevelFilter::Debug);
        }
        _ => {
            builder.filter_level(log::LevelFilter::Trace);
        }
    }
    builder
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    log_builder(cli.verbose).init();

    let mut board = match &cli.board {
        Some(path) => BoardConfig::load(path)?,
        None => BoardConfig::default(),
    };
    if let Some(chip) = cli.chip {
        board.chip = Some(chip);
    }
    if let Some(hz) = cli.frequency {
        board.driver.frequency_hz = Some(hz);
    }
    if let Some(image) = cli.image {
        board.image = Some(image);
    }

    match cli.command {
        Commands::Info => commands::info::run(&board),
        Commands::Probe => commands::probe::run(&board),
        Commands::Read {
            output,
            start,
            length,
        } => commands::read::run(&board, &output, start, length),
        Commands::Write {
            input,
            start,
            erase,
            verify,
        } => commands::write::run(&board, &input, start, erase, verify),
        Commands::Erase { start, length } => commands::erase::run(&board, start, length),
        Commands::Selftest => commands::selftest::run(&board),
        Commands::ListChips { vendor } => {
            commands::list_chips(vendor.as_deref());
            Ok(())
        }
    }
}
