//! CLI argument parsing

use clap::{Parser, Subcommand};
use extflash_core::chip::ChipVariant;
use std::path::PathBuf;

/// Parse a string as a hex or decimal u32
fn parse_hex_u32(s: &str) -> Result<u32, String> {
    if let Some(hex) = s.strip_prefix("0x").or_else(|| s.strip_prefix("0X")) {
        u32::from_str_radix(hex, 16).map_err(|e| format!("Invalid hex value: {}", e))
    } else {
        s.parse::<u32>().map_err(|e| format!("Invalid number: {}", e))
    }
}

/// Parse a chip model name
fn parse_chip(s: &str) -> Result<ChipVariant, String> {
    s.parse::<ChipVariant>()
        .map_err(|_| format!("Unknown chip '{}' (see list-chips)", s))
}

#[derive(Parser)]
#[command(name = "extflash")]
#[command(author, version, about = "External SPI NOR flash tool", long_about = None)]
pub struct Cli {
    /// Verbosity level (-v, -vv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Board configuration file (RON format)
    #[arg(short, long, global = true)]
    pub board: Option<PathBuf>,

    /// Chip model, overrides the board configuration
    #[arg(short, long, global = true, value_parser = parse_chip)]
    pub chip: Option<ChipVariant>,

    /// SPI clock in Hz, overrides the chip default
    #[arg(short, long, global = true)]
    pub frequency: Option<u32>,

    /// Flash image backing the emulated chip; created on first write
    #[arg(short, long, global = true)]
    pub image: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Identify the configured chip and show its geometry and timing
    Info,

    /// Detect which supported chip is attached
    Probe,

    /// Read flash contents to file
    Read {
        /// Output file path
        #[arg(short, long)]
        output: PathBuf,

        /// Start address (hex, e.g., 0x10000)
        #[arg(long, value_parser = parse_hex_u32)]
        start: Option<u32>,

        /// Number of bytes to read (hex or decimal, default: to end of chip)
        #[arg(long, value_parser = parse_hex_u32)]
        length: Option<u32>,
    },

    /// Write file to flash, one page at a time
    Write {
        /// Input file path
        #[arg(short = 'n', long)]
        input: PathBuf,

        /// Start address (hex, e.g., 0x10000)
        #[arg(long, value_parser = parse_hex_u32)]
        start: Option<u32>,

        /// Erase the covered blocks before programming
        #[arg(long)]
        erase: bool,

        /// Read back and compare after writing
        #[arg(long)]
        verify: bool,
    },

    /// Erase flash, one block at a time
    Erase {
        /// Start address for partial erase (hex, e.g., 0x10000)
        #[arg(long, value_parser = parse_hex_u32)]
        start: Option<u32>,

        /// Length of region to erase (hex or decimal)
        #[arg(long, value_parser = parse_hex_u32)]
        length: Option<u32>,
    },

    /// Run the destructive self-test on block 0
    Selftest,

    /// List supported chips
    ListChips {
        /// Filter by vendor
        #[arg(long)]
        vendor: Option<String>,
    },
}
