//! CLI command implementations
//!
//! Every command builds the emulated chip from the board configuration,
//! brings the driver up on it and works through the driver's public API:
//! page-sized programs, block-by-block erases and busy polling between them.

pub mod erase;
pub mod info;
mod list;
pub mod probe;
pub mod read;
pub mod selftest;
pub mod write;

pub use list::list_chips;

use indicatif::{ProgressBar, ProgressStyle};

/// Byte-count progress bar labelled with `phase`
pub(crate) fn byte_progress(total: u64, phase: &str) -> ProgressBar {
    let pb = ProgressBar::new(total);
    pb.set_style(
        ProgressStyle::default_bar()
            .template(&format!(
                "{{spinner:.green}} [{{elapsed_precise}}] [{{bar:40.cyan/blue}}] {{bytes}}/{{total_bytes}} ({{bytes_per_sec}}, {{eta}}) {}",
                phase
            ))
            .unwrap_or_else(|_| ProgressStyle::default_bar())
            .progress_chars("#>-"),
    );
    pb
}

/// Count-based progress bar for block operations
pub(crate) fn block_progress(total: u64, phase: &str) -> ProgressBar {
    let pb = ProgressBar::new(total);
    pb.set_style(
        ProgressStyle::default_bar()
            .template(&format!(
                "{{spinner:.green}} [{{elapsed_precise}}] [{{bar:40.cyan/blue}}] {{pos}}/{{len}} blocks {}",
                phase
            ))
            .unwrap_or_else(|_| ProgressStyle::default_bar())
            .progress_chars("#>-"),
    );
    pb
}

pub(crate) fn format_size(bytes: u32) -> String {
    if bytes >= 1024 * 1024 {
        format!("{} MiB", bytes / (1024 * 1024))
    } else if bytes >= 1024 {
        format!("{} KiB", bytes / 1024)
    } else {
        format!("{} B", bytes)
    }
}

/// Resolve optional `--start`/`--length` against the chip size
pub(crate) fn resolve_range(
    total_size: u32,
    start: Option<u32>,
    length: Option<u32>,
) -> Result<(u32, u32), String> {
    let start = start.unwrap_or(0);
    if start >= total_size {
        return Err(format!(
            "Start address 0x{:08X} is outside the chip (0x{:08X} bytes)",
            start, total_size
        ));
    }
    let length = length.unwrap_or(total_size - start);
    if start as u64 + length as u64 > total_size as u64 {
        return Err(format!(
            "Range 0x{:08X}+0x{:X} runs past the end of the chip (0x{:08X} bytes)",
            start, length, total_size
        ));
    }
    Ok((start, length))
}
