//! Write command implementation

use crate::backend::{self, Driver};
use crate::config::BoardConfig;
use extflash_core::flash::{EraseCursor, DEFAULT_POLL_US};
use std::fs;
use std::path::Path;

use super::{byte_progress, erase::erase_with_progress, read::read_with_progress};

/// Run the write command
pub fn run(
    board: &BoardConfig,
    input: &Path,
    start: Option<u32>,
    erase: bool,
    verify: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    let data = fs::read(input)?;
    let mut flash = backend::open_driver(board)?;
    let geometry = flash.geometry();
    let start = start.unwrap_or(0);
    geometry.check_read(start, data.len())?;

    if erase {
        let cursor = EraseCursor::covering(&geometry, start, data.len() as u32)?;
        erase_with_progress(&mut flash, cursor)?;
    }

    let written = program_with_progress(&mut flash, start, &data)?;

    if verify {
        let readback = read_with_progress(&mut flash, start, data.len())?;
        if let Some(pos) = data.iter().zip(&readback).position(|(a, b)| a != b) {
            backend::persist(board, flash.bus())?;
            return Err(format!(
                "Verify failed at 0x{:08X}: expected 0x{:02X}, read 0x{:02X}",
                start as usize + pos,
                data[pos],
                readback[pos]
            )
            .into());
        }
        println!("Verified {} bytes", data.len());
    }

    backend::persist(board, flash.bus())?;
    println!(
        "Programmed {} of {} bytes at 0x{:08X}",
        written,
        data.len(),
        start
    );
    Ok(())
}

/// Program `data` page by page, waiting out each program cycle
///
/// Chunks that are entirely 0xFF are skipped since programming them leaves
/// the array unchanged. Returns the number of bytes actually programmed.
pub fn program_with_progress(
    flash: &mut Driver,
    start: u32,
    data: &[u8],
) -> Result<usize, Box<dyn std::error::Error>> {
    let geometry = flash.geometry();
    let timeout_us = flash.timing().program_timeout_us();
    let pb = byte_progress(data.len() as u64, "Writing");

    let mut offset = 0usize;
    let mut written = 0usize;
    while offset < data.len() {
        let address = start + offset as u32;
        let chunk_len = (geometry.page_remaining(address) as usize).min(data.len() - offset);
        let chunk = &data[offset..offset + chunk_len];

        if chunk.iter().any(|&b| b != 0xFF) {
            flash.write(address, chunk)?;
            flash.wait_idle(DEFAULT_POLL_US, timeout_us)?;
            written += chunk_len;
        }

        offset += chunk_len;
        pb.set_position(offset as u64);
    }

    pb.finish_with_message("Write complete");
    Ok(written)
}
