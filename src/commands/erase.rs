//! Erase command implementation

use crate::backend::{self, Driver};
use crate::config::BoardConfig;
use extflash_core::flash::{EraseCursor, DEFAULT_POLL_US};

use super::{block_progress, resolve_range};

/// Run the erase command
pub fn run(
    board: &BoardConfig,
    start: Option<u32>,
    length: Option<u32>,
) -> Result<(), Box<dyn std::error::Error>> {
    let mut flash = backend::open_driver(board)?;
    let geometry = flash.geometry();
    let (start, length) = resolve_range(geometry.total_size, start, length)?;

    let cursor = EraseCursor::covering(&geometry, start, length)?;
    let widened = cursor.remaining as u64 * geometry.erase_block_size as u64;
    if cursor.address != start || widened != length as u64 {
        log::warn!(
            "Widened erase to block boundaries: 0x{:08X}, {} blocks",
            cursor.address,
            cursor.remaining
        );
    }
    let blocks = cursor.remaining;
    erase_with_progress(&mut flash, cursor)?;

    backend::persist(board, flash.bus())?;
    println!(
        "Erased {} blocks starting at 0x{:08X}",
        blocks,
        geometry.block_base(start)
    );
    Ok(())
}

/// Erase every block of `cursor`, waiting for each to finish
pub fn erase_with_progress(
    flash: &mut Driver,
    mut cursor: EraseCursor,
) -> Result<(), Box<dyn std::error::Error>> {
    let timeout_us = flash.timing().erase_timeout_us();
    let pb = block_progress(cursor.remaining as u64, "Erasing");

    while !cursor.is_done() {
        flash.erase_next(&mut cursor)?;
        flash.wait_idle(DEFAULT_POLL_US, timeout_us)?;
        pb.inc(1);
    }

    pb.finish_with_message("Erase complete");
    Ok(())
}
