//! Read command implementation

use crate::backend::{self, Driver};
use crate::config::BoardConfig;
use std::fs;
use std::path::Path;

use super::{byte_progress, resolve_range};

/// Default chunk size for reading (4 KiB)
const READ_CHUNK_SIZE: usize = 4096;

/// Run the read command
pub fn run(
    board: &BoardConfig,
    output: &Path,
    start: Option<u32>,
    length: Option<u32>,
) -> Result<(), Box<dyn std::error::Error>> {
    let mut flash = backend::open_driver(board)?;
    let (start, length) = resolve_range(flash.geometry().total_size, start, length)?;

    let data = read_with_progress(&mut flash, start, length as usize)?;
    fs::write(output, &data)?;

    println!("Wrote {} bytes to {:?}", data.len(), output);
    Ok(())
}

/// Read `len` bytes at `start` with a progress bar
pub fn read_with_progress(
    flash: &mut Driver,
    start: u32,
    len: usize,
) -> Result<Vec<u8>, Box<dyn std::error::Error>> {
    let mut data = vec![0u8; len];
    let pb = byte_progress(len as u64, "Reading");

    let mut offset = 0usize;
    for chunk in data.chunks_mut(READ_CHUNK_SIZE) {
        flash.read(start + offset as u32, chunk)?;
        offset += chunk.len();
        pb.set_position(offset as u64);
    }

    pb.finish_with_message("Read complete");
    Ok(data)
}
