//! Info command implementation

use crate::backend;
use crate::config::BoardConfig;
use extflash_core::chip::FlashChip;

use super::format_size;

/// Identify the configured chip and print its description
pub fn run(board: &BoardConfig) -> Result<(), Box<dyn std::error::Error>> {
    let mut flash = backend::open_driver(board)?;
    let id = flash.read_id()?;
    let chip = *flash.chip();
    let desc = chip.descriptor();
    let geometry = flash.geometry();
    let timing = flash.timing();
    let bus = board.driver.bus_for(&chip);

    println!("Chip information:");
    println!("  Vendor:     {}", desc.vendor);
    println!("  Name:       {}", desc.name);
    println!("  JEDEC ID:   {}", id);
    println!(
        "  Size:       {} bytes ({})",
        geometry.total_size,
        format_size(geometry.total_size)
    );
    println!("  Page size:  {} bytes", geometry.page_size);
    println!(
        "  Erase size: {} ({} blocks)",
        format_size(geometry.erase_block_size),
        geometry.block_count()
    );
    println!("  Alignment:  {} bytes", geometry.write_alignment);
    println!("  Addressing: {}-byte", chip.address_width().bytes());
    println!(
        "  Bus:        {} Hz, mode {}",
        bus.frequency_hz,
        bus.mode.number()
    );
    println!();
    println!("Timing (worst case):");
    println!("  Byte program:     {:>9} us", timing.byte_program_us);
    println!("  Page program:     {:>9} us", timing.page_program_us);
    println!("  Block erase:      {:>9} us", timing.block_erase_us);
    println!("Call overhead:");
    println!("  write() 1 byte:   {:>9} us", timing.byte_write_call_us);
    println!("  write() 1 page:   {:>9} us", timing.page_write_call_us);
    println!("  erase():          {:>9} us", timing.block_erase_call_us);
    println!("  is_busy():        {:>9} us", timing.is_busy_call_us);

    Ok(())
}
