//! Probe command implementation

use crate::backend;
use crate::config::BoardConfig;
use extflash_core::chip::FlashChip;
use extflash_core::flash;

/// Detect which candidate chip is attached
pub fn run(board: &BoardConfig) -> Result<(), Box<dyn std::error::Error>> {
    let bus = backend::open_bus(board)?;
    let candidates = board.candidates();
    match flash::probe(bus, &candidates, board.driver) {
        Ok(mut driver) => {
            let chip = driver.chip().descriptor();
            let id = driver.read_id()?;
            println!("Found flash chip:");
            println!("  Vendor:   {}", chip.vendor);
            println!("  Name:     {}", chip.name);
            println!(
                "  Size:     {} bytes ({} KiB)",
                chip.geometry.total_size,
                chip.geometry.total_size / 1024
            );
            println!("  JEDEC ID: {}", id);
            Ok(())
        }
        Err(e) => {
            eprintln!("Probe failed: {}", e);
            Err(Box::new(e))
        }
    }
}
