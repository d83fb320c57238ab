//! Selftest command implementation

use crate::backend;
use crate::config::BoardConfig;
use extflash_core::flash::selftest;

/// Run the destructive self-test against block 0
pub fn run(board: &BoardConfig) -> Result<(), Box<dyn std::error::Error>> {
    let mut flash = backend::open_driver(board)?;
    log::warn!("Self-test erases block 0 and leaves a test pattern in it");

    let result = selftest::run(&mut flash);
    // Keep whatever state the chip ended up in, pass or fail
    backend::persist(board, flash.bus())?;
    result?;

    println!("Self-test passed");
    Ok(())
}
