//! Emulated flash backend
//!
//! Builds a [`DummyFlash`] for the board, preloaded from the image file when
//! one exists, and writes the image back after mutating commands.

use crate::config::BoardConfig;
use extflash_core::chip::ChipVariant;
use extflash_core::flash::FlashDriver;
use extflash_dummy::{DummyConfig, DummyFlash, ImageError};

/// Driver over the emulated chip
pub type Driver = FlashDriver<DummyFlash, ChipVariant>;

/// Create the emulated chip described by `board`
pub fn open_bus(board: &BoardConfig) -> Result<DummyFlash, ImageError> {
    let attached = board.attached_chip();
    let settings = &board.emulator;
    let config = DummyConfig::for_chip(&attached)
        .with_busy_polls(settings.busy_polls)
        .with_ident_delay(settings.ident_delay)
        .with_max_transfer_len(settings.max_transfer_len);
    let mut flash = DummyFlash::new(config);

    match &board.image {
        Some(path) if path.exists() => {
            let loaded = flash.load_image(path)?;
            log::info!("Loaded {} bytes from {}", loaded, path.display());
        }
        Some(path) => log::info!("{} does not exist yet, starting erased", path.display()),
        None => log::debug!("No image file, contents are discarded on exit"),
    }
    log::debug!("Emulating {}", attached);
    Ok(flash)
}

/// Create the emulated chip and bring the driver up on it
pub fn open_driver(board: &BoardConfig) -> Result<Driver, Box<dyn std::error::Error>> {
    let bus = open_bus(board)?;
    let mut driver = FlashDriver::new(bus, board.chip(), board.driver);
    driver.init()?;
    Ok(driver)
}

/// Write the emulated array back to the image file, if there is one
pub fn persist(board: &BoardConfig, flash: &DummyFlash) -> Result<(), ImageError> {
    if let Some(path) = &board.image {
        flash.save_image(path)?;
        log::info!("Saved image to {}", path.display());
    }
    Ok(())
}
