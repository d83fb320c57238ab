//! Content-altering self-test
//!
//! Erases the first block of the chip and programs a pattern into it, so it
//! must never run against a part holding data worth keeping. `init()` runs it
//! only when the crate is built with the `destructive-selftest` feature.

use crate::bus::SpiBus;
use crate::chip::FlashChip;
use crate::error::{Error, IdentFailure, Result, SelfTestStage};
use maybe_async::maybe_async;

use super::{EraseCursor, FlashDriver, DEFAULT_POLL_US};

/// Bytes checked after erase and programmed afterwards
pub const PATTERN_LEN: usize = 16;

/// Byte `i` of the test pattern
pub const fn pattern_byte(i: usize) -> u8 {
    (i as u8) ^ 0xAA
}

fn fail(stage: SelfTestStage, cause: Error) -> Error {
    match cause {
        // Bus faults stay visible as such
        Error::TransferFailed => cause,
        _ => {
            log::warn!("Self-test failed at {} stage: {}", stage, cause);
            Error::IdentificationFailed(IdentFailure::SelfTest(stage))
        }
    }
}

fn mismatch(stage: SelfTestStage) -> Error {
    log::warn!("Self-test failed at {} stage", stage);
    Error::IdentificationFailed(IdentFailure::SelfTest(stage))
}

/// Run the self-test on an initialized driver
#[maybe_async]
pub async fn run<B: SpiBus, C: FlashChip>(driver: &mut FlashDriver<B, C>) -> Result<()> {
    let geometry = driver.geometry();
    let timing = geometry.timing;
    log::info!("Running destructive self-test on block 0");

    let mut cursor = EraseCursor::new(0, 1);
    driver
        .erase_next(&mut cursor)
        .await
        .map_err(|e| fail(SelfTestStage::Erase, e))?;
    if cursor != EraseCursor::new(geometry.erase_block_size, 0) {
        return Err(mismatch(SelfTestStage::Erase));
    }
    driver
        .wait_idle(DEFAULT_POLL_US, timing.erase_timeout_us())
        .await
        .map_err(|e| fail(SelfTestStage::Timeout, e))?;

    let mut buf = [0u8; PATTERN_LEN];
    driver
        .read(0, &mut buf)
        .await
        .map_err(|e| fail(SelfTestStage::EraseVerify, e))?;
    if buf.iter().any(|&b| b != 0xFF) {
        return Err(mismatch(SelfTestStage::EraseVerify));
    }

    let mut pattern = [0u8; PATTERN_LEN];
    for (i, b) in pattern.iter_mut().enumerate() {
        *b = pattern_byte(i);
    }
    driver
        .write(0, &pattern)
        .await
        .map_err(|e| fail(SelfTestStage::Program, e))?;
    driver
        .wait_idle(DEFAULT_POLL_US, timing.program_timeout_us())
        .await
        .map_err(|e| fail(SelfTestStage::Timeout, e))?;

    driver
        .read(0, &mut buf)
        .await
        .map_err(|e| fail(SelfTestStage::ProgramVerify, e))?;
    if buf != pattern {
        return Err(mismatch(SelfTestStage::ProgramVerify));
    }

    log::info!("Self-test passed");
    Ok(())
}
