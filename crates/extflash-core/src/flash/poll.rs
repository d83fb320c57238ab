//! Bounded busy polling

use crate::bus::SpiBus;
use crate::chip::FlashChip;
use crate::error::{Error, Result};
use maybe_async::maybe_async;

use super::FlashDriver;

/// Poll interval used by the blocking helpers
pub const DEFAULT_POLL_US: u32 = 100;

impl<B: SpiBus, C: FlashChip> FlashDriver<B, C> {
    /// Poll `is_busy()` until the chip is idle
    ///
    /// Sleeps `poll_delay_us` between polls through the bus delay. Gives up
    /// with [`Error::Timeout`] once the accumulated delay reaches
    /// `timeout_us`. A zero `poll_delay_us` counts each poll as one
    /// microsecond, so `timeout_us` then bounds the number of polls.
    #[maybe_async]
    pub async fn wait_idle(&mut self, poll_delay_us: u32, timeout_us: u32) -> Result<()> {
        let step = poll_delay_us.max(1) as u64;
        let mut waited: u64 = 0;
        loop {
            if !self.is_busy().await? {
                return Ok(());
            }
            if waited >= timeout_us as u64 {
                log::warn!("Chip still busy after {} us", waited);
                return Err(Error::Timeout);
            }
            if poll_delay_us > 0 {
                self.bus_mut().delay_us(poll_delay_us).await;
            }
            waited += step;
        }
    }
}
