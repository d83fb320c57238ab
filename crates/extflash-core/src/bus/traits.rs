//! Bus trait definitions
//!
//! These traits use `maybe_async` to support both sync and async modes.
//! - By default, traits are async (suitable for Embassy-style executors)
//! - With the `is_sync` feature, traits become synchronous

use crate::error::Result;
use maybe_async::maybe_async;

use super::BusConfig;

/// Raw SPI bus with a dedicated chip-select line (sync or async depending on
/// the `is_sync` feature)
///
/// This is the only hardware the driver touches. Chip-select is controlled
/// separately from data exchanges so that one logical flash command can span
/// several exchanges: the command header in one, then the data phase split
/// into chunks no larger than [`max_transfer_len()`](Self::max_transfer_len).
///
/// ## Exchange semantics
///
/// `exchange(write, read)` is full duplex. The bus clocks
/// `max(write.len(), read.len())` bytes; byte `i` of `read` is captured while
/// byte `i` of `write` is shifted out. Once `write` runs out the bus sends the
/// overrun character `0x00`. Either slice may be empty.
///
/// In async builds the returned future completes when the hardware signals
/// the end of the exchange, so DMA-driven controllers can yield to the
/// executor in the meantime.
///
/// ## Example: register-level controller
///
/// ```ignore
/// #[maybe_async(AFIT)]
/// impl SpiBus for Spim1 {
///     fn max_transfer_len(&self) -> usize {
///         255 // EasyDMA MAXCNT
///     }
///
///     fn configure(&mut self, config: &BusConfig) -> Result<()> {
///         self.set_frequency(config.frequency_hz);
///         self.set_mode(config.mode);
///         Ok(())
///     }
///
///     fn set_cs(&mut self, active: bool) {
///         self.cs.write(!active);
///     }
///
///     async fn exchange(&mut self, write: &[u8], read: &mut [u8]) -> Result<()> {
///         self.start_dma(write, read);
///         self.end_event().await;
///         Ok(())
///     }
///
///     async fn delay_us(&mut self, us: u32) {
///         Timer::after_micros(us as u64).await;
///     }
/// }
/// ```
#[maybe_async(AFIT)]
pub trait SpiBus {
    /// Maximum number of bytes in a single exchange
    ///
    /// Driven by the controller's DMA descriptor, not by the flash geometry.
    fn max_transfer_len(&self) -> usize;

    /// Apply clock frequency and mode
    ///
    /// Called once from `init()` with chip-select deasserted.
    fn configure(&mut self, config: &BusConfig) -> Result<()>;

    /// Drive chip-select (CS is active low, so `active=true` means CS=0)
    fn set_cs(&mut self, active: bool);

    /// Perform one full-duplex exchange
    async fn exchange(&mut self, write: &[u8], read: &mut [u8]) -> Result<()>;

    /// Delay for the specified number of microseconds
    async fn delay_us(&mut self, us: u32);
}

// Lets callers lend a bus to a driver and inspect it afterwards
#[maybe_async(AFIT)]
impl<B: SpiBus + ?Sized> SpiBus for &mut B {
    fn max_transfer_len(&self) -> usize {
        (**self).max_transfer_len()
    }

    fn configure(&mut self, config: &BusConfig) -> Result<()> {
        (**self).configure(config)
    }

    fn set_cs(&mut self, active: bool) {
        (**self).set_cs(active)
    }

    async fn exchange(&mut self, write: &[u8], read: &mut [u8]) -> Result<()> {
        (**self).exchange(write, read).await
    }

    async fn delay_us(&mut self, us: u32) {
        (**self).delay_us(us).await
    }
}
