//! The flash driver policy layer

use crate::bus::SpiBus;
use crate::chip::{FlashChip, FlashGeometry, FlashTiming, JedecId};
use crate::error::{Error, IdentFailure, Result};
use crate::protocol;
use crate::spi::{Header, Status};
use maybe_async::maybe_async;

use super::{DriverConfig, EraseCursor};

/// External SPI NOR flash driver
///
/// Owns the bus for its lifetime; [`release()`](Self::release) hands it
/// back. Every operation finishes its own SPI exchanges before returning but
/// never waits for the chip's internal program or erase cycle: callers poll
/// [`is_busy()`](Self::is_busy) (or use [`wait_idle()`](Self::wait_idle)).
///
/// Mutating operations refuse to start while the chip reports
/// write-in-progress and always set the write-enable latch first, checking
/// it with a status read.
pub struct FlashDriver<B: SpiBus, C: FlashChip> {
    bus: B,
    chip: C,
    config: DriverConfig,
}

impl<B: SpiBus, C: FlashChip> FlashDriver<B, C> {
    /// Create a driver; nothing is sent on the bus until [`init()`](Self::init)
    pub fn new(bus: B, chip: C, config: DriverConfig) -> Self {
        Self { bus, chip, config }
    }

    /// The chip variant this driver was built for
    pub fn chip(&self) -> &C {
        &self.chip
    }

    /// Get a reference to the underlying bus
    pub fn bus(&self) -> &B {
        &self.bus
    }

    /// Get a mutable reference to the underlying bus
    pub fn bus_mut(&mut self) -> &mut B {
        &mut self.bus
    }

    /// The configuration the driver was built with
    pub fn config(&self) -> &DriverConfig {
        &self.config
    }

    /// Geometry of the active chip (pure, no bus traffic)
    pub fn geometry(&self) -> FlashGeometry {
        self.chip.geometry()
    }

    /// Datasheet timing of the active chip
    pub fn timing(&self) -> FlashTiming {
        self.chip.geometry().timing
    }

    /// Give the bus back
    pub fn release(self) -> (B, C) {
        (self.bus, self.chip)
    }

    /// Bring up the bus and identify the chip
    ///
    /// Deasserts chip-select, applies the bus configuration, then polls RDID
    /// according to the [`IdentPolicy`](super::IdentPolicy) until the
    /// expected identity is returned. With the `destructive-selftest` feature
    /// the self-test runs afterwards and its failure is reported as
    /// [`IdentFailure::SelfTest`].
    #[maybe_async]
    pub async fn init(&mut self) -> Result<JedecId> {
        self.bus.set_cs(false);
        let bus_config = self.config.bus_for(&self.chip);
        log::debug!(
            "Configuring bus: {} Hz, mode {}",
            bus_config.frequency_hz,
            bus_config.mode.number()
        );
        self.bus.configure(&bus_config)?;

        let id = self.identify().await?;
        log::info!(
            "Found {} {} ({})",
            self.chip.descriptor().vendor,
            self.chip.descriptor().name,
            id
        );

        #[cfg(feature = "destructive-selftest")]
        super::selftest::run(self).await?;

        Ok(id)
    }

    #[maybe_async]
    async fn identify(&mut self) -> Result<JedecId> {
        let expected = self.chip.id();
        let policy = self.config.ident;
        let attempts = policy.effective_attempts();
        let mut last = JedecId::default();

        for attempt in 1..=attempts {
            last = self.read_id().await?;
            if last == expected {
                if attempt > 1 {
                    log::debug!("Chip answered after {} attempts", attempt);
                }
                return Ok(last);
            }
            if attempt < attempts && policy.delay_us > 0 {
                self.bus.delay_us(policy.delay_us).await;
            }
        }

        log::warn!(
            "Expected {} ({}), last read {} after {} attempts",
            self.chip.descriptor().name,
            expected,
            last,
            attempts
        );
        Err(Error::IdentificationFailed(IdentFailure::NotDetected {
            last,
            attempts,
        }))
    }

    /// Issue a single RDID and return whatever came back
    #[maybe_async]
    pub async fn read_id(&mut self) -> Result<JedecId> {
        protocol::read_identity(&mut self.bus, self.chip.commands().identify).await
    }

    /// Read status register 1
    #[maybe_async]
    pub async fn read_status(&mut self) -> Result<Status> {
        protocol::read_status(&mut self.bus, self.chip.commands().read_status).await
    }

    /// Whether a program or erase is still running
    #[maybe_async]
    pub async fn is_busy(&mut self) -> Result<bool> {
        Ok(self.read_status().await?.is_busy())
    }

    #[maybe_async]
    async fn ensure_idle(&mut self) -> Result<()> {
        if self.is_busy().await? {
            log::debug!("Request rejected: chip busy");
            return Err(Error::Busy);
        }
        Ok(())
    }

    #[maybe_async]
    async fn write_enable(&mut self) -> Result<()> {
        let commands = self.chip.commands();
        protocol::write_enable(&mut self.bus, commands.write_enable, commands.read_status).await
    }

    /// Read `buf.len()` bytes starting at `address`
    ///
    /// The data phase is split into bus-sized exchanges with chip-select
    /// held, so the read may span any number of pages and blocks.
    #[maybe_async]
    pub async fn read(&mut self, address: u32, buf: &mut [u8]) -> Result<()> {
        self.ensure_idle().await?;
        self.geometry().check_read(address, buf.len())?;
        if buf.is_empty() {
            return Ok(());
        }

        let header = Header::addressed(
            self.chip.commands().read,
            address,
            self.chip.address_width(),
        );
        protocol::read_stream(&mut self.bus, &header, buf).await
    }

    /// Program `data` at `address`
    ///
    /// The range must lie within a single page. Returns once the data has
    /// been shifted out; the chip then stays busy for up to
    /// [`FlashTiming::page_program_us`].
    #[maybe_async]
    pub async fn write(&mut self, address: u32, data: &[u8]) -> Result<()> {
        self.ensure_idle().await?;
        if let Err(e) = self.geometry().check_program(address, data.len()) {
            log::warn!(
                "Rejected program of {} bytes at 0x{:08X}",
                data.len(),
                address
            );
            return Err(e);
        }
        if data.is_empty() {
            return Ok(());
        }

        self.write_enable().await?;
        let header = Header::addressed(
            self.chip.commands().program,
            address,
            self.chip.address_width(),
        );
        protocol::write_stream(&mut self.bus, &header, data).await
    }

    /// Erase the block at `*address`, then advance the cursor by one block
    ///
    /// On success `*address` moves forward by one erase block and
    /// `*remaining` drops by one. On any error both are left untouched.
    /// Asking for zero remaining blocks is [`Error::OutOfRange`].
    #[maybe_async]
    pub async fn erase(&mut self, address: &mut u32, remaining: &mut usize) -> Result<()> {
        if *remaining == 0 {
            return Err(Error::OutOfRange);
        }
        self.ensure_idle().await?;
        let geometry = self.geometry();
        if let Err(e) = geometry.check_erase(*address) {
            log::warn!("Rejected erase at 0x{:08X}", *address);
            return Err(e);
        }

        self.write_enable().await?;
        let header = Header::addressed(
            self.chip.commands().erase,
            *address,
            self.chip.address_width(),
        );
        protocol::command(&mut self.bus, &header).await?;

        log::debug!(
            "Erasing block at 0x{:08X}, {} left",
            *address,
            *remaining - 1
        );
        *address += geometry.erase_block_size;
        *remaining -= 1;
        Ok(())
    }

    /// [`erase()`](Self::erase) driven by an [`EraseCursor`]
    #[maybe_async]
    pub async fn erase_next(&mut self, cursor: &mut EraseCursor) -> Result<()> {
        self.erase(&mut cursor.address, &mut cursor.remaining).await
    }
}
