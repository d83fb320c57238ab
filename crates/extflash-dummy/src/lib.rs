//! extflash-dummy - In-memory SPI NOR flash emulator
//!
//! [`DummyFlash`] implements [`SpiBus`] and emulates a NOR chip at the
//! byte-stream level: every byte clocked while chip-select is asserted goes
//! through the same opcode → address → data decoding a real part performs.
//! It backs the driver's integration tests and the host CLI.

mod image;

pub use image::ImageError;

use extflash_core::bus::{BusConfig, SpiBus};
use extflash_core::chip::{ChipVariant, FlashChip, JedecId};
use extflash_core::error::{Error, Result};
use extflash_core::spi::{opcodes, Status};

/// Character sent when the write buffer runs out
const OVERRUN: u8 = 0x00;

/// Level read back when the chip is not driving MISO
const IDLE_LINE: u8 = 0xFF;

/// Configuration for the dummy flash
#[derive(Debug, Clone)]
pub struct DummyConfig {
    /// Identity returned by RDID
    pub id: JedecId,
    /// Flash size in bytes
    pub size: usize,
    /// Page size for programming
    pub page_size: usize,
    /// Largest exchange the emulated controller accepts
    pub max_transfer_len: usize,
    /// Status reads that report WIP after each program or erase
    pub busy_polls: u32,
    /// RDID attempts answered with an idle line before the real identity
    pub ident_delay: u32,
    /// Drop WREN commands, so the write-enable latch never sets
    pub ignore_wren: bool,
}

impl DummyConfig {
    /// Emulate the given chip with the reference controller limits
    pub fn for_chip<C: FlashChip + ?Sized>(chip: &C) -> Self {
        let geometry = chip.geometry();
        Self {
            id: chip.id(),
            size: geometry.total_size as usize,
            page_size: geometry.page_size as usize,
            max_transfer_len: 255,
            busy_polls: 2,
            ident_delay: 0,
            ignore_wren: false,
        }
    }

    /// Set the number of status reads that report WIP after a mutation
    pub fn with_busy_polls(mut self, polls: u32) -> Self {
        self.busy_polls = polls;
        self
    }

    /// Delay identification by `attempts` RDID commands
    pub fn with_ident_delay(mut self, attempts: u32) -> Self {
        self.ident_delay = attempts;
        self
    }

    /// Ignore WREN commands
    pub fn with_ignore_wren(mut self, ignore: bool) -> Self {
        self.ignore_wren = ignore;
        self
    }

    /// Set the controller's maximum exchange length
    pub fn with_max_transfer_len(mut self, len: usize) -> Self {
        self.max_transfer_len = len;
        self
    }
}

impl Default for DummyConfig {
    fn default() -> Self {
        Self::for_chip(&ChipVariant::Gd25wb256e)
    }
}

/// Bytes shifted out during one chip-select assertion
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Transaction {
    /// Every MOSI byte in order, including overrun characters
    pub mosi: Vec<u8>,
    /// Length of each exchange
    pub exchanges: Vec<usize>,
}

impl Transaction {
    /// The opcode, if at least one byte was clocked
    pub fn opcode(&self) -> Option<u8> {
        self.mosi.first().copied()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ArrayOp {
    Read,
    Program,
    Erase(u32),
}

impl ArrayOp {
    /// Operation and address width for an array opcode
    fn decode(opcode: u8) -> Option<(Self, usize)> {
        const KIB: u32 = 1024;
        Some(match opcode {
            opcodes::READ => (Self::Read, 3),
            opcodes::READ_4B => (Self::Read, 4),
            opcodes::PP => (Self::Program, 3),
            opcodes::PP_4B => (Self::Program, 4),
            opcodes::SE_20 => (Self::Erase(4 * KIB), 3),
            opcodes::SE_21 => (Self::Erase(4 * KIB), 4),
            opcodes::BE_52 => (Self::Erase(32 * KIB), 3),
            opcodes::BE_5C => (Self::Erase(32 * KIB), 4),
            opcodes::BE_D8 => (Self::Erase(64 * KIB), 3),
            opcodes::BE_DC => (Self::Erase(64 * KIB), 4),
            _ => return None,
        })
    }

    fn mutates(&self) -> bool {
        !matches!(self, Self::Read)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Phase {
    /// Next byte is the opcode
    Opcode,
    /// Collecting the address of an array command
    Address {
        op: ArrayOp,
        width: usize,
        collected: usize,
        address: u32,
    },
    /// Streaming array data out
    Read { address: usize },
    /// Latching program data, wrapping inside the page
    Program { page_base: usize, offset: usize },
    /// Repeating status register 1
    Status,
    /// Shifting out the identity
    Ident { index: usize, valid: bool },
    /// Command complete or rejected; remaining bytes are don't-care
    Ignore,
}

/// Mutation started during this assertion, applied when chip-select rises
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Pending {
    Program,
    Erase { base: usize, len: usize },
}

/// In-memory SPI NOR flash
pub struct DummyFlash {
    config: DummyConfig,
    data: Vec<u8>,
    write_enabled: bool,
    busy_polls_left: u32,
    ident_delay_left: u32,
    cs_active: bool,
    phase: Phase,
    pending: Option<Pending>,
    current: Option<Transaction>,
    log: Vec<Transaction>,
    bus_config: Option<BusConfig>,
    elapsed_us: u64,
    fail_next_exchange: bool,
}

impl DummyFlash {
    /// Create a new dummy flash, fully erased
    pub fn new(config: DummyConfig) -> Self {
        let data = vec![0xFF; config.size];
        let ident_delay_left = config.ident_delay;
        Self {
            config,
            data,
            write_enabled: false,
            busy_polls_left: 0,
            ident_delay_left,
            cs_active: false,
            phase: Phase::Opcode,
            pending: None,
            current: None,
            log: Vec::new(),
            bus_config: None,
            elapsed_us: 0,
            fail_next_exchange: false,
        }
    }

    /// Create a dummy emulating `chip`
    pub fn for_chip<C: FlashChip + ?Sized>(chip: &C) -> Self {
        Self::new(DummyConfig::for_chip(chip))
    }

    /// Get a reference to the flash data
    pub fn data(&self) -> &[u8] {
        &self.data
    }

    /// Get a mutable reference to the flash data
    pub fn data_mut(&mut self) -> &mut [u8] {
        &mut self.data
    }

    /// Completed chip-select assertions, oldest first
    pub fn transactions(&self) -> &[Transaction] {
        &self.log
    }

    /// Return and clear the transaction log
    pub fn take_transactions(&mut self) -> Vec<Transaction> {
        std::mem::take(&mut self.log)
    }

    /// Last bus configuration applied through `configure()`
    pub fn bus_config(&self) -> Option<BusConfig> {
        self.bus_config
    }

    /// Whether chip-select is currently asserted
    pub fn cs_active(&self) -> bool {
        self.cs_active
    }

    /// Whether the write-enable latch is set
    pub fn write_enabled(&self) -> bool {
        self.write_enabled
    }

    /// Whether a program or erase is still "running"
    pub fn busy(&self) -> bool {
        self.busy_polls_left > 0
    }

    /// Force WIP on for the next `polls` status reads
    pub fn set_busy(&mut self, polls: u32) {
        self.busy_polls_left = polls;
    }

    /// Total time requested through `delay_us()`
    pub fn elapsed_us(&self) -> u64 {
        self.elapsed_us
    }

    /// Make the next exchange fail with [`Error::TransferFailed`]
    pub fn fail_next_exchange(&mut self) {
        self.fail_next_exchange = true;
    }

    fn status(&mut self) -> u8 {
        let mut status = Status::empty();
        if self.busy_polls_left > 0 {
            status |= Status::WIP;
            self.busy_polls_left -= 1;
        }
        if self.write_enabled {
            status |= Status::WEL;
        }
        status.bits()
    }

    fn identity_byte(&self, index: usize) -> u8 {
        match index {
            0 => self.config.id.manufacturer,
            1 => self.config.id.memory_type,
            2 => self.config.id.capacity,
            _ => IDLE_LINE,
        }
    }

    fn begin(&mut self, opcode: u8) {
        let busy = self.busy();
        self.phase = match opcode {
            opcodes::RDSR => Phase::Status,
            opcodes::RDID => {
                let valid = self.ident_delay_left == 0;
                if !valid {
                    self.ident_delay_left -= 1;
                }
                Phase::Ident { index: 0, valid }
            }
            opcodes::WREN => {
                if self.config.ignore_wren {
                    log::debug!("dummy: WREN ignored");
                } else if !busy {
                    self.write_enabled = true;
                }
                Phase::Ignore
            }
            opcodes::WRDI => {
                if !busy {
                    self.write_enabled = false;
                }
                Phase::Ignore
            }
            _ => match ArrayOp::decode(opcode) {
                Some((op, _)) if op.mutates() && (busy || !self.write_enabled) => {
                    log::debug!(
                        "dummy: opcode {:02X} dropped (busy={}, WEL={})",
                        opcode,
                        busy,
                        self.write_enabled
                    );
                    Phase::Ignore
                }
                Some((op, width)) => Phase::Address {
                    op,
                    width,
                    collected: 0,
                    address: 0,
                },
                None => {
                    log::debug!("dummy: unsupported opcode {:02X}", opcode);
                    Phase::Ignore
                }
            },
        };
    }

    fn start(&mut self, op: ArrayOp, address: u32) -> Phase {
        let address = address as usize % self.data.len();
        match op {
            ArrayOp::Read => Phase::Read { address },
            ArrayOp::Program => {
                let page = self.config.page_size;
                self.pending = Some(Pending::Program);
                Phase::Program {
                    page_base: address - address % page,
                    offset: address % page,
                }
            }
            ArrayOp::Erase(len) => {
                let len = len as usize;
                self.pending = Some(Pending::Erase {
                    base: address - address % len,
                    len,
                });
                Phase::Ignore
            }
        }
    }

    /// Shift one byte in each direction
    fn clock(&mut self, mosi: u8) -> u8 {
        if let Some(current) = self.current.as_mut() {
            current.mosi.push(mosi);
        }
        match self.phase {
            Phase::Opcode => {
                self.begin(mosi);
                IDLE_LINE
            }
            Phase::Address {
                op,
                width,
                collected,
                address,
            } => {
                let address = (address << 8) | mosi as u32;
                let collected = collected + 1;
                self.phase = if collected < width {
                    Phase::Address {
                        op,
                        width,
                        collected,
                        address,
                    }
                } else {
                    self.start(op, address)
                };
                IDLE_LINE
            }
            Phase::Read { address } => {
                let byte = self.data[address];
                self.phase = Phase::Read {
                    address: (address + 1) % self.data.len(),
                };
                byte
            }
            Phase::Program { page_base, offset } => {
                self.data[page_base + offset] &= mosi;
                self.phase = Phase::Program {
                    page_base,
                    offset: (offset + 1) % self.config.page_size,
                };
                IDLE_LINE
            }
            Phase::Status => self.status(),
            Phase::Ident { index, valid } => {
                self.phase = Phase::Ident {
                    index: index + 1,
                    valid,
                };
                if valid {
                    self.identity_byte(index)
                } else {
                    IDLE_LINE
                }
            }
            Phase::Ignore => IDLE_LINE,
        }
    }

    fn finish(&mut self) {
        match self.pending.take() {
            Some(Pending::Program) => {
                self.write_enabled = false;
                self.busy_polls_left = self.config.busy_polls;
            }
            Some(Pending::Erase { base, len }) => {
                let end = (base + len).min(self.data.len());
                self.data[base..end].fill(0xFF);
                log::trace!("dummy: erased 0x{:08X}..0x{:08X}", base, end);
                self.write_enabled = false;
                self.busy_polls_left = self.config.busy_polls;
            }
            None => {}
        }
        if let Some(transaction) = self.current.take() {
            self.log.push(transaction);
        }
    }
}

impl SpiBus for DummyFlash {
    fn max_transfer_len(&self) -> usize {
        self.config.max_transfer_len
    }

    fn configure(&mut self, config: &BusConfig) -> Result<()> {
        if self.cs_active {
            log::warn!("dummy: bus reconfigured with chip-select asserted");
        }
        self.bus_config = Some(*config);
        Ok(())
    }

    fn set_cs(&mut self, active: bool) {
        match (self.cs_active, active) {
            (false, true) => {
                self.cs_active = true;
                self.phase = Phase::Opcode;
                self.current = Some(Transaction::default());
            }
            (true, false) => {
                self.cs_active = false;
                self.finish();
            }
            _ => {}
        }
    }

    fn exchange(&mut self, write: &[u8], read: &mut [u8]) -> Result<()> {
        if self.fail_next_exchange {
            self.fail_next_exchange = false;
            return Err(Error::TransferFailed);
        }
        let len = write.len().max(read.len());
        if len > self.config.max_transfer_len {
            log::error!(
                "dummy: exchange of {} bytes exceeds controller limit {}",
                len,
                self.config.max_transfer_len
            );
            return Err(Error::TransferFailed);
        }
        if let Some(current) = self.current.as_mut() {
            current.exchanges.push(len);
        }

        for i in 0..len {
            let mosi = write.get(i).copied().unwrap_or(OVERRUN);
            let miso = if self.cs_active {
                self.clock(mosi)
            } else {
                IDLE_LINE
            };
            if let Some(slot) = read.get_mut(i) {
                *slot = miso;
            }
        }
        Ok(())
    }

    fn delay_us(&mut self, us: u32) {
        self.elapsed_us += us as u64;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use extflash_core::chip::Mx25r6435f;
    use extflash_core::protocol;
    use extflash_core::spi::{AddressWidth, Header};

    fn small() -> DummyFlash {
        DummyFlash::new(DummyConfig::for_chip(&Mx25r6435f).with_busy_polls(0))
    }

    #[test]
    fn test_read_jedec_id() {
        let mut flash = small();
        let id = protocol::read_identity(&mut flash, opcodes::RDID).unwrap();
        assert_eq!(id, JedecId::new(0xC2, 0x28, 0x17));
    }

    #[test]
    fn test_delayed_identity() {
        let mut flash = DummyFlash::new(DummyConfig::for_chip(&Mx25r6435f).with_ident_delay(2));
        let blank = JedecId::new(0xFF, 0xFF, 0xFF);
        assert_eq!(protocol::read_identity(&mut flash, opcodes::RDID).unwrap(), blank);
        assert_eq!(protocol::read_identity(&mut flash, opcodes::RDID).unwrap(), blank);
        assert_eq!(
            protocol::read_identity(&mut flash, opcodes::RDID).unwrap(),
            Mx25r6435f.id()
        );
    }

    #[test]
    fn test_program_requires_wel() {
        let mut flash = small();
        let header = Header::addressed(opcodes::PP, 0x1000, AddressWidth::ThreeByte);
        protocol::write_stream(&mut flash, &header, &[0x00; 4]).unwrap();
        assert!(flash.data()[0x1000..0x1004].iter().all(|&b| b == 0xFF));

        protocol::write_enable(&mut flash, opcodes::WREN, opcodes::RDSR).unwrap();
        protocol::write_stream(&mut flash, &header, &[0x12, 0x34, 0x56, 0x78]).unwrap();
        assert_eq!(&flash.data()[0x1000..0x1004], &[0x12, 0x34, 0x56, 0x78]);
        assert!(!flash.write_enabled());
    }

    #[test]
    fn test_program_only_clears_bits() {
        let mut flash = small();
        flash.data_mut()[0] = 0xF0;
        protocol::write_enable(&mut flash, opcodes::WREN, opcodes::RDSR).unwrap();
        let header = Header::addressed(opcodes::PP, 0, AddressWidth::ThreeByte);
        protocol::write_stream(&mut flash, &header, &[0x3C]).unwrap();
        assert_eq!(flash.data()[0], 0x30);
    }

    #[test]
    fn test_program_wraps_inside_page() {
        let mut flash = small();
        protocol::write_enable(&mut flash, opcodes::WREN, opcodes::RDSR).unwrap();
        let header = Header::addressed(opcodes::PP, 254, AddressWidth::ThreeByte);
        protocol::write_stream(&mut flash, &header, &[0x01, 0x02, 0x03, 0x04]).unwrap();
        assert_eq!(&flash.data()[254..256], &[0x01, 0x02]);
        assert_eq!(&flash.data()[0..2], &[0x03, 0x04]);
        assert_eq!(flash.data()[256], 0xFF);
    }

    #[test]
    fn test_erase_applies_on_deselect() {
        let mut flash = small();
        flash.data_mut()[0x7000..0x11000].fill(0x00);
        protocol::write_enable(&mut flash, opcodes::WREN, opcodes::RDSR).unwrap();
        let header = Header::addressed(opcodes::BE_52, 0x8000, AddressWidth::ThreeByte);
        protocol::command(&mut flash, &header).unwrap();
        assert!(flash.data()[0x8000..0x10000].iter().all(|&b| b == 0xFF));
        assert_eq!(flash.data()[0x7FFF], 0x00);
        assert_eq!(flash.data()[0x10000], 0x00);
    }

    #[test]
    fn test_status_reports_wip_for_configured_polls() {
        let mut flash = DummyFlash::new(DummyConfig::for_chip(&Mx25r6435f).with_busy_polls(2));
        protocol::write_enable(&mut flash, opcodes::WREN, opcodes::RDSR).unwrap();
        let header = Header::addressed(opcodes::PP, 0, AddressWidth::ThreeByte);
        protocol::write_stream(&mut flash, &header, &[0x00]).unwrap();

        assert!(protocol::read_status(&mut flash, opcodes::RDSR).unwrap().is_busy());
        assert!(protocol::read_status(&mut flash, opcodes::RDSR).unwrap().is_busy());
        assert!(!protocol::read_status(&mut flash, opcodes::RDSR).unwrap().is_busy());
    }

    #[test]
    fn test_oversized_exchange_is_rejected() {
        let mut flash = small();
        flash.set_cs(true);
        let mut buf = [0u8; 256];
        assert_eq!(flash.exchange(&[], &mut buf), Err(Error::TransferFailed));
        flash.set_cs(false);
    }

    #[test]
    fn test_transaction_log() {
        let mut flash = small();
        protocol::read_status(&mut flash, opcodes::RDSR).unwrap();
        let log = flash.take_transactions();
        assert_eq!(log.len(), 1);
        assert_eq!(log[0].opcode(), Some(opcodes::RDSR));
        assert_eq!(log[0].mosi, vec![opcodes::RDSR, OVERRUN]);
        assert_eq!(log[0].exchanges, vec![2]);
        assert!(flash.transactions().is_empty());
    }
}
