//! Flash chip type definitions

use core::fmt;

use crate::bus::BusConfig;
use crate::error::{Error, Result};
use crate::spi::{opcodes, AddressWidth};

/// Identity triplet returned by RDID
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "std", derive(serde::Serialize, serde::Deserialize))]
pub struct JedecId {
    /// JEDEC manufacturer ID
    pub manufacturer: u8,
    /// Memory type (first device ID byte)
    pub memory_type: u8,
    /// Capacity code (second device ID byte)
    pub capacity: u8,
}

impl JedecId {
    /// Create an identity triplet
    pub const fn new(manufacturer: u8, memory_type: u8, capacity: u8) -> Self {
        Self {
            manufacturer,
            memory_type,
            capacity,
        }
    }

    /// Decode a 4-byte RDID reply; byte 0 was clocked during the opcode
    pub const fn from_reply(reply: &[u8; 4]) -> Self {
        Self::new(reply[1], reply[2], reply[3])
    }
}

impl fmt::Display for JedecId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{:02X} {:02X} {:02X}",
            self.manufacturer, self.memory_type, self.capacity
        )
    }
}

/// Datasheet timing characteristics, all in microseconds
///
/// The `*_call_us` values estimate how long the corresponding driver call
/// occupies the CPU (bus transfer plus code execution). Callers running a
/// cooperative scheduler use them to budget how much work fits in a slot.
/// The driver itself never sleeps on these.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[cfg_attr(feature = "std", derive(serde::Serialize, serde::Deserialize))]
pub struct FlashTiming {
    /// Worst-case time to program the first byte of a page
    pub byte_program_us: u32,
    /// Worst-case time to program a full page
    pub page_program_us: u32,
    /// Worst-case time to erase one erase block
    pub block_erase_us: u32,
    /// CPU time of a single-byte `write()` call
    pub byte_write_call_us: u32,
    /// CPU time of a full-page `write()` call
    pub page_write_call_us: u32,
    /// CPU time of an `erase()` call
    pub block_erase_call_us: u32,
    /// CPU time of an `is_busy()` call
    pub is_busy_call_us: u32,
}

impl FlashTiming {
    /// Busy-wait budget after a page program (twice the datasheet maximum)
    pub const fn program_timeout_us(&self) -> u32 {
        self.page_program_us.saturating_mul(2)
    }

    /// Busy-wait budget after a block erase (twice the datasheet maximum)
    pub const fn erase_timeout_us(&self) -> u32 {
        self.block_erase_us.saturating_mul(2)
    }
}

/// Immutable chip geometry
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "std", derive(serde::Serialize, serde::Deserialize))]
pub struct FlashGeometry {
    /// Total addressable size in bytes
    pub total_size: u32,
    /// Page program size; also the program alignment boundary
    pub page_size: u32,
    /// Smallest erasable unit
    pub erase_block_size: u32,
    /// Minimum write alignment in bytes
    pub write_alignment: u32,
    /// Timing characteristics
    pub timing: FlashTiming,
}

impl FlashGeometry {
    /// Number of erase blocks on the chip
    pub const fn block_count(&self) -> u32 {
        self.total_size / self.erase_block_size
    }

    /// Number of pages on the chip
    pub const fn page_count(&self) -> u32 {
        self.total_size / self.page_size
    }

    /// Base address of the erase block containing `address`
    pub const fn block_base(&self, address: u32) -> u32 {
        address - address % self.erase_block_size
    }

    /// Bytes left in the page starting at `address`
    pub const fn page_remaining(&self, address: u32) -> u32 {
        self.page_size - address % self.page_size
    }

    /// Check if an address range lies within the chip
    pub fn is_valid_range(&self, address: u32, len: usize) -> bool {
        // Use u64 arithmetic to avoid truncation when len > u32::MAX
        address < self.total_size && address as u64 + len as u64 <= self.total_size as u64
    }

    /// Validate a read of `len` bytes at `address`
    pub fn check_read(&self, address: u32, len: usize) -> Result<()> {
        if !self.is_valid_range(address, len) {
            return Err(Error::OutOfRange);
        }
        Ok(())
    }

    /// Validate a page program of `len` bytes at `address`
    ///
    /// The chip wraps inside the page when a program runs past its end, so
    /// a request crossing the boundary is rejected instead.
    pub fn check_program(&self, address: u32, len: usize) -> Result<()> {
        if len > self.page_size as usize {
            return Err(Error::OutOfRange);
        }
        if !self.is_valid_range(address, len) {
            return Err(Error::OutOfRange);
        }
        if address % self.write_alignment != 0 {
            return Err(Error::OutOfRange);
        }
        if len > self.page_remaining(address) as usize {
            return Err(Error::OutOfRange);
        }
        Ok(())
    }

    /// Validate an erase of the block starting at `address`
    pub fn check_erase(&self, address: u32) -> Result<()> {
        if address % self.erase_block_size != 0 {
            return Err(Error::OutOfRange);
        }
        if address as u64 + self.erase_block_size as u64 > self.total_size as u64 {
            return Err(Error::OutOfRange);
        }
        Ok(())
    }
}

/// Opcodes a chip variant uses for each driver operation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CommandSet {
    /// Array read
    pub read: u8,
    /// Page program
    pub program: u8,
    /// Erase of one erase block
    pub erase: u8,
    /// Status register 1 read
    pub read_status: u8,
    /// Write enable
    pub write_enable: u8,
    /// JEDEC identification
    pub identify: u8,
}

impl CommandSet {
    /// 3-byte address commands with 32 KiB block erase
    pub const STANDARD_32K: Self = Self {
        read: opcodes::READ,
        program: opcodes::PP,
        erase: opcodes::BE_52,
        read_status: opcodes::RDSR,
        write_enable: opcodes::WREN,
        identify: opcodes::RDID,
    };

    /// Dedicated 4-byte address commands with 32 KiB block erase
    pub const FOUR_BYTE_32K: Self = Self {
        read: opcodes::READ_4B,
        program: opcodes::PP_4B,
        erase: opcodes::BE_5C,
        read_status: opcodes::RDSR,
        write_enable: opcodes::WREN,
        identify: opcodes::RDID,
    };
}

/// Static description of one supported part
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChipDescriptor {
    /// Vendor name (e.g., "GigaDevice")
    pub vendor: &'static str,
    /// Chip model name (e.g., "GD25WB256E")
    pub name: &'static str,
    /// Expected RDID identity
    pub id: JedecId,
    /// Geometry and timing
    pub geometry: FlashGeometry,
    /// Opcodes
    pub commands: CommandSet,
    /// Address width used by `commands`
    pub address_width: AddressWidth,
    /// Default bus settings
    pub bus: BusConfig,
}

impl ChipDescriptor {
    /// Check if this chip matches the given identity
    pub fn matches(&self, id: &JedecId) -> bool {
        self.id == *id
    }
}

/// JEDEC manufacturer IDs
pub mod manufacturer {
    /// GigaDevice
    pub const GIGADEVICE: u8 = 0xC8;
    /// Macronix
    pub const MACRONIX: u8 = 0xC2;
}

#[cfg(test)]
mod tests {
    use super::*;

    const GEOMETRY: FlashGeometry = FlashGeometry {
        total_size: 32 * 1024 * 1024,
        page_size: 256,
        erase_block_size: 32 * 1024,
        write_alignment: 1,
        timing: FlashTiming {
            byte_program_us: 0,
            page_program_us: 0,
            block_erase_us: 0,
            byte_write_call_us: 0,
            page_write_call_us: 0,
            block_erase_call_us: 0,
            is_busy_call_us: 0,
        },
    };

    #[test]
    fn program_crossing_page_is_rejected() {
        assert_eq!(GEOMETRY.check_program(250, 10), Err(Error::OutOfRange));
        assert_eq!(GEOMETRY.check_program(250, 6), Ok(()));
        assert_eq!(GEOMETRY.check_program(256, 256), Ok(()));
        assert_eq!(GEOMETRY.check_program(0, 257), Err(Error::OutOfRange));
    }

    #[test]
    fn program_past_end_is_rejected() {
        let last_page = GEOMETRY.total_size - 256;
        assert_eq!(GEOMETRY.check_program(last_page, 256), Ok(()));
        assert_eq!(
            GEOMETRY.check_program(GEOMETRY.total_size, 1),
            Err(Error::OutOfRange)
        );
        assert_eq!(GEOMETRY.check_program(u32::MAX, 1), Err(Error::OutOfRange));
    }

    #[test]
    fn program_honours_alignment() {
        let geometry = FlashGeometry {
            write_alignment: 4,
            ..GEOMETRY
        };
        assert_eq!(geometry.check_program(2, 4), Err(Error::OutOfRange));
        assert_eq!(geometry.check_program(4, 4), Ok(()));
    }

    #[test]
    fn erase_requires_block_alignment() {
        assert_eq!(GEOMETRY.check_erase(1), Err(Error::OutOfRange));
        assert_eq!(GEOMETRY.check_erase(0), Ok(()));
        assert_eq!(GEOMETRY.check_erase(32 * 1024), Ok(()));
        let last = GEOMETRY.total_size - GEOMETRY.erase_block_size;
        assert_eq!(GEOMETRY.check_erase(last), Ok(()));
        assert_eq!(
            GEOMETRY.check_erase(GEOMETRY.total_size),
            Err(Error::OutOfRange)
        );
    }

    #[test]
    fn read_bounds() {
        assert_eq!(GEOMETRY.check_read(0, GEOMETRY.total_size as usize), Ok(()));
        assert_eq!(
            GEOMETRY.check_read(1, GEOMETRY.total_size as usize),
            Err(Error::OutOfRange)
        );
        assert_eq!(
            GEOMETRY.check_read(GEOMETRY.total_size, 0),
            Err(Error::OutOfRange)
        );
        assert_eq!(GEOMETRY.check_read(u32::MAX, usize::MAX), Err(Error::OutOfRange));
    }

    #[test]
    fn block_helpers() {
        assert_eq!(GEOMETRY.block_count(), 1024);
        assert_eq!(GEOMETRY.page_count(), 131072);
        assert_eq!(GEOMETRY.block_base(0x8123), 0x8000);
        assert_eq!(GEOMETRY.page_remaining(250), 6);
    }

    #[test]
    fn jedec_id_skips_opcode_slot() {
        let id = JedecId::from_reply(&[0xFF, 0xC8, 0x65, 0x19]);
        assert_eq!(id, JedecId::new(0xC8, 0x65, 0x19));
    }
}
