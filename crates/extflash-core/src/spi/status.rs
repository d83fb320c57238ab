//! Status register 1 bit definitions

use bitflags::bitflags;

bitflags! {
    /// Status register 1 as returned by RDSR
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct Status: u8 {
        /// Write In Progress / Busy
        const WIP  = 0x01;
        /// Write Enable Latch
        const WEL  = 0x02;
        /// Block Protect bit 0
        const BP0  = 0x04;
        /// Block Protect bit 1
        const BP1  = 0x08;
        /// Block Protect bit 2
        const BP2  = 0x10;
        /// Block Protect bit 3 / Top-Bottom
        const BP3  = 0x20;
        /// Block Protect bit 4 / Quad Enable on Macronix parts
        const BP4  = 0x40;
        /// Status Register Protect
        const SRP0 = 0x80;
    }
}

impl Status {
    /// Whether a program/erase is still running
    pub fn is_busy(&self) -> bool {
        self.contains(Self::WIP)
    }

    /// Whether the write enable latch is set
    pub fn write_enabled(&self) -> bool {
        self.contains(Self::WEL)
    }
}
