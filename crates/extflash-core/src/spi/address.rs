//! Address width types

/// Address width used by a chip's array commands
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "std", derive(serde::Serialize, serde::Deserialize))]
pub enum AddressWidth {
    /// 3-byte (24-bit) address - supports up to 16 MiB
    #[default]
    ThreeByte,
    /// 4-byte (32-bit) address - supports up to 4 GiB
    FourByte,
}

impl AddressWidth {
    /// Returns the number of address bytes
    pub const fn bytes(&self) -> usize {
        match self {
            Self::ThreeByte => 3,
            Self::FourByte => 4,
        }
    }

    /// Returns the maximum addressable size in bytes
    pub const fn max_size(&self) -> u64 {
        match self {
            Self::ThreeByte => 1 << 24,
            Self::FourByte => 1 << 32,
        }
    }

    /// Narrowest width able to address `total_size` bytes
    pub const fn for_size(total_size: u32) -> Self {
        if total_size as u64 > Self::ThreeByte.max_size() {
            Self::FourByte
        } else {
            Self::ThreeByte
        }
    }

    /// Encode an address big-endian into `buf`, returning the bytes written
    ///
    /// `buf` must hold at least [`bytes()`](Self::bytes) bytes.
    pub fn encode(&self, address: u32, buf: &mut [u8]) -> usize {
        match self {
            Self::ThreeByte => {
                buf[0] = (address >> 16) as u8;
                buf[1] = (address >> 8) as u8;
                buf[2] = address as u8;
            }
            Self::FourByte => {
                buf[0] = (address >> 24) as u8;
                buf[1] = (address >> 16) as u8;
                buf[2] = (address >> 8) as u8;
                buf[3] = address as u8;
            }
        }
        self.bytes()
    }
}
