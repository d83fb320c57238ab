//! Supported chip variants

use core::fmt;
use core::str::FromStr;

use super::types::{manufacturer, ChipDescriptor, CommandSet, FlashGeometry, FlashTiming, JedecId};
use super::FlashChip;
use crate::bus::{BusConfig, SpiMode};
use crate::spi::AddressWidth;

const MIB: u32 = 1024 * 1024;
const KIB: u32 = 1024;

/// nRF SPIM top speed; all supported parts run well above it
const SPIM_8M: u32 = 8_000_000;

// https://www.gigadevice.com.cn/Public/Uploads/uploadfile/files/20220714/DS-00863-GD25WB256E-Rev1.1.pdf
// pages 48-49. Call times assume 8 MHz SCK plus ~20 us of code.
static GD25WB256E: ChipDescriptor = ChipDescriptor {
    vendor: "GigaDevice",
    name: "GD25WB256E",
    id: JedecId::new(manufacturer::GIGADEVICE, 0x65, 0x19),
    geometry: FlashGeometry {
        total_size: 32 * MIB,
        page_size: 256,
        erase_block_size: 32 * KIB,
        write_alignment: 1,
        timing: FlashTiming {
            byte_program_us: 150,
            page_program_us: 4_000,
            block_erase_us: 2_000_000,
            byte_write_call_us: 94,
            page_write_call_us: 2_134,
            block_erase_call_us: 78,
            is_busy_call_us: 44,
        },
    },
    commands: CommandSet::FOUR_BYTE_32K,
    address_width: AddressWidth::FourByte,
    bus: BusConfig::new(SPIM_8M, SpiMode::Mode3),
};

static GD25LE255E: ChipDescriptor = ChipDescriptor {
    vendor: "GigaDevice",
    name: "GD25LE255E",
    id: JedecId::new(manufacturer::GIGADEVICE, 0x60, 0x19),
    geometry: FlashGeometry {
        total_size: 32 * MIB,
        page_size: 256,
        erase_block_size: 32 * KIB,
        write_alignment: 1,
        timing: FlashTiming {
            byte_program_us: 60,
            page_program_us: 2_400,
            block_erase_us: 1_600_000,
            byte_write_call_us: 94,
            page_write_call_us: 2_134,
            block_erase_call_us: 78,
            is_busy_call_us: 44,
        },
    },
    commands: CommandSet::FOUR_BYTE_32K,
    address_width: AddressWidth::FourByte,
    bus: BusConfig::new(SPIM_8M, SpiMode::Mode3),
};

// Timings are the high-performance mode maxima
static MX25R6435F: ChipDescriptor = ChipDescriptor {
    vendor: "Macronix",
    name: "MX25R6435F",
    id: JedecId::new(manufacturer::MACRONIX, 0x28, 0x17),
    geometry: FlashGeometry {
        total_size: 8 * MIB,
        page_size: 256,
        erase_block_size: 32 * KIB,
        write_alignment: 1,
        timing: FlashTiming {
            byte_program_us: 100,
            page_program_us: 10_000,
            block_erase_us: 1_500_000,
            byte_write_call_us: 93,
            page_write_call_us: 2_133,
            block_erase_call_us: 77,
            is_busy_call_us: 44,
        },
    },
    commands: CommandSet::STANDARD_32K,
    address_width: AddressWidth::ThreeByte,
    bus: BusConfig::new(SPIM_8M, SpiMode::Mode0),
};

/// GigaDevice GD25WB256E, 256 Mbit, 1.65-3.6 V
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Gd25wb256e;

/// GigaDevice GD25LE255E, 256 Mbit, 1.65-2.0 V
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Gd25le255e;

/// Macronix MX25R6435F, 64 Mbit, ultra low power
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Mx25r6435f;

impl FlashChip for Gd25wb256e {
    fn descriptor(&self) -> &'static ChipDescriptor {
        &GD25WB256E
    }
}

impl FlashChip for Gd25le255e {
    fn descriptor(&self) -> &'static ChipDescriptor {
        &GD25LE255E
    }
}

impl FlashChip for Mx25r6435f {
    fn descriptor(&self) -> &'static ChipDescriptor {
        &MX25R6435F
    }
}

/// Runtime-selected chip variant
///
/// Use this when the part comes from configuration or probing rather than
/// from the build.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "std", derive(serde::Serialize, serde::Deserialize))]
pub enum ChipVariant {
    /// GigaDevice GD25WB256E
    Gd25wb256e,
    /// GigaDevice GD25LE255E
    Gd25le255e,
    /// Macronix MX25R6435F
    Mx25r6435f,
}

impl ChipVariant {
    /// Every supported variant
    pub const ALL: [ChipVariant; 3] = [Self::Gd25wb256e, Self::Gd25le255e, Self::Mx25r6435f];

    /// Find the variant with the given identity
    pub fn from_id(id: &JedecId) -> Option<Self> {
        Self::ALL.into_iter().find(|v| v.descriptor().matches(id))
    }
}

impl FlashChip for ChipVariant {
    fn descriptor(&self) -> &'static ChipDescriptor {
        match self {
            Self::Gd25wb256e => &GD25WB256E,
            Self::Gd25le255e => &GD25LE255E,
            Self::Mx25r6435f => &MX25R6435F,
        }
    }
}

impl fmt::Display for ChipVariant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.descriptor().name)
    }
}

/// Error returned when parsing an unknown chip name
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UnknownChip;

impl fmt::Display for UnknownChip {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown chip name")
    }
}

#[cfg(feature = "std")]
impl std::error::Error for UnknownChip {}

impl FromStr for ChipVariant {
    type Err = UnknownChip;

    /// Case-insensitive match on the model name
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|v| v.descriptor().name.eq_ignore_ascii_case(s))
            .ok_or(UnknownChip)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn large_parts_use_four_byte_addressing() {
        for variant in ChipVariant::ALL {
            let desc = variant.descriptor();
            assert_eq!(
                desc.address_width,
                AddressWidth::for_size(desc.geometry.total_size),
                "{}",
                desc.name
            );
        }
    }

    #[test]
    fn geometry_is_self_consistent() {
        for variant in ChipVariant::ALL {
            let g = variant.geometry();
            assert_eq!(g.total_size % g.erase_block_size, 0);
            assert_eq!(g.erase_block_size % g.page_size, 0);
            assert_eq!(g.page_size % g.write_alignment, 0);
        }
    }

    #[test]
    fn lookup_by_id_and_name() {
        let id = JedecId::new(0xC8, 0x60, 0x19);
        assert_eq!(ChipVariant::from_id(&id), Some(ChipVariant::Gd25le255e));
        assert_eq!(ChipVariant::from_id(&JedecId::new(0xFF, 0xFF, 0xFF)), None);
        assert_eq!("mx25r6435f".parse::<ChipVariant>(), Ok(ChipVariant::Mx25r6435f));
        assert_eq!("W25Q128".parse::<ChipVariant>(), Err(UnknownChip));
    }

    #[test]
    fn zero_sized_and_enum_agree() {
        assert_eq!(Gd25wb256e.descriptor(), ChipVariant::Gd25wb256e.descriptor());
        assert_eq!(Gd25le255e.descriptor(), ChipVariant::Gd25le255e.descriptor());
        assert_eq!(Mx25r6435f.descriptor(), ChipVariant::Mx25r6435f.descriptor());
    }
}
