//! Bus settings required by a chip

/// SPI clock polarity/phase
///
/// The supported NOR parts only accept modes 0 and 3; both sample on the
/// rising edge and differ only in clock idle level. Bit order is always
/// MSB first.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "std", derive(serde::Serialize, serde::Deserialize))]
pub enum SpiMode {
    /// CPOL=0, CPHA=0
    #[default]
    Mode0,
    /// CPOL=1, CPHA=1
    Mode3,
}

impl SpiMode {
    /// Mode number as used by spidev and most HALs
    pub const fn number(&self) -> u8 {
        match self {
            Self::Mode0 => 0,
            Self::Mode3 => 3,
        }
    }
}

/// Bus configuration applied by `init()`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "std", derive(serde::Serialize, serde::Deserialize))]
pub struct BusConfig {
    /// SCK frequency in Hz
    pub frequency_hz: u32,
    /// Clock polarity/phase
    pub mode: SpiMode,
}

impl BusConfig {
    /// Create a bus configuration
    pub const fn new(frequency_hz: u32, mode: SpiMode) -> Self {
        Self { frequency_hz, mode }
    }

    /// Set the SCK frequency in Hz
    pub const fn with_frequency(mut self, frequency_hz: u32) -> Self {
        self.frequency_hz = frequency_hz;
        self
    }

    /// Set the SPI mode
    pub const fn with_mode(mut self, mode: SpiMode) -> Self {
        self.mode = mode;
        self
    }
}
