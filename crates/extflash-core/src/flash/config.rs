//! Driver configuration

use crate::bus::{BusConfig, SpiMode};
use crate::chip::FlashChip;

/// Bounded identification retry policy used by `init()`
///
/// Flash parts ignore commands for a short time after power-up
/// (tVSL / tPUW, typically well under 10 ms). `init()` keeps issuing RDID
/// until the expected identity comes back or `attempts` are spent, waiting
/// `delay_us` between attempts. The default gives a budget of about 20 ms of
/// delay plus the time of the RDID exchanges themselves.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "std", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "std", serde(default))]
pub struct IdentPolicy {
    /// Maximum number of RDID attempts; at least one is always made
    pub attempts: u32,
    /// Delay between attempts in microseconds
    pub delay_us: u32,
}

impl IdentPolicy {
    /// Default number of attempts
    pub const DEFAULT_ATTEMPTS: u32 = 2_000;
    /// Default delay between attempts
    pub const DEFAULT_DELAY_US: u32 = 10;

    /// Create a policy
    pub const fn new(attempts: u32, delay_us: u32) -> Self {
        Self { attempts, delay_us }
    }

    /// A single attempt with no delay
    pub const fn once() -> Self {
        Self::new(1, 0)
    }

    /// Attempts actually made (never zero)
    pub const fn effective_attempts(&self) -> u32 {
        if self.attempts == 0 {
            1
        } else {
            self.attempts
        }
    }

    /// Total delay spent between attempts when the chip never answers
    pub const fn budget_us(&self) -> u64 {
        (self.effective_attempts() as u64 - 1) * self.delay_us as u64
    }
}

impl Default for IdentPolicy {
    fn default() -> Self {
        Self::new(Self::DEFAULT_ATTEMPTS, Self::DEFAULT_DELAY_US)
    }
}

/// Configuration moved into a [`FlashDriver`](super::FlashDriver) at startup
///
/// Bus settings left as `None` fall back to the chip's datasheet defaults.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[cfg_attr(feature = "std", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "std", serde(default))]
pub struct DriverConfig {
    /// SCK frequency override in Hz
    pub frequency_hz: Option<u32>,
    /// SPI mode override
    pub mode: Option<SpiMode>,
    /// Identification retry policy
    pub ident: IdentPolicy,
}

impl DriverConfig {
    /// Override the SCK frequency
    pub const fn with_frequency(mut self, frequency_hz: u32) -> Self {
        self.frequency_hz = Some(frequency_hz);
        self
    }

    /// Override the SPI mode
    pub const fn with_mode(mut self, mode: SpiMode) -> Self {
        self.mode = Some(mode);
        self
    }

    /// Replace the identification policy
    pub const fn with_ident(mut self, ident: IdentPolicy) -> Self {
        self.ident = ident;
        self
    }

    /// Bus settings to apply for `chip`
    pub fn bus_for<C: FlashChip + ?Sized>(&self, chip: &C) -> BusConfig {
        let mut bus = chip.bus_config();
        if let Some(hz) = self.frequency_hz {
            bus = bus.with_frequency(hz);
        }
        if let Some(mode) = self.mode {
            bus = bus.with_mode(mode);
        }
        bus
    }
}
