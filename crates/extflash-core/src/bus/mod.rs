//! SPI bus abstraction
//!
//! This module defines the transport the driver runs on: a raw full-duplex
//! SPI exchange primitive plus chip-select control, and the bus settings a
//! chip variant requires.

mod config;
mod traits;

pub use config::{BusConfig, SpiMode};
pub use traits::SpiBus;
