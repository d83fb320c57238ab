//! extflash-core - External SPI NOR flash driver
//!
//! This crate turns a command-addressed SPI NOR flash chip into a
//! byte-addressable read/program/erase device. It is `no_std` so the same
//! driver runs in a bootloader, in application firmware and on a host.
//!
//! The driver is split into three layers:
//!
//! - [`bus`] - chip-select control and full-duplex SPI exchanges
//! - [`protocol`] - command framing (opcodes, address encoding, status bits)
//! - [`flash`] - the [`FlashDriver`](flash::FlashDriver) policy layer that
//!   validates requests against the chip geometry and performs the
//!   write-enable handshake
//!
//! Chip variants live in [`chip`] and are selected either at compile time
//! (a zero-sized type such as [`chip::Gd25wb256e`]) or at runtime through
//! [`chip::ChipVariant`].
//!
//! # Features
//!
//! - `std` - Enable `std::error::Error` and serde support for configuration
//! - `is_sync` - Compile the driver as blocking instead of `async`
//! - `destructive-selftest` - Run the content-altering self-test from `init()`
//!
//! # Example
//!
//! ```ignore
//! use extflash_core::chip::Gd25wb256e;
//! use extflash_core::flash::{DriverConfig, FlashDriver};
//!
//! fn store<B: extflash_core::bus::SpiBus>(bus: B) -> extflash_core::Result<()> {
//!     let mut flash = FlashDriver::new(bus, Gd25wb256e, DriverConfig::default());
//!     flash.init()?;
//!     flash.write(0x1000, &[0xAA; 16])?;
//!     while flash.is_busy()? {}
//!     Ok(())
//! }
//! ```

#![no_std]
#![warn(missing_docs)]
#![warn(rust_2018_idioms)]
// Allow async fn in traits - we use maybe-async for dual sync/async support
#![allow(async_fn_in_trait)]

#[cfg(feature = "std")]
extern crate std;

pub mod bus;
pub mod chip;
pub mod error;
pub mod flash;
pub mod protocol;
pub mod spi;

pub use error::{Error, Result};
