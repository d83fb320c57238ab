//! Flash driver policy layer
//!
//! [`FlashDriver`] validates every request against the chip geometry,
//! performs the write-enable handshake and frames commands through
//! [`protocol`](crate::protocol). Busy polling is left to the caller, with
//! [`FlashDriver::wait_idle`] for callers that want to block.

mod config;
mod cursor;
mod driver;
mod poll;
mod probe;
pub mod selftest;

pub use config::{DriverConfig, IdentPolicy};
pub use cursor::EraseCursor;
pub use driver::FlashDriver;
pub use poll::DEFAULT_POLL_US;
pub use probe::probe;
