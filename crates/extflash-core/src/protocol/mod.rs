//! Protocol implementations
//!
//! Command sequences expressed against [`SpiBus`](crate::bus::SpiBus). The
//! driver composes these; they perform no validation of their own.

mod spi25;

pub use spi25::*;
