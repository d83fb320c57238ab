//! SPI wire-level types
//!
//! This module provides the pieces that end up on the wire: opcodes,
//! address encoding, command headers and status register bits.

mod address;
mod frame;
pub mod opcodes;
mod status;

pub use address::AddressWidth;
pub use frame::{Header, IDENT_REPLY_LEN, MAX_HEADER_LEN, STATUS_REPLY_LEN};
pub use opcodes::*;
pub use status::Status;
