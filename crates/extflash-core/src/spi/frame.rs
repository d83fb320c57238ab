//! Command header framing
//!
//! Every transaction starts with a header: one opcode byte, optionally
//! followed by a big-endian address. The header is sent in its own exchange
//! and the data phase follows in further exchanges while chip-select stays
//! asserted.

use heapless::Vec;

use super::AddressWidth;

/// Longest header: opcode plus a 4-byte address
pub const MAX_HEADER_LEN: usize = 1 + 4;

/// Bytes clocked for a status register read (opcode slot + status)
pub const STATUS_REPLY_LEN: usize = 2;

/// Bytes clocked for an identification read (opcode slot + 3 identity bytes)
pub const IDENT_REPLY_LEN: usize = 4;

/// A command header ready to be shifted out
///
/// Designed to avoid allocation - the bytes live inline.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Header {
    bytes: Vec<u8, MAX_HEADER_LEN>,
}

impl Header {
    /// Header with no address phase (e.g., WREN, RDSR, RDID)
    pub fn opcode(opcode: u8) -> Self {
        let mut bytes = Vec::new();
        // Capacity is MAX_HEADER_LEN, a single byte always fits
        let _ = bytes.push(opcode);
        Self { bytes }
    }

    /// Header with an address phase (e.g., READ, PP, BE)
    pub fn addressed(opcode: u8, address: u32, width: AddressWidth) -> Self {
        let mut raw = [0u8; MAX_HEADER_LEN];
        raw[0] = opcode;
        let len = 1 + width.encode(address, &mut raw[1..]);
        let mut bytes = Vec::new();
        let _ = bytes.extend_from_slice(&raw[..len]);
        Self { bytes }
    }

    /// The opcode byte
    pub fn command(&self) -> u8 {
        self.bytes[0]
    }

    /// Raw header bytes in wire order
    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    /// Number of bytes in the header
    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    /// Always false; a header carries at least the opcode
    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }
}
