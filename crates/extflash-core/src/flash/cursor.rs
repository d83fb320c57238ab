//! Erase progress cursor

use crate::chip::FlashGeometry;
use crate::error::{Error, Result};

/// Caller-owned erase progress
///
/// Each successful [`erase_next()`](super::FlashDriver::erase_next) erases the
/// block at `address`, then advances `address` by one erase block and
/// decrements `remaining`. Nothing is touched on failure, so the same cursor
/// can be retried after polling `is_busy()`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct EraseCursor {
    /// Base address of the next block to erase
    pub address: u32,
    /// Number of blocks left
    pub remaining: usize,
}

impl EraseCursor {
    /// Create a cursor over `remaining` blocks starting at `address`
    pub const fn new(address: u32, remaining: usize) -> Self {
        Self { address, remaining }
    }

    /// Cursor over every erase block touched by `len` bytes at `start`
    ///
    /// The range is widened to block boundaries on both ends.
    pub fn covering(geometry: &FlashGeometry, start: u32, len: u32) -> Result<Self> {
        if len == 0 {
            return Ok(Self::new(geometry.block_base(start), 0));
        }
        let end = start as u64 + len as u64;
        if end > geometry.total_size as u64 {
            return Err(Error::OutOfRange);
        }
        let block = geometry.erase_block_size as u64;
        let first = geometry.block_base(start);
        let blocks = (end - first as u64).div_ceil(block);
        Ok(Self::new(first, blocks as usize))
    }

    /// True once every block has been erased
    pub const fn is_done(&self) -> bool {
        self.remaining == 0
    }
}
