//! SPI25 command sequences
//!
//! This module implements the select → command → transfer → deselect
//! sequences shared by every supported part. Opcodes are passed in by the
//! caller so the same sequences serve all chip variants.
//!
//! Uses `maybe_async` to support both sync and async modes:
//! - With `is_sync` feature: blocking/synchronous
//! - Without `is_sync` feature: async

use crate::bus::SpiBus;
use crate::chip::JedecId;
use crate::error::{Error, Result};
use crate::spi::{Header, Status, IDENT_REPLY_LEN, STATUS_REPLY_LEN};
use maybe_async::maybe_async;

/// Run one exchange framed by chip-select
///
/// Chip-select is released even when the exchange fails.
#[maybe_async]
pub async fn transaction<B: SpiBus + ?Sized>(
    bus: &mut B,
    write: &[u8],
    read: &mut [u8],
) -> Result<()> {
    bus.set_cs(true);
    let result = bus.exchange(write, read).await;
    bus.set_cs(false);
    result
}

/// Read status register 1
///
/// The reply is clocked as two bytes; the first is shifted in while the
/// opcode goes out and carries no information.
#[maybe_async]
pub async fn read_status<B: SpiBus + ?Sized>(bus: &mut B, opcode: u8) -> Result<Status> {
    let mut reply = [0u8; STATUS_REPLY_LEN];
    transaction(bus, &[opcode], &mut reply).await?;
    Ok(Status::from_bits_retain(reply[1]))
}

/// Read the JEDEC identity
#[maybe_async]
pub async fn read_identity<B: SpiBus + ?Sized>(bus: &mut B, opcode: u8) -> Result<JedecId> {
    let mut reply = [0u8; IDENT_REPLY_LEN];
    transaction(bus, &[opcode], &mut reply).await?;
    Ok(JedecId::from_reply(&reply))
}

/// Set the write-enable latch and confirm it with a status read
///
/// A single attempt: if WEL does not read back set the caller gets
/// [`Error::WriteEnableFailed`] and decides whether to retry.
#[maybe_async]
pub async fn write_enable<B: SpiBus + ?Sized>(bus: &mut B, wren: u8, rdsr: u8) -> Result<()> {
    transaction(bus, &[wren], &mut []).await?;
    let status = read_status(bus, rdsr).await?;
    if !status.write_enabled() {
        log::debug!("spi25: WEL not set after WREN (status {:02X})", status.bits());
        return Err(Error::WriteEnableFailed);
    }
    Ok(())
}

/// Send a header-only command (write enable, block erase)
#[maybe_async]
pub async fn command<B: SpiBus + ?Sized>(bus: &mut B, header: &Header) -> Result<()> {
    log::trace!("spi25: command {:02X?}", header.as_bytes());
    transaction(bus, header.as_bytes(), &mut []).await
}

/// Send `header`, then read `buf.len()` bytes with chip-select held
///
/// The data phase is split into exchanges of at most
/// `bus.max_transfer_len()` bytes.
#[maybe_async]
pub async fn read_stream<B: SpiBus + ?Sized>(
    bus: &mut B,
    header: &Header,
    buf: &mut [u8],
) -> Result<()> {
    let max_len = bus.max_transfer_len().max(1);
    log::trace!(
        "spi25: read {:02X?}, {} bytes in chunks of {}",
        header.as_bytes(),
        buf.len(),
        max_len
    );

    bus.set_cs(true);
    let result = read_phases(bus, header, buf, max_len).await;
    bus.set_cs(false);
    result
}

#[maybe_async]
async fn read_phases<B: SpiBus + ?Sized>(
    bus: &mut B,
    header: &Header,
    buf: &mut [u8],
    max_len: usize,
) -> Result<()> {
    bus.exchange(header.as_bytes(), &mut []).await?;
    for chunk in buf.chunks_mut(max_len) {
        bus.exchange(&[], chunk).await?;
    }
    Ok(())
}

/// Send `header`, then write `data` with chip-select held
#[maybe_async]
pub async fn write_stream<B: SpiBus + ?Sized>(
    bus: &mut B,
    header: &Header,
    data: &[u8],
) -> Result<()> {
    let max_len = bus.max_transfer_len().max(1);
    log::trace!(
        "spi25: program {:02X?}, {} bytes in chunks of {}",
        header.as_bytes(),
        data.len(),
        max_len
    );

    bus.set_cs(true);
    let result = write_phases(bus, header, data, max_len).await;
    bus.set_cs(false);
    result
}

#[maybe_async]
async fn write_phases<B: SpiBus + ?Sized>(
    bus: &mut B,
    header: &Header,
    data: &[u8],
    max_len: usize,
) -> Result<()> {
    bus.exchange(header.as_bytes(), &mut []).await?;
    for chunk in data.chunks(max_len) {
        bus.exchange(chunk, &mut []).await?;
    }
    Ok(())
}
