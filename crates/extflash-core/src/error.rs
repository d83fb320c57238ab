//! Error types for extflash-core
//!
//! This module provides a no_std compatible error type that every driver
//! entry point returns.

use core::fmt;

use crate::chip::JedecId;

/// Why chip identification at init failed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IdentFailure {
    /// No attempt returned the expected identity
    NotDetected {
        /// Identity returned by the last attempt
        last: JedecId,
        /// Number of attempts made
        attempts: u32,
    },
    /// The chip answered with the right identity but failed the self-test
    SelfTest(SelfTestStage),
}

/// Self-test step that failed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SelfTestStage {
    /// Erase command rejected or cursor not advanced by exactly one block
    Erase,
    /// Erased bytes did not read back as 0xFF
    EraseVerify,
    /// Program command rejected
    Program,
    /// Programmed bytes did not read back
    ProgramVerify,
    /// Device stayed busy past the polling budget
    Timeout,
}

/// Core error type - no_std compatible, Copy for efficiency
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Error {
    /// A previous program/erase is still running; poll `is_busy()` and retry
    Busy,
    /// Address or length violates the chip geometry or a page/block boundary
    OutOfRange,
    /// The status register did not confirm the write-enable latch
    WriteEnableFailed,
    /// Chip not detected, or detected but failed the self-test
    IdentificationFailed(IdentFailure),
    /// The bus implementation reported a transfer error
    TransferFailed,
    /// A caller-side wait exceeded its budget
    Timeout,
}

impl fmt::Display for SelfTestStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Erase => write!(f, "erase"),
            Self::EraseVerify => write!(f, "erase verify"),
            Self::Program => write!(f, "program"),
            Self::ProgramVerify => write!(f, "program verify"),
            Self::Timeout => write!(f, "busy timeout"),
        }
    }
}

impl fmt::Display for IdentFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NotDetected { last, attempts } => write!(
                f,
                "chip not detected after {} attempts (last id {})",
                attempts, last
            ),
            Self::SelfTest(stage) => write!(f, "self-test failed at {} stage", stage),
        }
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Busy => write!(f, "flash device busy"),
            Self::OutOfRange => write!(f, "parameter out of range"),
            Self::WriteEnableFailed => write!(f, "write enable latch not set"),
            Self::IdentificationFailed(failure) => {
                write!(f, "identification failed: {}", failure)
            }
            Self::TransferFailed => write!(f, "SPI transfer failed"),
            Self::Timeout => write!(f, "operation timed out"),
        }
    }
}

#[cfg(feature = "std")]
impl std::error::Error for Error {}

/// Result type alias using the core Error type
pub type Result<T> = core::result::Result<T, Error>;
