//! Error types for wbspi-core
//!
//! This module provides a no_std compatible error type that is shared by the
//! prober, the programmer and the protection engine.

use core::fmt;

/// Which step of a page program sequence failed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WriteStage {
    /// The Write Enable command was rejected by the bus
    EnableFailed,
    /// The Page Program command was rejected by the bus
    ProgramFailed,
    /// The chip did not clear BUSY within the program timeout
    Timeout,
}

/// Details about a write failure
///
/// Chunks before `addr` have been fully programmed; nothing is known about
/// the chunk starting at `addr`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WriteFailure {
    /// Step that failed
    pub stage: WriteStage,
    /// Flash address of the chunk that failed
    pub addr: u32,
    /// Number of bytes committed before the failing chunk
    pub written: usize,
}

/// Core error type - no_std compatible, Copy for efficiency
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Error {
    // Probe errors
    /// The 16-bit device ID is not in the chip table
    UnsupportedDevice(u16),

    // Bus errors
    /// A command, read or write transaction failed on the bus
    BusFailure,
    /// The chip stayed busy longer than the allowed time
    Timeout,

    // Operation errors
    /// A write aborted part way through
    Write(WriteFailure),
    /// Address range is beyond the flash chip size
    AddressOutOfBounds,
    /// Operation requires a sector aligned address and length
    InvalidAlignment,

    // Protection errors
    /// Sector-granular protection (SEC=1) is active and cannot be decoded
    UnsupportedConfiguration,
    /// The chip has no supported block protect field
    Unsupported,
    /// Protected region must start at the bottom or end at the top of the flash
    NotTopOrBottom,
    /// Protected region size cannot be expressed by the BP bits
    UnsupportedRegionSize,
    /// The status register write was ignored because it is locked
    RegisterLocked,
}

impl fmt::Display for WriteStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::EnableFailed => write!(f, "write enable failed"),
            Self::ProgramFailed => write!(f, "page program failed"),
            Self::Timeout => write!(f, "page program timed out"),
        }
    }
}

impl fmt::Display for WriteFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} at address 0x{:08X} ({} bytes written)",
            self.stage, self.addr, self.written
        )
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UnsupportedDevice(id) => write!(f, "unsupported Winbond ID {:04x}", id),
            Self::BusFailure => write!(f, "SPI bus transaction failed"),
            Self::Timeout => write!(f, "operation timed out"),
            Self::Write(failure) => write!(f, "{}", failure),
            Self::AddressOutOfBounds => write!(f, "address out of bounds"),
            Self::InvalidAlignment => write!(f, "invalid alignment"),
            Self::UnsupportedConfiguration => {
                write!(f, "sector protection (SEC) is set, not supported")
            }
            Self::Unsupported => write!(f, "chip does not support write protection"),
            Self::NotTopOrBottom => {
                write!(f, "region must touch the top or the bottom of the flash")
            }
            Self::UnsupportedRegionSize => write!(f, "unsupported region size"),
            Self::RegisterLocked => write!(f, "status register is locked"),
        }
    }
}

#[cfg(feature = "std")]
impl std::error::Error for Error {}

/// Result type alias using the core Error type
pub type Result<T> = core::result::Result<T, Error>;
