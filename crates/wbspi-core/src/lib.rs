//! wbspi-core - Driver core for Winbond-family SPI NOR flash
//!
//! This crate identifies W25P/W25X/W25Q parts from their JEDEC ID, programs
//! data with page-aligned Page Program commands and manages the block write
//! protection bits in the status registers. It is `no_std` and talks to the
//! hardware only through the [`programmer::SpiBus`] trait.
//!
//! # Features
//!
//! - `std` - Enable standard library support (includes `alloc`)
//! - `alloc` - Enable heap allocation
//!
//! # Example
//!
//! ```ignore
//! use wbspi_core::{flash, wp, programmer::SpiBus};
//!
//! fn lock_bootblock<B: SpiBus>(bus: &mut B) -> wbspi_core::Result<()> {
//!     let handle = flash::probe_spi(bus)?;
//!     let bootblock = wp::Region::new(handle.total_size() - 0x10000, 0x10000);
//!     wp::set_protection(bus, &handle, &bootblock, true, wp::LockdownMode::Pin)
//! }
//! ```

#![no_std]
#![warn(missing_docs)]
#![warn(rust_2018_idioms)]

#[cfg(feature = "alloc")]
extern crate alloc;

#[cfg(feature = "std")]
extern crate std;

pub mod chip;
pub mod error;
pub mod flash;
pub mod programmer;
pub mod protocol;
pub mod spi;
pub mod wp;

pub use error::{Error, Result, WriteFailure, WriteStage};
