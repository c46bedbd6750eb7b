//! SPI opcodes and command framing
//!
//! This module provides the Winbond command set and the helpers used to
//! build addressed command headers.

mod address;
pub mod opcodes;

pub use address::{address_header, ADDRESS_HEADER_LEN};
pub use opcodes::*;
