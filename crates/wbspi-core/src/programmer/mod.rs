//! Bus abstraction
//!
//! This module defines the trait a SPI transport implements so the driver
//! can talk to a flash chip.

mod traits;

pub use traits::*;
