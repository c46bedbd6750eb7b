//! Write protection support
//!
//! Winbond parts protect a power-of-two sized range anchored at either end
//! of the flash through status register bits:
//!
//! - **BP bits (Block Protect)**: Select how much of the chip is protected
//! - **TB bit (Top/Bottom)**: Anchor the range at address 0 (TB=1) or at the end
//! - **SEC bit (Sector/Block)**: Sector granularity, present on 3-bit parts only
//!   and never set by this crate
//! - **CMP bit (Complement)**: Invert the protected region
//! - **SRP0/SRP1 bits**: Lock the status register (pin, power-cycle, permanent)
//!
//! # Example
//!
//! ```ignore
//! use wbspi_core::wp::{self, LockdownMode, Protection, Region};
//!
//! // Protect the top 64 KiB until the next power cycle
//! let top = Region::new(handle.total_size() - 0x10000, 0x10000);
//! wp::set_protection(&mut bus, &handle, &top, false, LockdownMode::Preserve)?;
//! assert_eq!(wp::query_protection(&mut bus, &handle, &top)?, Protection::FullyProtected);
//!
//! // Remove protection again
//! wp::disable_protection(&mut bus, &handle, false)?;
//! ```

mod ops;
mod ranges;
mod types;

pub use ops::*;
pub use ranges::*;
pub use types::*;
