//! Flash chip types and table
//!
//! This module describes the supported Winbond parts and provides lookup by
//! JEDEC device ID or by name.

mod table;
mod types;

pub use table::*;
pub use types::*;
