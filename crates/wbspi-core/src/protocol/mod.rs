//! Protocol implementations
//!
//! This module contains the command sequences used by the Winbond family.

pub mod winbond;

pub use winbond::*;
