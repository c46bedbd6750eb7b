//! Flash operations
//!
//! This module provides chip probing and the high-level read, write and
//! erase operations.

mod handle;
mod operations;

pub use handle::*;
pub use operations::*;
