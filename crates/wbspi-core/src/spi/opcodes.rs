//! Winbond SPI flash opcodes
//!
//! The W25P/W25X/W25Q parts share the classic JEDEC command set. Only the
//! commands this driver issues are listed here.

// ============================================================================
// Write control
// ============================================================================

/// Write Enable - required before any program/erase/status write
pub const WREN: u8 = 0x06;
/// Write Disable - clears WEL bit in status register
pub const WRDI: u8 = 0x04;
/// Write Enable for Volatile Status Register
pub const EWSR: u8 = 0x50;

// ============================================================================
// Status register operations
// ============================================================================

/// Read Status Register 1
pub const RDSR: u8 = 0x05;
/// Read Status Register 2
pub const RDSR2: u8 = 0x35;
/// Write Status Register (1 byte: SR1, 2 bytes: SR1 and SR2)
pub const WRSR: u8 = 0x01;

// ============================================================================
// Identification
// ============================================================================

/// Read JEDEC ID (manufacturer + device ID)
pub const RDID: u8 = 0x9F;

// ============================================================================
// Read / program / erase
// ============================================================================

/// Read Data
pub const READ: u8 = 0x03;
/// Fast Read (one dummy byte after the address)
pub const FAST_READ: u8 = 0x0B;
/// Page Program
pub const PP: u8 = 0x02;
/// Sector Erase 4KB
pub const SE_20: u8 = 0x20;

// ============================================================================
// Status register bit definitions
// ============================================================================

/// Status Register 1: Write In Progress / Busy
pub const SR1_WIP: u8 = 0x01;
/// Status Register 1: Write Enable Latch
pub const SR1_WEL: u8 = 0x02;
/// Status Register 1: Status Register Protect 0
pub const SR1_SRP0: u8 = 0x80;

/// Status Register 2: Status Register Protect 1
pub const SR2_SRP1: u8 = 0x01;
/// Status Register 2: Quad Enable
pub const SR2_QE: u8 = 0x02;
/// Status Register 2: Complement Protect
pub const SR2_CMP: u8 = 0x40;
/// Status Register 2: Suspend Status
pub const SR2_SUS: u8 = 0x80;
