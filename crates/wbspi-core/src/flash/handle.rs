//! Flash handle - probed identity and geometry of a chip

use crate::chip::{find_chip, ChipDescriptor};
use crate::error::{Error, Result};
use crate::programmer::SpiBus;
use crate::protocol;
use crate::spi::opcodes;

/// Handle for a probed flash chip
///
/// Created once by [`probe`] and immutable afterwards. The handle only
/// describes the chip; every operation borrows the bus separately.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FlashHandle {
    /// The identified flash chip
    pub chip: &'static ChipDescriptor,
    page_size: u32,
    sector_size: u32,
    total_size: u32,
    erase_opcode: u8,
    status_opcode: u8,
    program_opcode: u8,
}

impl FlashHandle {
    /// Create a handle for the given chip
    pub fn new(chip: &'static ChipDescriptor) -> Self {
        Self {
            chip,
            page_size: chip.page_size(),
            sector_size: chip.sector_size(),
            total_size: chip.total_size(),
            erase_opcode: opcodes::SE_20,
            status_opcode: opcodes::RDSR,
            program_opcode: opcodes::PP,
        }
    }

    /// Chip name
    pub fn name(&self) -> &'static str {
        self.chip.name
    }

    /// Page size in bytes
    pub fn page_size(&self) -> u32 {
        self.page_size
    }

    /// Sector (erase unit) size in bytes
    pub fn sector_size(&self) -> u32 {
        self.sector_size
    }

    /// Total flash size in bytes
    pub fn total_size(&self) -> u32 {
        self.total_size
    }

    /// Opcode used for erase
    pub fn erase_opcode(&self) -> u8 {
        self.erase_opcode
    }

    /// Opcode used to read the status register
    pub fn status_opcode(&self) -> u8 {
        self.status_opcode
    }

    /// Opcode used to program a page
    pub fn program_opcode(&self) -> u8 {
        self.program_opcode
    }

    /// Check if an address range is valid for this chip
    pub fn is_valid_range(&self, addr: u32, len: usize) -> bool {
        addr as u64 + len as u64 <= self.total_size as u64
    }
}

/// Identify a chip from its 3-byte JEDEC ID response
///
/// Only the device ID (bytes 1 and 2) is matched; the manufacturer byte has
/// already been dispatched on by the caller. No bus I/O is performed.
pub fn probe(idcode: &[u8; 3]) -> Result<FlashHandle> {
    let id = u16::from_be_bytes([idcode[1], idcode[2]]);

    let chip = find_chip(id).ok_or_else(|| {
        log::warn!(
            "SF: Unsupported Winbond ID {:02x}{:02x}",
            idcode[1],
            idcode[2]
        );
        Error::UnsupportedDevice(id)
    })?;

    log::debug!("SF: Detected {} with {} bytes", chip.name, chip.total_size());
    Ok(FlashHandle::new(chip))
}

/// Read the JEDEC ID over the bus and identify the chip
pub fn probe_spi<B: SpiBus + ?Sized>(bus: &mut B) -> Result<FlashHandle> {
    let idcode = protocol::read_jedec_id(bus)?;
    probe(&idcode)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_probe_w25q64() {
        let handle = probe(&[0xEF, 0x40, 0x17]).unwrap();
        assert_eq!(handle.name(), "W25Q64_V");
        assert_eq!(handle.page_size(), 256);
        assert_eq!(handle.sector_size(), 4096);
        assert_eq!(handle.total_size(), 8 * 1024 * 1024);
        assert_eq!(handle.erase_opcode(), 0x20);
        assert_eq!(handle.status_opcode(), 0x05);
        assert_eq!(handle.program_opcode(), 0x02);
    }

    #[test]
    fn test_probe_ignores_manufacturer_byte() {
        let a = probe(&[0xEF, 0x30, 0x15]).unwrap();
        let b = probe(&[0x00, 0x30, 0x15]).unwrap();
        assert_eq!(a, b);
        assert_eq!(a.name(), "W25X16");
    }

    #[test]
    fn test_probe_unknown() {
        assert_eq!(
            probe(&[0xEF, 0x12, 0x34]),
            Err(Error::UnsupportedDevice(0x1234))
        );
    }

    #[test]
    fn test_valid_range() {
        let handle = probe(&[0xEF, 0x40, 0x14]).unwrap();
        let size = handle.total_size();
        assert!(handle.is_valid_range(0, size as usize));
        assert!(handle.is_valid_range(size, 0));
        assert!(!handle.is_valid_range(size - 1, 2));
        assert!(!handle.is_valid_range(u32::MAX, 1));
    }
}
