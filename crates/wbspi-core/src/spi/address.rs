//! Addressed command headers

/// Length of an opcode plus 3-byte address header
pub const ADDRESS_HEADER_LEN: usize = 4;

/// Build an opcode + 3-byte big-endian address header
///
/// Only the low 24 bits of `addr` are sent; this chip family has no
/// 4-byte addressing.
pub const fn address_header(opcode: u8, addr: u32) -> [u8; ADDRESS_HEADER_LEN] {
    [opcode, (addr >> 16) as u8, (addr >> 8) as u8, addr as u8]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_address_is_big_endian() {
        assert_eq!(address_header(0x02, 0x12_3456), [0x02, 0x12, 0x34, 0x56]);
        assert_eq!(address_header(0x20, 0x100), [0x20, 0x00, 0x01, 0x00]);
    }

    #[test]
    fn test_address_drops_high_byte() {
        assert_eq!(address_header(0x03, 0xAB00_0001), [0x03, 0x00, 0x00, 0x01]);
    }
}
