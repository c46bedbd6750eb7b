//! Static chip table and lookup

use super::types::ChipDescriptor;

/// All supported parts, looked up by device ID (first match wins)
///
/// IDs must be unique.
pub static CHIPS: &[ChipDescriptor] = &[
    ChipDescriptor::new(0x2014, "W25P80", 8, 4, 4, 4),
    ChipDescriptor::new(0x2015, "W25P16", 8, 4, 4, 5),
    ChipDescriptor::new(0x2016, "W25P32", 8, 4, 4, 6),
    ChipDescriptor::new(0x3014, "W25X80", 8, 4, 4, 4),
    ChipDescriptor::new(0x3015, "W25X16", 8, 4, 4, 5),
    ChipDescriptor::new(0x3016, "W25X32", 8, 4, 4, 6),
    ChipDescriptor::new(0x3017, "W25X64", 8, 4, 4, 7),
    ChipDescriptor::new(0x4014, "W25Q80_V", 8, 4, 4, 4),
    ChipDescriptor::new(0x4015, "W25Q16_V", 8, 4, 4, 5).with_protection(16, 3),
    ChipDescriptor::new(0x6015, "W25Q16DW", 8, 4, 4, 5).with_protection(16, 3),
    ChipDescriptor::new(0x4016, "W25Q32_V", 8, 4, 4, 6).with_protection(16, 3),
    ChipDescriptor::new(0x6016, "W25Q32DW", 8, 4, 4, 6).with_protection(16, 3),
    ChipDescriptor::new(0x4017, "W25Q64_V", 8, 4, 4, 7).with_protection(17, 3),
    ChipDescriptor::new(0x6017, "W25Q64DW", 8, 4, 4, 7).with_protection(17, 3),
    ChipDescriptor::new(0x4018, "W25Q128_V", 8, 4, 4, 8).with_protection(18, 3),
    ChipDescriptor::new(0x6018, "W25Q128FW", 8, 4, 4, 8).with_protection(18, 3),
    ChipDescriptor::new(0x7018, "W25Q128J", 8, 4, 4, 8).with_protection(18, 3),
    ChipDescriptor::new(0x4019, "W25Q256_V", 8, 4, 4, 9).with_protection(16, 4),
    ChipDescriptor::new(0x7019, "W25Q256J", 8, 4, 4, 9).with_protection(16, 4),
];

/// Find a chip by its 16-bit device ID
pub fn find_chip(id: u16) -> Option<&'static ChipDescriptor> {
    CHIPS.iter().find(|chip| chip.id == id)
}

/// Find a chip by name (case-insensitive)
pub fn find_chip_by_name(name: &str) -> Option<&'static ChipDescriptor> {
    CHIPS.iter().find(|chip| chip.name.eq_ignore_ascii_case(name))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chip::BpWidth;

    #[test]
    fn test_ids_are_unique() {
        for (i, a) in CHIPS.iter().enumerate() {
            for b in &CHIPS[i + 1..] {
                assert_ne!(a.id, b.id, "{} and {} share an ID", a.name, b.name);
            }
        }
    }

    #[test]
    fn test_geometry_invariants() {
        for chip in CHIPS {
            assert_eq!(chip.page_size(), 256, "{}", chip.name);
            assert_eq!(chip.sector_size(), 4096, "{}", chip.name);
            assert_eq!(chip.block_size(), 64 * 1024, "{}", chip.name);
            assert_eq!(
                chip.total_size(),
                chip.sector_size() << (chip.sectors_per_block_shift + chip.blocks_shift)
            );
            if chip.bp_width().is_some() {
                assert!(chip.protection_granularity() <= chip.total_size());
            }
        }
    }

    #[test]
    fn test_find_w25q128() {
        let chip = find_chip(0x4018).unwrap();
        assert_eq!(chip.name, "W25Q128_V");
        assert_eq!(chip.total_size(), 16 * 1024 * 1024);
        assert_eq!(chip.protection_granularity(), 256 * 1024);
        assert_eq!(chip.bp_width(), Some(BpWidth::Three));
    }

    #[test]
    fn test_find_w25q256_has_four_bp_bits() {
        let chip = find_chip(0x7019).unwrap();
        assert_eq!(chip.total_size(), 32 * 1024 * 1024);
        assert_eq!(chip.bp_width(), Some(BpWidth::Four));
        assert_eq!(chip.bp_width().unwrap().max_bp(), 15);
    }

    #[test]
    fn test_legacy_parts_have_no_protection() {
        let chip = find_chip(0x3017).unwrap();
        assert_eq!(chip.name, "W25X64");
        assert_eq!(chip.bp_width(), None);
    }

    #[test]
    fn test_unknown_id() {
        assert!(find_chip(0xFFFF).is_none());
        assert!(find_chip(0x0000).is_none());
    }

    #[test]
    fn test_find_by_name() {
        assert_eq!(find_chip_by_name("w25q64dw").unwrap().id, 0x6017);
        assert!(find_chip_by_name("MX25L6405").is_none());
    }
}
