//! Block protection range codec
//!
//! Converts between the BP/TB/CMP status register fields and the protected
//! address range. Both directions use the same power-of-two rule:
//!
//! - BP=0 protects nothing, otherwise `granularity << (bp - 1)` bytes are
//!   protected, clamped to the chip size
//! - TB=1 anchors the range at address 0, TB=0 at the end of the chip
//! - CMP=1 swaps the protected and unprotected parts (and thus the anchor)

use crate::error::{Error, Result};

use super::types::{ProtectionState, Region};

/// Decode the protected region from BP/TB/CMP
///
/// `granularity_shift` is log2 of the smallest protectable unit. With CMP
/// set, BP=0 protects the whole chip.
pub fn bpbits_to_region(granularity_shift: u8, state: &ProtectionState, total_size: u32) -> Region {
    let protected = if state.bp == 0 {
        0
    } else {
        let size = 1u64 << (granularity_shift as u32 + state.bp as u32 - 1);
        core::cmp::min(size, total_size as u64) as u32
    };

    let (size, bottom) = if state.complement {
        (total_size - protected, !state.top_not_bottom)
    } else {
        (protected, state.top_not_bottom)
    };

    let offset = if bottom { 0 } else { total_size - size };
    Region::new(offset, size)
}

/// Encode a region as BP/TB/CMP
///
/// The region must start at 0 or end at `total_size`. Regions larger than
/// half the chip are expressed through CMP; what remains must be empty or a
/// power of two no smaller than the granularity, with a BP value that fits
/// in `max_bp`.
pub fn region_to_bpbits(
    granularity_shift: u8,
    max_bp: u8,
    region: &Region,
    total_size: u32,
) -> Result<ProtectionState> {
    if !region.touches_top_or_bottom(total_size) || region.end() > total_size {
        return Err(Error::NotTopOrBottom);
    }

    let mut top_not_bottom = region.offset == 0;
    let mut complement = false;
    let mut size = region.size;

    if size > total_size / 2 {
        complement = true;
        top_not_bottom = !top_not_bottom;
        size = total_size - size;
    }

    let bp = if size == 0 {
        0
    } else {
        let granularity = 1u32 << granularity_shift;
        if !size.is_power_of_two() || size < granularity {
            return Err(Error::UnsupportedRegionSize);
        }
        size.trailing_zeros() - granularity_shift as u32 + 1
    };

    if bp > max_bp as u32 {
        return Err(Error::UnsupportedRegionSize);
    }

    Ok(ProtectionState::new(bp as u8, top_not_bottom, complement))
}

/// List every distinct region the BP/TB/CMP fields can express
///
/// Sorted by size, then offset. The empty region is listed once.
#[cfg(feature = "alloc")]
pub fn available_regions(
    granularity_shift: u8,
    max_bp: u8,
    total_size: u32,
) -> alloc::vec::Vec<Region> {
    let mut regions = alloc::vec::Vec::new();

    for complement in [false, true] {
        for top_not_bottom in [false, true] {
            for bp in 0..=max_bp {
                let state = ProtectionState::new(bp, top_not_bottom, complement);
                let mut region = bpbits_to_region(granularity_shift, &state, total_size);
                if region.is_empty() {
                    region = Region::empty();
                }
                if !regions.contains(&region) {
                    regions.push(region);
                }
            }
        }
    }

    regions.sort_by_key(|r| (r.size, r.offset));
    regions
}

#[cfg(test)]
mod tests {
    use super::*;

    const MIB: u32 = 1024 * 1024;
    const KIB: u32 = 1024;

    #[test]
    fn test_no_protection() {
        for tb in [false, true] {
            let region = bpbits_to_region(16, &ProtectionState::new(0, tb, false), 4 * MIB);
            assert!(region.is_empty());
        }
    }

    #[test]
    fn test_top_protection() {
        let total = 16 * MIB;
        let region = bpbits_to_region(18, &ProtectionState::new(1, false, false), total);
        assert_eq!(region, Region::new(total - 256 * KIB, 256 * KIB));
    }

    #[test]
    fn test_bottom_protection() {
        let region = bpbits_to_region(16, &ProtectionState::new(3, true, false), 4 * MIB);
        assert_eq!(region, Region::new(0, 256 * KIB));
    }

    #[test]
    fn test_clamped_to_chip_size() {
        // 64K << 6 = 4M on a 2M part
        let region = bpbits_to_region(16, &ProtectionState::new(7, false, false), 2 * MIB);
        assert_eq!(region, Region::new(0, 2 * MIB));
    }

    #[test]
    fn test_large_bp_does_not_overflow() {
        let region = bpbits_to_region(18, &ProtectionState::new(15, true, false), 32 * MIB);
        assert_eq!(region, Region::new(0, 32 * MIB));
    }

    #[test]
    fn test_cmp_inverts_range() {
        let total = 4 * MIB;
        // BP=1, TB=1 alone protects the first 64K
        let region = bpbits_to_region(16, &ProtectionState::new(1, true, true), total);
        assert_eq!(region, Region::new(64 * KIB, total - 64 * KIB));

        let region = bpbits_to_region(16, &ProtectionState::new(1, false, true), total);
        assert_eq!(region, Region::new(0, total - 64 * KIB));
    }

    #[test]
    fn test_cmp_with_zero_bp_protects_everything() {
        let region = bpbits_to_region(16, &ProtectionState::new(0, false, true), 4 * MIB);
        assert_eq!(region, Region::new(0, 4 * MIB));
    }

    #[test]
    fn test_encode_top_block() {
        let total = 8 * MIB;
        let state = region_to_bpbits(17, 7, &Region::new(total - 128 * KIB, 128 * KIB), total).unwrap();
        assert_eq!(state, ProtectionState::new(1, false, false));
    }

    #[test]
    fn test_encode_bottom_half() {
        let total = 4 * MIB;
        let state = region_to_bpbits(16, 7, &Region::new(0, 2 * MIB), total).unwrap();
        assert_eq!(state, ProtectionState::new(6, true, false));
    }

    #[test]
    fn test_encode_uses_complement_above_half() {
        let total = 4 * MIB;
        let state = region_to_bpbits(16, 7, &Region::new(0, 3 * MIB), total).unwrap();
        // Complement of the top 1M
        assert_eq!(state, ProtectionState::new(5, false, true));
        assert_eq!(bpbits_to_region(16, &state, total), Region::new(0, 3 * MIB));
    }

    #[test]
    fn test_encode_whole_chip() {
        let total = 16 * MIB;
        let state = region_to_bpbits(18, 7, &Region::new(0, total), total).unwrap();
        assert_eq!(state, ProtectionState::new(0, false, true));
        assert_eq!(bpbits_to_region(18, &state, total), Region::new(0, total));
    }

    #[test]
    fn test_encode_empty() {
        let total = 4 * MIB;
        assert_eq!(
            region_to_bpbits(16, 7, &Region::new(0, 0), total),
            Ok(ProtectionState::new(0, true, false))
        );
        assert_eq!(
            region_to_bpbits(16, 7, &Region::new(total, 0), total),
            Ok(ProtectionState::new(0, false, false))
        );
    }

    #[test]
    fn test_encode_not_anchored() {
        assert_eq!(
            region_to_bpbits(16, 7, &Region::new(64 * KIB, 64 * KIB), 4 * MIB),
            Err(Error::NotTopOrBottom)
        );
    }

    #[test]
    fn test_encode_bad_sizes() {
        let total = 4 * MIB;
        // Not a power of two
        assert_eq!(
            region_to_bpbits(16, 7, &Region::new(0, 192 * KIB), total),
            Err(Error::UnsupportedRegionSize)
        );
        // Smaller than the granularity
        assert_eq!(
            region_to_bpbits(16, 7, &Region::new(0, 32 * KIB), total),
            Err(Error::UnsupportedRegionSize)
        );
        // Complement leaves a non power of two
        assert_eq!(
            region_to_bpbits(16, 7, &Region::new(0, total - 192 * KIB), total),
            Err(Error::UnsupportedRegionSize)
        );
    }

    #[test]
    fn test_encode_bp_overflow() {
        // 16M half of a 32M part needs bp=9 with 64K granularity
        let total = 32 * MIB;
        assert_eq!(
            region_to_bpbits(16, 7, &Region::new(0, 16 * MIB), total),
            Err(Error::UnsupportedRegionSize)
        );
        assert_eq!(
            region_to_bpbits(16, 15, &Region::new(0, 16 * MIB), total),
            Ok(ProtectionState::new(9, true, false))
        );
    }

    #[test]
    fn test_round_trip() {
        // (granularity shift, max bp, total size)
        let parts = [(16u8, 7u8, 2 * MIB), (17, 7, 8 * MIB), (18, 7, 16 * MIB), (16, 15, 32 * MIB)];

        for (shift, max_bp, total) in parts {
            let half = total as u64 / 2;
            for bp in 1..=max_bp {
                let size = 1u64 << (shift as u32 + bp as u32 - 1);
                for tb in [false, true] {
                    for cmp in [false, true] {
                        // Sizes at or above half (or equal to half with CMP)
                        // have more than one encoding
                        if size > half || (cmp && size == half) {
                            continue;
                        }
                        let state = ProtectionState::new(bp, tb, cmp);
                        let region = bpbits_to_region(shift, &state, total);
                        assert_eq!(
                            region_to_bpbits(shift, max_bp, &region, total),
                            Ok(state),
                            "shift={} total={:#x} region={}",
                            shift,
                            total,
                            region
                        );
                    }
                }
            }
        }
    }

    #[cfg(feature = "alloc")]
    #[test]
    fn test_available_regions() {
        let regions = available_regions(16, 7, 2 * MIB);
        assert_eq!(regions[0], Region::empty());
        assert!(regions.contains(&Region::new(0, 64 * KIB)));
        assert!(regions.contains(&Region::new(2 * MIB - 64 * KIB, 64 * KIB)));
        assert!(regions.contains(&Region::new(64 * KIB, 2 * MIB - 64 * KIB)));
        assert_eq!(regions.last(), Some(&Region::new(0, 2 * MIB)));
        for region in &regions {
            assert!(region.touches_top_or_bottom(2 * MIB));
        }
    }
}
