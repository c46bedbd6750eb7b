//! Write protection types and structures
//!
//! This module provides the status register model used by the protection
//! engine: the combined 16-bit register image, the two Block Protect field
//! layouts and the decoded protection state.

use bitflags::bitflags;

use crate::chip::BpWidth;

/// Write protection lockdown mode
///
/// Controls whether the status register itself can be modified, through
/// the SRP0 (status register 1) and SRP1 (status register 2) bits.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LockdownMode {
    /// Status register can be freely modified
    None,
    /// Leave the SRP bits untouched
    #[default]
    Preserve,
    /// Status register is locked while the WP# pin is asserted
    Pin,
    /// Status register is locked until the next power cycle
    Reboot,
    /// Status register is locked forever (OTP)
    Permanent,
}

impl LockdownMode {
    /// 2-bit SRP code (`srp1 << 1 | srp0`), `None` for [`LockdownMode::Preserve`]
    pub const fn srp(self) -> Option<u8> {
        match self {
            Self::None => Some(0),
            Self::Pin => Some(1),
            Self::Reboot => Some(2),
            Self::Permanent => Some(3),
            Self::Preserve => None,
        }
    }

    /// Decode the mode from a 2-bit SRP code
    pub const fn from_srp(srp: u8) -> Self {
        match srp & 0b11 {
            0 => Self::None,
            1 => Self::Pin,
            2 => Self::Reboot,
            _ => Self::Permanent,
        }
    }
}

impl core::fmt::Display for LockdownMode {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::None => write!(f, "none"),
            Self::Preserve => write!(f, "preserve"),
            Self::Pin => write!(f, "pin"),
            Self::Reboot => write!(f, "reboot"),
            Self::Permanent => write!(f, "permanent"),
        }
    }
}

/// A byte range in the flash, `[offset, offset + size)`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Region {
    /// Start address
    pub offset: u32,
    /// Length in bytes
    pub size: u32,
}

impl Region {
    /// Create a new region
    pub const fn new(offset: u32, size: u32) -> Self {
        Self { offset, size }
    }

    /// Create an empty region
    pub const fn empty() -> Self {
        Self { offset: 0, size: 0 }
    }

    /// Get the end address (exclusive)
    pub const fn end(&self) -> u32 {
        self.offset.saturating_add(self.size)
    }

    /// Check if the region covers no bytes
    pub const fn is_empty(&self) -> bool {
        self.size == 0
    }

    /// Check if `other` lies entirely within this region
    pub const fn contains(&self, other: &Region) -> bool {
        other.offset >= self.offset && other.end() <= self.end()
    }

    /// Check if the region starts at address 0 or ends at `total_size`
    pub const fn touches_top_or_bottom(&self, total_size: u32) -> bool {
        self.offset == 0 || self.end() == total_size
    }
}

impl core::fmt::Display for Region {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        if self.size == 0 {
            write!(f, "none")
        } else {
            write!(
                f,
                "0x{:08x}-0x{:08x} ({} bytes)",
                self.offset,
                self.end(),
                self.size
            )
        }
    }
}

/// Block protection settings as stored in the status registers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ProtectionState {
    /// Block Protect value
    pub bp: u8,
    /// TB bit: protection is anchored at address 0
    pub top_not_bottom: bool,
    /// CMP bit: protected and unprotected parts are swapped
    pub complement: bool,
}

impl ProtectionState {
    /// Create a new protection state
    pub const fn new(bp: u8, top_not_bottom: bool, complement: bool) -> Self {
        Self {
            bp,
            top_not_bottom,
            complement,
        }
    }
}

/// Result of comparing a region against the hardware protection
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Protection {
    /// Nothing in the flash is protected
    NotProtected,
    /// Some protection is active but it does not cover the whole region
    PartiallyProtected,
    /// The whole region is protected
    FullyProtected,
}

/// Decoded protection status of a chip
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProtectionStatus {
    /// Raw BP/TB/CMP values
    pub state: ProtectionState,
    /// Protected region
    pub region: Region,
    /// Status register lockdown mode
    pub mode: LockdownMode,
}

bitflags! {
    /// Fixed-position bits of the combined status register image
    ///
    /// Bits 0-7 are status register 1, bits 8-15 status register 2. The BP,
    /// TB and SEC positions depend on the part and live in [`BpLayout`].
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct StatusFlags: u16 {
        /// Erase or program in progress
        const BUSY = 1 << 0;
        /// Write enable latch
        const WEL  = 1 << 1;
        /// Status register protect 0
        const SRP0 = 1 << 7;
        /// Status register protect 1
        const SRP1 = 1 << 8;
        /// Quad enable
        const QE   = 1 << 9;
        /// Complement protect
        const CMP  = 1 << 14;
        /// Erase/program suspended
        const SUS  = 1 << 15;
    }
}

/// Status registers 1 and 2 viewed as one 16-bit value
///
/// `sreg = reg1 | reg2 << 8`, independent of host byte order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct StatusRegs(pub u16);

impl StatusRegs {
    /// Combine the two register bytes
    pub const fn from_bytes(reg1: u8, reg2: u8) -> Self {
        Self(reg1 as u16 | (reg2 as u16) << 8)
    }

    /// Split into `(reg1, reg2)`
    pub const fn to_bytes(self) -> (u8, u8) {
        (self.0 as u8, (self.0 >> 8) as u8)
    }

    /// Fixed-position flags that are set
    pub const fn flags(self) -> StatusFlags {
        StatusFlags::from_bits_truncate(self.0)
    }

    /// Replace the bits selected by `mask` with those of `value`
    pub const fn merge(self, mask: u16, value: u16) -> Self {
        Self((self.0 & !mask) | (value & mask))
    }

    /// Check if the bits selected by `mask` already equal those of `value`
    pub const fn matches(self, mask: u16, value: u16) -> bool {
        self.0 & mask == value & mask
    }
}

/// Protection fields unpacked from a status register image
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct BpFields {
    /// BP, TB and CMP
    pub state: ProtectionState,
    /// SEC bit (always false on the 4-bit layout)
    pub sec: bool,
    /// 2-bit SRP code
    pub srp: u8,
}

/// A `(mask, value)` pair over the combined status register image
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct StatusUpdate {
    /// Bits to modify
    pub mask: u16,
    /// New values of the bits in `mask`
    pub value: u16,
}

/// Layout of status register 1 protection bits
///
/// - `ThreeBit`: `busy[0] wel[1] bp[2:4] tb[5] sec[6] srp0[7]`
/// - `FourBit`: `busy[0] wel[1] bp[2:5] tb[6] srp0[7]`
///
/// Status register 2 is the same for both:
/// `srp1[0] qe[1] res[2] lb[3:5] cmp[6] sus[7]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BpLayout {
    /// BP0-BP2, TB and SEC
    ThreeBit,
    /// BP0-BP3 and TB
    FourBit,
}

const BP_SHIFT: u32 = 2;

impl BpLayout {
    /// Layout for a BP field width
    pub const fn from_width(width: BpWidth) -> Self {
        match width {
            BpWidth::Three => Self::ThreeBit,
            BpWidth::Four => Self::FourBit,
        }
    }

    /// Field width
    pub const fn width(self) -> BpWidth {
        match self {
            Self::ThreeBit => BpWidth::Three,
            Self::FourBit => BpWidth::Four,
        }
    }

    /// Mask of the BP field in the 16-bit image
    pub const fn bp_mask(self) -> u16 {
        (self.width().max_bp() as u16) << BP_SHIFT
    }

    /// TB bit in the 16-bit image
    pub const fn tb_bit(self) -> u16 {
        match self {
            Self::ThreeBit => 1 << 5,
            Self::FourBit => 1 << 6,
        }
    }

    /// SEC bit in the 16-bit image, if the layout has one
    pub const fn sec_bit(self) -> Option<u16> {
        match self {
            Self::ThreeBit => Some(1 << 6),
            Self::FourBit => None,
        }
    }

    /// Extract the protection fields from a register image
    pub fn unpack(self, sreg: u16) -> BpFields {
        let flags = StatusFlags::from_bits_truncate(sreg);
        let srp = u8::from(flags.contains(StatusFlags::SRP0))
            | u8::from(flags.contains(StatusFlags::SRP1)) << 1;

        BpFields {
            state: ProtectionState {
                bp: ((sreg & self.bp_mask()) >> BP_SHIFT) as u8,
                top_not_bottom: sreg & self.tb_bit() != 0,
                complement: flags.contains(StatusFlags::CMP),
            },
            sec: self.sec_bit().is_some_and(|bit| sreg & bit != 0),
            srp,
        }
    }

    /// Build the register update for a protection state and lockdown mode
    ///
    /// The update covers BP, TB, CMP, SEC (forced to 0 where present) and,
    /// unless `mode` is [`LockdownMode::Preserve`], SRP0/SRP1. `state.bp`
    /// must fit the field.
    pub fn pack(self, state: &ProtectionState, mode: LockdownMode) -> StatusUpdate {
        let mut mask = self.bp_mask() | self.tb_bit() | StatusFlags::CMP.bits();
        let mut value = ((state.bp as u16) << BP_SHIFT) & self.bp_mask();

        if state.top_not_bottom {
            value |= self.tb_bit();
        }
        if state.complement {
            value |= StatusFlags::CMP.bits();
        }
        if let Some(sec) = self.sec_bit() {
            mask |= sec;
        }

        if let Some(srp) = mode.srp() {
            mask |= (StatusFlags::SRP0 | StatusFlags::SRP1).bits();
            if srp & 1 != 0 {
                value |= StatusFlags::SRP0.bits();
            }
            if srp & 2 != 0 {
                value |= StatusFlags::SRP1.bits();
            }
        }

        StatusUpdate { mask, value }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_regs_marshal() {
        let regs = StatusRegs::from_bytes(0x9C, 0x41);
        assert_eq!(regs.0, 0x419C);
        assert_eq!(regs.to_bytes(), (0x9C, 0x41));
        assert!(regs.flags().contains(StatusFlags::SRP0 | StatusFlags::SRP1 | StatusFlags::CMP));
        assert!(!regs.flags().contains(StatusFlags::BUSY));
    }

    #[test]
    fn test_status_regs_merge() {
        let regs = StatusRegs::from_bytes(0xFF, 0x00);
        let merged = regs.merge(0x00FC, 0x0004);
        assert_eq!(merged.to_bytes(), (0x07, 0x00));
        assert!(merged.matches(0x00FC, 0x0004));
        assert!(!regs.matches(0x00FC, 0x0004));
    }

    #[test]
    fn test_three_bit_unpack() {
        // bp=5, tb=1, sec=0, srp0=1 / srp1=0, cmp=1
        let sreg = StatusRegs::from_bytes(0b1011_0100, 0b0100_0000).0;
        let fields = BpLayout::ThreeBit.unpack(sreg);
        assert_eq!(fields.state, ProtectionState::new(5, true, true));
        assert!(!fields.sec);
        assert_eq!(fields.srp, 1);
    }

    #[test]
    fn test_three_bit_sec() {
        let fields = BpLayout::ThreeBit.unpack(0x0040);
        assert!(fields.sec);
        assert!(!fields.state.top_not_bottom);
        // Same bit is TB on the 4-bit layout
        let fields = BpLayout::FourBit.unpack(0x0040);
        assert!(!fields.sec);
        assert!(fields.state.top_not_bottom);
    }

    #[test]
    fn test_four_bit_unpack() {
        // bp=0b1011, tb=1, srp1=1
        let sreg = StatusRegs::from_bytes(0b0110_1100, 0b0000_0001).0;
        let fields = BpLayout::FourBit.unpack(sreg);
        assert_eq!(fields.state, ProtectionState::new(0b1011, true, false));
        assert_eq!(fields.srp, 2);
    }

    #[test]
    fn test_three_bit_pack() {
        let update = BpLayout::ThreeBit.pack(&ProtectionState::new(3, true, false), LockdownMode::Preserve);
        assert_eq!(update.mask, 0x407C);
        assert_eq!(update.value, 0x002C);
    }

    #[test]
    fn test_four_bit_pack_with_lock() {
        let update = BpLayout::FourBit.pack(&ProtectionState::new(9, false, true), LockdownMode::Permanent);
        // BP[2:5] | TB[6] | SRP0[7] in reg1, SRP1[0] | CMP[6] in reg2
        assert_eq!(update.mask, 0x41FC);
        assert_eq!(update.value, 0x41A4);
    }

    #[test]
    fn test_pack_unpack_agree() {
        for layout in [BpLayout::ThreeBit, BpLayout::FourBit] {
            for bp in 0..=layout.width().max_bp() {
                for (tb, cmp) in [(false, false), (false, true), (true, false), (true, true)] {
                    let state = ProtectionState::new(bp, tb, cmp);
                    let update = layout.pack(&state, LockdownMode::Reboot);
                    let fields = layout.unpack(update.value);
                    assert_eq!(fields.state, state);
                    assert!(!fields.sec);
                    assert_eq!(LockdownMode::from_srp(fields.srp), LockdownMode::Reboot);
                }
            }
        }
    }

    #[test]
    fn test_lockdown_srp_codes() {
        assert_eq!(LockdownMode::None.srp(), Some(0));
        assert_eq!(LockdownMode::Pin.srp(), Some(1));
        assert_eq!(LockdownMode::Reboot.srp(), Some(2));
        assert_eq!(LockdownMode::Permanent.srp(), Some(3));
        assert_eq!(LockdownMode::Preserve.srp(), None);
        for srp in 0..4 {
            assert_eq!(LockdownMode::from_srp(srp).srp(), Some(srp));
        }
    }

    #[test]
    fn test_region_helpers() {
        let region = Region::new(0x1000, 0x1000);
        assert_eq!(region.end(), 0x2000);
        assert!(region.contains(&Region::new(0x1800, 0x100)));
        assert!(region.contains(&Region::new(0x1000, 0x1000)));
        assert!(!region.contains(&Region::new(0x0800, 0x1000)));
        assert!(region.touches_top_or_bottom(0x2000));
        assert!(!region.touches_top_or_bottom(0x4000));
        assert!(Region::new(0, 0x10).touches_top_or_bottom(0x4000));
    }
}
