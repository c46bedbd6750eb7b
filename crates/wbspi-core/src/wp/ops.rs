//! Write protection operations
//!
//! This module reads, decodes and updates the block protection bits of a
//! probed chip. Every call reads the hardware fresh; nothing is cached in the
//! [`FlashHandle`].

use super::ranges::{bpbits_to_region, region_to_bpbits};
use super::types::{
    BpLayout, LockdownMode, Protection, ProtectionStatus, Region, StatusRegs, StatusUpdate,
};
use crate::error::{Error, Result};
use crate::flash::FlashHandle;
use crate::programmer::SpiBus;
use crate::protocol;

/// Block protect layout of a chip, or [`Error::Unsupported`]
pub fn protection_layout(handle: &FlashHandle) -> Result<BpLayout> {
    handle
        .chip
        .bp_width()
        .map(BpLayout::from_width)
        .ok_or(Error::Unsupported)
}

/// Read status registers 1 and 2 into one image
pub fn read_status_regs<B: SpiBus + ?Sized>(bus: &mut B) -> Result<StatusRegs> {
    let (sr1, sr2) = protocol::read_status12(bus)?;
    Ok(StatusRegs::from_bytes(sr1, sr2))
}

/// Update selected bits of status registers 1 and 2
///
/// Only bits set in `update.mask` are changed. If the registers already hold
/// the requested bits nothing is written. Otherwise the registers are written
/// with the legacy two-byte WRSR, either permanently (after WREN, then
/// waiting up to tW) or volatile (after EWSR, then waiting tSHSL), and read
/// back.
///
/// Returns [`Error::RegisterLocked`] if the read-back does not match, which
/// happens when SRP0/SRP1 lock the register or WP# is asserted.
pub fn write_status_masked<B: SpiBus + ?Sized>(
    bus: &mut B,
    update: StatusUpdate,
    non_volatile: bool,
) -> Result<()> {
    let current = read_status_regs(bus)?;
    if current.matches(update.mask, update.value) {
        log::trace!("WINBOND: SREG already up to date");
        return Ok(());
    }

    if non_volatile {
        protocol::write_enable(bus)?;
    } else {
        protocol::volatile_write_enable(bus)?;
    }

    let (sr1, sr2) = current.merge(update.mask, update.value).to_bytes();
    protocol::write_status12(bus, sr1, sr2)?;

    if non_volatile {
        bus.wait_ready(protocol::STATUS_WRITE_TIMEOUT_MS)?;
    } else {
        bus.delay_us(protocol::VOLATILE_WRITE_DELAY_US);
    }

    let readback = read_status_regs(bus)?;
    let (sr1, sr2) = readback.to_bytes();
    log::debug!("WINBOND: SREG={:02x} SREG2={:02x}", sr1, sr2);

    if !readback.matches(update.mask, update.value) {
        log::error!("WINBOND: SREG is locked!");
        return Err(Error::RegisterLocked);
    }

    Ok(())
}

/// Read and decode the current protection settings
pub fn read_protection<B: SpiBus + ?Sized>(
    bus: &mut B,
    handle: &FlashHandle,
) -> Result<ProtectionStatus> {
    let layout = protection_layout(handle)?;

    let sr1 = protocol::read_register(bus, handle.status_opcode())?;
    let fields = layout.unpack(sr1 as u16);
    if fields.sec {
        log::warn!("WINBOND: sector protection (SEC) is not supported");
        return Err(Error::UnsupportedConfiguration);
    }

    let sr2 = protocol::read_status2(bus)?;
    let fields = layout.unpack(StatusRegs::from_bytes(sr1, sr2).0);
    let region = bpbits_to_region(
        handle.chip.protection_granularity_shift,
        &fields.state,
        handle.total_size(),
    );

    Ok(ProtectionStatus {
        state: fields.state,
        region,
        mode: LockdownMode::from_srp(fields.srp),
    })
}

/// Check how much of `region` is covered by the hardware protection
///
/// Returns [`Protection::NotProtected`] when nothing is protected,
/// [`Protection::FullyProtected`] when the protected range contains
/// `region` and [`Protection::PartiallyProtected`] otherwise.
pub fn query_protection<B: SpiBus + ?Sized>(
    bus: &mut B,
    handle: &FlashHandle,
    region: &Region,
) -> Result<Protection> {
    let status = read_protection(bus, handle)?;
    let wp_region = status.region;

    if wp_region.is_empty() {
        log::debug!("WINBOND: flash isn't protected");
        return Ok(Protection::NotProtected);
    }

    log::debug!(
        "WINBOND: flash protected range 0x{:08x}-0x{:08x}",
        wp_region.offset,
        wp_region.end()
    );

    if wp_region.contains(region) {
        Ok(Protection::FullyProtected)
    } else {
        Ok(Protection::PartiallyProtected)
    }
}

/// Build the status register update that protects `region`
///
/// Performs every validation [`set_protection`] does, without bus I/O.
pub fn protection_update(
    handle: &FlashHandle,
    region: &Region,
    mode: LockdownMode,
) -> Result<StatusUpdate> {
    let total_size = handle.total_size();
    if !region.touches_top_or_bottom(total_size) {
        return Err(Error::NotTopOrBottom);
    }

    let layout = protection_layout(handle)?;
    let state = region_to_bpbits(
        handle.chip.protection_granularity_shift,
        layout.width().max_bp(),
        region,
        total_size,
    )
    .inspect_err(|e| {
        if *e == Error::UnsupportedRegionSize {
            log::error!("WINBOND: ERROR: unsupported region size");
        }
    })?;

    log::trace!(
        "WINBOND: bp={} tb={} cmp={} for {}",
        state.bp,
        state.top_not_bottom as u8,
        state.complement as u8,
        region
    );

    Ok(layout.pack(&state, mode))
}

/// Protect a region anchored at the bottom or top of the flash
///
/// `non_volatile` selects whether the setting survives a power cycle.
/// Unless `mode` is [`LockdownMode::Preserve`] the status register lockdown
/// bits are written in the same transaction. Invalid regions are rejected
/// before anything is sent on the bus.
pub fn set_protection<B: SpiBus + ?Sized>(
    bus: &mut B,
    handle: &FlashHandle,
    region: &Region,
    non_volatile: bool,
    mode: LockdownMode,
) -> Result<()> {
    let update = protection_update(handle, region, mode)?;
    write_status_masked(bus, update, non_volatile)?;

    log::debug!(
        "WINBOND: write-protection set to range 0x{:08x}-0x{:08x}",
        region.offset,
        region.end()
    );

    Ok(())
}

/// Remove all block protection
///
/// Equivalent to protecting an empty region at the bottom of the flash with
/// the lockdown bits left untouched.
pub fn disable_protection<B: SpiBus + ?Sized>(
    bus: &mut B,
    handle: &FlashHandle,
    non_volatile: bool,
) -> Result<()> {
    set_protection(bus, handle, &Region::empty(), non_volatile, LockdownMode::Preserve)
}

/// List every region the chip can protect
#[cfg(feature = "alloc")]
pub fn protection_regions(handle: &FlashHandle) -> Result<alloc::vec::Vec<Region>> {
    let layout = protection_layout(handle)?;
    Ok(super::ranges::available_regions(
        handle.chip.protection_granularity_shift,
        layout.width().max_bp(),
        handle.total_size(),
    ))
}
