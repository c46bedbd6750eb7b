//! Write protection command implementations

use wbspi_core::flash::FlashHandle;
use wbspi_core::programmer::SpiBus;
use wbspi_core::wp::{self, LockdownMode, Region};

/// Format a range as a human-readable string with fraction of chip
fn format_range(range: &Region, total_size: u32) -> String {
    if range.is_empty() {
        return "none".to_string();
    }
    if range.size == total_size {
        return "all".to_string();
    }

    let fraction_str = if total_size % range.size == 0 {
        format!("1/{}", total_size / range.size)
    } else if total_size % (total_size - range.size) == 0 {
        let rest = total_size / (total_size - range.size);
        format!("{}/{}", rest - 1, rest)
    } else {
        format!("{:.1}%", range.size as f64 * 100.0 / total_size as f64)
    };

    let position = if range.offset == 0 {
        "lower"
    } else if range.end() == total_size {
        "upper"
    } else {
        "middle"
    };

    format!("{} {}", position, fraction_str)
}

/// Format a lock-down mode for display
fn format_mode(mode: LockdownMode) -> &'static str {
    match mode {
        LockdownMode::None | LockdownMode::Preserve => "disabled",
        LockdownMode::Pin => "hardware",
        LockdownMode::Reboot => "power_cycle",
        LockdownMode::Permanent => "permanent",
    }
}

/// Show current write protection status
pub fn cmd_status(bus: &mut dyn SpiBus, handle: &FlashHandle) -> Result<(), Box<dyn std::error::Error>> {
    let status = wp::read_protection(bus, handle)
        .map_err(|e| format!("Failed to read protection status: {}", e))?;
    let total_size = handle.total_size();

    println!(
        "Protection range: start=0x{:08x} length=0x{:08x} ({})",
        status.region.offset,
        status.region.size,
        format_range(&status.region, total_size)
    );
    println!(
        "Protection bits: BP={} TB={} CMP={}",
        status.state.bp,
        u8::from(status.state.top_not_bottom),
        u8::from(status.state.complement)
    );
    println!("Protection mode: {}", format_mode(status.mode));

    Ok(())
}

/// List available protection ranges
pub fn cmd_list(handle: &FlashHandle) -> Result<(), Box<dyn std::error::Error>> {
    let ranges = wp::protection_regions(handle)?;
    let total_size = handle.total_size();

    println!("Available protection ranges:");
    for range in &ranges {
        println!(
            "    start=0x{:08x} length=0x{:08x} ({})",
            range.offset,
            range.size,
            format_range(range, total_size)
        );
    }

    Ok(())
}

/// Protect a range and optionally lock the status register
pub fn cmd_set(
    bus: &mut dyn SpiBus,
    handle: &FlashHandle,
    start: u32,
    length: u32,
    temporary: bool,
    mode: LockdownMode,
) -> Result<(), Box<dyn std::error::Error>> {
    let region = Region::new(start, length);

    wp::set_protection(bus, handle, &region, !temporary, mode)
        .map_err(|e| format!("Failed to set protection range {}: {}", region, e))?;

    println!(
        "Protection range set to start=0x{:08x} length=0x{:08x} ({}){}.",
        region.offset,
        region.size,
        format_range(&region, handle.total_size()),
        if temporary { " (temporary)" } else { "" }
    );
    if mode == LockdownMode::Permanent {
        log::warn!("Status register is now permanently locked");
    }

    Ok(())
}

/// Disable write protection
pub fn cmd_disable(
    bus: &mut dyn SpiBus,
    handle: &FlashHandle,
    temporary: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    wp::disable_protection(bus, handle, !temporary)
        .map_err(|e| format!("Failed to disable write protection: {}", e))?;

    println!(
        "Write protection disabled{}.",
        if temporary { " (temporary)" } else { "" }
    );

    Ok(())
}
