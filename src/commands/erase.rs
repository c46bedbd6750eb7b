//! Erase command implementation

use indicatif::{ProgressBar, ProgressStyle};
use std::time::Duration;
use wbspi_core::flash::{self, FlashHandle};
use wbspi_core::programmer::SpiBus;

/// Run the erase command
///
/// Without `start`/`length` the whole chip is erased sector by sector.
pub fn cmd_erase(
    bus: &mut dyn SpiBus,
    handle: &FlashHandle,
    start: Option<u32>,
    length: Option<u32>,
) -> Result<(), Box<dyn std::error::Error>> {
    let (start, length) = match (start, length) {
        (Some(start), Some(length)) => (start, length),
        (None, None) => (0, handle.total_size()),
        _ => return Err("Both --start and --length must be specified for partial erase".into()),
    };

    if !handle.is_valid_range(start, length as usize) {
        return Err(format!(
            "Erase range 0x{:08X}..0x{:08X} is outside chip bounds (0x{:08X})",
            start,
            start as u64 + length as u64,
            handle.total_size()
        )
        .into());
    }

    let sector_size = handle.sector_size();
    if start % sector_size != 0 || length % sector_size != 0 {
        return Err(format!(
            "Erase range must be aligned to the sector size (0x{:X} bytes)",
            sector_size
        )
        .into());
    }

    let pb = ProgressBar::new_spinner();
    pb.set_style(
        ProgressStyle::default_spinner()
            .template("{spinner:.green} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner()),
    );
    pb.set_message(format!(
        "Erasing {} bytes at 0x{:08X}...",
        length, start
    ));
    pb.enable_steady_tick(Duration::from_millis(100));

    flash::erase(bus, handle, start, length)?;

    pb.finish_with_message(format!("Erased {} bytes starting at 0x{:08X}", length, start));
    Ok(())
}
