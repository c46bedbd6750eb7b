//! Probe and info command implementations

use super::format_size;
use wbspi_core::chip::WINBOND_MANUFACTURER;
use wbspi_core::flash::FlashHandle;
use wbspi_core::programmer::SpiBus;
use wbspi_core::wp;

/// Print the identified chip
pub fn cmd_probe(handle: &FlashHandle) -> Result<(), Box<dyn std::error::Error>> {
    println!("Found flash chip:");
    println!("  Name:     {}", handle.name());
    println!(
        "  Size:     {} bytes ({} KiB)",
        handle.total_size(),
        handle.total_size() / 1024
    );
    println!(
        "  JEDEC ID: {:02X} {:04X}",
        WINBOND_MANUFACTURER, handle.chip.id
    );
    Ok(())
}

/// Print geometry, opcodes and protection status of the chip
pub fn cmd_info(bus: &mut dyn SpiBus, handle: &FlashHandle) -> Result<(), Box<dyn std::error::Error>> {
    let chip = handle.chip;

    println!("Flash Chip Information");
    println!("======================");
    println!();
    println!("Name:            {}", handle.name());
    println!("JEDEC ID:        {:02X} {:04X}", WINBOND_MANUFACTURER, chip.id);
    println!(
        "Size:            {} bytes ({})",
        handle.total_size(),
        format_size(handle.total_size())
    );
    println!("Page size:       {} bytes", handle.page_size());
    println!("Sector size:     {}", format_size(handle.sector_size()));
    println!("Block size:      {}", format_size(chip.block_size()));
    println!(
        "Opcodes:         program 0x{:02X}, erase 0x{:02X}, status 0x{:02X}",
        handle.program_opcode(),
        handle.erase_opcode(),
        handle.status_opcode()
    );

    let Some(width) = chip.bp_width() else {
        println!("Protection:      not supported");
        return Ok(());
    };

    println!(
        "Protection:      {} BP bits, {} granularity",
        width.bits(),
        format_size(chip.protection_granularity())
    );

    match wp::read_protection(bus, handle) {
        Ok(status) => {
            println!("Protected:       {}", status.region);
            println!("Lockdown:        {}", status.mode);
        }
        Err(e) => println!("Protected:       unknown ({})", e),
    }

    Ok(())
}
