//! List commands implementation

use super::format_size;
use crate::programmers;
use wbspi_core::chip::{self, WINBOND_MANUFACTURER};

/// List all supported programmers
pub fn list_programmers() {
    println!("Supported programmers:");
    println!();
    for p in programmers::available_programmers() {
        println!("  {:10} - {}", p.name, p.description);
    }
}

/// List all supported chips
pub fn list_chips() {
    println!("Supported flash chips:");
    println!();
    println!(
        "{:<12} {:>10} {:>10} {:>12}",
        "Name", "Size", "JEDEC ID", "Protection"
    );
    println!("{}", "-".repeat(48));

    for chip in chip::CHIPS {
        let jedec_str = format!("{:02X} {:04X}", WINBOND_MANUFACTURER, chip.id);
        let wp_str = match chip.bp_width() {
            Some(width) => format!(
                "{}-bit/{}",
                width.bits(),
                format_size(chip.protection_granularity())
            ),
            None => "-".to_string(),
        };

        println!(
            "{:<12} {:>10} {:>10} {:>12}",
            chip.name,
            format_size(chip.total_size()),
            jedec_str,
            wp_str
        );
    }
}
