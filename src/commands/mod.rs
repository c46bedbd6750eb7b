//! CLI command implementations
//!
//! Every command receives the opened bus and the handle of the probed chip.
//! Commands that change flash contents or status registers are run with
//! image persistence enabled by the caller.

pub mod erase;
mod list;
pub mod probe;
pub mod read;
pub mod wp;
pub mod write;

pub use list::{list_chips, list_programmers};

use indicatif::{ProgressBar, ProgressStyle};

/// Create a byte progress bar labelled with `phase`
pub(crate) fn byte_progress_bar(total: u64, phase: &str) -> ProgressBar {
    let pb = ProgressBar::new(total);
    pb.set_style(
        ProgressStyle::default_bar()
            .template(&format!(
                "{{spinner:.green}} [{{elapsed_precise}}] [{{bar:40.cyan/blue}}] {{bytes}}/{{total_bytes}} ({{bytes_per_sec}}, {{eta}}) {}",
                phase
            ))
            .unwrap_or_else(|_| ProgressStyle::default_bar())
            .progress_chars("#>-"),
    );
    pb
}

/// Format a byte count with a binary unit
pub(crate) fn format_size(bytes: u32) -> String {
    if bytes >= 1024 * 1024 {
        format!("{} MiB", bytes / (1024 * 1024))
    } else if bytes >= 1024 {
        format!("{} KiB", bytes / 1024)
    } else {
        format!("{} B", bytes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_size() {
        assert_eq!(format_size(512), "512 B");
        assert_eq!(format_size(64 * 1024), "64 KiB");
        assert_eq!(format_size(16 * 1024 * 1024), "16 MiB");
    }
}
