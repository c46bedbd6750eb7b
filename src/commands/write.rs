//! Write command implementation

use super::byte_progress_bar;
use super::read::read_range_with_progress;
use indicatif::{ProgressBar, ProgressStyle};
use std::path::Path;
use std::time::Duration;
use wbspi_core::flash::{self, FlashHandle, WriteProgress};
use wbspi_core::programmer::SpiBus;

/// Default chunk size for verification
const VERIFY_CHUNK_SIZE: usize = 4096;

/// Progress reporter using an indicatif progress bar
struct IndicatifProgress {
    bar: Option<ProgressBar>,
}

impl IndicatifProgress {
    fn new() -> Self {
        Self { bar: None }
    }

    fn finish(&mut self, message: &str) {
        if let Some(pb) = self.bar.take() {
            pb.finish_with_message(message.to_string());
        }
    }
}

impl WriteProgress for IndicatifProgress {
    fn writing(&mut self, bytes_to_write: usize) {
        self.bar = Some(byte_progress_bar(bytes_to_write as u64, "Writing"));
    }

    fn write_progress(&mut self, bytes_written: usize) {
        if let Some(pb) = &self.bar {
            pb.set_position(bytes_written as u64);
        }
    }
}

/// Sector-aligned window covering `len` bytes at `addr`
fn erase_window(addr: u32, len: u32, sector_size: u32) -> (u32, u32) {
    let start = addr - addr % sector_size;
    let end = (addr + len).div_ceil(sector_size) * sector_size;
    (start, end - start)
}

/// Run the write command
///
/// Unless `no_erase` is set, every sector touched by the image is read,
/// merged with the image, erased and rewritten, so data sharing those
/// sectors survives.
pub fn cmd_write(
    bus: &mut dyn SpiBus,
    handle: &FlashHandle,
    input: &Path,
    offset: u32,
    no_erase: bool,
    no_verify: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    let data = std::fs::read(input)?;
    if data.is_empty() {
        return Err(format!("Input file {:?} is empty", input).into());
    }

    if !handle.is_valid_range(offset, data.len()) {
        return Err(format!(
            "File size ({} bytes) at offset 0x{:08X} exceeds flash size ({} bytes)",
            data.len(),
            offset,
            handle.total_size()
        )
        .into());
    }

    let (addr, image) = if no_erase {
        (offset, data)
    } else {
        let (start, len) = erase_window(offset, data.len() as u32, handle.sector_size());
        let mut merged = read_range_with_progress(bus, handle, start, len as usize, "Reading")?;
        let rel = (offset - start) as usize;
        merged[rel..rel + data.len()].copy_from_slice(&data);

        let pb = ProgressBar::new_spinner();
        pb.set_style(
            ProgressStyle::default_spinner()
                .template("{spinner:.green} {msg}")
                .unwrap_or_else(|_| ProgressStyle::default_spinner()),
        );
        pb.set_message(format!("Erasing {} bytes at 0x{:08X}...", len, start));
        pb.enable_steady_tick(Duration::from_millis(100));
        flash::erase(bus, handle, start, len)?;
        pb.finish_with_message("Erase complete");

        (start, merged)
    };

    let mut progress = IndicatifProgress::new();
    let result = flash::write_with_progress(bus, handle, addr, &image, &mut progress);
    match result {
        Ok(()) => progress.finish("Write complete"),
        Err(e) => {
            if let Some(pb) = progress.bar.take() {
                pb.abandon_with_message("Write failed!");
            }
            return Err(e.into());
        }
    }

    if !no_verify {
        verify_flash_with_progress(bus, handle, addr, &image)?;
    }

    println!("Wrote {} bytes at 0x{:08X}", image.len(), addr);
    Ok(())
}

/// Verify flash contents against expected data with progress bar
pub fn verify_flash_with_progress(
    bus: &mut dyn SpiBus,
    handle: &FlashHandle,
    addr: u32,
    expected: &[u8],
) -> Result<(), Box<dyn std::error::Error>> {
    let total_size = expected.len();
    let mut buf = vec![0u8; VERIFY_CHUNK_SIZE];

    let pb = byte_progress_bar(total_size as u64, "Verifying");

    let mut offset = 0usize;
    while offset < total_size {
        let chunk_size = std::cmp::min(VERIFY_CHUNK_SIZE, total_size - offset);
        let chunk = &mut buf[..chunk_size];

        flash::read(bus, handle, addr + offset as u32, chunk)?;

        let expected_chunk = &expected[offset..offset + chunk_size];
        if let Some(i) = chunk.iter().zip(expected_chunk).position(|(a, b)| a != b) {
            pb.abandon_with_message("Verification failed!");
            return Err(format!(
                "Verification failed at 0x{:08X}: expected 0x{:02X}, got 0x{:02X}",
                addr as usize + offset + i,
                expected_chunk[i],
                chunk[i]
            )
            .into());
        }

        offset += chunk_size;
        pb.set_position(offset as u64);
    }

    pb.finish_with_message("Verification passed");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_erase_window() {
        assert_eq!(erase_window(0, 4096, 4096), (0, 4096));
        assert_eq!(erase_window(100, 10, 4096), (0, 4096));
        assert_eq!(erase_window(4000, 200, 4096), (0, 8192));
        assert_eq!(erase_window(0x2000, 1, 4096), (0x2000, 4096));
    }
}
