//! Read command implementation

use super::byte_progress_bar;
use std::fs::File;
use std::io::Write;
use std::path::Path;
use wbspi_core::flash::{self, FlashHandle};
use wbspi_core::programmer::SpiBus;

/// Default chunk size for reading (4 KiB)
const READ_CHUNK_SIZE: usize = 4096;

/// Run the read command
pub fn cmd_read(
    bus: &mut dyn SpiBus,
    handle: &FlashHandle,
    output: &Path,
) -> Result<(), Box<dyn std::error::Error>> {
    let data = read_flash_with_progress(bus, handle)?;

    let mut file = File::create(output)?;
    file.write_all(&data)?;

    println!("Wrote {} bytes to {:?}", data.len(), output);
    Ok(())
}

/// Read `len` bytes at `addr` with a progress bar
pub fn read_range_with_progress(
    bus: &mut dyn SpiBus,
    handle: &FlashHandle,
    addr: u32,
    len: usize,
    phase: &str,
) -> Result<Vec<u8>, Box<dyn std::error::Error>> {
    let mut data = vec![0u8; len];
    let pb = byte_progress_bar(len as u64, phase);

    let mut offset = 0usize;
    while offset < len {
        let chunk_size = std::cmp::min(READ_CHUNK_SIZE, len - offset);
        let chunk = &mut data[offset..offset + chunk_size];

        flash::read(bus, handle, addr + offset as u32, chunk)?;

        offset += chunk_size;
        pb.set_position(offset as u64);
    }

    pb.finish_with_message("Read complete");
    Ok(data)
}

/// Read entire flash contents with progress bar
pub fn read_flash_with_progress(
    bus: &mut dyn SpiBus,
    handle: &FlashHandle,
) -> Result<Vec<u8>, Box<dyn std::error::Error>> {
    read_range_with_progress(bus, handle, 0, handle.total_size() as usize, "Reading")
}
