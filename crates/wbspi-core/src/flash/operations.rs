//! High-level flash operations

use crate::error::{Error, Result, WriteFailure, WriteStage};
use crate::programmer::SpiBus;
use crate::protocol;
use crate::spi::ADDRESS_HEADER_LEN;

use super::handle::FlashHandle;

/// Progress callback for write operations
pub trait WriteProgress {
    /// Called once before the first chunk is programmed
    fn writing(&mut self, bytes_to_write: usize);

    /// Called after each programmed chunk with the running total
    fn write_progress(&mut self, bytes_written: usize);
}

/// A no-op progress reporter
pub struct NoProgress;

impl WriteProgress for NoProgress {
    fn writing(&mut self, _bytes_to_write: usize) {}
    fn write_progress(&mut self, _bytes_written: usize) {}
}

/// Read flash contents
pub fn read<B: SpiBus + ?Sized>(
    bus: &mut B,
    handle: &FlashHandle,
    addr: u32,
    buf: &mut [u8],
) -> Result<()> {
    if !handle.is_valid_range(addr, buf.len()) {
        return Err(Error::AddressOutOfBounds);
    }

    protocol::read_data(bus, addr, buf, true)
}

/// Write data to flash
///
/// The target region must be erased first. See [`write_with_progress`].
pub fn write<B: SpiBus + ?Sized>(
    bus: &mut B,
    handle: &FlashHandle,
    addr: u32,
    data: &[u8],
) -> Result<()> {
    write_with_progress(bus, handle, addr, data, &mut NoProgress)
}

/// Write data to flash, reporting progress after every chunk
///
/// Data is split so that no Page Program crosses a page boundary and no
/// transaction exceeds what the bus accepts after the 4-byte header. Each
/// chunk is preceded by its own Write Enable and followed by a ready wait.
///
/// The first failing chunk aborts the write with [`Error::Write`]; every
/// chunk before it has been programmed. Nothing is retried.
pub fn write_with_progress<B: SpiBus + ?Sized, P: WriteProgress + ?Sized>(
    bus: &mut B,
    handle: &FlashHandle,
    addr: u32,
    data: &[u8],
    progress: &mut P,
) -> Result<()> {
    if !handle.is_valid_range(addr, data.len()) {
        return Err(Error::AddressOutOfBounds);
    }

    let page_size = handle.page_size() as usize;
    let mut written = 0usize;
    let mut current_addr = addr;

    progress.writing(data.len());

    while written < data.len() {
        let page_offset = current_addr as usize % page_size;
        let chunk_len = core::cmp::min(data.len() - written, page_size - page_offset);
        let chunk_len = bus.crop_chunk(ADDRESS_HEADER_LEN, chunk_len);

        let fail = |stage| {
            Error::Write(WriteFailure {
                stage,
                addr: current_addr,
                written,
            })
        };

        if chunk_len == 0 {
            log::warn!("SF: bus cannot carry any payload after the PP header");
            return Err(fail(WriteStage::ProgramFailed));
        }

        let chunk = &data[written..written + chunk_len];
        protocol::program_page(bus, handle.program_opcode(), current_addr, chunk)
            .map_err(fail)?;

        written += chunk_len;
        current_addr += chunk_len as u32;
        progress.write_progress(written);
    }

    log::debug!(
        "SF: Winbond: Successfully programmed {} bytes @ 0x{:x}",
        data.len(),
        addr
    );

    Ok(())
}

/// Erase a sector-aligned region of flash
///
/// Issues one sector erase per sector. Verifying the erased contents is
/// left to the caller.
pub fn erase<B: SpiBus + ?Sized>(
    bus: &mut B,
    handle: &FlashHandle,
    addr: u32,
    len: u32,
) -> Result<()> {
    if !handle.is_valid_range(addr, len as usize) {
        return Err(Error::AddressOutOfBounds);
    }

    let sector_size = handle.sector_size();
    if addr % sector_size != 0 || len % sector_size != 0 {
        log::error!(
            "SF: Erase offset/length not multiple of sector size (0x{:x})",
            sector_size
        );
        return Err(Error::InvalidAlignment);
    }

    let end = addr + len;
    let mut current_addr = addr;
    while current_addr < end {
        protocol::erase_block(
            bus,
            handle.erase_opcode(),
            current_addr,
            protocol::ERASE_TIMEOUT_MS,
        )?;
        current_addr += sector_size;
    }

    log::debug!("SF: Successfully erased {} bytes @ 0x{:x}", len, addr);
    Ok(())
}

/// Read the chip's primary status register
pub fn read_status<B: SpiBus + ?Sized>(bus: &mut B, handle: &FlashHandle) -> Result<u8> {
    protocol::read_register(bus, handle.status_opcode())
}
