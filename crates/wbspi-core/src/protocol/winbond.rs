//! Winbond command sequences
//!
//! Thin wrappers around [`SpiBus`] that issue one JEDEC command each, plus
//! the composite program/erase sequences (WREN, command, wait for ready).

use crate::error::{Error, Result, WriteStage};
use crate::programmer::SpiBus;
use crate::spi::{address_header, opcodes, ADDRESS_HEADER_LEN};

/// Maximum time to program one page, in milliseconds
pub const PROGRAM_TIMEOUT_MS: u32 = 10;
/// Maximum time to erase one 4 KiB sector, in milliseconds
pub const ERASE_TIMEOUT_MS: u32 = 500;
/// Maximum time for a non-volatile status register write (tW), in milliseconds
pub const STATUS_WRITE_TIMEOUT_MS: u32 = 30;
/// Settle time after a volatile status register write (tSHSL), in microseconds
pub const VOLATILE_WRITE_DELAY_US: u32 = 1;

/// Read the 3-byte JEDEC ID (manufacturer, device high, device low)
pub fn read_jedec_id<B: SpiBus + ?Sized>(bus: &mut B) -> Result<[u8; 3]> {
    let mut idcode = [0u8; 3];
    bus.command_read(&[opcodes::RDID], &mut idcode)?;
    Ok(idcode)
}

/// Read a single-byte register with the given opcode
pub fn read_register<B: SpiBus + ?Sized>(bus: &mut B, opcode: u8) -> Result<u8> {
    let mut buf = [0u8; 1];
    bus.command_read(&[opcode], &mut buf)?;
    Ok(buf[0])
}

/// Read status register 1
pub fn read_status1<B: SpiBus + ?Sized>(bus: &mut B) -> Result<u8> {
    read_register(bus, opcodes::RDSR)
}

/// Read status register 2
pub fn read_status2<B: SpiBus + ?Sized>(bus: &mut B) -> Result<u8> {
    read_register(bus, opcodes::RDSR2)
}

/// Read status registers 1 and 2 as a `(reg1, reg2)` pair
pub fn read_status12<B: SpiBus + ?Sized>(bus: &mut B) -> Result<(u8, u8)> {
    let sr1 = read_status1(bus)?;
    let sr2 = read_status2(bus)?;
    Ok((sr1, sr2))
}

/// Send the Write Enable command
pub fn write_enable<B: SpiBus + ?Sized>(bus: &mut B) -> Result<()> {
    bus.command(opcodes::WREN)
}

/// Send the Write Enable for Volatile Status Register command
pub fn volatile_write_enable<B: SpiBus + ?Sized>(bus: &mut B) -> Result<()> {
    bus.command(opcodes::EWSR)
}

/// Write status registers 1 and 2 with the legacy two-byte WRSR
///
/// The caller is responsible for the preceding write enable and for
/// waiting afterwards.
pub fn write_status12<B: SpiBus + ?Sized>(bus: &mut B, sr1: u8, sr2: u8) -> Result<()> {
    bus.command_write(&[opcodes::WRSR, sr1, sr2], &[])
}

/// Program up to one page
///
/// The data must not cross a page boundary and must fit in one bus
/// transaction. On failure the step that failed is returned.
pub fn program_page<B: SpiBus + ?Sized>(
    bus: &mut B,
    opcode: u8,
    addr: u32,
    data: &[u8],
) -> core::result::Result<(), WriteStage> {
    let header = address_header(opcode, addr);
    log::trace!(
        "PP: cmd = {{ 0x{:02x} 0x{:02x}{:02x}{:02x} }} chunk_len = {}",
        header[0],
        header[1],
        header[2],
        header[3],
        data.len()
    );

    if write_enable(bus).is_err() {
        log::warn!("SF: Enabling Write failed");
        return Err(WriteStage::EnableFailed);
    }

    if bus.command_write(&header, data).is_err() {
        log::warn!("SF: Winbond Page Program failed");
        return Err(WriteStage::ProgramFailed);
    }

    bus.wait_ready(PROGRAM_TIMEOUT_MS).map_err(|e| match e {
        Error::Timeout => WriteStage::Timeout,
        _ => WriteStage::ProgramFailed,
    })
}

/// Erase one sector/block at the given address
pub fn erase_block<B: SpiBus + ?Sized>(
    bus: &mut B,
    opcode: u8,
    addr: u32,
    timeout_ms: u32,
) -> Result<()> {
    write_enable(bus)?;
    bus.command_write(&address_header(opcode, addr), &[])?;
    bus.wait_ready(timeout_ms)
}

/// Read data from flash
///
/// Large reads are split according to the bus transfer limit. With `fast`
/// set, Fast Read with one dummy byte is used instead of Read Data.
pub fn read_data<B: SpiBus + ?Sized>(
    bus: &mut B,
    addr: u32,
    buf: &mut [u8],
    fast: bool,
) -> Result<()> {
    let (opcode, header_len) = if fast {
        (opcodes::FAST_READ, ADDRESS_HEADER_LEN + 1)
    } else {
        (opcodes::READ, ADDRESS_HEADER_LEN)
    };

    let mut offset = 0;
    while offset < buf.len() {
        let mut header = [0u8; ADDRESS_HEADER_LEN + 1];
        header[..ADDRESS_HEADER_LEN]
            .copy_from_slice(&address_header(opcode, addr + offset as u32));

        let chunk_len = bus.crop_chunk(header_len, buf.len() - offset);
        if chunk_len == 0 {
            return Err(Error::BusFailure);
        }

        bus.command_read(&header[..header_len], &mut buf[offset..offset + chunk_len])?;
        offset += chunk_len;
    }

    Ok(())
}
