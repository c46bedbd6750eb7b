//! wbspi-dummy - In-memory Winbond flash emulator for testing
//!
//! This crate provides a [`DummyFlash`] that implements
//! [`SpiBus`](wbspi_core::programmer::SpiBus) on top of an in-memory copy of
//! a W25 part. It models the parts of the chip the driver relies on:
//!
//! - JEDEC ID, status registers 1 and 2, WEL and BUSY
//! - non-volatile (WREN) and volatile (EWSR) status register writes
//! - SRP0/SRP1 status register lock-down, including the WP# pin
//! - block protection of the array by BP/TB/CMP
//! - Page Program wrap-around and 4 KiB sector erase
//!
//! Every transaction is recorded so tests can count and inspect the
//! commands a driver sent. Faults (failing opcodes, a chip that never
//! leaves BUSY, a status register that ignores writes) can be injected.

#![cfg_attr(not(feature = "std"), no_std)]

#[cfg(feature = "alloc")]
extern crate alloc;

#[cfg(feature = "alloc")]
use alloc::vec;
#[cfg(feature = "alloc")]
use alloc::vec::Vec;

use wbspi_core::chip::{find_chip, ChipDescriptor, CHIPS, WINBOND_MANUFACTURER};
#[cfg(feature = "alloc")]
use wbspi_core::error::{Error, Result};
#[cfg(feature = "alloc")]
use wbspi_core::programmer::SpiBus;
#[cfg(feature = "alloc")]
use wbspi_core::spi::opcodes;
#[cfg(feature = "alloc")]
use wbspi_core::wp::{bpbits_to_region, BpLayout, Region, StatusRegs};


/// Status register 1 bits the WRSR command can change
const SR1_WRITABLE: u8 = 0xFC;
/// Status register 2 bits the WRSR command can change (SRP1, QE, CMP)
const SR2_WRITABLE: u8 = 0x43;
/// BUSY polls reported after a page program
const PROGRAM_BUSY_POLLS: u32 = 2;
/// BUSY polls reported after a sector erase
const ERASE_BUSY_POLLS: u32 = 5;
/// BUSY polls reported after a non-volatile status register write
const STATUS_BUSY_POLLS: u32 = 3;

/// Configuration for the dummy flash
#[derive(Debug, Clone)]
pub struct DummyConfig {
    /// Emulated part
    pub chip: &'static ChipDescriptor,
    /// JEDEC manufacturer ID
    pub manufacturer_id: u8,
    /// Largest transaction (header plus data) the bus accepts
    pub max_transfer: usize,
    /// State of the WP# pin (true = asserted, i.e. driven low)
    pub wp_asserted: bool,
    /// Ignore every status register write, as a locked part would
    pub status_locked: bool,
}

impl DummyConfig {
    /// Default configuration for a given part
    pub fn for_chip(chip: &'static ChipDescriptor) -> Self {
        Self {
            chip,
            manufacturer_id: WINBOND_MANUFACTURER,
            max_transfer: 4096,
            wp_asserted: false,
            status_locked: false,
        }
    }
}

impl Default for DummyConfig {
    fn default() -> Self {
        Self::for_chip(find_chip(0x4018).unwrap_or(&CHIPS[0]))
    }
}

/// One recorded bus transaction
#[cfg(feature = "alloc")]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Transaction {
    /// Command opcode (first header byte)
    pub opcode: u8,
    /// Full header, opcode included
    pub header: Vec<u8>,
    /// Data clocked out after the header
    pub payload: Vec<u8>,
    /// Number of bytes clocked in
    pub read_len: usize,
}

#[cfg(feature = "alloc")]
impl Transaction {
    /// 24-bit address of an addressed command
    pub fn address(&self) -> Option<u32> {
        if self.header.len() < 4 {
            return None;
        }
        Some(u32::from_be_bytes([0, self.header[1], self.header[2], self.header[3]]))
    }
}

/// A fault injected into the bus
#[cfg(feature = "alloc")]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Fault {
    opcode: u8,
    skip: usize,
}

/// Dummy flash programmer
///
/// Emulates a Winbond chip in memory for testing purposes.
#[cfg(feature = "alloc")]
pub struct DummyFlash {
    config: DummyConfig,
    data: Vec<u8>,
    status_reg1: u8,
    status_reg2: u8,
    nv_status: StatusRegs,
    write_enabled: bool,
    volatile_status_enabled: bool,
    busy_polls: u32,
    stuck_busy: bool,
    fault: Option<Fault>,
    log: Vec<Transaction>,
    elapsed_us: u64,
}

#[cfg(feature = "alloc")]
impl DummyFlash {
    /// Create a new dummy flash with the given configuration
    pub fn new(config: DummyConfig) -> Self {
        let data = vec![0xFF; config.chip.total_size() as usize];
        Self {
            config,
            data,
            status_reg1: 0,
            status_reg2: 0,
            nv_status: StatusRegs::default(),
            write_enabled: false,
            volatile_status_enabled: false,
            busy_polls: 0,
            stuck_busy: false,
            fault: None,
            log: Vec::new(),
            elapsed_us: 0,
        }
    }

    /// Create a new dummy flash with default configuration (W25Q128_V)
    pub fn new_default() -> Self {
        Self::new(DummyConfig::default())
    }

    /// Create a dummy flash with pre-filled data
    pub fn with_data(config: DummyConfig, initial_data: &[u8]) -> Self {
        let mut flash = Self::new(config);
        let len = core::cmp::min(initial_data.len(), flash.data.len());
        flash.data[..len].copy_from_slice(&initial_data[..len]);
        flash
    }

    /// Get a reference to the flash data
    pub fn data(&self) -> &[u8] {
        &self.data
    }

    /// Get a mutable reference to the flash data
    pub fn data_mut(&mut self) -> &mut [u8] {
        &mut self.data
    }

    /// Get the configuration
    pub fn config(&self) -> &DummyConfig {
        &self.config
    }

    /// Get a mutable reference to the configuration
    pub fn config_mut(&mut self) -> &mut DummyConfig {
        &mut self.config
    }

    /// Current `(reg1, reg2)` status register values
    pub fn status(&self) -> (u8, u8) {
        (self.status_reg1, self.status_reg2)
    }

    /// Force both status registers, volatile and non-volatile
    pub fn set_status(&mut self, reg1: u8, reg2: u8) {
        self.status_reg1 = reg1 & !(opcodes::SR1_WIP | opcodes::SR1_WEL);
        self.status_reg2 = reg2;
        self.nv_status = StatusRegs::from_bytes(self.status_reg1, self.status_reg2);
    }

    /// Simulate a power-down, power-up cycle
    ///
    /// Volatile status register contents are replaced by the non-volatile
    /// copy and a power supply lock-down (SRP1=1, SRP0=0) is released.
    pub fn power_cycle(&mut self) {
        let (mut sr1, mut sr2) = self.nv_status.to_bytes();
        if sr1 & opcodes::SR1_SRP0 == 0 && sr2 & opcodes::SR2_SRP1 != 0 {
            sr2 &= !opcodes::SR2_SRP1;
        }
        sr1 &= !(opcodes::SR1_WIP | opcodes::SR1_WEL);
        self.status_reg1 = sr1;
        self.status_reg2 = sr2;
        self.nv_status = StatusRegs::from_bytes(sr1, sr2);
        self.write_enabled = false;
        self.volatile_status_enabled = false;
        self.busy_polls = 0;
    }

    /// Keep reporting BUSY until cleared
    pub fn set_stuck_busy(&mut self, stuck: bool) {
        self.stuck_busy = stuck;
    }

    /// Fail every `opcode` transaction after the first `skip` ones
    pub fn fail_after(&mut self, opcode: u8, skip: usize) {
        self.fault = Some(Fault { opcode, skip });
    }

    /// Remove an injected fault
    pub fn clear_fault(&mut self) {
        self.fault = None;
    }

    /// All recorded transactions
    pub fn transactions(&self) -> &[Transaction] {
        &self.log
    }

    /// Opcodes of all recorded transactions, in order
    pub fn opcodes(&self) -> Vec<u8> {
        self.log.iter().map(|t| t.opcode).collect()
    }

    /// Number of recorded transactions with the given opcode
    pub fn count(&self, opcode: u8) -> usize {
        self.log.iter().filter(|t| t.opcode == opcode).count()
    }

    /// Forget all recorded transactions
    pub fn clear_log(&mut self) {
        self.log.clear();
    }

    /// Total time spent in `delay_us`
    pub fn elapsed_us(&self) -> u64 {
        self.elapsed_us
    }

    /// Region currently protected by BP/TB/CMP, if any
    pub fn protected_region(&self) -> Option<Region> {
        let layout = BpLayout::from_width(self.config.chip.bp_width()?);
        let fields = layout.unpack(StatusRegs::from_bytes(self.status_reg1, self.status_reg2).0);
        if fields.sec {
            return None;
        }
        let region = bpbits_to_region(
            self.config.chip.protection_granularity_shift,
            &fields.state,
            self.config.chip.total_size(),
        );
        (!region.is_empty()).then_some(region)
    }

    fn is_protected(&self, addr: u32, len: u32) -> bool {
        match self.protected_region() {
            Some(region) => addr < region.end() && region.offset < addr.saturating_add(len),
            None => false,
        }
    }

    fn status_locked(&self) -> bool {
        if self.config.status_locked {
            return true;
        }
        let srp0 = self.status_reg1 & opcodes::SR1_SRP0 != 0;
        let srp1 = self.status_reg2 & opcodes::SR2_SRP1 != 0;
        match (srp1, srp0) {
            (false, false) => false,
            (false, true) => self.config.wp_asserted,
            // Power supply lock-down or one time program
            (true, _) => true,
        }
    }

    fn check_fault(&self, opcode: u8) -> Result<()> {
        match self.fault {
            Some(fault) if fault.opcode == opcode && self.count(opcode) > fault.skip => {
                log::debug!("dummy: injected failure for opcode 0x{:02x}", opcode);
                Err(Error::BusFailure)
            }
            _ => Ok(()),
        }
    }

    fn record(&mut self, header: &[u8], payload: &[u8], read_len: usize) -> Result<u8> {
        let opcode = *header.first().ok_or(Error::BusFailure)?;
        self.log.push(Transaction {
            opcode,
            header: header.to_vec(),
            payload: payload.to_vec(),
            read_len,
        });
        self.check_fault(opcode)?;
        Ok(opcode)
    }

    fn header_address(&self, header: &[u8]) -> Result<usize> {
        if header.len() < 4 {
            log::warn!("dummy: missing address for opcode 0x{:02x}", header[0]);
            return Err(Error::BusFailure);
        }
        Ok(u32::from_be_bytes([0, header[1], header[2], header[3]]) as usize)
    }

    fn read_status1(&mut self) -> u8 {
        let mut sr1 = self.status_reg1;
        if self.write_enabled {
            sr1 |= opcodes::SR1_WEL;
        }
        if self.stuck_busy || self.busy_polls > 0 {
            self.busy_polls = self.busy_polls.saturating_sub(1);
            sr1 |= opcodes::SR1_WIP;
        }
        sr1
    }

    fn handle_read(&mut self, header: &[u8], buf: &mut [u8]) -> Result<()> {
        let addr = self.header_address(header)?;
        let len = buf.len();

        if addr + len > self.data.len() {
            return Err(Error::AddressOutOfBounds);
        }

        buf.copy_from_slice(&self.data[addr..addr + len]);
        Ok(())
    }

    fn handle_write_status(&mut self, values: &[u8]) {
        let volatile = self.volatile_status_enabled && !self.write_enabled;
        if !self.write_enabled && !self.volatile_status_enabled {
            log::debug!("dummy: WRSR without write enable ignored");
            return;
        }
        self.write_enabled = false;
        self.volatile_status_enabled = false;

        if self.status_locked() {
            log::debug!("dummy: WRSR ignored, status register locked");
            return;
        }

        if let Some(&sr1) = values.first() {
            self.status_reg1 = (self.status_reg1 & !SR1_WRITABLE) | (sr1 & SR1_WRITABLE);
        }
        if let Some(&sr2) = values.get(1) {
            self.status_reg2 = (self.status_reg2 & !SR2_WRITABLE) | (sr2 & SR2_WRITABLE);
        }

        if !volatile {
            self.nv_status = StatusRegs::from_bytes(self.status_reg1, self.status_reg2);
            self.busy_polls = STATUS_BUSY_POLLS;
        }
    }

    fn handle_page_program(&mut self, header: &[u8], data: &[u8]) -> Result<()> {
        let addr = self.header_address(header)?;
        if addr >= self.data.len() {
            return Err(Error::AddressOutOfBounds);
        }
        if !self.write_enabled {
            log::debug!("dummy: PP without write enable ignored");
            return Ok(());
        }
        self.write_enabled = false;

        if self.is_protected(addr as u32, data.len() as u32) {
            log::debug!("dummy: PP to protected area 0x{:06x} ignored", addr);
            return Ok(());
        }

        // Programming wraps around within the page and only clears bits
        let page_size = self.config.chip.page_size() as usize;
        let page_base = addr & !(page_size - 1);
        for (i, &byte) in data.iter().enumerate() {
            let offset = (addr - page_base + i) % page_size;
            self.data[page_base + offset] &= byte;
        }

        self.busy_polls = PROGRAM_BUSY_POLLS;
        Ok(())
    }

    fn handle_sector_erase(&mut self, header: &[u8]) -> Result<()> {
        let addr = self.header_address(header)?;
        let erase_size = self.config.chip.sector_size() as usize;

        // Align address to erase boundary
        let aligned_addr = addr & !(erase_size - 1);

        if aligned_addr + erase_size > self.data.len() {
            return Err(Error::AddressOutOfBounds);
        }
        if !self.write_enabled {
            log::debug!("dummy: SE without write enable ignored");
            return Ok(());
        }
        self.write_enabled = false;

        if self.is_protected(aligned_addr as u32, erase_size as u32) {
            log::debug!("dummy: SE of protected sector 0x{:06x} ignored", aligned_addr);
            return Ok(());
        }

        self.data[aligned_addr..aligned_addr + erase_size].fill(0xFF);
        self.busy_polls = ERASE_BUSY_POLLS;
        Ok(())
    }
}

#[cfg(feature = "alloc")]
impl SpiBus for DummyFlash {
    fn command_read(&mut self, header: &[u8], buf: &mut [u8]) -> Result<()> {
        let opcode = self.record(header, &[], buf.len())?;

        match opcode {
            // JEDEC ID
            opcodes::RDID => {
                let id = self.config.chip.id.to_be_bytes();
                let response = [self.config.manufacturer_id, id[0], id[1]];
                for (dst, src) in buf.iter_mut().zip(response) {
                    *dst = src;
                }
                Ok(())
            }

            // Status register read
            opcodes::RDSR => {
                let sr1 = self.read_status1();
                buf.fill(sr1);
                Ok(())
            }
            opcodes::RDSR2 => {
                buf.fill(self.status_reg2);
                Ok(())
            }

            // Commands without a data phase
            opcodes::WREN => {
                self.write_enabled = true;
                Ok(())
            }
            opcodes::WRDI => {
                self.write_enabled = false;
                Ok(())
            }
            opcodes::EWSR => {
                self.volatile_status_enabled = true;
                Ok(())
            }

            // Read commands
            opcodes::READ => self.handle_read(header, buf),
            opcodes::FAST_READ => {
                if header.len() < 5 {
                    return Err(Error::BusFailure);
                }
                self.handle_read(&header[..4], buf)
            }

            _ => {
                log::warn!("dummy: unsupported read opcode 0x{:02x}", opcode);
                Err(Error::BusFailure)
            }
        }
    }

    fn command_write(&mut self, header: &[u8], payload: &[u8]) -> Result<()> {
        let opcode = self.record(header, payload, 0)?;

        match opcode {
            opcodes::WRSR => {
                let values: Vec<u8> = header[1..].iter().chain(payload).copied().collect();
                self.handle_write_status(&values);
                Ok(())
            }
            opcodes::PP => self.handle_page_program(header, payload),
            opcodes::SE_20 => self.handle_sector_erase(header),
            opcodes::WREN => {
                self.write_enabled = true;
                Ok(())
            }
            opcodes::EWSR => {
                self.volatile_status_enabled = true;
                Ok(())
            }
            _ => {
                log::warn!("dummy: unsupported write opcode 0x{:02x}", opcode);
                Err(Error::BusFailure)
            }
        }
    }

    fn crop_chunk(&self, header_len: usize, len: usize) -> usize {
        len.min(self.config.max_transfer.saturating_sub(header_len))
    }

    fn delay_us(&mut self, us: u32) {
        self.elapsed_us += u64::from(us);
    }
}
