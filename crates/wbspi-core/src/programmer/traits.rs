//! SPI bus trait definition

use crate::error::{Error, Result};
use crate::spi::opcodes;

/// Interval between two BUSY polls in [`SpiBus::wait_ready`]
pub const READY_POLL_US: u32 = 10;

/// SPI bus trait
///
/// This trait represents a transport that can run a complete SPI transaction
/// (chip select asserted for the duration of one call) against a single
/// flash chip. The driver assumes it has exclusive use of the bus for the
/// duration of each operation; callers must serialize access.
///
/// Only `command_read`, `command_write`, `crop_chunk` and `delay_us` have to
/// be implemented. `command` and `wait_ready` have default implementations
/// built on top of them.
///
/// ## Example
///
/// ```ignore
/// impl SpiBus for Spidev {
///     fn command_read(&mut self, header: &[u8], buf: &mut [u8]) -> Result<()> {
///         self.transfer(header, buf).map_err(|_| Error::BusFailure)
///     }
///
///     fn command_write(&mut self, header: &[u8], payload: &[u8]) -> Result<()> {
///         self.write_chained(header, payload).map_err(|_| Error::BusFailure)
///     }
///
///     fn crop_chunk(&self, header_len: usize, len: usize) -> usize {
///         len.min(self.max_transfer - header_len)
///     }
///
///     fn delay_us(&mut self, us: u32) {
///         std::thread::sleep(std::time::Duration::from_micros(us.into()));
///     }
/// }
/// ```
pub trait SpiBus {
    /// Send a command that has no data phase (e.g. WREN)
    fn command(&mut self, opcode: u8) -> Result<()> {
        self.command_read(&[opcode], &mut [])
    }

    /// Send `header` (opcode plus optional address/dummy bytes), then clock
    /// `buf.len()` bytes in
    fn command_read(&mut self, header: &[u8], buf: &mut [u8]) -> Result<()>;

    /// Send `header` followed by `payload` in a single transaction
    fn command_write(&mut self, header: &[u8], payload: &[u8]) -> Result<()>;

    /// Return how many of `len` payload bytes fit in one transaction after a
    /// header of `header_len` bytes
    ///
    /// Drivers must ask on every chunk since the header size differs between
    /// commands.
    fn crop_chunk(&self, header_len: usize, len: usize) -> usize;

    /// Delay for the specified number of microseconds
    fn delay_us(&mut self, us: u32);

    /// Poll status register 1 until BUSY clears
    ///
    /// Returns [`Error::Timeout`] if the chip is still busy after
    /// `timeout_ms` milliseconds. Transports with a hardware ready signal
    /// may override this.
    fn wait_ready(&mut self, timeout_ms: u32) -> Result<()> {
        let max_polls = timeout_ms.saturating_mul(1000) / READY_POLL_US;

        for _ in 0..=max_polls {
            let mut status = [0u8; 1];
            self.command_read(&[opcodes::RDSR], &mut status)?;
            if status[0] & opcodes::SR1_WIP == 0 {
                return Ok(());
            }
            self.delay_us(READY_POLL_US);
        }

        log::warn!("SF: timeout after {} ms waiting for ready", timeout_ms);
        Err(Error::Timeout)
    }
}
