use embedded_hal::blocking::{
    delay::DelayMs,
    i2c::{Write, WriteRead},
};
use fugit::MillisDurationU32;

use crate::sensors::imu::registers::{IMURegister, BURST_LEN, I2C_ADDRESS, OFFSET_BLOCK_LEN};

/// 1 MHz monotonic tick
pub type Instant = fugit::TimerInstantU64<1_000_000>;

/// Register level access to the sensor.
///
/// The asynchronous read must not be reported as complete if the transfer
/// failed. Whoever owns the completion interrupt hands the landed burst to
/// [`crate::IMU::complete_read`] exactly once per successful transfer.
pub trait Transport {
    type Error;

    fn write_regs(
        &mut self,
        reg: IMURegister,
        data: &[u8],
        timeout: MillisDurationU32,
    ) -> Result<(), Self::Error>;

    fn read_regs(
        &mut self,
        reg: IMURegister,
        buf: &mut [u8],
        timeout: MillisDurationU32,
    ) -> Result<(), Self::Error>;

    /// Start a non-blocking read of `len` bytes, returns once the transfer
    /// is queued
    fn start_read_regs(&mut self, reg: IMURegister, len: usize) -> Result<(), Self::Error>;

    /// Edge triggered data ready line, returns and clears the pending edge
    fn take_data_ready(&mut self) -> bool;
}

/// Monotonic tick source and blocking delay
pub trait Clock: DelayMs<u32> {
    fn now(&self) -> Instant;
}

/// Longest register block the driver writes in one transfer
pub const MAX_WRITE_LEN: usize = OFFSET_BLOCK_LEN;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum I2cError<E> {
    Bus(E),
    /// write longer than [`MAX_WRITE_LEN`], or read longer than a burst
    TooLong(usize),
}

/// [`Transport`] over a blocking embedded-hal I2C bus.
///
/// Boards without a DMA path complete the "asynchronous" burst inline, the
/// bytes are latched until the control loop collects them with
/// [`I2cTransport::take_completed`] and hands them to the driver.
pub struct I2cTransport<I2C> {
    i2c:        I2C,
    addr:       u8,
    completed:  Option<[u8; BURST_LEN]>,
    data_ready: bool,
}

/// new
impl<I2C> I2cTransport<I2C> {
    pub fn new(i2c: I2C) -> Self {
        Self {
            i2c,
            addr: I2C_ADDRESS,
            completed: None,
            data_ready: false,
        }
    }

    pub fn with_address(mut self, addr: u8) -> Self {
        self.addr = addr;
        self
    }

    pub fn release(self) -> I2C {
        self.i2c
    }
}

/// completion, data ready
impl<I2C> I2cTransport<I2C> {
    pub fn take_completed(&mut self) -> Option<[u8; BURST_LEN]> {
        self.completed.take()
    }

    /// Call from the data ready pin interrupt
    pub fn on_data_ready(&mut self) {
        self.data_ready = true;
    }
}

impl<I2C, E> Transport for I2cTransport<I2C>
where
    I2C: Write<Error = E> + WriteRead<Error = E>,
{
    type Error = I2cError<E>;

    /// the blocking bus enforces its own timeout
    fn write_regs(
        &mut self,
        reg: IMURegister,
        data: &[u8],
        _timeout: MillisDurationU32,
    ) -> Result<(), I2cError<E>> {
        let len = data.len();
        if len > MAX_WRITE_LEN {
            return Err(I2cError::TooLong(len));
        }

        let mut frame = [0u8; MAX_WRITE_LEN + 1];
        frame[0] = reg.to_addr();
        frame[1..=len].copy_from_slice(data);

        self.i2c.write(self.addr, &frame[..=len]).map_err(I2cError::Bus)
    }

    fn read_regs(
        &mut self,
        reg: IMURegister,
        buf: &mut [u8],
        _timeout: MillisDurationU32,
    ) -> Result<(), I2cError<E>> {
        self.i2c
            .write_read(self.addr, &[reg.to_addr()], buf)
            .map_err(I2cError::Bus)
    }

    fn start_read_regs(&mut self, reg: IMURegister, len: usize) -> Result<(), I2cError<E>> {
        if len > BURST_LEN {
            return Err(I2cError::TooLong(len));
        }

        // nothing is latched on failure
        self.completed = None;

        let mut buf = [0u8; BURST_LEN];
        self.i2c
            .write_read(self.addr, &[reg.to_addr()], &mut buf[..len])
            .map_err(I2cError::Bus)?;
        self.completed = Some(buf);

        Ok(())
    }

    fn take_data_ready(&mut self) -> bool {
        core::mem::replace(&mut self.data_ready, false)
    }
}
