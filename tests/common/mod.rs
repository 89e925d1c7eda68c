#![allow(dead_code)]

use embedded_hal::blocking::delay::DelayMs;
use fugit::MillisDurationU32;

use rflight_imu::sensors::imu::registers::{IMURegister, BURST_LEN};
use rflight_imu::{Clock, ImuConfig, Instant, Transport, IMU};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BusError;

/// Register file behind a fake bus, records every write in order
pub struct FakeTransport {
    pub regs:          [u8; 128],
    pub writes:        Vec<(u8, Vec<u8>)>,
    pub started:       Vec<(u8, usize)>,
    /// writes to these registers fail
    pub fail_writes:   Vec<u8>,
    /// fail the nth write, counting from 0
    pub fail_write_at: Option<usize>,
    pub fail_reads:    bool,
    pub stuck_reset:   bool,
    pub data_ready:    bool,
    write_count:       usize,
}

impl Default for FakeTransport {
    fn default() -> Self {
        let mut regs = [0u8; 128];
        regs[IMURegister::WHO_AM_I.to_addr() as usize] = 0x68;
        Self {
            regs,
            writes: Vec::new(),
            started: Vec::new(),
            fail_writes: Vec::new(),
            fail_write_at: None,
            fail_reads: false,
            stuck_reset: false,
            data_ready: false,
            write_count: 0,
        }
    }
}

impl FakeTransport {
    pub fn set_burst(&mut self, burst: &[u8; BURST_LEN]) {
        let start = IMURegister::ACCEL_XOUT_H.to_addr() as usize;
        self.regs[start..start + BURST_LEN].copy_from_slice(burst);
    }

    pub fn reg(&self, reg: IMURegister) -> u8 {
        self.regs[reg.to_addr() as usize]
    }

    pub fn block(&self, reg: IMURegister, len: usize) -> &[u8] {
        let start = reg.to_addr() as usize;
        &self.regs[start..start + len]
    }

    pub fn writes_to(&self, reg: IMURegister) -> Vec<Vec<u8>> {
        self.writes
            .iter()
            .filter(|(r, _)| *r == reg.to_addr())
            .map(|(_, d)| d.clone())
            .collect()
    }

    pub fn write_regs_in_order(&self) -> Vec<(u8, u8)> {
        self.writes.iter().map(|(r, d)| (*r, d[0])).collect()
    }
}

impl Transport for FakeTransport {
    type Error = BusError;

    fn write_regs(
        &mut self,
        reg: IMURegister,
        data: &[u8],
        _timeout: MillisDurationU32,
    ) -> Result<(), BusError> {
        let n = self.write_count;
        self.write_count += 1;
        if self.fail_write_at == Some(n) || self.fail_writes.contains(&reg.to_addr()) {
            return Err(BusError);
        }

        self.writes.push((reg.to_addr(), data.to_vec()));

        let start = reg.to_addr() as usize;
        self.regs[start..start + data.len()].copy_from_slice(data);

        // reset finishes immediately unless told otherwise
        if reg == IMURegister::PWR_MGMT_1 && !self.stuck_reset {
            self.regs[start] &= !0x80;
        }
        Ok(())
    }

    fn read_regs(
        &mut self,
        reg: IMURegister,
        buf: &mut [u8],
        _timeout: MillisDurationU32,
    ) -> Result<(), BusError> {
        if self.fail_reads {
            return Err(BusError);
        }
        let start = reg.to_addr() as usize;
        buf.copy_from_slice(&self.regs[start..start + buf.len()]);
        Ok(())
    }

    fn start_read_regs(&mut self, reg: IMURegister, len: usize) -> Result<(), BusError> {
        if self.fail_reads {
            return Err(BusError);
        }
        self.started.push((reg.to_addr(), len));
        Ok(())
    }

    fn take_data_ready(&mut self) -> bool {
        core::mem::replace(&mut self.data_ready, false)
    }
}

/// Microsecond clock that only moves on delay or when told to
#[derive(Default)]
pub struct FakeClock {
    pub now_us: u64,
    pub delays: Vec<u32>,
}

impl FakeClock {
    pub fn advance_us(&mut self, us: u64) {
        self.now_us += us;
    }
}

impl DelayMs<u32> for FakeClock {
    fn delay_ms(&mut self, ms: u32) {
        self.delays.push(ms);
        self.now_us += ms as u64 * 1000;
    }
}

impl Clock for FakeClock {
    fn now(&self) -> Instant {
        Instant::from_ticks(self.now_us)
    }
}

pub type TestImu = IMU<FakeTransport, FakeClock>;

pub fn imu() -> TestImu {
    imu_with(FakeTransport::default(), ImuConfig::default())
}

pub fn imu_with(transport: FakeTransport, cfg: ImuConfig) -> TestImu {
    IMU::new(transport, FakeClock::default(), cfg).unwrap()
}

pub fn initialized() -> TestImu {
    let mut imu = imu();
    imu.initialize().unwrap();
    imu.transport_mut().writes.clear();
    imu
}

/// accel, temp, gyro as a big endian burst
pub fn burst(accel: [i16; 3], temp: i16, gyro: [i16; 3]) -> [u8; BURST_LEN] {
    let words = [accel[0], accel[1], accel[2], temp, gyro[0], gyro[1], gyro[2]];
    let mut out = [0u8; BURST_LEN];
    for (i, w) in words.iter().enumerate() {
        out[i * 2..i * 2 + 2].copy_from_slice(&w.to_be_bytes());
    }
    out
}
