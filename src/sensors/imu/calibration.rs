use byteorder::{BigEndian, ByteOrder};

use super::registers::*;
use super::{AccelRange, GyroRange, IMUError, IMU};
use crate::bus::{Clock, Transport};
use crate::sensors::{RawSample, V3};

/// Offsets written into XA_OFFS / XG_OFFS_USR
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct DeviceOffsets {
    pub accel: [i16; 3],
    pub gyro:  [i16; 3],
}

/// Residual, in raw counts, added to every burst before scaling
#[derive(Debug, Default, Clone, Copy, PartialEq)]
pub struct SoftwareOffsets {
    pub accel: V3,
    pub gyro:  V3,
}

#[derive(Debug, Default, Clone, Copy, PartialEq)]
pub struct CalibrationReport {
    pub device:        DeviceOffsets,
    pub software:      SoftwareOffsets,
    pub failed_writes: u32,
    pub failed_reads:  u32,
}

impl CalibrationReport {
    pub fn is_clean(&self) -> bool {
        self.failed_writes == 0 && self.failed_reads == 0
    }
}

/// Per axis sums over one batch of raw reads, wide enough for
/// `u16::MAX` saturated samples
#[derive(Debug, Default, Clone, Copy)]
struct Sums {
    accel: [i64; 3],
    gyro:  [i64; 3],
}

impl Sums {
    /// Z is measured against +1 g instead of zero
    fn add(&mut self, raw: &RawSample, one_g: i32) {
        self.accel[0] += raw.accel[0] as i64;
        self.accel[1] += raw.accel[1] as i64;
        self.accel[2] += raw.accel[2] as i64 - one_g as i64;
        for i in 0..3 {
            self.gyro[i] += raw.gyro[i] as i64;
        }
    }
}

/// Negated mean, saturated to the offset register range
fn mean_correction(sum: i64, n: i64) -> i16 {
    (-sum / n).clamp(i16::MIN as i64, i16::MAX as i64) as i16
}

/// Adds `correction` to a factory trim and puts the original bit 0 back
pub fn apply_trim_correction(trim: i16, correction: i16) -> i16 {
    let tc = trim as u16 & ACCEL_TRIM_TC_BIT;
    let corrected = trim.wrapping_add(correction) as u16;
    ((corrected & !ACCEL_TRIM_TC_BIT) | tc) as i16
}

/// calibration
impl<T: Transport, C: Clock> IMU<T, C> {
    /// Two pass calibration, sensor must be still and level.
    ///
    /// The first pass writes the device offset registers at the fixed
    /// calibration ranges, the second pass (after the settle period)
    /// measures what is left and keeps it as a software offset.
    ///
    /// Individual register failures do not stop the sequence, they are
    /// counted in the returned report. A failed read reuses the previous
    /// sample. Must not run while a [`IMU::start_read`] transfer is in flight.
    pub fn calibrate(&mut self) -> Result<CalibrationReport, IMUError<T::Error>> {
        let cal = self.settings.calibration;
        if cal.samples == 0
            || cal.gyro_range == GyroRange::NotSet
            || cal.accel_range == AccelRange::NotSet
        {
            return Err(IMUError::InvalidConfiguration);
        }

        let mut report = CalibrationReport::default();
        let prev_gyro = self.config.gyro_range;
        let prev_accel = self.config.accel_range;

        log_info!("imu: calibrating, {} samples per pass", cal.samples);

        if let Err(e) = self.set_gyro_range(cal.gyro_range) {
            self.calibration_failure("gyro range", &e, &mut report.failed_writes);
        }
        if let Err(e) = self.set_accel_range(cal.accel_range) {
            self.calibration_failure("accel range", &e, &mut report.failed_writes);
        }

        let mut trim_block = [0u8; OFFSET_BLOCK_LEN];
        let trim_ok = match self.read_regs(IMURegister::XA_OFFS_H, &mut trim_block) {
            Ok(()) => true,
            Err(e) => {
                self.calibration_failure("accel trim read", &e, &mut report.failed_reads);
                false
            }
        };

        let sums = self.sample_sums(&mut report);
        let n = cal.samples as i64;

        let mut accel_block = [0u8; OFFSET_BLOCK_LEN];
        let mut gyro_block = [0u8; OFFSET_BLOCK_LEN];
        for i in 0..3 {
            let trim = BigEndian::read_i16(&trim_block[i * 2..]);
            let correction = mean_correction(sums.accel[i], n);
            report.device.accel[i] = apply_trim_correction(trim, correction);
            report.device.gyro[i] = mean_correction(sums.gyro[i], n);

            BigEndian::write_i16(&mut accel_block[i * 2..], report.device.accel[i]);
            BigEndian::write_i16(&mut gyro_block[i * 2..], report.device.gyro[i]);
        }

        /// without the factory trim the block would overwrite it with garbage
        if trim_ok {
            if let Err(e) = self.write_regs(IMURegister::XA_OFFS_H, &accel_block) {
                self.calibration_failure("accel offsets", &e, &mut report.failed_writes);
            }
        } else {
            report.failed_writes += 1;
        }
        if let Err(e) = self.write_regs(IMURegister::XG_OFFS_USRH, &gyro_block) {
            self.calibration_failure("gyro offsets", &e, &mut report.failed_writes);
        }

        if prev_gyro != GyroRange::NotSet {
            if let Err(e) = self.set_gyro_range(prev_gyro) {
                self.calibration_failure("gyro range restore", &e, &mut report.failed_writes);
            }
        }
        if prev_accel != AccelRange::NotSet {
            if let Err(e) = self.set_accel_range(prev_accel) {
                self.calibration_failure("accel range restore", &e, &mut report.failed_writes);
            }
        }

        log_info!("imu: settling for {} ms", cal.settle_time.to_millis());
        self.clock.delay_ms(cal.settle_time.to_millis());

        let sums = self.sample_sums(&mut report);
        let n = cal.samples as f32;
        let residual = |sum: i64| -(sum as f32) / n;

        report.software = SoftwareOffsets {
            accel: V3::new(
                residual(sums.accel[0]),
                residual(sums.accel[1]),
                residual(sums.accel[2]),
            ),
            gyro:  V3::new(
                residual(sums.gyro[0]),
                residual(sums.gyro[1]),
                residual(sums.gyro[2]),
            ),
        };
        self.offsets = report.software;

        log_info!(
            "imu: calibration done, {} failed writes, {} failed reads",
            report.failed_writes,
            report.failed_reads
        );

        Ok(report)
    }

    fn sample_sums(&mut self, report: &mut CalibrationReport) -> Sums {
        let one_g = self.settings.calibration.acc_one_g;
        let mut sums = Sums::default();
        let mut last = RawSample::default();

        for _ in 0..self.settings.calibration.samples {
            match self.read_raw() {
                Ok(raw) => last = raw,
                Err(_) => report.failed_reads += 1,
            }
            sums.add(&last, one_g);
        }

        sums
    }

    fn calibration_failure(&self, step: &str, err: &IMUError<T::Error>, count: &mut u32) {
        match err {
            IMUError::Hardware(_) => log_warn!("imu: calibration step failed: {}", step),
            _ => log_warn!("imu: calibration step rejected: {}", step),
        }
        *count += 1;
    }
}
