pub mod calibration;
pub mod config;
pub mod registers;

use byteorder::{BigEndian, ByteOrder};
use fugit::HertzU32;

use crate::bus::{Clock, Instant, Transport};
use crate::consts::*;
use crate::sensors::filtering::SensorFilters;
use crate::sensors::{PhysicalSample, RawSample, V3};

pub use self::calibration::{CalibrationReport, DeviceOffsets, SoftwareOffsets};
pub use self::config::*;
use self::registers::*;

#[derive(Debug)]
pub enum IMUError<E> {
    /// Transport failure
    Hardware(E),
    /// WHO_AM_I returned something other than 0x68
    IdentityMismatch(u8),
    /// unset range or sentinel, sample rate outside 4..=1000 Hz
    InvalidConfiguration,
    /// DEVICE_RESET never cleared
    ResetTimeout,
    Filter(biquad::Errors),
}

/// MPU-6050 over a [`Transport`].
///
/// Holds the last burst in raw counts and as a filtered [`PhysicalSample`].
/// The control loop calls [`IMU::start_read`], whoever owns the transfer
/// completion calls [`IMU::complete_read`] with the landed bytes.
pub struct IMU<T, C> {
    transport:    T,
    clock:        C,
    settings:     ImuConfig,
    config:       DeviceConfig,
    filters:      SensorFilters,
    raw:          RawSample,
    sample:       PhysicalSample,
    offsets:      SoftwareOffsets,
    read_started: Option<Instant>,
    delta_t:      f32,
    init_time:    Option<Instant>,
}

/// new
impl<T: Transport, C: Clock> IMU<T, C> {
    pub fn new(transport: T, clock: C, settings: ImuConfig) -> Result<Self, IMUError<T::Error>> {
        let filters = SensorFilters::new(
            settings.filter_sample_freq,
            settings.acc_cutoff,
            settings.gyro_cutoff,
        )
        .map_err(IMUError::Filter)?;

        Ok(Self {
            transport,
            clock,
            settings,
            config: DeviceConfig::default(),
            filters,
            raw: RawSample::default(),
            sample: PhysicalSample::default(),
            offsets: SoftwareOffsets::default(),
            read_started: None,
            delta_t: 0.0,
            init_time: None,
        })
    }

    pub fn release(self) -> (T, C) {
        (self.transport, self.clock)
    }
}

/// init
impl<T: Transport, C: Clock> IMU<T, C> {
    /// Full bring-up, stops at the first failing step.
    ///
    /// Cached configuration is cleared first so a retry writes every
    /// register again.
    pub fn initialize(&mut self) -> Result<(), IMUError<T::Error>> {
        self.config = DeviceConfig::default();
        self.init_time = None;

        log_info!("imu: reset");
        self.write_reg(IMURegister::PWR_MGMT_1, PwrMgmt1::DEVICE_RESET.bits())?;
        self.wait_reset()?;

        /// gyro, accel, temp
        self.write_reg(IMURegister::SIGNAL_PATH_RESET, SignalPathReset::all().bits())?;
        self.clock.delay_ms(SIGNAL_RESET_DELAY.to_millis());

        /// wake, clock from the Z gyro PLL
        self.write_reg(IMURegister::PWR_MGMT_1, PwrMgmt1::CLKSEL_PLL_Z.bits())?;
        self.clock.delay_ms(WAKE_DELAY.to_millis());

        self.write_reg(IMURegister::PWR_MGMT_2, PwrMgmt2::empty().bits())?;

        let id = self.read_reg(IMURegister::WHO_AM_I)?;
        if id != WHO_AM_I_VALUE {
            log_warn!("imu: WHO_AM_I = {:?}, expected {:?}", id, WHO_AM_I_VALUE);
            return Err(IMUError::IdentityMismatch(id));
        }

        self.set_interrupt(false)?;

        /// active high, push-pull, pulsed, no fsync
        self.write_reg(IMURegister::INT_PIN_CFG, IntPinCfg::empty().bits())?;
        self.write_reg(IMURegister::USER_CTRL, UserCtrl::I2C_MST_EN.bits())?;

        self.set_gyro_range(self.settings.gyro_range)?;
        self.set_accel_range(self.settings.accel_range)?;
        self.set_lpf(self.settings.lpf)?;
        self.set_sample_rate(self.settings.sample_rate)?;

        self.set_interrupt(true)?;

        self.init_time = Some(self.clock.now());
        log_info!("imu: initialized");

        Ok(())
    }

    fn wait_reset(&mut self) -> Result<(), IMUError<T::Error>> {
        for _ in 0..self.settings.reset_poll_limit {
            let pwr = PwrMgmt1::from_bits_truncate(self.read_reg(IMURegister::PWR_MGMT_1)?);
            if !pwr.contains(PwrMgmt1::DEVICE_RESET) {
                return Ok(());
            }
            self.clock.delay_ms(RESET_POLL_DELAY.to_millis());
        }
        log_warn!("imu: reset did not complete");
        Err(IMUError::ResetTimeout)
    }
}

/// device configuration
impl<T: Transport, C: Clock> IMU<T, C> {
    pub fn set_gyro_range(&mut self, range: GyroRange) -> Result<(), IMUError<T::Error>> {
        let full_scale = match range.full_scale() {
            Some(fs) => fs,
            None => return Err(IMUError::InvalidConfiguration),
        };
        if self.config.gyro_range == range {
            return Ok(());
        }

        self.write_reg(IMURegister::GYRO_CONFIG, range.to_val())?;
        self.config.gyro_range = range;
        self.config.g_mult = lsb_multiplier(full_scale);

        log_debug!("imu: gyro range {:?}", range);
        Ok(())
    }

    pub fn set_accel_range(&mut self, range: AccelRange) -> Result<(), IMUError<T::Error>> {
        let full_scale = match range.full_scale() {
            Some(fs) => fs,
            None => return Err(IMUError::InvalidConfiguration),
        };
        if self.config.accel_range == range {
            return Ok(());
        }

        self.write_reg(IMURegister::ACCEL_CONFIG, range.to_val())?;
        self.config.accel_range = range;
        self.config.a_mult = lsb_multiplier(full_scale);

        log_debug!("imu: accel range {:?}", range);
        Ok(())
    }

    pub fn set_lpf(&mut self, lpf: LowPassBandwidth) -> Result<(), IMUError<T::Error>> {
        if lpf == LowPassBandwidth::NotSet {
            return Err(IMUError::InvalidConfiguration);
        }
        if self.config.lpf == lpf {
            return Ok(());
        }

        self.write_reg(IMURegister::CONFIG, lpf.to_val())?;
        self.config.lpf = lpf;

        Ok(())
    }

    /// Output rate derived from the 1 kHz internal clock
    pub fn set_sample_rate(&mut self, rate: HertzU32) -> Result<(), IMUError<T::Error>> {
        let divider = match sample_rate_divider(rate) {
            Some(d) => d,
            None => return Err(IMUError::InvalidConfiguration),
        };
        if self.config.sample_rate == Some(rate) {
            return Ok(());
        }

        self.write_reg(IMURegister::SMPLRT_DIV, divider)?;
        self.config.sample_rate = Some(rate);
        self.config.divider = Some(divider);

        log_debug!("imu: sample rate {} Hz, divider {}", rate.raw(), divider);
        Ok(())
    }

    /// Data ready interrupt on the INT pin
    pub fn set_interrupt(&mut self, enable: bool) -> Result<(), IMUError<T::Error>> {
        let val = if enable {
            IntEnable::DATA_RDY_EN
        } else {
            IntEnable::empty()
        };
        self.write_reg(IMURegister::INT_ENABLE, val.bits())
    }
}

/// SMPLRT_DIV for `rate`, None outside 4..=1000 Hz
pub fn sample_rate_divider(rate: HertzU32) -> Option<u8> {
    let base = SENSOR_FREQ.raw();
    let rate = rate.raw();
    if rate == 0 || rate > base {
        return None;
    }
    u8::try_from((base - rate) / rate).ok()
}

/// acquisition
impl<T: Transport, C: Clock> IMU<T, C> {
    /// Queue the 14 byte burst. `delta_t` becomes the time since the
    /// previous call.
    pub fn start_read(&mut self) -> Result<(), IMUError<T::Error>> {
        let now = self.clock.now();
        if let Some(prev) = self.read_started {
            if let Some(dt) = now.checked_duration_since(prev) {
                self.delta_t = dt.to_micros() as f32 * 1e-6;
            }
        }
        self.read_started = Some(now);

        self.transport
            .start_read_regs(IMURegister::ACCEL_XOUT_H, BURST_LEN)
            .map_err(IMUError::Hardware)
    }

    /// Completion of [`IMU::start_read`]. Only call with a burst that
    /// actually landed, nothing here can tell stale bytes apart.
    pub fn complete_read(&mut self, buf: &[u8; BURST_LEN]) {
        self.raw = parse_burst(buf);

        let a = self.config.a_mult;
        let g = self.config.g_mult;
        let acc = V3::new(
            (self.raw.accel[0] as f32 + self.offsets.accel.x) * a,
            (self.raw.accel[1] as f32 + self.offsets.accel.y) * a,
            (self.raw.accel[2] as f32 + self.offsets.accel.z) * a,
        );
        let gyro = V3::new(
            (self.raw.gyro[0] as f32 + self.offsets.gyro.x) * g,
            (self.raw.gyro[1] as f32 + self.offsets.gyro.y) * g,
            (self.raw.gyro[2] as f32 + self.offsets.gyro.z) * g,
        );

        self.sample = self.filters.update(acc, gyro);
    }

    /// Blocking burst read, bypasses offsets and filters
    pub fn read_raw(&mut self) -> Result<RawSample, IMUError<T::Error>> {
        let mut buf = [0u8; BURST_LEN];
        self.transport
            .read_regs(IMURegister::ACCEL_XOUT_H, &mut buf, self.settings.bus_timeout)
            .map_err(IMUError::Hardware)?;
        Ok(parse_burst(&buf))
    }

    /// Consumes a pending data ready edge
    pub fn data_ready(&mut self) -> bool {
        self.transport.take_data_ready()
    }

    pub fn reset_filters(&mut self) {
        self.filters.reset();
    }
}

/// accel x/y/z, temp, gyro x/y/z
pub fn parse_burst(buf: &[u8; BURST_LEN]) -> RawSample {
    let word = |i: usize| BigEndian::read_i16(&buf[i * 2..]);
    RawSample::new(
        [word(0), word(1), word(2)],
        word(3),
        [word(4), word(5), word(6)],
    )
}

/// getters
impl<T, C> IMU<T, C> {
    pub fn raw(&self) -> RawSample {
        self.raw
    }

    pub fn raw_accel(&self) -> [i16; 3] {
        self.raw.accel
    }

    pub fn raw_gyro(&self) -> [i16; 3] {
        self.raw.gyro
    }

    pub fn raw_temp(&self) -> i16 {
        self.raw.temp
    }

    /// datasheet: 340 LSB/°C, 36.53 °C at zero
    pub fn temperature_celsius(&self) -> f32 {
        self.raw.temp as f32 / 340.0 + 36.53
    }

    pub fn sample(&self) -> PhysicalSample {
        self.sample
    }

    /// g
    pub fn accel(&self) -> V3 {
        self.sample.accel
    }

    /// deg/s
    pub fn gyro(&self) -> V3 {
        self.sample.gyro
    }

    /// seconds between the last two [`IMU::start_read`] calls
    pub fn delta_t(&self) -> f32 {
        self.delta_t
    }

    pub fn config(&self) -> &DeviceConfig {
        &self.config
    }

    pub fn settings(&self) -> &ImuConfig {
        &self.settings
    }

    pub fn offsets(&self) -> SoftwareOffsets {
        self.offsets
    }

    pub fn init_time(&self) -> Option<Instant> {
        self.init_time
    }

    pub fn transport_mut(&mut self) -> &mut T {
        &mut self.transport
    }

    pub fn clock_mut(&mut self) -> &mut C {
        &mut self.clock
    }
}

/// register access
impl<T: Transport, C: Clock> IMU<T, C> {
    fn write_reg(&mut self, reg: IMURegister, val: u8) -> Result<(), IMUError<T::Error>> {
        self.write_regs(reg, &[val])
    }

    fn write_regs(&mut self, reg: IMURegister, data: &[u8]) -> Result<(), IMUError<T::Error>> {
        self.transport
            .write_regs(reg, data, self.settings.bus_timeout)
            .map_err(IMUError::Hardware)
    }

    fn read_reg(&mut self, reg: IMURegister) -> Result<u8, IMUError<T::Error>> {
        let mut out = [0u8; 1];
        self.read_regs(reg, &mut out)?;
        Ok(out[0])
    }

    fn read_regs(&mut self, reg: IMURegister, buf: &mut [u8]) -> Result<(), IMUError<T::Error>> {
        self.transport
            .read_regs(reg, buf, self.settings.bus_timeout)
            .map_err(IMUError::Hardware)
    }
}
