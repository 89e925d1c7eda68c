use core::f32::consts::PI;

use fugit::{HertzU32, MillisDurationU32};

/// Internal sample clock of the sensor when the DLPF is enabled
pub const SENSOR_FREQ: HertzU32 = HertzU32::Hz(1000);
// pub const SENSOR_FREQ: HertzU32 = HertzU32::Hz(8000);

/// Software filter bank design rate and cutoffs
pub const FILTER_SAMPLE_FREQ: HertzU32 = HertzU32::Hz(1000);
pub const FILTER_CUTOFF_ACC: HertzU32 = HertzU32::Hz(10);
pub const FILTER_CUTOFF_GYRO: HertzU32 = HertzU32::Hz(60);

pub const BUS_TIMEOUT: MillisDurationU32 = MillisDurationU32::millis(100);

/// Bring-up waits
pub const SIGNAL_RESET_DELAY: MillisDurationU32 = MillisDurationU32::millis(100);
pub const WAKE_DELAY: MillisDurationU32 = MillisDurationU32::millis(50);
pub const RESET_POLL_DELAY: MillisDurationU32 = MillisDurationU32::millis(1);
pub const RESET_POLL_LIMIT: u32 = 100;

pub const ADC_BITS: u32 = 16;

pub mod calibration {
    use fugit::MillisDurationU32;

    pub const SAMPLES: u16 = 500;

    /// raw accel Z at +1 g on the ±16 g range
    pub const ACC_ONE_G_16: i32 = 2048;

    pub const SETTLE_TIME: MillisDurationU32 = MillisDurationU32::millis(5000);
}

pub mod ahrs_vals {
    /// weight of the gyro integrated angle
    pub const COMPLEMENTARY_COEFFICIENT: f32 = 0.98;

    pub const MAHONY_KP: f32 = 2.0;
    pub const MAHONY_KI: f32 = 0.1;

    /// seconds, independent of the measured loop period
    pub const MAHONY_STEP: f32 = 0.001;

    /// rad/s
    pub const MAHONY_INTEGRAL_LIMIT: f32 = 1.0;
}

pub const DEG_TO_RAD: f32 = PI / 180.0;
pub const RAD_TO_DEG: f32 = 180.0 / PI;
