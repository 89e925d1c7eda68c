use fugit::{HertzU32, MillisDurationU32};

use crate::consts::*;

/// Register byte for GYRO_CONFIG, FS_SEL in bits 4:3
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[repr(u8)]
pub enum GyroRange {
    Dps250  = 0x00,
    Dps500  = 0x08,
    Dps1000 = 0x10,
    Dps2000 = 0x18,
    NotSet  = 0xFF,
}

impl GyroRange {
    pub fn to_val(self) -> u8 {
        self as u8
    }

    /// full scale in deg/s, None for the sentinel
    pub fn full_scale(self) -> Option<f32> {
        match self {
            Self::Dps250 => Some(250.0),
            Self::Dps500 => Some(500.0),
            Self::Dps1000 => Some(1000.0),
            Self::Dps2000 => Some(2000.0),
            Self::NotSet => None,
        }
    }
}

/// Register byte for ACCEL_CONFIG, AFS_SEL in bits 4:3
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[repr(u8)]
pub enum AccelRange {
    G2     = 0x00,
    G4     = 0x08,
    G8     = 0x10,
    G16    = 0x18,
    NotSet = 0xFF,
}

impl AccelRange {
    pub fn to_val(self) -> u8 {
        self as u8
    }

    /// full scale in g, None for the sentinel
    pub fn full_scale(self) -> Option<f32> {
        match self {
            Self::G2 => Some(2.0),
            Self::G4 => Some(4.0),
            Self::G8 => Some(8.0),
            Self::G16 => Some(16.0),
            Self::NotSet => None,
        }
    }
}

/// DLPF_CFG in CONFIG. Anything but 256 Hz drops the gyro output rate to 1 kHz
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[repr(u8)]
pub enum LowPassBandwidth {
    Hz256  = 0,
    Hz188  = 1,
    Hz98   = 2,
    Hz42   = 3,
    Hz20   = 4,
    Hz10   = 5,
    Hz5    = 6,
    NotSet = 0xFF,
}

impl LowPassBandwidth {
    pub fn to_val(self) -> u8 {
        self as u8
    }
}

/// Per LSB scale of a signed 16 bit ADC spanning +-full_scale
pub fn lsb_multiplier(full_scale: f32) -> f32 {
    full_scale / (1u32 << (ADC_BITS - 1)) as f32
}

/// Configuration last accepted by the device.
///
/// `g_mult` / `a_mult` are 0 until the matching range has been written.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct DeviceConfig {
    pub gyro_range:  GyroRange,
    pub accel_range: AccelRange,
    pub lpf:         LowPassBandwidth,
    pub sample_rate: Option<HertzU32>,
    pub divider:     Option<u8>,
    pub g_mult:      f32,
    pub a_mult:      f32,
}

impl Default for DeviceConfig {
    fn default() -> Self {
        Self {
            gyro_range:  GyroRange::NotSet,
            accel_range: AccelRange::NotSet,
            lpf:         LowPassBandwidth::NotSet,
            sample_rate: None,
            divider:     None,
            g_mult:      0.0,
            a_mult:      0.0,
        }
    }
}

/// Driver settings, everything the bring-up and calibration sequences need
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ImuConfig {
    pub bus_timeout:        MillisDurationU32,
    pub gyro_range:         GyroRange,
    pub accel_range:        AccelRange,
    pub lpf:                LowPassBandwidth,
    pub sample_rate:        HertzU32,
    pub filter_sample_freq: HertzU32,
    pub acc_cutoff:         HertzU32,
    pub gyro_cutoff:        HertzU32,
    pub reset_poll_limit:   u32,
    pub calibration:        CalibrationConfig,
}

impl Default for ImuConfig {
    fn default() -> Self {
        Self {
            bus_timeout:        BUS_TIMEOUT,
            gyro_range:         GyroRange::Dps2000,
            accel_range:        AccelRange::G16,
            lpf:                LowPassBandwidth::Hz188,
            sample_rate:        SENSOR_FREQ,
            filter_sample_freq: FILTER_SAMPLE_FREQ,
            acc_cutoff:         FILTER_CUTOFF_ACC,
            gyro_cutoff:        FILTER_CUTOFF_GYRO,
            reset_poll_limit:   RESET_POLL_LIMIT,
            calibration:        CalibrationConfig::default(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CalibrationConfig {
    pub samples:     u16,
    pub settle_time: MillisDurationU32,
    pub gyro_range:  GyroRange,
    pub accel_range: AccelRange,
    /// raw Z count expected at +1 g on `accel_range`
    pub acc_one_g:   i32,
}

impl Default for CalibrationConfig {
    fn default() -> Self {
        Self {
            samples:     calibration::SAMPLES,
            settle_time: calibration::SETTLE_TIME,
            gyro_range:  GyroRange::Dps1000,
            accel_range: AccelRange::G16,
            acc_one_g:   calibration::ACC_ONE_G_16,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn multipliers_from_full_scale() {
        let g = lsb_multiplier(GyroRange::Dps2000.full_scale().unwrap());
        let a = lsb_multiplier(AccelRange::G16.full_scale().unwrap());
        assert!((g - 0.061_035_156).abs() < 1e-9);
        assert!((a - 0.000_488_281_25).abs() < 1e-12);
    }

    #[test]
    fn sentinel_has_no_scale() {
        assert_eq!(GyroRange::NotSet.full_scale(), None);
        assert_eq!(AccelRange::NotSet.full_scale(), None);
    }

    #[test]
    fn range_bytes() {
        assert_eq!(GyroRange::Dps250.to_val(), 0x00);
        assert_eq!(GyroRange::Dps2000.to_val(), 0x18);
        assert_eq!(AccelRange::G4.to_val(), 0x08);
        assert_eq!(LowPassBandwidth::Hz188.to_val(), 1);
        assert_eq!(LowPassBandwidth::Hz5.to_val(), 6);
    }

    #[test]
    fn defaults() {
        let cfg = ImuConfig::default();
        assert_eq!(cfg.gyro_range, GyroRange::Dps2000);
        assert_eq!(cfg.accel_range, AccelRange::G16);
        assert_eq!(cfg.sample_rate, HertzU32::Hz(1000));
        assert_eq!(cfg.calibration.samples, 500);
        assert_eq!(cfg.calibration.gyro_range, GyroRange::Dps1000);

        let dev = DeviceConfig::default();
        assert_eq!(dev.gyro_range, GyroRange::NotSet);
        assert_eq!(dev.g_mult, 0.0);
    }
}
