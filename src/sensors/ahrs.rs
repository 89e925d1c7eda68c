pub mod complementary;
pub mod mahony;

use nalgebra::Quaternion;

use super::{PhysicalSample, Quat, V3};
use crate::consts::ahrs_vals::*;

pub use self::complementary::*;
pub use self::mahony::*;

/// One orientation update step, writing into the shared angles
pub trait AHRS {
    fn update(&mut self, angles: &mut EulerAngles, gyro: V3, acc: V3, delta_time: f32);

    fn reset(&mut self);
}

/// degrees
#[derive(Debug, Default, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct EulerAngles {
    pub roll:  f32,
    pub pitch: f32,
    pub yaw:   f32,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AhrsConfig {
    /// weight of the gyro integrated angle
    pub complementary_coefficient: f32,
    pub mahony_kp:                 f32,
    /// 0 disables integral feedback
    pub mahony_ki:                 f32,
    /// seconds per Mahony update
    pub mahony_step:               f32,
    /// rad/s, per axis
    pub mahony_integral_limit:     f32,
}

impl Default for AhrsConfig {
    fn default() -> Self {
        Self {
            complementary_coefficient: COMPLEMENTARY_COEFFICIENT,
            mahony_kp:                 MAHONY_KP,
            mahony_ki:                 MAHONY_KI,
            mahony_step:               MAHONY_STEP,
            mahony_integral_limit:     MAHONY_INTEGRAL_LIMIT,
        }
    }
}

/// Orientation estimate fed by the filtered IMU output.
///
/// Both estimators write the same roll/pitch/yaw, use one or the other per
/// loop iteration.
#[derive(Debug, Clone, Copy)]
pub struct Attitude {
    angles:        EulerAngles,
    complementary: AhrsComplementary,
    mahony:        AhrsMahony,
}

impl Default for Attitude {
    fn default() -> Self {
        Self::new(AhrsConfig::default())
    }
}

/// new
impl Attitude {
    pub fn new(cfg: AhrsConfig) -> Self {
        Self {
            angles:        EulerAngles::default(),
            complementary: AhrsComplementary::new(cfg.complementary_coefficient),
            mahony:        AhrsMahony::new(
                cfg.mahony_kp,
                cfg.mahony_ki,
                cfg.mahony_step,
                cfg.mahony_integral_limit,
            ),
        }
    }
}

/// update
impl Attitude {
    /// Complementary tilt filter, `delta_t` in seconds
    pub fn compute_euler(&mut self, sample: &PhysicalSample, delta_t: f32) {
        self.complementary
            .update(&mut self.angles, sample.gyro, sample.accel, delta_t);
    }

    /// Mahony filter, always integrates its own fixed step
    pub fn compute_mahony(&mut self, sample: &PhysicalSample) {
        let step = self.mahony.step();
        self.mahony
            .update(&mut self.angles, sample.gyro, sample.accel, step);
    }

    pub fn reset_integrators(&mut self) {
        self.complementary.reset();
        self.mahony.reset();
        self.angles = EulerAngles::default();
        log_debug!("ahrs: integrators reset");
    }
}

/// getters
impl Attitude {
    pub fn euler(&self) -> EulerAngles {
        self.angles
    }

    pub fn quaternion(&self) -> Quat {
        self.mahony.quat()
    }
}

pub(crate) fn identity() -> Quat {
    Quaternion::new(1.0, 0.0, 0.0, 0.0)
}
