use nalgebra::ComplexField;

use super::{EulerAngles, AHRS, V3};
use crate::math::*;

/// Gyro integration blended with the tilt seen by the accelerometer.
///
/// Roll integrates gyro Y and pitch integrates gyro X, matching how the
/// sensor is mounted. Yaw has no reference and drifts freely.
#[derive(Debug, Clone, Copy)]
pub struct AhrsComplementary {
    coefficient: f32,
}

/// new
impl AhrsComplementary {
    pub fn new(coefficient: f32) -> Self {
        Self { coefficient }
    }
}

/// update
impl AHRS for AhrsComplementary {
    fn update(&mut self, angles: &mut EulerAngles, gyro: V3, acc: V3, delta_time: f32) {
        let acc_roll = atan2_deg(acc.y, acc.z);
        let acc_pitch = atan2_deg(-acc.x, ComplexField::sqrt(acc.y * acc.y + acc.z * acc.z));

        let k = self.coefficient;
        angles.roll = k * (angles.roll + gyro.y * delta_time) + (1.0 - k) * acc_roll;
        angles.pitch = k * (angles.pitch + gyro.x * delta_time) + (1.0 - k) * acc_pitch;

        angles.yaw += gyro.z * delta_time;
    }

    /// stateless, the angles live in the caller
    fn reset(&mut self) {}
}
