use nalgebra::ComplexField;

use super::{identity, EulerAngles, Quat, AHRS, V3};
use crate::{consts::DEG_TO_RAD, math::*};

/// Mahony PI filter, gravity only.
///
/// https://x-io.co.uk/open-source-imu-and-ahrs-algorithms/
///
/// Integrates with the fixed `step` instead of the measured loop period,
/// Kp and Ki are tuned against that step and against the bias of
/// [`inv_sqrt`].
#[derive(Debug, Clone, Copy)]
pub struct AhrsMahony {
    quat:           Quat,
    integral:       V3,
    kp:             f32,
    ki:             f32,
    step:           f32,
    integral_limit: f32,
}

/// new
impl AhrsMahony {
    pub fn new(kp: f32, ki: f32, step: f32, integral_limit: f32) -> Self {
        Self {
            quat: identity(),
            integral: V3::zeros(),
            kp,
            ki,
            step,
            integral_limit,
        }
    }
}

/// getters
impl AhrsMahony {
    pub fn quat(&self) -> Quat {
        self.quat
    }

    pub fn integral(&self) -> V3 {
        self.integral
    }

    pub fn step(&self) -> f32 {
        self.step
    }
}

/// update
impl AHRS for AhrsMahony {
    /// `delta_time` is ignored, see [`AhrsMahony`]
    fn update(&mut self, angles: &mut EulerAngles, gyro: V3, acc: V3, _delta_time: f32) {
        let mut rate = gyro * DEG_TO_RAD;

        /// free fall or no data, gyro only
        let acc_norm_sq = acc.norm_squared();
        if acc_norm_sq > 0.0 {
            let acc = acc * inv_sqrt(acc_norm_sq);
            let q = &self.quat;

            /// half the estimated gravity direction
            let half_v = V3::new(
                q.i * q.k - q.w * q.j,
                q.w * q.i + q.j * q.k,
                q.w * q.w - 0.5 + q.k * q.k,
            );

            let half_e = acc.cross(&half_v);

            if self.ki > 0.0 {
                let limit = self.integral_limit;
                self.integral += half_e * (2.0 * self.ki * self.step);
                self.integral = self.integral.map(|x| x.clamp(-limit, limit));
                rate += self.integral;
            }

            rate += half_e * (2.0 * self.kp);
        }

        let r = rate * (0.5 * self.step);
        let (qa, qb, qc, qd) = (self.quat.w, self.quat.i, self.quat.j, self.quat.k);

        let q = Quat::new(
            qa + (-qb * r.x - qc * r.y - qd * r.z),
            qb + (qa * r.x + qc * r.z - qd * r.y),
            qc + (qa * r.y - qb * r.z + qd * r.x),
            qd + (qa * r.z + qb * r.y - qc * r.x),
        );

        self.quat = q * inv_sqrt(q.norm_squared());

        *angles = euler_from_quat(&self.quat);
    }

    fn reset(&mut self) {
        self.quat = identity();
        self.integral = V3::zeros();
    }
}

/// Z-Y-X Tait-Bryan angles in degrees, pitch argument clamped to asin's domain
pub fn euler_from_quat(q: &Quat) -> EulerAngles {
    let (w, x, y, z) = (q.w, q.i, q.j, q.k);
    let y_sq = y * y;

    let t0 = 2.0 * (w * x + y * z);
    let t1 = 1.0 - 2.0 * (x * x + y_sq);

    let t2 = (2.0 * (w * y - z * x)).clamp(-1.0, 1.0);

    let t3 = 2.0 * (w * z + x * y);
    let t4 = 1.0 - 2.0 * (y_sq + z * z);

    EulerAngles {
        roll:  atan2_deg(t0, t1),
        pitch: rad_to_deg(ComplexField::asin(t2)),
        yaw:   atan2_deg(t3, t4),
    }
}
