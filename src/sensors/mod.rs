pub mod ahrs;
pub mod filtering;
pub mod imu;

use derive_new::new;
use nalgebra::{self as na};

pub type V3 = na::Vector3<f32>;
pub type Quat = na::Quaternion<f32>;

/// One burst worth of raw counts, in register order
#[derive(new, Debug, Default, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct RawSample {
    pub accel: [i16; 3],
    pub temp:  i16,
    pub gyro:  [i16; 3],
}

/// Offset, scaled and filtered sample. g and deg/s
#[derive(Debug, Default, Clone, Copy, PartialEq)]
pub struct PhysicalSample {
    pub accel: V3,
    pub gyro:  V3,
}
