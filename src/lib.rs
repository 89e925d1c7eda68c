#![allow(unused_doc_comments)]
#![cfg_attr(not(test), no_std)]

//! MPU-6050 driver and attitude estimation for a flight-control loop.
//!
//! Raw register bursts come in through a [`bus::Transport`], are scaled and
//! filtered by [`sensors::imu::IMU`], and are fused into Euler angles and a
//! quaternion by [`sensors::ahrs::Attitude`].

#[macro_use]
pub mod logging;

pub mod bus;
pub mod consts;
pub mod math;
pub mod sensors;

pub use bus::{Clock, I2cError, I2cTransport, Instant, Transport};
pub use sensors::ahrs::{AhrsConfig, Attitude, EulerAngles};
pub use sensors::imu::{CalibrationReport, IMUError, ImuConfig, IMU};
pub use sensors::{PhysicalSample, RawSample, V3};
