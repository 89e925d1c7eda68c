mod common;

use common::*;
use rflight_imu::sensors::filtering::SensorFilters;
use rflight_imu::sensors::imu::registers::IMURegister;
use rflight_imu::sensors::imu::GyroRange;
use rflight_imu::{IMUError, ImuConfig, V3};

// factory trims with bit 0 = 1, 0, 1
const TRIM: [u8; 6] = [0x01, 0x01, 0x02, 0x00, 0xFF, 0xF1];

fn still_imu() -> TestImu {
    let mut imu = initialized();
    let t = imu.transport_mut();
    let start = IMURegister::XA_OFFS_H.to_addr() as usize;
    t.regs[start..start + 6].copy_from_slice(&TRIM);
    t.set_burst(&burst([7, -3, 2048 + 5], 0, [11, -4, 0]));
    imu
}

#[test]
fn device_offsets_keep_trim_bit() {
    let mut imu = still_imu();
    let report = imu.calibrate().unwrap();

    assert!(report.is_clean());
    // 0x0101 - 7, 0x0200 + 3, -15 - 5, each with the original bit 0
    assert_eq!(report.device.accel, [0x00FB, 0x0202, -19]);
    assert_eq!(report.device.gyro, [-11, 4, 0]);

    let t = imu.transport_mut();
    assert_eq!(
        t.block(IMURegister::XA_OFFS_H, 6),
        [0x00, 0xFB, 0x02, 0x02, 0xFF, 0xED]
    );
    assert_eq!(
        t.block(IMURegister::XG_OFFS_USRH, 6),
        [0xFF, 0xF5, 0x00, 0x04, 0x00, 0x00]
    );
    for (orig, written) in TRIM.iter().zip(t.block(IMURegister::XA_OFFS_H, 6)).skip(1).step_by(2) {
        assert_eq!(orig & 1, written & 1);
    }
}

#[test]
fn ranges_switched_and_restored() {
    let mut imu = still_imu();
    imu.calibrate().unwrap();

    let t = imu.transport_mut();
    assert_eq!(t.writes_to(IMURegister::GYRO_CONFIG), [vec![0x10], vec![0x18]]);
    assert!(t.writes_to(IMURegister::ACCEL_CONFIG).is_empty());

    let order: Vec<u8> = t.writes.iter().map(|(r, _)| *r).collect();
    assert_eq!(
        order,
        [
            IMURegister::GYRO_CONFIG.to_addr(),
            IMURegister::XA_OFFS_H.to_addr(),
            IMURegister::XG_OFFS_USRH.to_addr(),
            IMURegister::GYRO_CONFIG.to_addr(),
        ]
    );

    assert_eq!(imu.config().gyro_range, GyroRange::Dps2000);
    assert_eq!(imu.clock_mut().delays.last(), Some(&5000));
}

#[test]
fn software_offsets_from_second_pass() {
    let mut imu = still_imu();
    let report = imu.calibrate().unwrap();

    assert_eq!(report.software.accel, V3::new(-7.0, 3.0, -5.0));
    assert_eq!(report.software.gyro, V3::new(-11.0, 4.0, 0.0));
    assert_eq!(imu.offsets(), report.software);

    // offsets cancel the bias before scaling
    let buf = burst([7, -3, 2048 + 5], 0, [11, -4, 0]);
    imu.complete_read(&buf);

    let cfg = ImuConfig::default();
    let mut reference =
        SensorFilters::new(cfg.filter_sample_freq, cfg.acc_cutoff, cfg.gyro_cutoff).unwrap();
    let expected = reference.update(
        V3::new(0.0, 0.0, 2048.0 * imu.config().a_mult),
        V3::zeros(),
    );
    assert_eq!(imu.sample(), expected);
}

#[test]
fn failed_offset_write_does_not_abort() {
    let mut imu = still_imu();
    imu.transport_mut().fail_writes = vec![IMURegister::XG_OFFS_USRH.to_addr()];

    let report = imu.calibrate().unwrap();

    assert_eq!(report.failed_writes, 1);
    assert_eq!(report.failed_reads, 0);
    assert!(!report.is_clean());
    assert_eq!(report.software.gyro, V3::new(-11.0, 4.0, 0.0));
    assert_eq!(imu.config().gyro_range, GyroRange::Dps2000);
}

#[test]
fn failed_reads_are_counted() {
    let mut imu = still_imu();
    imu.transport_mut().fail_reads = true;

    let report = imu.calibrate().unwrap();

    // trim block plus both passes
    assert_eq!(report.failed_reads, 1 + 2 * 500);
    // accel block skipped without a trim to build on
    assert_eq!(report.failed_writes, 1);
    assert!(imu.transport_mut().writes_to(IMURegister::XA_OFFS_H).is_empty());
    assert_eq!(imu.transport_mut().writes_to(IMURegister::XG_OFFS_USRH).len(), 1);
}

#[test]
fn invalid_calibration_settings() {
    let mut cfg = ImuConfig::default();
    cfg.calibration.gyro_range = GyroRange::NotSet;
    let mut imu = imu_with(FakeTransport::default(), cfg);
    imu.initialize().unwrap();
    imu.transport_mut().writes.clear();

    assert!(matches!(imu.calibrate(), Err(IMUError::InvalidConfiguration)));
    assert!(imu.transport_mut().writes.is_empty());
}

#[test]
fn short_calibration_uses_configured_samples() {
    let mut cfg = ImuConfig::default();
    cfg.calibration.samples = 10;
    let mut transport = FakeTransport::default();
    transport.set_burst(&burst([20, 0, 2048], 0, [0, 0, 30]));
    let mut imu = imu_with(transport, cfg);
    imu.initialize().unwrap();

    let report = imu.calibrate().unwrap();
    assert_eq!(report.device.gyro, [0, 0, -30]);
    assert_eq!(report.software.accel, V3::new(-20.0, 0.0, 0.0));
}

#[test]
fn saturated_axes_over_long_calibration() {
    let mut cfg = ImuConfig::default();
    cfg.calibration.samples = 65000;
    let mut transport = FakeTransport::default();
    transport.set_burst(&burst([0, 0, i16::MIN], 0, [i16::MIN, 0, 0]));
    let mut imu = imu_with(transport, cfg);
    imu.initialize().unwrap();

    let report = imu.calibrate().unwrap();

    assert!(report.is_clean());
    // clamped to the register range, Z trim keeps bit 0 clear
    assert_eq!(report.device.gyro, [i16::MAX, 0, 0]);
    assert_eq!(report.device.accel, [0, 0, i16::MAX - 1]);
    assert_eq!(report.software.accel, V3::new(0.0, 0.0, 32768.0 + 2048.0));
    assert_eq!(report.software.gyro, V3::new(32768.0, 0.0, 0.0));
}
