//! Register map, https://invensense.tdk.com/wp-content/uploads/2015/02/MPU-6000-Register-Map1.pdf

use bitflags::bitflags;

/// AD0 low
pub const I2C_ADDRESS: u8 = 0x68;

pub const WHO_AM_I_VALUE: u8 = 0x68;

/// accel x/y/z, temp, gyro x/y/z, all big endian i16
pub const BURST_LEN: usize = 14;

pub const OFFSET_BLOCK_LEN: usize = 6;

#[allow(non_camel_case_types)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[repr(u8)]
pub enum IMURegister {
    XA_OFFS_H         = 0x06,
    XA_OFFS_L         = 0x07,
    YA_OFFS_H         = 0x08,
    YA_OFFS_L         = 0x09,
    ZA_OFFS_H         = 0x0A,
    ZA_OFFS_L         = 0x0B,

    XG_OFFS_USRH      = 0x13,
    XG_OFFS_USRL      = 0x14,
    YG_OFFS_USRH      = 0x15,
    YG_OFFS_USRL      = 0x16,
    ZG_OFFS_USRH      = 0x17,
    ZG_OFFS_USRL      = 0x18,

    SMPLRT_DIV        = 0x19,
    CONFIG            = 0x1A,
    GYRO_CONFIG       = 0x1B,
    ACCEL_CONFIG      = 0x1C,

    INT_PIN_CFG       = 0x37,
    INT_ENABLE        = 0x38,
    INT_STATUS        = 0x3A,

    ACCEL_XOUT_H      = 0x3B,
    ACCEL_XOUT_L      = 0x3C,
    ACCEL_YOUT_H      = 0x3D,
    ACCEL_YOUT_L      = 0x3E,
    ACCEL_ZOUT_H      = 0x3F,
    ACCEL_ZOUT_L      = 0x40,
    TEMP_OUT_H        = 0x41,
    TEMP_OUT_L        = 0x42,
    GYRO_XOUT_H       = 0x43,
    GYRO_XOUT_L       = 0x44,
    GYRO_YOUT_H       = 0x45,
    GYRO_YOUT_L       = 0x46,
    GYRO_ZOUT_H       = 0x47,
    GYRO_ZOUT_L       = 0x48,

    SIGNAL_PATH_RESET = 0x68,
    USER_CTRL         = 0x6A,
    PWR_MGMT_1        = 0x6B,
    PWR_MGMT_2        = 0x6C,

    WHO_AM_I          = 0x75,
}

impl IMURegister {
    pub fn to_addr(self) -> u8 {
        self as u8
    }
}

bitflags! {
    pub struct PwrMgmt1: u8 {
        const DEVICE_RESET = 0b1000_0000;
        const SLEEP        = 0b0100_0000;
        const CYCLE        = 0b0010_0000;
        const TEMP_DIS     = 0b0000_1000;
        /// PLL with Z axis gyro reference
        const CLKSEL_PLL_Z = 0b0000_0011;
    }
}

bitflags! {
    /// all clear = every axis enabled
    pub struct PwrMgmt2: u8 {
        const STBY_XA = 0b0010_0000;
        const STBY_YA = 0b0001_0000;
        const STBY_ZA = 0b0000_1000;
        const STBY_XG = 0b0000_0100;
        const STBY_YG = 0b0000_0010;
        const STBY_ZG = 0b0000_0001;
    }
}

bitflags! {
    pub struct SignalPathReset: u8 {
        const GYRO_RESET  = 0b0000_0100;
        const ACCEL_RESET = 0b0000_0010;
        const TEMP_RESET  = 0b0000_0001;
    }
}

bitflags! {
    /// all clear = active high, push-pull, 50 us pulse
    pub struct IntPinCfg: u8 {
        const INT_LEVEL     = 0b1000_0000;
        const INT_OPEN      = 0b0100_0000;
        const LATCH_INT_EN  = 0b0010_0000;
        const INT_RD_CLEAR  = 0b0001_0000;
        const I2C_BYPASS_EN = 0b0000_0010;
    }
}

bitflags! {
    pub struct UserCtrl: u8 {
        const FIFO_EN        = 0b0100_0000;
        /// auxiliary bus master, the value bring-up writes
        const I2C_MST_EN     = 0b0010_0000;
        /// SPI only, keep clear on I2C
        const I2C_IF_DIS     = 0b0001_0000;
        const FIFO_RESET     = 0b0000_0100;
        const I2C_MST_RESET  = 0b0000_0010;
        const SIG_COND_RESET = 0b0000_0001;
    }
}

bitflags! {
    pub struct IntEnable: u8 {
        const DATA_RDY_EN = 0b0000_0001;
    }
}

/// Factory accel trim keeps a temperature compensation flag in bit 0
pub const ACCEL_TRIM_TC_BIT: u16 = 0x0001;
