use crate::consts::RAD_TO_DEG;

pub fn rad_to_deg(rad: f32) -> f32 {
    rad * 180.0 / core::f32::consts::PI
}

pub fn deg_to_rad(deg: f32) -> f32 {
    deg * core::f32::consts::PI / 180.0
}

/// 1 / sqrt(x), magic constant and a single Newton step.
///
/// Worst case relative error is about 0.175 %. The AHRS gains are tuned
/// against this bias, do not swap in an exact square root.
#[inline]
pub fn inv_sqrt(x: f32) -> f32 {
    let i = x.to_bits() as i32;
    let i = 0x5f37_59df_i32.wrapping_sub(i >> 1);
    let y = f32::from_bits(i as u32);

    y * (1.5 - (0.5 * x * y * y))
}

/// atan2 in degrees.
///
/// Rational polynomial over min(|x|,|y|) / max(|x|,|y|), then folded back
/// into the right quadrant. https://github.com/betaflight/betaflight/blob/master/src/main/common/maths.c
pub fn atan2_deg(y: f32, x: f32) -> f32 {
    const ATAN_POLY_COEF1: f32 = 3.145_516_7e-7;
    const ATAN_POLY_COEF2: f32 = 0.999_973_6;
    const ATAN_POLY_COEF3: f32 = 0.147_440_07;
    const ATAN_POLY_COEF4: f32 = 0.309_981_43;
    const ATAN_POLY_COEF5: f32 = 0.050_301_764;
    const ATAN_POLY_COEF6: f32 = 0.147_103_91;
    const ATAN_POLY_COEF7: f32 = 0.644_464_07;

    let abs_x = abs(x);
    let abs_y = abs(y);

    let mut result = if abs_x > abs_y { abs_x } else { abs_y };

    if result != 0.0 {
        result = (if abs_x < abs_y { abs_x } else { abs_y }) / result;
    }

    result = -((((ATAN_POLY_COEF5 * result - ATAN_POLY_COEF4) * result - ATAN_POLY_COEF3)
        * result
        - ATAN_POLY_COEF2)
        * result
        - ATAN_POLY_COEF1)
        / ((ATAN_POLY_COEF7 * result + ATAN_POLY_COEF6) * result + 1.0);
    result *= RAD_TO_DEG;

    if abs_y > abs_x {
        result = 90.0 - result;
    }
    if x < 0.0 {
        result = 180.0 - result;
    }
    if y < 0.0 {
        result = -result;
    }

    result
}

/// atan in degrees, http://nghiaho.com/?p=997
///
/// Coarser than [`atan2_deg`], max error just under 0.09 degrees.
pub fn atan_deg(z: f32) -> f32 {
    if z < 0.0 {
        return -atan_deg(-z);
    }

    if z > 1.0 {
        return 90.0 - atan_deg(1.0 / z);
    }

    z * (45.0 - (z - 1.0) * (14.0 + 3.83 * z))
}

#[inline(always)]
fn abs(x: f32) -> f32 {
    f32::from_bits(x.to_bits() & 0x7fff_ffff)
}
