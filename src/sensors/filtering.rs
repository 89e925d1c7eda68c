use fugit::HertzU32;

use super::{PhysicalSample, V3};

pub use self::biquad_wrapper::*;

/// Per axis low pass, accel and gyro each get their own cutoff.
///
/// Every channel keeps its own biquad state, nothing is shared across axes.
#[derive(Clone, Copy)]
pub struct SensorFilters {
    acc_lowpass:  BiquadFilter,
    gyro_lowpass: BiquadFilter,
}

/// new
impl SensorFilters {
    pub fn new(
        sampling_freq: HertzU32,
        acc_cutoff: HertzU32,
        gyro_cutoff: HertzU32,
    ) -> Result<Self, biquad::Errors> {
        let acc_lowpass = BiquadFilter::new_lowpass(acc_cutoff, sampling_freq)?;
        let gyro_lowpass = BiquadFilter::new_lowpass(gyro_cutoff, sampling_freq)?;

        log_debug!(
            "filter bank: acc {} Hz, gyro {} Hz @ {} Hz",
            acc_cutoff.raw(),
            gyro_cutoff.raw(),
            sampling_freq.raw()
        );

        Ok(Self {
            acc_lowpass,
            gyro_lowpass,
        })
    }
}

/// update
impl SensorFilters {
    /// All six channels advance together
    pub fn update(&mut self, acc: V3, gyro: V3) -> PhysicalSample {
        PhysicalSample {
            accel: self.update_acc(acc),
            gyro:  self.update_gyro(gyro),
        }
    }

    pub fn update_acc(&mut self, acc: V3) -> V3 {
        self.acc_lowpass.apply(acc)
    }

    pub fn update_gyro(&mut self, gyro: V3) -> V3 {
        self.gyro_lowpass.apply(gyro)
    }

    pub fn reset(&mut self) {
        self.acc_lowpass.reset();
        self.gyro_lowpass.reset();
    }
}

mod biquad_wrapper {
    use super::V3;

    use biquad::*;
    use fugit::HertzU32;

    /// Three independent second order sections sharing one design
    #[derive(Clone, Copy)]
    pub struct BiquadFilter {
        coeffs: Coefficients<f32>,
        x: DirectForm2Transposed<f32>,
        y: DirectForm2Transposed<f32>,
        z: DirectForm2Transposed<f32>,
    }

    /// new
    impl BiquadFilter {
        pub fn new(
            cutoff_freq: Hertz<f32>,
            sampling_freq: Hertz<f32>,
            filter_type: Type<f32>,
        ) -> Result<Self, Errors> {
            let coeffs = Coefficients::<f32>::from_params(
                filter_type,
                sampling_freq,
                cutoff_freq,
                Q_BUTTERWORTH_F32,
            )?;
            let x = DirectForm2Transposed::<f32>::new(coeffs);
            let y = DirectForm2Transposed::<f32>::new(coeffs);
            let z = DirectForm2Transposed::<f32>::new(coeffs);

            Ok(Self { coeffs, x, y, z })
        }

        pub fn new_lowpass(cutoff_freq: HertzU32, sampling_freq: HertzU32) -> Result<Self, Errors> {
            let cutoff = Hertz::<f32>::from_hz(cutoff_freq.raw() as f32)?;
            let sampling = Hertz::<f32>::from_hz(sampling_freq.raw() as f32)?;
            Self::new(cutoff, sampling, Type::LowPass)
        }
    }

    /// apply
    impl BiquadFilter {
        pub fn apply(&mut self, input: V3) -> V3 {
            let x = self.x.run(input.x);
            let y = self.y.run(input.y);
            let z = self.z.run(input.z);

            V3::new(x, y, z)
        }

        pub fn reset(&mut self) {
            self.x = DirectForm2Transposed::<f32>::new(self.coeffs);
            self.y = DirectForm2Transposed::<f32>::new(self.coeffs);
            self.z = DirectForm2Transposed::<f32>::new(self.coeffs);
        }
    }
}
