//! Second-order IIR sections built from the RBJ audio EQ cookbook.

use core::f64::consts::PI;

/// Q giving a maximally flat (Butterworth) response.
pub const BUTTERWORTH_Q: f32 = core::f32::consts::FRAC_1_SQRT_2;

/// Normalised biquad coefficients (`a0` folded in).
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct BiquadCoeffs {
    pub b0: f32,
    pub b1: f32,
    pub b2: f32,
    pub a1: f32,
    pub a2: f32,
}

/// Intermediate values shared by every cookbook design.
struct Prototype {
    cos: f64,
    alpha: f64,
}

impl Prototype {
    fn new(sample_rate: f32, freq_hz: f32, q: f32) -> Self {
        let sr = f64::from(sample_rate.max(1.0));
        let upper = 0.49 * sr;
        let freq = f64::from(freq_hz).min(upper).max(upper.min(10.0));
        let q = f64::from(q).max(0.05);
        let omega = 2.0 * PI * freq / sr;
        Self {
            cos: omega.cos(),
            alpha: omega.sin() / (2.0 * q),
        }
    }
}

impl BiquadCoeffs {
    /// Pass-through section.
    pub const IDENTITY: Self = Self {
        b0: 1.0,
        b1: 0.0,
        b2: 0.0,
        a1: 0.0,
        a2: 0.0,
    };

    fn normalised(b0: f64, b1: f64, b2: f64, a0: f64, a1: f64, a2: f64) -> Self {
        let inv_a0 = 1.0 / a0;
        Self {
            b0: (b0 * inv_a0) as f32,
            b1: (b1 * inv_a0) as f32,
            b2: (b2 * inv_a0) as f32,
            a1: (a1 * inv_a0) as f32,
            a2: (a2 * inv_a0) as f32,
        }
    }

    /// Bell filter boosting or cutting `gain_db` around `freq_hz`.
    pub fn peak(sample_rate: f32, freq_hz: f32, gain_db: f32, q: f32) -> Self {
        let p = Prototype::new(sample_rate, freq_hz, q);
        let a = 10f64.powf(f64::from(gain_db) / 40.0);
        Self::normalised(
            1.0 + p.alpha * a,
            -2.0 * p.cos,
            1.0 - p.alpha * a,
            1.0 + p.alpha / a,
            -2.0 * p.cos,
            1.0 - p.alpha / a,
        )
    }

    pub fn low_shelf(sample_rate: f32, freq_hz: f32, gain_db: f32, q: f32) -> Self {
        let p = Prototype::new(sample_rate, freq_hz, q);
        let a = 10f64.powf(f64::from(gain_db) / 40.0);
        let two_sqrt_a_alpha = 2.0 * a.sqrt() * p.alpha;
        Self::normalised(
            a * ((a + 1.0) - (a - 1.0) * p.cos + two_sqrt_a_alpha),
            2.0 * a * ((a - 1.0) - (a + 1.0) * p.cos),
            a * ((a + 1.0) - (a - 1.0) * p.cos - two_sqrt_a_alpha),
            (a + 1.0) + (a - 1.0) * p.cos + two_sqrt_a_alpha,
            -2.0 * ((a - 1.0) + (a + 1.0) * p.cos),
            (a + 1.0) + (a - 1.0) * p.cos - two_sqrt_a_alpha,
        )
    }

    pub fn high_shelf(sample_rate: f32, freq_hz: f32, gain_db: f32, q: f32) -> Self {
        let p = Prototype::new(sample_rate, freq_hz, q);
        let a = 10f64.powf(f64::from(gain_db) / 40.0);
        let two_sqrt_a_alpha = 2.0 * a.sqrt() * p.alpha;
        Self::normalised(
            a * ((a + 1.0) + (a - 1.0) * p.cos + two_sqrt_a_alpha),
            -2.0 * a * ((a - 1.0) + (a + 1.0) * p.cos),
            a * ((a + 1.0) + (a - 1.0) * p.cos - two_sqrt_a_alpha),
            (a + 1.0) - (a - 1.0) * p.cos + two_sqrt_a_alpha,
            2.0 * ((a - 1.0) - (a + 1.0) * p.cos),
            (a + 1.0) - (a - 1.0) * p.cos - two_sqrt_a_alpha,
        )
    }

    pub fn lowpass(sample_rate: f32, cutoff_hz: f32, q: f32) -> Self {
        let p = Prototype::new(sample_rate, cutoff_hz, q);
        let b = (1.0 - p.cos) * 0.5;
        Self::normalised(
            b,
            1.0 - p.cos,
            b,
            1.0 + p.alpha,
            -2.0 * p.cos,
            1.0 - p.alpha,
        )
    }

    pub fn highpass(sample_rate: f32, cutoff_hz: f32, q: f32) -> Self {
        let p = Prototype::new(sample_rate, cutoff_hz, q);
        let b = (1.0 + p.cos) * 0.5;
        Self::normalised(
            b,
            -(1.0 + p.cos),
            b,
            1.0 + p.alpha,
            -2.0 * p.cos,
            1.0 - p.alpha,
        )
    }
}

/// Transposed direct form II state for one channel.
#[derive(Clone, Copy, Debug, Default)]
pub struct BiquadState {
    z1: f32,
    z2: f32,
}

impl BiquadState {
    #[inline]
    pub fn new() -> Self {
        Self::default()
    }

    #[inline]
    pub fn process(&mut self, input: f32, coeffs: &BiquadCoeffs) -> f32 {
        let output = coeffs.b0 * input + self.z1;
        self.z1 = coeffs.b1 * input - coeffs.a1 * output + self.z2;
        self.z2 = coeffs.b2 * input - coeffs.a2 * output;
        output
    }
}
