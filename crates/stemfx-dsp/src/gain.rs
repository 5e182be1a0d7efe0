/// Level below which decibel values are treated as silence.
pub const SILENCE_DB: f32 = -120.0;

#[inline]
pub fn db_to_linear(db: f32) -> f32 {
    if db <= SILENCE_DB {
        0.0
    } else {
        10.0f32.powf(db * 0.05)
    }
}

#[inline]
pub fn linear_to_db(linear: f32) -> f32 {
    if linear <= 0.0 {
        SILENCE_DB
    } else {
        (20.0 * linear.log10()).max(SILENCE_DB)
    }
}

/// Static gain applied in place to a block of samples.
#[derive(Clone, Copy, Debug)]
pub struct Gain {
    linear: f32,
}

impl Gain {
    #[inline]
    pub fn from_db(db: f32) -> Self {
        Self {
            linear: db_to_linear(db),
        }
    }

    #[inline]
    pub fn process(&self, samples: &mut [f32]) {
        for sample in samples.iter_mut() {
            *sample *= self.linear;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn db_conversions_agree() {
        assert!((db_to_linear(-6.0) - 0.501_187).abs() < 1e-5);
        assert!((linear_to_db(0.5) + 6.020_6).abs() < 1e-3);
        assert_eq!(db_to_linear(-150.0), 0.0);
        assert_eq!(linear_to_db(0.0), SILENCE_DB);
    }

    #[test]
    fn gain_scales_block_in_place() {
        let mut block = [0.25, -0.5, 1.0];
        Gain::from_db(0.0).process(&mut block);
        assert_eq!(block, [0.25, -0.5, 1.0]);
        Gain::from_db(-120.0).process(&mut block);
        assert_eq!(block, [0.0, 0.0, 0.0]);
    }
}
