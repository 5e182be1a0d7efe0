/// Per-sample coefficient of a one-pole follower reaching ~63% of a step in `ms`.
#[inline]
pub fn time_to_coeff(ms: f32, sample_rate: f32) -> f32 {
    (-1.0 / ((ms.max(0.1) / 1_000.0) * sample_rate.max(1.0))).exp()
}

/// Peak envelope follower with separate attack and release times.
#[derive(Clone, Copy, Debug)]
pub struct EnvelopeFollower {
    attack_coeff: f32,
    release_coeff: f32,
    envelope: f32,
}

impl EnvelopeFollower {
    pub fn new(sample_rate: f32, attack_ms: f32, release_ms: f32) -> Self {
        Self {
            attack_coeff: time_to_coeff(attack_ms, sample_rate),
            release_coeff: time_to_coeff(release_ms, sample_rate),
            envelope: 0.0,
        }
    }

    #[inline]
    pub fn next(&mut self, input: f32) -> f32 {
        let level = input.abs();
        let coeff = if level > self.envelope {
            self.attack_coeff
        } else {
            self.release_coeff
        };
        self.envelope = coeff * self.envelope + (1.0 - coeff) * level;
        self.envelope
    }

    #[inline]
    pub fn envelope(&self) -> f32 {
        self.envelope
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn follower_tracks_and_releases() {
        let mut env = EnvelopeFollower::new(44_100.0, 1.0, 50.0);
        for _ in 0..4_410 {
            env.next(0.5);
        }
        assert!((env.envelope() - 0.5).abs() < 1e-3);
        for _ in 0..44_100 {
            env.next(0.0);
        }
        assert!(env.envelope() < 1e-3);
    }
}
