use stemfx_dsp::gain::{db_to_linear, linear_to_db};
use stemfx_dsp::smoothing::{time_to_coeff, EnvelopeFollower};

use super::{check_channels, Stage, StageKind};
use crate::buffer::{AudioBuffer, BufferConfig};
use crate::error::ProcessingError;

/// Downward expander: attenuates material whose envelope sits below the
/// threshold by `ratio` dB per dB of shortfall.
#[derive(Debug, Clone)]
pub struct NoiseGateStage {
    threshold_db: f32,
    ratio: f32,
    attack_ms: f32,
    release_ms: f32,
    followers: Vec<EnvelopeFollower>,
}

impl NoiseGateStage {
    pub fn new(threshold_db: f32, ratio: f32, attack_ms: f32, release_ms: f32) -> Self {
        Self {
            threshold_db,
            ratio: ratio.max(1.0),
            attack_ms,
            release_ms,
            followers: Vec::new(),
        }
    }
}

impl Stage for NoiseGateStage {
    fn kind(&self) -> StageKind {
        StageKind::NoiseGate
    }

    fn prepare(&mut self, config: &BufferConfig) {
        self.followers = vec![
            EnvelopeFollower::new(config.sample_rate, self.attack_ms, self.release_ms);
            config.channels
        ];
    }

    fn process(&mut self, buffer: &mut AudioBuffer) -> Result<(), ProcessingError> {
        check_channels(self.followers.len(), buffer)?;
        for (channel, follower) in buffer.channels_mut().zip(self.followers.iter_mut()) {
            for sample in channel.iter_mut() {
                let env_db = linear_to_db(follower.next(*sample));
                if env_db < self.threshold_db {
                    let gain_db = (env_db - self.threshold_db) * (self.ratio - 1.0);
                    *sample *= db_to_linear(gain_db);
                }
            }
        }
        Ok(())
    }
}

#[derive(Debug, Clone)]
pub struct CompressorStage {
    threshold_db: f32,
    ratio: f32,
    attack_ms: f32,
    release_ms: f32,
    followers: Vec<EnvelopeFollower>,
}

impl CompressorStage {
    pub fn new(threshold_db: f32, ratio: f32, attack_ms: f32, release_ms: f32) -> Self {
        Self {
            threshold_db,
            ratio: ratio.max(1.0),
            attack_ms,
            release_ms,
            followers: Vec::new(),
        }
    }
}

impl Stage for CompressorStage {
    fn kind(&self) -> StageKind {
        StageKind::Compressor
    }

    fn prepare(&mut self, config: &BufferConfig) {
        self.followers = vec![
            EnvelopeFollower::new(config.sample_rate, self.attack_ms, self.release_ms);
            config.channels
        ];
    }

    fn process(&mut self, buffer: &mut AudioBuffer) -> Result<(), ProcessingError> {
        check_channels(self.followers.len(), buffer)?;
        for (channel, follower) in buffer.channels_mut().zip(self.followers.iter_mut()) {
            for sample in channel.iter_mut() {
                let env_db = linear_to_db(follower.next(*sample));
                if env_db > self.threshold_db {
                    let delta = env_db - self.threshold_db;
                    let gain_db = (self.threshold_db + delta / self.ratio) - env_db;
                    *sample *= db_to_linear(gain_db);
                }
            }
        }
        Ok(())
    }
}

/// Peak limiter: the output never exceeds the threshold.
#[derive(Debug, Clone)]
pub struct LimiterStage {
    ceiling: f32,
    release_ms: f32,
    release_coeff: f32,
    gain: Vec<f32>,
}

impl LimiterStage {
    pub fn new(threshold_db: f32, release_ms: f32) -> Self {
        Self {
            ceiling: db_to_linear(threshold_db.min(0.0)),
            release_ms,
            release_coeff: 0.0,
            gain: Vec::new(),
        }
    }
}

impl Stage for LimiterStage {
    fn kind(&self) -> StageKind {
        StageKind::Limiter
    }

    fn prepare(&mut self, config: &BufferConfig) {
        self.release_coeff = time_to_coeff(self.release_ms, config.sample_rate);
        self.gain = vec![1.0; config.channels];
    }

    fn process(&mut self, buffer: &mut AudioBuffer) -> Result<(), ProcessingError> {
        check_channels(self.gain.len(), buffer)?;
        for (channel, gain) in buffer.channels_mut().zip(self.gain.iter_mut()) {
            for sample in channel.iter_mut() {
                let abs = sample.abs();
                if abs > self.ceiling {
                    *gain = (self.ceiling / abs).min(*gain);
                } else {
                    *gain += (1.0 - *gain) * (1.0 - self.release_coeff);
                    // Recovery must not push this sample over the ceiling.
                    if abs * *gain > self.ceiling {
                        *gain = self.ceiling / abs;
                    }
                }
                *sample *= *gain;
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sine(amplitude: f32, frames: usize) -> AudioBuffer {
        let samples = (0..frames)
            .map(|n| amplitude * (n as f32 * 2.0 * std::f32::consts::PI * 220.0 / 44_100.0).sin())
            .collect();
        AudioBuffer::from_channels(vec![samples]).unwrap()
    }

    fn run(stage: &mut dyn Stage, buffer: &mut AudioBuffer) {
        stage.prepare(&BufferConfig::new(44_100.0, buffer.num_channels()));
        stage.process(buffer).unwrap();
    }

    #[test]
    fn limiter_enforces_ceiling() {
        let mut buffer = sine(3.0, 44_100);
        run(&mut LimiterStage::new(-1.0, 100.0), &mut buffer);
        assert!(buffer.peak() <= db_to_linear(-1.0) + 1e-6);
    }

    #[test]
    fn compressor_reduces_loud_signal() {
        let mut buffer = sine(0.9, 44_100);
        run(&mut CompressorStage::new(-20.0, 4.0, 5.0, 50.0), &mut buffer);
        let tail = &buffer.channel(0).unwrap()[22_050..];
        let peak = tail.iter().fold(0.0f32, |p, s| p.max(s.abs()));
        assert!(peak < 0.5);
    }

    #[test]
    fn gate_silences_quiet_signal_and_passes_loud_one() {
        let mut quiet = sine(0.0005, 44_100);
        run(&mut NoiseGateStage::new(-40.0, 10.0, 1.0, 100.0), &mut quiet);
        let tail = &quiet.channel(0).unwrap()[22_050..];
        assert!(tail.iter().all(|s| s.abs() < 1e-6));

        let original = sine(0.5, 4_410);
        let mut loud = original.clone();
        run(&mut NoiseGateStage::new(-40.0, 10.0, 1.0, 100.0), &mut loud);
        let late: Vec<f32> = loud.channel(0).unwrap()[2_205..].to_vec();
        assert_eq!(late, original.channel(0).unwrap()[2_205..].to_vec());
    }

    #[test]
    fn channel_count_must_match_preparation() {
        let mut stage = LimiterStage::new(-1.0, 100.0);
        stage.prepare(&BufferConfig::new(44_100.0, 1));
        let mut stereo = AudioBuffer::new(2, 16);
        assert!(stage.process(&mut stereo).is_err());
    }
}
