use stemfx_dsp::gain::Gain;
use stemfx_dsp::saturator::TanhDrive;

use super::{Stage, StageKind};
use crate::buffer::{AudioBuffer, BufferConfig};
use crate::error::ProcessingError;

/// `tanh` saturation blended with the dry signal.
#[derive(Debug, Clone)]
pub struct DistortionStage {
    drive: TanhDrive,
    mix: f32,
}

impl DistortionStage {
    pub fn new(drive_db: f32, mix: f32) -> Self {
        Self {
            drive: TanhDrive::new(drive_db),
            mix: mix.clamp(0.0, 1.0),
        }
    }
}

impl Stage for DistortionStage {
    fn kind(&self) -> StageKind {
        StageKind::Distortion
    }

    fn prepare(&mut self, _config: &BufferConfig) {}

    fn process(&mut self, buffer: &mut AudioBuffer) -> Result<(), ProcessingError> {
        for sample in buffer.iter_mut() {
            let dry = *sample;
            *sample = dry * (1.0 - self.mix) + self.drive.process(dry) * self.mix;
        }
        Ok(())
    }
}

#[derive(Debug, Clone)]
pub struct GainStage {
    gain: Gain,
}

impl GainStage {
    pub fn new(gain_db: f32) -> Self {
        Self {
            gain: Gain::from_db(gain_db),
        }
    }
}

impl Stage for GainStage {
    fn kind(&self) -> StageKind {
        StageKind::Gain
    }

    fn prepare(&mut self, _config: &BufferConfig) {}

    fn process(&mut self, buffer: &mut AudioBuffer) -> Result<(), ProcessingError> {
        for channel in buffer.channels_mut() {
            self.gain.process(channel);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn full_mix_distortion_is_bounded() {
        let mut buffer = AudioBuffer::from_channels(vec![vec![-1.0, -0.2, 0.0, 0.2, 1.0]]).unwrap();
        let mut stage = DistortionStage::new(25.0, 1.0);
        stage.prepare(&BufferConfig::new(44_100.0, 1));
        stage.process(&mut buffer).unwrap();
        assert!(buffer.peak() <= 1.0);
        assert_eq!(buffer.channel(0).unwrap()[2], 0.0);
    }

    #[test]
    fn gain_scales_every_channel() {
        let mut buffer = AudioBuffer::from_channels(vec![vec![0.5; 4]; 2]).unwrap();
        GainStage::new(-6.020_6).process(&mut buffer).unwrap();
        assert!(buffer.iter().all(|s| (s - 0.25).abs() < 1e-4));
    }
}
