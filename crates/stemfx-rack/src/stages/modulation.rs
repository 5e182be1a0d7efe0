use std::f32::consts::PI;

use stemfx_dsp::delay::ModulatedDelayLine;

use super::{check_channels, Stage, StageKind};
use crate::buffer::{AudioBuffer, BufferConfig};
use crate::error::ProcessingError;

const TWO_PI: f32 = PI * 2.0;

/// Delay swing, in milliseconds, at full chorus depth.
const CHORUS_MAX_SWING_MS: f32 = 10.0;
const MAX_FEEDBACK: f32 = 0.9;
const PHASER_STAGES: usize = 4;

/// LFO-modulated short delay mixed with the dry signal.
#[derive(Debug, Clone)]
pub struct ChorusStage {
    rate_hz: f32,
    depth: f32,
    centre_delay_ms: f32,
    feedback: f32,
    mix: f32,
    sample_rate: f32,
    lines: Vec<ModulatedDelayLine>,
    phases: Vec<f32>,
}

impl ChorusStage {
    pub fn new(rate_hz: f32, depth: f32, centre_delay_ms: f32, feedback: f32, mix: f32) -> Self {
        Self {
            rate_hz: rate_hz.clamp(0.0, 100.0),
            depth: depth.clamp(0.0, 1.0),
            centre_delay_ms: centre_delay_ms.clamp(0.0, 100.0),
            feedback: feedback.clamp(-MAX_FEEDBACK, MAX_FEEDBACK),
            mix: mix.clamp(0.0, 1.0),
            sample_rate: 44_100.0,
            lines: Vec::new(),
            phases: Vec::new(),
        }
    }
}

impl Stage for ChorusStage {
    fn kind(&self) -> StageKind {
        StageKind::Chorus
    }

    fn prepare(&mut self, config: &BufferConfig) {
        self.sample_rate = config.sample_rate;
        let max_ms = self.centre_delay_ms + self.depth * CHORUS_MAX_SWING_MS;
        let max_delay_samples = ((max_ms / 1_000.0) * self.sample_rate).ceil().max(2.0) as usize;
        self.lines = vec![ModulatedDelayLine::new(max_delay_samples + 2); config.channels];
        self.phases = vec![0.0; config.channels];
    }

    fn process(&mut self, buffer: &mut AudioBuffer) -> Result<(), ProcessingError> {
        check_channels(self.lines.len(), buffer)?;
        let swing_samples = (self.depth * CHORUS_MAX_SWING_MS / 1_000.0) * self.sample_rate;
        let base_samples = (self.centre_delay_ms / 1_000.0) * self.sample_rate;
        let phase_inc = self.rate_hz / self.sample_rate;
        for ((channel, line), phase) in buffer
            .channels_mut()
            .zip(self.lines.iter_mut())
            .zip(self.phases.iter_mut())
        {
            for sample in channel.iter_mut() {
                *phase = (*phase + phase_inc) % 1.0;
                let lfo = (*phase * TWO_PI).sin();
                let delay = base_samples + swing_samples * (lfo * 0.5 + 0.5);
                let delayed = line.process(*sample, delay, self.feedback);
                *sample = *sample * (1.0 - self.mix) + delayed * self.mix;
            }
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, Default)]
struct AllpassStage {
    z1: f32,
}

impl AllpassStage {
    fn process(&mut self, input: f32, coeff: f32) -> f32 {
        let y = -coeff * input + self.z1;
        self.z1 = input + coeff * y;
        y
    }
}

#[derive(Debug, Clone, Default)]
struct PhaserChannel {
    stages: [AllpassStage; PHASER_STAGES],
    feedback_state: f32,
    phase: f32,
}

/// Four swept first-order allpass sections with feedback.
#[derive(Debug, Clone)]
pub struct PhaserStage {
    rate_hz: f32,
    depth: f32,
    centre_frequency_hz: f32,
    feedback: f32,
    mix: f32,
    sample_rate: f32,
    channels: Vec<PhaserChannel>,
}

impl PhaserStage {
    pub fn new(
        rate_hz: f32,
        depth: f32,
        centre_frequency_hz: f32,
        feedback: f32,
        mix: f32,
    ) -> Self {
        Self {
            rate_hz: rate_hz.clamp(0.0, 100.0),
            depth: depth.clamp(0.0, 1.0),
            centre_frequency_hz: centre_frequency_hz.max(40.0),
            feedback: feedback.clamp(-MAX_FEEDBACK, MAX_FEEDBACK),
            mix: mix.clamp(0.0, 1.0),
            sample_rate: 44_100.0,
            channels: Vec::new(),
        }
    }
}

impl Stage for PhaserStage {
    fn kind(&self) -> StageKind {
        StageKind::Phaser
    }

    fn prepare(&mut self, config: &BufferConfig) {
        self.sample_rate = config.sample_rate;
        self.channels = vec![PhaserChannel::default(); config.channels];
    }

    fn process(&mut self, buffer: &mut AudioBuffer) -> Result<(), ProcessingError> {
        check_channels(self.channels.len(), buffer)?;
        let nyquist_guard = self.sample_rate * 0.45;
        let max_freq = (self.centre_frequency_hz * (1.0 + self.depth)).min(nyquist_guard);
        let min_freq = (self.centre_frequency_hz * (1.0 - self.depth))
            .max(40.0)
            .min(max_freq);
        let phase_inc = self.rate_hz / self.sample_rate;
        for (channel, state) in buffer.channels_mut().zip(self.channels.iter_mut()) {
            for sample in channel.iter_mut() {
                state.phase = (state.phase + phase_inc) % 1.0;
                let lfo = (state.phase * TWO_PI).sin() * 0.5 + 0.5;
                let freq = min_freq + (max_freq - min_freq) * lfo;
                let omega = (PI * freq / self.sample_rate).tan().min(10.0);
                let coeff = (1.0 - omega) / (1.0 + omega);

                let mut wet = *sample + state.feedback_state * self.feedback;
                for stage in &mut state.stages {
                    wet = stage.process(wet, coeff);
                }
                state.feedback_state = wet;
                *sample = wet * self.mix + *sample * (1.0 - self.mix);
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn noise(frames: usize) -> Vec<f32> {
        let mut state = 0x1234_5678u32;
        (0..frames)
            .map(|_| {
                state ^= state << 13;
                state ^= state >> 17;
                state ^= state << 5;
                (state as f32 / u32::MAX as f32) * 2.0 - 1.0
            })
            .collect()
    }

    fn run(stage: &mut dyn Stage, input: Vec<f32>) -> Vec<f32> {
        let mut buffer = AudioBuffer::from_channels(vec![input]).unwrap();
        stage.prepare(&BufferConfig::new(44_100.0, 1));
        stage.process(&mut buffer).unwrap();
        buffer.into_channels().remove(0)
    }

    #[test]
    fn zero_mix_chorus_is_transparent() {
        let input = noise(4_096);
        let output = run(&mut ChorusStage::new(0.8, 0.25, 7.0, 0.0, 0.0), input.clone());
        assert_eq!(input, output);
    }

    #[test]
    fn chorus_and_phaser_stay_bounded() {
        let input = noise(44_100);
        let chorus = run(&mut ChorusStage::new(5.0, 1.0, 20.0, 0.9, 1.0), input.clone());
        let phaser = run(&mut PhaserStage::new(2.0, 1.0, 1_000.0, 0.7, 1.0), input);
        assert!(chorus.iter().chain(&phaser).all(|s| s.is_finite() && s.abs() < 50.0));
    }

    #[test]
    fn phaser_changes_the_signal() {
        let input = noise(2_048);
        let output = run(&mut PhaserStage::new(0.5, 0.7, 800.0, 0.3, 0.5), input.clone());
        assert!(input.iter().zip(&output).any(|(a, b)| (a - b).abs() > 1e-3));
    }
}
