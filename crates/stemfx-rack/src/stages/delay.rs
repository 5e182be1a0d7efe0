use stemfx_dsp::delay::DelayLine;

use super::{check_channels, Stage, StageKind};
use crate::buffer::{AudioBuffer, BufferConfig};
use crate::error::ProcessingError;

const MAX_FEEDBACK: f32 = 0.95;

/// Feedback echo with a wet/dry blend.
#[derive(Debug, Clone)]
pub struct DelayStage {
    delay_seconds: f32,
    feedback: f32,
    mix: f32,
    lines: Vec<DelayLine>,
}

impl DelayStage {
    pub fn new(delay_seconds: f32, feedback: f32, mix: f32) -> Self {
        Self {
            delay_seconds: delay_seconds.max(0.0),
            feedback: feedback.clamp(0.0, MAX_FEEDBACK),
            mix: mix.clamp(0.0, 1.0),
            lines: Vec::new(),
        }
    }
}

impl Stage for DelayStage {
    fn kind(&self) -> StageKind {
        StageKind::Delay
    }

    fn prepare(&mut self, config: &BufferConfig) {
        let length = (self.delay_seconds * config.sample_rate).round().max(1.0) as usize;
        self.lines = vec![DelayLine::new(length); config.channels];
    }

    fn process(&mut self, buffer: &mut AudioBuffer) -> Result<(), ProcessingError> {
        check_channels(self.lines.len(), buffer)?;
        for (channel, line) in buffer.channels_mut().zip(self.lines.iter_mut()) {
            for sample in channel.iter_mut() {
                let dry = *sample;
                let delayed = line.process(dry, self.feedback);
                *sample = dry * (1.0 - self.mix) + delayed * self.mix;
            }
        }
        Ok(())
    }
}
