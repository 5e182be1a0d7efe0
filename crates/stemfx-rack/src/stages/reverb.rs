use super::{check_channels, Stage, StageKind};
use crate::buffer::{AudioBuffer, BufferConfig};
use crate::error::ProcessingError;

const COMB_LENGTHS: [usize; 4] = [1116, 1188, 1277, 1356];
const ALLPASS_LENGTHS: [usize; 2] = [556, 441];
/// Extra delay added to right-hand (odd) channels to decorrelate the tails.
const STEREO_SPREAD: usize = 23;

#[derive(Debug, Clone)]
struct CombFilter {
    buffer: Vec<f32>,
    index: usize,
    feedback: f32,
    damp: f32,
    filter_store: f32,
}

impl CombFilter {
    fn new(length: usize, feedback: f32, damp: f32) -> Self {
        Self {
            buffer: vec![0.0; length.max(1)],
            index: 0,
            feedback,
            damp,
            filter_store: 0.0,
        }
    }

    fn process(&mut self, input: f32) -> f32 {
        let output = self.buffer[self.index];
        self.filter_store = output * (1.0 - self.damp) + self.filter_store * self.damp;
        self.buffer[self.index] = input + self.filter_store * self.feedback;
        self.index = (self.index + 1) % self.buffer.len();
        output
    }
}

#[derive(Debug, Clone)]
struct AllPassFilter {
    buffer: Vec<f32>,
    index: usize,
}

impl AllPassFilter {
    const FEEDBACK: f32 = 0.5;

    fn new(length: usize) -> Self {
        Self {
            buffer: vec![0.0; length.max(1)],
            index: 0,
        }
    }

    fn process(&mut self, input: f32) -> f32 {
        let buf_out = self.buffer[self.index];
        let output = -input + buf_out;
        self.buffer[self.index] = input + buf_out * Self::FEEDBACK;
        self.index = (self.index + 1) % self.buffer.len();
        output
    }
}

#[derive(Debug, Clone)]
struct ReverbChannel {
    combs: Vec<CombFilter>,
    allpasses: Vec<AllPassFilter>,
    predelay: Vec<f32>,
    predelay_index: usize,
}

impl ReverbChannel {
    fn new(scale: f32, spread: usize, feedback: f32, damp: f32, predelay_samples: usize) -> Self {
        let scaled = |length: usize| ((length + spread) as f32 * scale).round().max(1.0) as usize;
        Self {
            combs: COMB_LENGTHS
                .iter()
                .map(|&length| CombFilter::new(scaled(length), feedback, damp))
                .collect(),
            allpasses: ALLPASS_LENGTHS
                .iter()
                .map(|&length| AllPassFilter::new(scaled(length)))
                .collect(),
            predelay: vec![0.0; predelay_samples],
            predelay_index: 0,
        }
    }

    fn process(&mut self, input: f32) -> f32 {
        let predelayed = if self.predelay.is_empty() {
            input
        } else {
            let out = self.predelay[self.predelay_index];
            self.predelay[self.predelay_index] = input;
            self.predelay_index = (self.predelay_index + 1) % self.predelay.len();
            out
        };

        let mut sum = 0.0;
        for comb in &mut self.combs {
            sum += comb.process(predelayed);
        }
        for allpass in &mut self.allpasses {
            sum = allpass.process(sum);
        }
        sum / (self.combs.len() as f32)
    }
}

/// Comb/allpass room with pre-delay, stereo width and freeze.
///
/// In freeze mode the combs stop taking input and recirculate losslessly,
/// holding whatever tail they already contain.
#[derive(Debug, Clone)]
pub struct ReverbStage {
    room_size: f32,
    damping: f32,
    wet_level: f32,
    dry_level: f32,
    width: f32,
    frozen: bool,
    pre_delay_ms: f32,
    channels: Vec<ReverbChannel>,
}

impl ReverbStage {
    pub fn new(
        room_size: f32,
        damping: f32,
        wet_level: f32,
        dry_level: f32,
        width: f32,
        freeze_mode: f32,
        pre_delay_ms: f32,
    ) -> Self {
        Self {
            room_size: room_size.clamp(0.0, 1.0),
            damping: damping.clamp(0.0, 0.99),
            wet_level: wet_level.clamp(0.0, 1.0),
            dry_level: dry_level.clamp(0.0, 1.0),
            width: width.clamp(0.0, 1.0),
            frozen: freeze_mode >= 0.5,
            pre_delay_ms: pre_delay_ms.max(0.0),
            channels: Vec::new(),
        }
    }
}

impl Stage for ReverbStage {
    fn kind(&self) -> StageKind {
        StageKind::Reverb
    }

    fn prepare(&mut self, config: &BufferConfig) {
        let scale = (config.sample_rate / 44_100.0).max(0.25);
        let (feedback, damp) = if self.frozen {
            (1.0, 0.0)
        } else {
            (0.75 + self.room_size * 0.2, self.damping)
        };
        let predelay_samples = ((self.pre_delay_ms / 1_000.0) * config.sample_rate).round() as usize;
        self.channels = (0..config.channels)
            .map(|index| {
                let spread = if index % 2 == 1 { STEREO_SPREAD } else { 0 };
                ReverbChannel::new(scale, spread, feedback, damp, predelay_samples)
            })
            .collect();
    }

    fn process(&mut self, buffer: &mut AudioBuffer) -> Result<(), ProcessingError> {
        check_channels(self.channels.len(), buffer)?;
        let frames = buffer.len();
        let input_gain = if self.frozen { 0.0 } else { 1.0 };

        let wet: Vec<Vec<f32>> = buffer
            .channels()
            .zip(self.channels.iter_mut())
            .map(|(channel, state)| {
                channel
                    .iter()
                    .map(|sample| state.process(sample * input_gain))
                    .collect()
            })
            .collect();

        // Width cross-feeds the tails of channel pairs; mono keeps its own tail.
        let direct = self.wet_level * (self.width * 0.5 + 0.5);
        let cross = self.wet_level * ((1.0 - self.width) * 0.5);
        let count = wet.len();
        for (index, channel) in buffer.as_mut_slice().iter_mut().enumerate() {
            let partner = if count == 1 { index } else { index ^ 1 };
            let partner = if partner < count { partner } else { index };
            for frame in 0..frames {
                let tail = wet[index][frame] * direct + wet[partner][frame] * cross;
                channel[frame] = channel[frame] * self.dry_level + tail;
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn impulse(channels: usize, frames: usize) -> AudioBuffer {
        let mut data = vec![vec![0.0; frames]; channels];
        for channel in &mut data {
            channel[0] = 1.0;
        }
        AudioBuffer::from_channels(data).unwrap()
    }

    fn run(stage: &mut ReverbStage, buffer: &mut AudioBuffer) {
        stage.prepare(&BufferConfig::new(44_100.0, buffer.num_channels()));
        stage.process(buffer).unwrap();
    }

    #[test]
    fn pre_delay_postpones_the_tail() {
        let mut buffer = impulse(1, 4_000);
        run(&mut ReverbStage::new(0.5, 0.5, 1.0, 0.0, 1.0, 0.0, 20.0), &mut buffer);
        let out = buffer.channel(0).unwrap();
        // 20 ms at 44.1 kHz plus the shortest comb.
        let silent_until = 882 + COMB_LENGTHS[0];
        assert!(out[..silent_until].iter().all(|s| *s == 0.0));
        assert!(out[silent_until..].iter().any(|s| s.abs() > 1e-4));
    }

    #[test]
    fn frozen_reverb_ignores_new_input() {
        let mut buffer = impulse(2, 8_000);
        run(&mut ReverbStage::new(0.5, 0.5, 1.0, 0.0, 1.0, 1.0, 0.0), &mut buffer);
        assert!(buffer.iter().all(|s| *s == 0.0));
    }

    #[test]
    fn dry_only_is_scaled_input() {
        let mut buffer = impulse(2, 64);
        run(&mut ReverbStage::new(0.5, 0.5, 0.0, 0.8, 1.0, 0.0, 0.0), &mut buffer);
        assert_eq!(buffer.channel(0).unwrap()[0], 0.8);
        assert!(buffer.channel(1).unwrap()[1..].iter().all(|s| *s == 0.0));
    }

    #[test]
    fn long_tail_stays_finite() {
        let noise: Vec<f32> = (0..88_200).map(|n| ((n * 7919) % 200) as f32 / 100.0 - 1.0).collect();
        let mut buffer = AudioBuffer::from_channels(vec![noise.clone(), noise]).unwrap();
        run(&mut ReverbStage::new(1.0, 0.0, 1.0, 1.0, 0.5, 0.0, 0.0), &mut buffer);
        assert!(buffer.iter().all(|s| s.is_finite()));
    }
}
