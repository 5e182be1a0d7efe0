use stemfx_rack::AudioBuffer;

/// Linear-interpolation sample rate converter.
///
/// Keeps its fractional read position between calls so a signal can be fed
/// in consecutive blocks.
#[derive(Debug, Clone)]
pub struct LinearResampler {
    ratio: f64,
    phase: f64,
}

impl LinearResampler {
    pub fn new(input_rate: u32, output_rate: u32) -> Self {
        Self {
            ratio: input_rate as f64 / output_rate.max(1) as f64,
            phase: 0.0,
        }
    }

    /// Number of output frames a block of `input_len` frames converts to.
    pub fn output_len(&self, input_len: usize) -> usize {
        if input_len == 0 {
            return 0;
        }
        ((input_len as f64 - self.phase) / self.ratio).ceil().max(0.0) as usize
    }

    /// Fills `output` from `input`, returning the number of frames written.
    pub fn process(&mut self, input: &[f32], output: &mut [f32]) -> usize {
        let Some(last) = input.len().checked_sub(1) else {
            return 0;
        };
        let mut position = self.phase;
        let mut produced = 0;
        for out in output.iter_mut() {
            let index = position.floor() as usize;
            if index > last {
                break;
            }
            let frac = (position - index as f64) as f32;
            *out = match input.get(index + 1) {
                Some(next) => input[index] * (1.0 - frac) + next * frac,
                None => input[index],
            };
            produced += 1;
            position += self.ratio;
        }
        self.phase = (position - input.len() as f64).max(0.0);
        produced
    }
}

/// Converts every channel of `buffer` from `from` Hz to `to` Hz.
pub fn resample_buffer(buffer: &AudioBuffer, from: u32, to: u32) -> AudioBuffer {
    if from == to || buffer.is_empty() {
        return buffer.clone();
    }
    let channels = buffer
        .channels()
        .map(|channel| {
            let mut resampler = LinearResampler::new(from, to);
            let mut output = vec![0.0; resampler.output_len(channel.len())];
            let written = resampler.process(channel, &mut output);
            output.truncate(written);
            output
        })
        .collect();
    // Every channel has the same length, so the output is never ragged.
    AudioBuffer::from_channels(channels).unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unity_ratio_copies_input() {
        let input = [0.0, 0.5, 1.0, -0.5];
        let mut resampler = LinearResampler::new(44_100, 44_100);
        let mut output = [0.0; 4];
        assert_eq!(resampler.process(&input, &mut output), 4);
        assert_eq!(output, input);
    }

    #[test]
    fn upsampling_interpolates() {
        let mut resampler = LinearResampler::new(22_050, 44_100);
        let input = [0.0, 1.0, 0.0];
        let mut output = vec![0.0; resampler.output_len(input.len())];
        let written = resampler.process(&input, &mut output);
        assert_eq!(written, 6);
        assert_eq!(&output[..4], &[0.0, 0.5, 1.0, 0.5]);
    }

    #[test]
    fn downsampled_buffer_has_expected_length() {
        let buffer = AudioBuffer::from_channels(vec![vec![0.25; 48_000], vec![-0.25; 48_000]]).unwrap();
        let out = resample_buffer(&buffer, 48_000, 44_100);
        assert_eq!(out.num_channels(), 2);
        assert_eq!(out.len(), 44_100);
        assert!(out.iter().all(|s| (s.abs() - 0.25).abs() < 1e-6));
    }
}
