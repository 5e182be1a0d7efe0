use serde::{Deserialize, Serialize};

use crate::error::ProcessingError;

/// Settings handed to every stage before it processes a buffer.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BufferConfig {
    pub sample_rate: f32,
    pub channels: usize,
}

impl BufferConfig {
    pub fn new(sample_rate: f32, channels: usize) -> Self {
        Self {
            sample_rate,
            channels,
        }
    }
}

/// Channel-major (non-interleaved) audio buffer.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct AudioBuffer {
    channels: Vec<Vec<f32>>,
}

impl AudioBuffer {
    pub fn new(num_channels: usize, frames: usize) -> Self {
        let channels = (0..num_channels).map(|_| vec![0.0; frames]).collect();
        Self { channels }
    }

    /// Wraps per-channel sample vectors. Every channel must have the same length.
    pub fn from_channels(channels: Vec<Vec<f32>>) -> Result<Self, ProcessingError> {
        let expected = channels.first().map(Vec::len).unwrap_or_default();
        if let Some((channel, actual)) = channels
            .iter()
            .map(Vec::len)
            .enumerate()
            .find(|(_, len)| *len != expected)
        {
            return Err(ProcessingError::RaggedChannels {
                channel,
                expected,
                actual,
            });
        }
        Ok(Self { channels })
    }

    pub fn num_channels(&self) -> usize {
        self.channels.len()
    }

    /// Frames per channel.
    pub fn len(&self) -> usize {
        self.channels
            .first()
            .map(|channel| channel.len())
            .unwrap_or_default()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn shape(&self) -> (usize, usize) {
        (self.num_channels(), self.len())
    }

    pub fn channel(&self, index: usize) -> Option<&[f32]> {
        self.channels.get(index).map(Vec::as_slice)
    }

    pub fn iter(&self) -> impl Iterator<Item = &f32> {
        self.channels.iter().flat_map(|channel| channel.iter())
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut f32> {
        self.channels
            .iter_mut()
            .flat_map(|channel| channel.iter_mut())
    }

    pub fn channels(&self) -> impl Iterator<Item = &Vec<f32>> {
        self.channels.iter()
    }

    pub fn channels_mut(&mut self) -> impl Iterator<Item = &mut Vec<f32>> {
        self.channels.iter_mut()
    }

    pub fn as_slice(&self) -> &[Vec<f32>] {
        &self.channels
    }

    pub fn as_mut_slice(&mut self) -> &mut [Vec<f32>] {
        &mut self.channels
    }

    pub fn into_channels(self) -> Vec<Vec<f32>> {
        self.channels
    }

    /// Largest absolute sample value, `0.0` for an empty buffer.
    pub fn peak(&self) -> f32 {
        self.iter().fold(0.0f32, |peak, sample| peak.max(sample.abs()))
    }

    /// Rejects empty buffers and the first NaN or infinite sample.
    pub fn validate(&self) -> Result<(), ProcessingError> {
        if self.channels.is_empty() || self.is_empty() {
            return Err(ProcessingError::Empty);
        }
        for (channel, samples) in self.channels.iter().enumerate() {
            if let Some(index) = samples.iter().position(|sample| !sample.is_finite()) {
                return Err(ProcessingError::NonFinite { channel, index });
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ragged_channels_are_rejected() {
        let err = AudioBuffer::from_channels(vec![vec![0.0; 4], vec![0.0; 3]]).unwrap_err();
        assert_eq!(
            err,
            ProcessingError::RaggedChannels {
                channel: 1,
                expected: 4,
                actual: 3
            }
        );
    }

    #[test]
    fn validate_reports_first_non_finite_sample() {
        let buffer =
            AudioBuffer::from_channels(vec![vec![0.0, 0.1], vec![0.2, f32::NAN]]).unwrap();
        assert_eq!(
            buffer.validate(),
            Err(ProcessingError::NonFinite {
                channel: 1,
                index: 1
            })
        );
        assert_eq!(AudioBuffer::new(2, 0).validate(), Err(ProcessingError::Empty));
    }
}
