use stemfx_dsp::biquad::{BiquadCoeffs, BiquadState, BUTTERWORTH_Q};

use super::{check_channels, Stage, StageKind};
use crate::buffer::{AudioBuffer, BufferConfig};
use crate::error::ProcessingError;

#[derive(Debug, Clone, Copy)]
enum Shape {
    LowShelf { gain_db: f32, q: f32 },
    Peak { gain_db: f32, q: f32 },
    HighShelf { gain_db: f32, q: f32 },
    Highpass,
    Lowpass,
}

/// Single biquad band, one state per channel.
#[derive(Debug, Clone)]
pub struct FilterStage {
    shape: Shape,
    cutoff_hz: f32,
    coeffs: BiquadCoeffs,
    states: Vec<BiquadState>,
}

impl FilterStage {
    fn new(shape: Shape, cutoff_hz: f32) -> Self {
        Self {
            shape,
            cutoff_hz,
            coeffs: BiquadCoeffs::IDENTITY,
            states: Vec::new(),
        }
    }

    pub fn low_shelf(cutoff_hz: f32, gain_db: f32, q: f32) -> Self {
        Self::new(Shape::LowShelf { gain_db, q }, cutoff_hz)
    }

    pub fn peak(cutoff_hz: f32, gain_db: f32, q: f32) -> Self {
        Self::new(Shape::Peak { gain_db, q }, cutoff_hz)
    }

    pub fn high_shelf(cutoff_hz: f32, gain_db: f32, q: f32) -> Self {
        Self::new(Shape::HighShelf { gain_db, q }, cutoff_hz)
    }

    pub fn highpass(cutoff_hz: f32) -> Self {
        Self::new(Shape::Highpass, cutoff_hz)
    }

    pub fn lowpass(cutoff_hz: f32) -> Self {
        Self::new(Shape::Lowpass, cutoff_hz)
    }
}

impl Stage for FilterStage {
    fn kind(&self) -> StageKind {
        match self.shape {
            Shape::LowShelf { .. } => StageKind::LowShelf,
            Shape::Peak { .. } => StageKind::PeakEq,
            Shape::HighShelf { .. } => StageKind::HighShelf,
            Shape::Highpass => StageKind::Highpass,
            Shape::Lowpass => StageKind::Lowpass,
        }
    }

    fn prepare(&mut self, config: &BufferConfig) {
        let sr = config.sample_rate;
        let freq = self.cutoff_hz;
        self.coeffs = match self.shape {
            Shape::LowShelf { gain_db, q } => BiquadCoeffs::low_shelf(sr, freq, gain_db, q),
            Shape::Peak { gain_db, q } => BiquadCoeffs::peak(sr, freq, gain_db, q),
            Shape::HighShelf { gain_db, q } => BiquadCoeffs::high_shelf(sr, freq, gain_db, q),
            Shape::Highpass => BiquadCoeffs::highpass(sr, freq, BUTTERWORTH_Q),
            Shape::Lowpass => BiquadCoeffs::lowpass(sr, freq, BUTTERWORTH_Q),
        };
        self.states = vec![BiquadState::new(); config.channels];
    }

    fn process(&mut self, buffer: &mut AudioBuffer) -> Result<(), ProcessingError> {
        check_channels(self.states.len(), buffer)?;
        for (channel, state) in buffer.channels_mut().zip(self.states.iter_mut()) {
            for sample in channel.iter_mut() {
                *sample = state.process(*sample, &self.coeffs);
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kind_follows_constructor() {
        assert_eq!(FilterStage::peak(400.0, -3.0, 1.5).kind(), StageKind::PeakEq);
        assert_eq!(FilterStage::lowpass(5_000.0).kind(), StageKind::Lowpass);
    }

    #[test]
    fn highpass_removes_offset() {
        let mut stage = FilterStage::highpass(90.0);
        let mut buffer = AudioBuffer::from_channels(vec![vec![0.5; 44_100]; 2]).unwrap();
        stage.prepare(&BufferConfig::new(44_100.0, 2));
        stage.process(&mut buffer).unwrap();
        let last = buffer.channel(1).unwrap()[44_099];
        assert!(last.abs() < 1e-3);
    }
}
