//! Channel-layout normalization.
//!
//! Callers hand over either a mono sequence or a row-major matrix whose
//! orientation is unknown. Stages always see a channel-major
//! [`AudioBuffer`]; the [`Orientation`] returned by [`normalize`] lets
//! [`restore`] give the caller back the exact shape it supplied.
//!
//! Untagged matrices are oriented by size: the smaller dimension is taken
//! as the channel count, and a matrix is transposed only when it has more
//! rows than columns. Square matrices stay channel-major. The guess is
//! wrong whenever the channel count is at least the frame count, so short
//! multichannel material should be tagged with [`AudioArray::with_layout`].

use serde::{Deserialize, Serialize};

use crate::buffer::AudioBuffer;
use crate::error::ProcessingError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Layout {
    /// `channels × frames`
    ChannelMajor,
    /// `frames × channels`
    TimeMajor,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Shape {
    Mono(usize),
    Matrix { rows: usize, cols: usize },
}

impl Shape {
    pub fn len(&self) -> usize {
        match *self {
            Shape::Mono(len) => len,
            Shape::Matrix { rows, cols } => rows * cols,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Caller-side sample data: a 1-D sequence or a row-major 2-D matrix.
#[derive(Debug, Clone, PartialEq)]
pub struct AudioArray {
    data: Vec<f32>,
    shape: Shape,
    layout: Option<Layout>,
}

impl AudioArray {
    pub fn mono(samples: Vec<f32>) -> Self {
        Self {
            shape: Shape::Mono(samples.len()),
            data: samples,
            layout: None,
        }
    }

    /// Row-major matrix of `rows × cols` samples.
    pub fn matrix(rows: usize, cols: usize, data: Vec<f32>) -> Result<Self, ProcessingError> {
        if data.len() != rows * cols {
            return Err(ProcessingError::ShapeMismatch {
                expected: (rows, cols),
                actual: (1, data.len()),
            });
        }
        Ok(Self {
            data,
            shape: Shape::Matrix { rows, cols },
            layout: None,
        })
    }

    pub fn from_rows(rows: Vec<Vec<f32>>) -> Result<Self, ProcessingError> {
        let cols = rows.first().map(Vec::len).unwrap_or_default();
        let count = rows.len();
        let mut data = Vec::with_capacity(count * cols);
        for (index, row) in rows.into_iter().enumerate() {
            if row.len() != cols {
                return Err(ProcessingError::RaggedChannels {
                    channel: index,
                    expected: cols,
                    actual: row.len(),
                });
            }
            data.extend(row);
        }
        Self::matrix(count, cols, data)
    }

    /// Channel-major matrix built from a buffer, tagged so it is never transposed.
    pub fn from_buffer(buffer: &AudioBuffer) -> Self {
        let (rows, cols) = buffer.shape();
        let data = buffer.as_slice().concat();
        Self {
            data,
            shape: Shape::Matrix { rows, cols },
            layout: Some(Layout::ChannelMajor),
        }
    }

    /// Records the orientation explicitly, bypassing the size heuristic.
    pub fn with_layout(mut self, layout: Layout) -> Self {
        if matches!(self.shape, Shape::Matrix { .. }) {
            self.layout = Some(layout);
        }
        self
    }

    pub fn shape(&self) -> Shape {
        self.shape
    }

    pub fn layout(&self) -> Option<Layout> {
        self.layout
    }

    pub fn data(&self) -> &[f32] {
        &self.data
    }

    pub fn into_data(self) -> Vec<f32> {
        self.data
    }

    /// Sample at `(row, col)`; mono arrays only have row `0`.
    pub fn get(&self, row: usize, col: usize) -> Option<f32> {
        match self.shape {
            Shape::Mono(len) if row == 0 && col < len => self.data.get(col).copied(),
            Shape::Matrix { rows, cols } if row < rows && col < cols => {
                self.data.get(row * cols + col).copied()
            }
            _ => None,
        }
    }

    /// Copy in `frames × channels` order, whatever the stored layout.
    pub fn to_time_major(&self) -> Result<Self, ProcessingError> {
        let (buffer, _) = normalize(self)?;
        let (channels, frames) = buffer.shape();
        let mut data = Vec::with_capacity(channels * frames);
        for frame in 0..frames {
            for channel in buffer.as_slice() {
                data.push(channel[frame]);
            }
        }
        Ok(Self {
            data,
            shape: Shape::Matrix {
                rows: frames,
                cols: channels,
            },
            layout: Some(Layout::TimeMajor),
        })
    }
}

/// How a caller's array was reoriented on the way in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Orientation {
    shape: Shape,
    layout: Option<Layout>,
    transposed: bool,
}

impl Orientation {
    pub fn shape(&self) -> Shape {
        self.shape
    }

    pub fn transposed(&self) -> bool {
        self.transposed
    }

    /// Shape of the channel-major buffer stages will see.
    pub fn channel_major_shape(&self) -> (usize, usize) {
        match self.shape {
            Shape::Mono(len) => (1, len),
            Shape::Matrix { rows, cols } if self.transposed => (cols, rows),
            Shape::Matrix { rows, cols } => (rows, cols),
        }
    }
}

fn should_transpose(rows: usize, cols: usize, layout: Option<Layout>) -> bool {
    match layout {
        Some(Layout::ChannelMajor) => false,
        Some(Layout::TimeMajor) => true,
        None => rows > cols,
    }
}

/// Copies `array` into a channel-major buffer.
pub fn normalize(array: &AudioArray) -> Result<(AudioBuffer, Orientation), ProcessingError> {
    let (buffer, transposed) = match array.shape {
        Shape::Mono(_) => (AudioBuffer::from_channels(vec![array.data.clone()])?, false),
        Shape::Matrix { rows, cols } => {
            if should_transpose(rows, cols, array.layout) {
                let channels = (0..cols)
                    .map(|col| (0..rows).map(|row| array.data[row * cols + col]).collect())
                    .collect();
                (AudioBuffer::from_channels(channels)?, true)
            } else {
                let channels = array
                    .data
                    .chunks(cols.max(1))
                    .take(rows)
                    .map(<[f32]>::to_vec)
                    .collect();
                let buffer = if cols == 0 {
                    AudioBuffer::new(rows, 0)
                } else {
                    AudioBuffer::from_channels(channels)?
                };
                (buffer, false)
            }
        }
    };
    let orientation = Orientation {
        shape: array.shape,
        layout: array.layout,
        transposed,
    };
    Ok((buffer, orientation))
}

/// Inverse of [`normalize`]: returns data in the caller's original shape.
pub fn restore(buffer: AudioBuffer, orientation: &Orientation) -> Result<AudioArray, ProcessingError> {
    let expected = orientation.channel_major_shape();
    let ragged = buffer.channels().any(|channel| channel.len() != expected.1);
    if buffer.shape() != expected || ragged {
        return Err(ProcessingError::ShapeMismatch {
            expected,
            actual: buffer.shape(),
        });
    }
    let data = if orientation.transposed {
        let (channels, frames) = expected;
        let mut data = Vec::with_capacity(channels * frames);
        for frame in 0..frames {
            for channel in buffer.as_slice() {
                data.push(channel[frame]);
            }
        }
        data
    } else {
        buffer.into_channels().concat()
    };
    Ok(AudioArray {
        data,
        shape: orientation.shape,
        layout: orientation.layout,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ramp(len: usize) -> Vec<f32> {
        (0..len).map(|n| n as f32).collect()
    }

    #[test]
    fn mono_becomes_single_channel() {
        let (buffer, orientation) = normalize(&AudioArray::mono(ramp(5))).unwrap();
        assert_eq!(buffer.shape(), (1, 5));
        let restored = restore(buffer, &orientation).unwrap();
        assert_eq!(restored.shape(), Shape::Mono(5));
        assert_eq!(restored.data(), ramp(5).as_slice());
    }

    #[test]
    fn tall_matrix_is_transposed_and_restored() {
        // 4 frames of stereo, time-major.
        let array = AudioArray::matrix(4, 2, vec![0.0, 10.0, 1.0, 11.0, 2.0, 12.0, 3.0, 13.0])
            .unwrap();
        let (buffer, orientation) = normalize(&array).unwrap();
        assert!(orientation.transposed());
        assert_eq!(buffer.channel(0).unwrap(), &[0.0, 1.0, 2.0, 3.0]);
        assert_eq!(buffer.channel(1).unwrap(), &[10.0, 11.0, 12.0, 13.0]);
        assert_eq!(restore(buffer, &orientation).unwrap(), array);
    }

    #[test]
    fn square_matrix_stays_channel_major() {
        let array = AudioArray::matrix(2, 2, vec![1.0, 2.0, 3.0, 4.0]).unwrap();
        let (buffer, orientation) = normalize(&array).unwrap();
        assert!(!orientation.transposed());
        assert_eq!(buffer.channel(0).unwrap(), &[1.0, 2.0]);
    }

    #[test]
    fn explicit_layout_overrides_heuristic() {
        // Three channels of two frames would be guessed as time-major.
        let array = AudioArray::matrix(3, 2, ramp(6))
            .unwrap()
            .with_layout(Layout::ChannelMajor);
        let (buffer, orientation) = normalize(&array).unwrap();
        assert_eq!(buffer.shape(), (3, 2));
        assert!(!orientation.transposed());

        let tagged = AudioArray::matrix(2, 8, ramp(16))
            .unwrap()
            .with_layout(Layout::TimeMajor);
        let (buffer, _) = normalize(&tagged).unwrap();
        assert_eq!(buffer.shape(), (8, 2));
    }

    #[test]
    fn restore_rejects_wrong_shape() {
        let (_, orientation) = normalize(&AudioArray::mono(ramp(4))).unwrap();
        let err = restore(AudioBuffer::new(2, 4), &orientation).unwrap_err();
        assert!(matches!(err, ProcessingError::ShapeMismatch { .. }));
    }

    #[test]
    fn time_major_copy_matches_transpose() {
        let array = AudioArray::from_rows(vec![vec![1.0, 2.0, 3.0], vec![4.0, 5.0, 6.0]]).unwrap();
        let time_major = array.to_time_major().unwrap();
        assert_eq!(time_major.shape(), Shape::Matrix { rows: 3, cols: 2 });
        assert_eq!(time_major.data(), &[1.0, 4.0, 2.0, 5.0, 3.0, 6.0]);
    }
}
