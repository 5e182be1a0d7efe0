use std::fs::File;
use std::path::Path;

use stemfx_rack::{AudioBuffer, ProcessingError};
use symphonia::core::audio::{AudioBufferRef, SampleBuffer, Signal};
use symphonia::core::codecs::DecoderOptions;
use symphonia::core::errors::Error as SymphoniaError;
use symphonia::core::formats::FormatOptions;
use symphonia::core::io::MediaSourceStream;
use symphonia::core::meta::MetadataOptions;
use symphonia::core::probe::Hint;
use thiserror::Error;
use tracing::debug;

use crate::resample::resample_buffer;

#[derive(Debug, Error)]
pub enum AudioIoError {
    #[error(transparent)]
    Io(#[from] std::io::Error),
    #[error(transparent)]
    Decode(#[from] SymphoniaError),
    #[error(transparent)]
    Wav(#[from] hound::Error),
    #[error("no decodable audio track")]
    NoSupportedTracks,
    #[error("audio track has no sample rate")]
    UnknownSampleRate,
    #[error(transparent)]
    Layout(#[from] ProcessingError),
}

/// A decoded file: channel-major samples at their native rate.
#[derive(Debug, Clone, PartialEq)]
pub struct DecodedAudio {
    pub sample_rate: u32,
    pub buffer: AudioBuffer,
}

impl DecodedAudio {
    pub fn resampled(self, target_rate: u32) -> Self {
        if self.sample_rate == target_rate {
            return self;
        }
        debug!(from = self.sample_rate, to = target_rate, "resampling");
        Self {
            buffer: resample_buffer(&self.buffer, self.sample_rate, target_rate),
            sample_rate: target_rate,
        }
    }
}

/// Decodes any format symphonia was built with (wav, flac, mp3).
pub fn load(path: &Path) -> Result<DecodedAudio, AudioIoError> {
    let file = File::open(path)?;
    let stream = MediaSourceStream::new(Box::new(file), Default::default());
    let mut hint = Hint::new();
    if let Some(ext) = path.extension().and_then(|ext| ext.to_str()) {
        hint.with_extension(ext);
    }

    let probed = symphonia::default::get_probe().format(
        &hint,
        stream,
        &FormatOptions::default(),
        &MetadataOptions::default(),
    )?;
    let mut format = probed.format;
    let track = format
        .default_track()
        .ok_or(AudioIoError::NoSupportedTracks)?;
    let track_id = track.id;
    let params = track.codec_params.clone();
    let sample_rate = params.sample_rate.ok_or(AudioIoError::UnknownSampleRate)?;
    let mut decoder = symphonia::default::get_codecs().make(&params, &DecoderOptions::default())?;

    let mut channels: Vec<Vec<f32>> = Vec::new();
    loop {
        let packet = match format.next_packet() {
            Ok(packet) => packet,
            Err(SymphoniaError::IoError(err)) if err.kind() == std::io::ErrorKind::UnexpectedEof => {
                break
            }
            Err(err) => return Err(err.into()),
        };
        if packet.track_id() != track_id {
            continue;
        }
        match decoder.decode(&packet)? {
            AudioBufferRef::F32(decoded) => {
                let count = decoded.spec().channels.count();
                channels.resize_with(count.max(channels.len()), Vec::new);
                for (index, channel) in channels.iter_mut().enumerate().take(count) {
                    channel.extend_from_slice(decoded.chan(index));
                }
            }
            other => {
                let spec = *other.spec();
                let count = spec.channels.count();
                if count == 0 {
                    continue;
                }
                let mut samples = SampleBuffer::<f32>::new(other.capacity() as u64, spec);
                samples.copy_interleaved_ref(other);
                channels.resize_with(count.max(channels.len()), Vec::new);
                for frame in samples.samples().chunks_exact(count) {
                    for (channel, sample) in channels.iter_mut().zip(frame) {
                        channel.push(*sample);
                    }
                }
            }
        }
    }

    debug!(path = %path.display(), sample_rate, channels = channels.len(), "decoded");
    Ok(DecodedAudio {
        sample_rate,
        buffer: AudioBuffer::from_channels(channels)?,
    })
}

/// Decodes `path` and converts it to `target_rate`.
pub fn load_resampled(path: &Path, target_rate: u32) -> Result<DecodedAudio, AudioIoError> {
    Ok(load(path)?.resampled(target_rate))
}

/// Writes a 32-bit float WAV file.
pub fn save(buffer: &AudioBuffer, path: &Path, sample_rate: u32) -> Result<(), AudioIoError> {
    let spec = hound::WavSpec {
        channels: buffer.num_channels().max(1) as u16,
        sample_rate,
        bits_per_sample: 32,
        sample_format: hound::SampleFormat::Float,
    };
    let mut writer = hound::WavWriter::create(path, spec)?;
    for frame in 0..buffer.len() {
        for channel in buffer.as_slice() {
            writer.write_sample(channel[frame])?;
        }
    }
    writer.finalize()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn wav_round_trip_preserves_samples() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("tone.wav");
        let left: Vec<f32> = (0..1_000).map(|n| (n as f32 * 0.01).sin() * 0.5).collect();
        let right: Vec<f32> = left.iter().map(|s| -s).collect();
        let buffer = AudioBuffer::from_channels(vec![left, right]).unwrap();

        save(&buffer, &path, 44_100).unwrap();
        let decoded = load(&path).unwrap();

        assert_eq!(decoded.sample_rate, 44_100);
        assert_eq!(decoded.buffer, buffer);
    }

    #[test]
    fn resampled_load_reaches_target_rate() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("low.wav");
        let buffer = AudioBuffer::from_channels(vec![vec![0.1; 22_050]]).unwrap();
        save(&buffer, &path, 22_050).unwrap();

        let decoded = load_resampled(&path, 44_100).unwrap();
        assert_eq!(decoded.sample_rate, 44_100);
        assert_eq!(decoded.buffer.num_channels(), 1);
        assert!(decoded.buffer.len().abs_diff(44_100) <= 1);
    }

    #[test]
    fn missing_file_is_an_io_error() {
        let err = load(Path::new("/definitely/not/here.wav")).unwrap_err();
        assert!(matches!(err, AudioIoError::Io(_)));
    }
}
