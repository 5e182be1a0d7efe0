//! Orchestration around `stemfx-rack`: file decoding, resampling, stem
//! separation back-ends and the per-file pipeline used by the `stemfx`
//! binary.

pub mod audio_io;
pub mod config;
pub mod pipeline;
pub mod resample;
pub mod separator;

/// Every file is processed at this rate.
pub const CANONICAL_SAMPLE_RATE: u32 = 44_100;
