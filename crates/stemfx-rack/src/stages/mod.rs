//! Stage descriptors and the processors that realise them.

mod delay;
mod drive;
mod dynamics;
mod filter;
mod modulation;
mod reverb;

use std::fmt;
use std::sync::Arc;

use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};

use crate::buffer::{AudioBuffer, BufferConfig};
use crate::error::{ProcessingError, RackError};

pub use delay::DelayStage;
pub use drive::{DistortionStage, GainStage};
pub use dynamics::{CompressorStage, LimiterStage, NoiseGateStage};
pub use filter::FilterStage;
pub use modulation::{ChorusStage, PhaserStage};
pub use reverb::ReverbStage;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StageKind {
    NoiseGate,
    Compressor,
    Distortion,
    LowShelf,
    PeakEq,
    HighShelf,
    Highpass,
    Lowpass,
    Chorus,
    Delay,
    Phaser,
    Reverb,
    Limiter,
    Gain,
}

impl StageKind {
    pub const ALL: [StageKind; 14] = [
        StageKind::NoiseGate,
        StageKind::Compressor,
        StageKind::Distortion,
        StageKind::LowShelf,
        StageKind::PeakEq,
        StageKind::HighShelf,
        StageKind::Highpass,
        StageKind::Lowpass,
        StageKind::Chorus,
        StageKind::Delay,
        StageKind::Phaser,
        StageKind::Reverb,
        StageKind::Limiter,
        StageKind::Gain,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            StageKind::NoiseGate => "noise_gate",
            StageKind::Compressor => "compressor",
            StageKind::Distortion => "distortion",
            StageKind::LowShelf => "low_shelf",
            StageKind::PeakEq => "peak_eq",
            StageKind::HighShelf => "high_shelf",
            StageKind::Highpass => "highpass",
            StageKind::Lowpass => "lowpass",
            StageKind::Chorus => "chorus",
            StageKind::Delay => "delay",
            StageKind::Phaser => "phaser",
            StageKind::Reverb => "reverb",
            StageKind::Limiter => "limiter",
            StageKind::Gain => "gain",
        }
    }
}

impl fmt::Display for StageKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// One stage of a chain with the numeric settings it needs.
///
/// Units follow the field names: `_db` decibels, `_hz` hertz, `_ms`
/// milliseconds, `_seconds` seconds; mixes, depths and levels are 0..=1.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "stage", rename_all = "snake_case")]
pub enum StageDescriptor {
    NoiseGate {
        threshold_db: f32,
        ratio: f32,
        attack_ms: f32,
        release_ms: f32,
    },
    Compressor {
        threshold_db: f32,
        ratio: f32,
        attack_ms: f32,
        release_ms: f32,
    },
    Distortion {
        drive_db: f32,
        mix: f32,
    },
    LowShelf {
        cutoff_hz: f32,
        gain_db: f32,
        q: f32,
    },
    PeakEq {
        cutoff_hz: f32,
        gain_db: f32,
        q: f32,
    },
    HighShelf {
        cutoff_hz: f32,
        gain_db: f32,
        q: f32,
    },
    Highpass {
        cutoff_hz: f32,
    },
    Lowpass {
        cutoff_hz: f32,
    },
    Chorus {
        rate_hz: f32,
        depth: f32,
        centre_delay_ms: f32,
        feedback: f32,
        mix: f32,
    },
    Delay {
        delay_seconds: f32,
        feedback: f32,
        mix: f32,
    },
    Phaser {
        rate_hz: f32,
        depth: f32,
        centre_frequency_hz: f32,
        feedback: f32,
        mix: f32,
    },
    Reverb {
        room_size: f32,
        damping: f32,
        wet_level: f32,
        dry_level: f32,
        width: f32,
        freeze_mode: f32,
        pre_delay_ms: f32,
    },
    Limiter {
        threshold_db: f32,
        release_ms: f32,
    },
    Gain {
        gain_db: f32,
    },
}

impl StageDescriptor {
    pub fn kind(&self) -> StageKind {
        match self {
            StageDescriptor::NoiseGate { .. } => StageKind::NoiseGate,
            StageDescriptor::Compressor { .. } => StageKind::Compressor,
            StageDescriptor::Distortion { .. } => StageKind::Distortion,
            StageDescriptor::LowShelf { .. } => StageKind::LowShelf,
            StageDescriptor::PeakEq { .. } => StageKind::PeakEq,
            StageDescriptor::HighShelf { .. } => StageKind::HighShelf,
            StageDescriptor::Highpass { .. } => StageKind::Highpass,
            StageDescriptor::Lowpass { .. } => StageKind::Lowpass,
            StageDescriptor::Chorus { .. } => StageKind::Chorus,
            StageDescriptor::Delay { .. } => StageKind::Delay,
            StageDescriptor::Phaser { .. } => StageKind::Phaser,
            StageDescriptor::Reverb { .. } => StageKind::Reverb,
            StageDescriptor::Limiter { .. } => StageKind::Limiter,
            StageDescriptor::Gain { .. } => StageKind::Gain,
        }
    }
}

/// A processor built from one [`StageDescriptor`].
///
/// `prepare` is always called before `process`, with the channel count of
/// the buffer that follows.
pub trait Stage: Send {
    fn kind(&self) -> StageKind;
    fn prepare(&mut self, config: &BufferConfig);
    fn process(&mut self, buffer: &mut AudioBuffer) -> Result<(), ProcessingError>;
}

/// Rejects a buffer whose channel count differs from the prepared one.
pub(crate) fn check_channels(prepared: usize, buffer: &AudioBuffer) -> Result<(), ProcessingError> {
    if buffer.num_channels() != prepared {
        return Err(ProcessingError::ShapeMismatch {
            expected: (prepared, buffer.len()),
            actual: buffer.shape(),
        });
    }
    Ok(())
}

pub trait StageFactory: Send + Sync {
    fn kind(&self) -> StageKind;
    fn create(&self, descriptor: &StageDescriptor) -> Box<dyn Stage>;
}

/// Factory for the processors shipped with this crate.
pub struct BuiltinStageFactory {
    kind: StageKind,
}

impl BuiltinStageFactory {
    pub fn new(kind: StageKind) -> Self {
        Self { kind }
    }
}

impl StageFactory for BuiltinStageFactory {
    fn kind(&self) -> StageKind {
        self.kind
    }

    fn create(&self, descriptor: &StageDescriptor) -> Box<dyn Stage> {
        match *descriptor {
            StageDescriptor::NoiseGate {
                threshold_db,
                ratio,
                attack_ms,
                release_ms,
            } => Box::new(NoiseGateStage::new(threshold_db, ratio, attack_ms, release_ms)),
            StageDescriptor::Compressor {
                threshold_db,
                ratio,
                attack_ms,
                release_ms,
            } => Box::new(CompressorStage::new(threshold_db, ratio, attack_ms, release_ms)),
            StageDescriptor::Distortion { drive_db, mix } => {
                Box::new(DistortionStage::new(drive_db, mix))
            }
            StageDescriptor::LowShelf {
                cutoff_hz,
                gain_db,
                q,
            } => Box::new(FilterStage::low_shelf(cutoff_hz, gain_db, q)),
            StageDescriptor::PeakEq {
                cutoff_hz,
                gain_db,
                q,
            } => Box::new(FilterStage::peak(cutoff_hz, gain_db, q)),
            StageDescriptor::HighShelf {
                cutoff_hz,
                gain_db,
                q,
            } => Box::new(FilterStage::high_shelf(cutoff_hz, gain_db, q)),
            StageDescriptor::Highpass { cutoff_hz } => Box::new(FilterStage::highpass(cutoff_hz)),
            StageDescriptor::Lowpass { cutoff_hz } => Box::new(FilterStage::lowpass(cutoff_hz)),
            StageDescriptor::Chorus {
                rate_hz,
                depth,
                centre_delay_ms,
                feedback,
                mix,
            } => Box::new(ChorusStage::new(rate_hz, depth, centre_delay_ms, feedback, mix)),
            StageDescriptor::Delay {
                delay_seconds,
                feedback,
                mix,
            } => Box::new(DelayStage::new(delay_seconds, feedback, mix)),
            StageDescriptor::Phaser {
                rate_hz,
                depth,
                centre_frequency_hz,
                feedback,
                mix,
            } => Box::new(PhaserStage::new(
                rate_hz,
                depth,
                centre_frequency_hz,
                feedback,
                mix,
            )),
            StageDescriptor::Reverb {
                room_size,
                damping,
                wet_level,
                dry_level,
                width,
                freeze_mode,
                pre_delay_ms,
            } => Box::new(ReverbStage::new(
                room_size,
                damping,
                wet_level,
                dry_level,
                width,
                freeze_mode,
                pre_delay_ms,
            )),
            StageDescriptor::Limiter {
                threshold_db,
                release_ms,
            } => Box::new(LimiterStage::new(threshold_db, release_ms)),
            StageDescriptor::Gain { gain_db } => Box::new(GainStage::new(gain_db)),
        }
    }
}

/// The set of stage implementations a rack may build chains from.
pub struct StageRegistry {
    factories: Vec<Box<dyn StageFactory>>,
}

static BUILTIN: Lazy<Arc<StageRegistry>> = Lazy::new(|| Arc::new(StageRegistry::builtin()));

impl StageRegistry {
    pub fn new() -> Self {
        Self {
            factories: Vec::new(),
        }
    }

    /// Every processor shipped with this crate.
    pub fn builtin() -> Self {
        let mut registry = Self::new();
        for kind in StageKind::ALL {
            registry.register_factory(Box::new(BuiltinStageFactory::new(kind)));
        }
        registry
    }

    /// Process-wide shared instance of [`StageRegistry::builtin`].
    pub fn shared() -> Arc<StageRegistry> {
        Arc::clone(&BUILTIN)
    }

    /// Later registrations for the same kind take precedence.
    pub fn register_factory(&mut self, factory: Box<dyn StageFactory>) -> &mut Self {
        self.factories.push(factory);
        self
    }

    pub fn iter(&self) -> impl Iterator<Item = &dyn StageFactory> {
        self.factories.iter().map(|factory| factory.as_ref())
    }

    pub fn find(&self, kind: StageKind) -> Option<&dyn StageFactory> {
        self.iter().filter(|factory| factory.kind() == kind).last()
    }

    pub fn supports(&self, kind: StageKind) -> bool {
        self.find(kind).is_some()
    }

    pub fn instantiate(&self, descriptor: &StageDescriptor) -> Result<Box<dyn Stage>, RackError> {
        self.find(descriptor.kind())
            .map(|factory| factory.create(descriptor))
            .ok_or(RackError::DependencyMissing {
                stage: descriptor.kind(),
            })
    }
}

impl Default for StageRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for StageRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list()
            .entries(self.iter().map(|factory| factory.kind()))
            .finish()
    }
}
