//! Per-instrument effect racks for separated music stems.
//!
//! A [`Rack`] resolves a named preset against its family's default table,
//! builds an ordered [`Chain`] of stage descriptors from the result and runs
//! audio through freshly prepared stage processors.

pub mod buffer;
pub mod chain;
pub mod error;
pub mod instruments;
pub mod layout;
pub mod params;
pub mod preset;
pub mod rack;
pub mod randomize;
pub mod separation;
pub mod stages;

pub use buffer::{AudioBuffer, BufferConfig};
pub use chain::Chain;
pub use error::{ConfigurationError, ProcessingError, RackError};
pub use instruments::{InstrumentFamily, UnknownFamily};
pub use layout::{normalize, restore, AudioArray, Layout, Orientation, Shape};
pub use params::{ParameterDefinition, ParameterError, ParameterId, ParameterLayout, ParameterSet, Settings};
pub use preset::{lookup_preset, resolve_preset, Preset, DEFAULT_PRESET};
pub use rack::{Rack, MIN_SAMPLE_RATE};
pub use randomize::{RandomRange, Randomizer};
pub use separation::{
    select_stem, PassthroughSeparator, SeparationError, SourceSeparator, StemMap, StemName,
};
pub use stages::{Stage, StageDescriptor, StageFactory, StageKind, StageRegistry};

/// Builds a rack for `family`, optionally randomizes it with `seed` and
/// processes `input` once.
pub fn apply_effects(
    family: InstrumentFamily,
    input: &AudioArray,
    sample_rate: u32,
    preset: &str,
    seed: Option<u64>,
) -> Result<AudioArray, RackError> {
    let mut rack = Rack::new(family, preset)?;
    if seed.is_some() {
        rack.randomize_parameters(seed)?;
    }
    rack.process(input, sample_rate)
}
