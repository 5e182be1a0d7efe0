use std::sync::Arc;

use tracing::debug;

use crate::buffer::AudioBuffer;
use crate::chain::Chain;
use crate::error::{ProcessingError, RackError};
use crate::instruments::InstrumentFamily;
use crate::layout::{normalize, restore, AudioArray};
use crate::params::{ParameterSet, Settings};
use crate::preset::resolve_preset;
use crate::randomize::Randomizer;
use crate::stages::StageRegistry;

/// Lowest sample rate `process` accepts.
pub const MIN_SAMPLE_RATE: u32 = 1_000;

/// The effects rack for one instrument family.
///
/// A rack owns its active parameter set and the chain built from it.
/// Mutating calls are chainable and rebuild the chain before returning;
/// [`Rack::configure`] is the exception and defers the rebuild to
/// [`Rack::build`] or the next [`Rack::process`].
///
/// Racks are not meant to be shared between threads while mutated. Use
/// one rack per worker.
#[derive(Debug, Clone)]
pub struct Rack {
    family: InstrumentFamily,
    preset: String,
    parameters: ParameterSet,
    chain: Option<Chain>,
    registry: Arc<StageRegistry>,
}

impl Rack {
    pub fn new(family: InstrumentFamily, preset: &str) -> Result<Self, RackError> {
        Self::with_overrides(family, preset, std::iter::empty())
    }

    /// Resolves `preset`, then applies `overrides` on top. Unknown override
    /// keys are rejected.
    pub fn with_overrides<'a, I>(
        family: InstrumentFamily,
        preset: &str,
        overrides: I,
    ) -> Result<Self, RackError>
    where
        I: IntoIterator<Item = (&'a str, f32)>,
    {
        Self::with_registry(family, preset, overrides, StageRegistry::shared())
    }

    pub fn with_registry<'a, I>(
        family: InstrumentFamily,
        preset: &str,
        overrides: I,
        registry: Arc<StageRegistry>,
    ) -> Result<Self, RackError>
    where
        I: IntoIterator<Item = (&'a str, f32)>,
    {
        let mut parameters = resolve_preset(family, preset)?;
        parameters.apply(overrides)?;
        let mut rack = Self {
            family,
            preset: preset.to_string(),
            parameters,
            chain: None,
            registry,
        };
        rack.build()?;
        Ok(rack)
    }

    pub fn family(&self) -> InstrumentFamily {
        self.family
    }

    /// Name of the last preset requested, even if it fell back to defaults.
    pub fn preset_name(&self) -> &str {
        &self.preset
    }

    pub fn parameters(&self) -> &ParameterSet {
        &self.parameters
    }

    /// Owned copy of the active parameter values.
    pub fn current_settings(&self) -> Settings {
        self.parameters.snapshot()
    }

    pub fn chain(&self) -> Option<&Chain> {
        self.chain.as_ref()
    }

    pub fn is_built(&self) -> bool {
        self.chain.is_some()
    }

    /// Replaces the active parameters with the defaults merged with
    /// `name`'s overrides. Unknown names log a warning and load the
    /// defaults.
    pub fn load_preset(&mut self, name: &str) -> Result<&mut Self, RackError> {
        self.parameters = resolve_preset(self.family, name)?;
        self.preset = name.to_string();
        self.build()
    }

    /// Draws new values for this family's randomizable parameters. The same
    /// seed always produces the same draws.
    pub fn randomize_parameters(&mut self, seed: Option<u64>) -> Result<&mut Self, RackError> {
        Randomizer::new(seed).randomize(&mut self.parameters, self.family.random_ranges())?;
        self.build()
    }

    /// Updates individual parameters without rebuilding. The current chain
    /// is discarded.
    pub fn configure<'a, I>(&mut self, updates: I) -> Result<&mut Self, RackError>
    where
        I: IntoIterator<Item = (&'a str, f32)>,
    {
        self.parameters.apply(updates)?;
        self.chain = None;
        Ok(self)
    }

    pub fn build(&mut self) -> Result<&mut Self, RackError> {
        let chain = Chain::build(self.family, &self.parameters, &self.registry)?;
        self.chain = Some(chain);
        Ok(self)
    }

    /// Processes a copy of `input` and returns it in the caller's shape.
    pub fn process(&mut self, input: &AudioArray, sample_rate: u32) -> Result<AudioArray, RackError> {
        let (mut buffer, orientation) = normalize(input)?;
        self.run(&mut buffer, sample_rate)?;
        Ok(restore(buffer, &orientation)?)
    }

    /// Processes a copy of an already channel-major buffer.
    pub fn process_buffer(
        &mut self,
        input: &AudioBuffer,
        sample_rate: u32,
    ) -> Result<AudioBuffer, RackError> {
        let mut buffer = input.clone();
        self.run(&mut buffer, sample_rate)?;
        Ok(buffer)
    }

    fn run(&mut self, buffer: &mut AudioBuffer, sample_rate: u32) -> Result<(), RackError> {
        if sample_rate < MIN_SAMPLE_RATE {
            return Err(ProcessingError::InvalidSampleRate(sample_rate).into());
        }
        buffer.validate()?;
        let chain = match self.chain.take() {
            Some(chain) => chain,
            None => {
                debug!(family = %self.family, "building chain on first use");
                Chain::build(self.family, &self.parameters, &self.registry)?
            }
        };
        let result = chain.process(&self.registry, buffer, sample_rate);
        self.chain = Some(chain);
        result
    }
}
