use serde::Serialize;
use tracing::debug;

use crate::buffer::{AudioBuffer, BufferConfig};
use crate::error::RackError;
use crate::instruments::InstrumentFamily;
use crate::params::ParameterSet;
use crate::stages::{StageDescriptor, StageKind, StageRegistry};

/// Ordered stage descriptors derived from one parameter snapshot.
///
/// A chain holds no DSP state. Processors are created from the descriptors
/// on every [`Chain::process`] call, so each call starts from silence.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Chain {
    family: InstrumentFamily,
    stages: Vec<StageDescriptor>,
}

impl Chain {
    /// Fails if `registry` lacks an implementation for any stage the
    /// family's topology needs.
    pub fn build(
        family: InstrumentFamily,
        parameters: &ParameterSet,
        registry: &StageRegistry,
    ) -> Result<Self, RackError> {
        let stages = family.build_chain(parameters);
        if let Some(missing) = stages.iter().find(|stage| !registry.supports(stage.kind())) {
            return Err(RackError::DependencyMissing {
                stage: missing.kind(),
            });
        }
        debug!(
            %family,
            stages = stages.len(),
            kinds = ?stages.iter().map(StageDescriptor::kind).collect::<Vec<_>>(),
            "built chain"
        );
        Ok(Self { family, stages })
    }

    pub fn family(&self) -> InstrumentFamily {
        self.family
    }

    pub fn stages(&self) -> &[StageDescriptor] {
        &self.stages
    }

    pub fn kinds(&self) -> Vec<StageKind> {
        self.stages.iter().map(StageDescriptor::kind).collect()
    }

    pub fn len(&self) -> usize {
        self.stages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.stages.is_empty()
    }

    /// Runs `buffer` through every stage in order, in place.
    pub fn process(
        &self,
        registry: &StageRegistry,
        buffer: &mut AudioBuffer,
        sample_rate: u32,
    ) -> Result<(), RackError> {
        let config = BufferConfig::new(sample_rate as f32, buffer.num_channels());
        for descriptor in &self.stages {
            let mut stage = registry.instantiate(descriptor)?;
            stage.prepare(&config);
            stage.process(buffer)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::preset::resolve_preset;
    use crate::stages::{BuiltinStageFactory, StageFactory};

    #[test]
    fn bass_default_topology() {
        let params = resolve_preset(InstrumentFamily::Bass, "default").unwrap();
        let chain = Chain::build(InstrumentFamily::Bass, &params, &StageRegistry::builtin()).unwrap();
        assert_eq!(
            chain.kinds(),
            vec![
                StageKind::NoiseGate,
                StageKind::Compressor,
                StageKind::Distortion,
                StageKind::LowShelf,
                StageKind::PeakEq,
                StageKind::Chorus,
                StageKind::Limiter,
            ]
        );
    }

    #[test]
    fn missing_stage_fails_the_build() {
        let mut registry = StageRegistry::new();
        for kind in StageKind::ALL {
            if kind != StageKind::Reverb {
                registry.register_factory(Box::new(BuiltinStageFactory::new(kind)));
            }
        }
        let params = resolve_preset(InstrumentFamily::Vocal, "default").unwrap();
        let err = Chain::build(InstrumentFamily::Vocal, &params, &registry).unwrap_err();
        assert!(matches!(
            err,
            RackError::DependencyMissing {
                stage: StageKind::Reverb
            }
        ));

        // Bass never needs a reverb.
        let params = resolve_preset(InstrumentFamily::Bass, "default").unwrap();
        assert!(Chain::build(InstrumentFamily::Bass, &params, &registry).is_ok());
    }

    #[test]
    fn processing_twice_gives_identical_output() {
        let registry = StageRegistry::builtin();
        let params = resolve_preset(InstrumentFamily::Guitar, "ambient").unwrap();
        let chain = Chain::build(InstrumentFamily::Guitar, &params, &registry).unwrap();
        let input: Vec<f32> = (0..2_048).map(|i| (i as f32 * 0.05).sin() * 0.3).collect();
        let mut a = AudioBuffer::from_channels(vec![input.clone(), input.clone()]).unwrap();
        let mut b = a.clone();
        chain.process(&registry, &mut a, 44_100).unwrap();
        chain.process(&registry, &mut b, 44_100).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn builtin_factory_reports_its_kind() {
        assert_eq!(BuiltinStageFactory::new(StageKind::Delay).kind(), StageKind::Delay);
    }
}
