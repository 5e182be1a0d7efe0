use serde::Serialize;
use tracing::warn;

use crate::error::ConfigurationError;
use crate::instruments::InstrumentFamily;
use crate::params::{ParameterError, ParameterSet};

/// Name that always resolves to the unmodified default table.
pub const DEFAULT_PRESET: &str = "default";

/// A named, partial override of a family's defaults.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Preset {
    pub name: &'static str,
    pub overrides: &'static [(&'static str, f32)],
}

impl Preset {
    pub const fn new(name: &'static str, overrides: &'static [(&'static str, f32)]) -> Self {
        Self { name, overrides }
    }
}

/// `Ok(None)` for [`DEFAULT_PRESET`], the table entry for a known name.
pub fn lookup_preset(
    family: InstrumentFamily,
    name: &str,
) -> Result<Option<&'static Preset>, ConfigurationError> {
    if name == DEFAULT_PRESET {
        return Ok(None);
    }
    family
        .presets()
        .iter()
        .find(|preset| preset.name == name)
        .map(Some)
        .ok_or_else(|| ConfigurationError::UnknownPreset {
            family: family.to_string(),
            name: name.to_string(),
        })
}

/// Defaults merged with the named preset's overrides.
///
/// Unknown names are not an error: a warning is logged and the plain
/// defaults are returned.
pub fn resolve_preset(family: InstrumentFamily, name: &str) -> Result<ParameterSet, ParameterError> {
    let mut parameters = ParameterSet::new(family.layout());
    match lookup_preset(family, name) {
        Ok(Some(preset)) => parameters.apply(preset.overrides.iter().copied())?,
        Ok(None) => {}
        Err(err) => warn!(%err, "falling back to default parameters"),
    }
    Ok(parameters)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_preset_resolves_cleanly() {
        for family in InstrumentFamily::ALL {
            for preset in family.presets() {
                let params = resolve_preset(family, preset.name).unwrap();
                for (id, value) in preset.overrides {
                    assert_eq!(params.get(id), Some(*value), "{family}/{}", preset.name);
                }
            }
        }
    }

    #[test]
    fn unknown_name_is_reported_by_lookup_only() {
        assert!(lookup_preset(InstrumentFamily::Bass, "nope").is_err());
        let params = resolve_preset(InstrumentFamily::Bass, "nope").unwrap();
        assert_eq!(params.snapshot(), InstrumentFamily::Bass.layout().defaults());
    }
}
