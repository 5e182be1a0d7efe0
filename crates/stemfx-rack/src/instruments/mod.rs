//! Per-family default tables, presets, randomization ranges and chain
//! topologies.

pub mod bass;
pub mod guitar;
pub mod synth;
pub mod vocal;

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::params::{ParameterLayout, ParameterSet};
use crate::preset::{Preset, DEFAULT_PRESET};
use crate::randomize::RandomRange;
use crate::separation::StemName;
use crate::stages::StageDescriptor;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InstrumentFamily {
    Vocal,
    Bass,
    Guitar,
    Synth,
}

impl InstrumentFamily {
    pub const ALL: [InstrumentFamily; 4] = [
        InstrumentFamily::Vocal,
        InstrumentFamily::Bass,
        InstrumentFamily::Guitar,
        InstrumentFamily::Synth,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            InstrumentFamily::Vocal => "vocal",
            InstrumentFamily::Bass => "bass",
            InstrumentFamily::Guitar => "guitar",
            InstrumentFamily::Synth => "synth",
        }
    }

    /// Separated stem this family's rack is fed from.
    pub fn stem(&self) -> StemName {
        match self {
            InstrumentFamily::Vocal => StemName::Vocals,
            InstrumentFamily::Bass => StemName::Bass,
            InstrumentFamily::Guitar => StemName::Guitar,
            InstrumentFamily::Synth => StemName::Piano,
        }
    }

    /// Preset a freshly configured pipeline uses when none is given.
    pub fn default_preset(&self) -> &'static str {
        match self {
            InstrumentFamily::Guitar => guitar::CLEAN,
            _ => DEFAULT_PRESET,
        }
    }

    pub fn layout(&self) -> &'static ParameterLayout {
        match self {
            InstrumentFamily::Vocal => &*vocal::LAYOUT,
            InstrumentFamily::Bass => &*bass::LAYOUT,
            InstrumentFamily::Guitar => &*guitar::LAYOUT,
            InstrumentFamily::Synth => &*synth::LAYOUT,
        }
    }

    pub fn presets(&self) -> &'static [Preset] {
        match self {
            InstrumentFamily::Vocal => vocal::PRESETS,
            InstrumentFamily::Bass => bass::PRESETS,
            InstrumentFamily::Guitar => guitar::PRESETS,
            InstrumentFamily::Synth => synth::PRESETS,
        }
    }

    pub fn random_ranges(&self) -> &'static [RandomRange] {
        match self {
            InstrumentFamily::Vocal => vocal::RANDOM_RANGES,
            InstrumentFamily::Bass => bass::RANDOM_RANGES,
            InstrumentFamily::Guitar => guitar::RANDOM_RANGES,
            InstrumentFamily::Synth => synth::RANDOM_RANGES,
        }
    }

    /// Stage descriptors for `parameters`, in this family's fixed order.
    pub fn build_chain(&self, parameters: &ParameterSet) -> Vec<StageDescriptor> {
        match self {
            InstrumentFamily::Vocal => vocal::build_chain(parameters),
            InstrumentFamily::Bass => bass::build_chain(parameters),
            InstrumentFamily::Guitar => guitar::build_chain(parameters),
            InstrumentFamily::Synth => synth::build_chain(parameters),
        }
    }
}

impl fmt::Display for InstrumentFamily {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown instrument family `{0}`")]
pub struct UnknownFamily(pub String);

impl FromStr for InstrumentFamily {
    type Err = UnknownFamily;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "vocal" | "vocals" => Ok(InstrumentFamily::Vocal),
            "bass" => Ok(InstrumentFamily::Bass),
            "guitar" => Ok(InstrumentFamily::Guitar),
            "synth" | "piano" | "keys" => Ok(InstrumentFamily::Synth),
            _ => Err(UnknownFamily(s.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn families_parse_from_stem_names() {
        assert_eq!("piano".parse::<InstrumentFamily>(), Ok(InstrumentFamily::Synth));
        assert_eq!("Vocals".parse::<InstrumentFamily>(), Ok(InstrumentFamily::Vocal));
        assert!("drums".parse::<InstrumentFamily>().is_err());
    }

    #[test]
    fn random_ranges_fit_inside_layouts() {
        for family in InstrumentFamily::ALL {
            for range in family.random_ranges() {
                let definition = family
                    .layout()
                    .find(range.id)
                    .unwrap_or_else(|| panic!("{family}: {}", range.id));
                assert!(range.min >= definition.min && range.max <= definition.max);
                assert!(range.min <= range.max);
            }
        }
    }

    #[test]
    fn default_preset_is_known() {
        for family in InstrumentFamily::ALL {
            let name = family.default_preset();
            assert!(name == DEFAULT_PRESET || family.presets().iter().any(|p| p.name == name));
        }
    }
}
