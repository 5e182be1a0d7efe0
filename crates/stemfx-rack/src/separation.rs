//! Source separation seam. Back-ends live outside this crate; the rack only
//! needs the stem vocabulary and a way to pick one stem out of a mapping.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::buffer::AudioBuffer;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StemName {
    Vocals,
    Bass,
    Guitar,
    Piano,
    Drums,
    Other,
}

impl StemName {
    pub const ALL: [StemName; 6] = [
        StemName::Vocals,
        StemName::Bass,
        StemName::Guitar,
        StemName::Piano,
        StemName::Drums,
        StemName::Other,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            StemName::Vocals => "vocals",
            StemName::Bass => "bass",
            StemName::Guitar => "guitar",
            StemName::Piano => "piano",
            StemName::Drums => "drums",
            StemName::Other => "other",
        }
    }
}

impl fmt::Display for StemName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown stem `{0}`")]
pub struct UnknownStem(pub String);

impl FromStr for StemName {
    type Err = UnknownStem;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        StemName::ALL
            .into_iter()
            .find(|stem| stem.as_str().eq_ignore_ascii_case(s))
            .ok_or_else(|| UnknownStem(s.to_string()))
    }
}

/// Channel-major buffers keyed by stem.
pub type StemMap = BTreeMap<StemName, AudioBuffer>;

#[derive(Debug, Error)]
pub enum SeparationError {
    #[error("separation backend failed: {message}")]
    Backend {
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },
    #[error("separator returned stem `{stem}` with shape {actual:?}, mix has {expected:?}")]
    ShapeMismatch {
        stem: StemName,
        expected: (usize, usize),
        actual: (usize, usize),
    },
}

impl SeparationError {
    pub fn backend(message: impl Into<String>) -> Self {
        Self::Backend {
            message: message.into(),
            source: None,
        }
    }

    pub fn with_source(
        message: impl Into<String>,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        Self::Backend {
            message: message.into(),
            source: Some(Box::new(source)),
        }
    }
}

/// Splits a channel-major mix into stems.
///
/// Implementations may omit stems they cannot produce; callers decide how
/// to fall back.
pub trait SourceSeparator {
    fn name(&self) -> &str;

    fn separate(&self, mix: &AudioBuffer, sample_rate: u32) -> Result<StemMap, SeparationError>;
}

/// Every stem is a copy of the mix.
#[derive(Debug, Default, Clone, Copy)]
pub struct PassthroughSeparator;

impl SourceSeparator for PassthroughSeparator {
    fn name(&self) -> &str {
        "passthrough"
    }

    fn separate(&self, mix: &AudioBuffer, _sample_rate: u32) -> Result<StemMap, SeparationError> {
        Ok(StemName::ALL
            .into_iter()
            .map(|stem| (stem, mix.clone()))
            .collect())
    }
}

pub fn select_stem(stems: &StemMap, stem: StemName) -> Option<&AudioBuffer> {
    stems.get(&stem)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stem_names_round_trip_through_strings() {
        for stem in StemName::ALL {
            assert_eq!(stem.as_str().parse::<StemName>(), Ok(stem));
        }
        assert_eq!("VOCALS".parse::<StemName>(), Ok(StemName::Vocals));
        assert!("kazoo".parse::<StemName>().is_err());
    }

    #[test]
    fn passthrough_yields_every_stem() {
        let mix = AudioBuffer::from_channels(vec![vec![0.1, 0.2], vec![0.3, 0.4]]).unwrap();
        let stems = PassthroughSeparator.separate(&mix, 44_100).unwrap();
        assert_eq!(stems.len(), StemName::ALL.len());
        assert_eq!(select_stem(&stems, StemName::Drums), Some(&mix));
    }

    #[test]
    fn select_stem_reports_missing_entries() {
        let stems = StemMap::new();
        assert!(select_stem(&stems, StemName::Bass).is_none());
    }
}
