use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use stemfx_rack::InstrumentFamily;
use tracing::debug;

/// Preset and overrides for one family's rack.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RackConfig {
    pub preset: Option<String>,
    pub overrides: BTreeMap<String, f32>,
}

impl RackConfig {
    pub fn overrides(&self) -> impl Iterator<Item = (&str, f32)> {
        self.overrides.iter().map(|(id, value)| (id.as_str(), *value))
    }
}

/// Rack configuration file: `{ "<family>": { "preset": .., "overrides": {..} } }`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RackConfigFile {
    pub racks: BTreeMap<InstrumentFamily, RackConfig>,
}

/// `<config dir>/stemfx/racks.json`.
pub fn default_config_path() -> Option<PathBuf> {
    let mut base = dirs::config_dir()?;
    base.push("stemfx");
    base.push("racks.json");
    Some(base)
}

impl RackConfigFile {
    pub fn from_path(path: &Path) -> Result<Self> {
        let contents = fs::read_to_string(path)
            .with_context(|| format!("failed to read rack config {}", path.display()))?;
        serde_json::from_str(&contents)
            .with_context(|| format!("{} is not a valid rack config", path.display()))
    }

    /// An explicit path must exist. Without one, the per-user default file is
    /// used when present.
    pub fn load(explicit: Option<&Path>) -> Result<Self> {
        if let Some(path) = explicit {
            return Self::from_path(path);
        }
        match default_config_path() {
            Some(path) if path.is_file() => {
                debug!(path = %path.display(), "using rack config");
                Self::from_path(&path)
            }
            _ => Ok(Self::default()),
        }
    }

    /// Merges per-family preset flags over the file. Flags win.
    pub fn with_presets<'a, I>(mut self, presets: I) -> Self
    where
        I: IntoIterator<Item = (InstrumentFamily, Option<&'a str>)>,
    {
        for (family, preset) in presets {
            if let Some(preset) = preset {
                self.racks.entry(family).or_default().preset = Some(preset.to_string());
            }
        }
        self
    }

    pub fn rack(&self, family: InstrumentFamily) -> RackConfig {
        self.racks.get(&family).cloned().unwrap_or_default()
    }

    /// Preset name for `family`, falling back to the family's default.
    pub fn preset(&self, family: InstrumentFamily) -> String {
        self.racks
            .get(&family)
            .and_then(|rack| rack.preset.clone())
            .unwrap_or_else(|| family.default_preset().to_string())
    }
}
