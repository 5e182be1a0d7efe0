use std::collections::{BTreeMap, HashMap};
use std::fmt;
use std::ops::RangeInclusive;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Snapshot of a rack's active values, keyed by parameter id.
pub type Settings = BTreeMap<String, f32>;

#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ParameterId(String);

impl ParameterId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for ParameterId {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

impl fmt::Display for ParameterId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ParameterDefinition {
    pub id: ParameterId,
    pub name: String,
    pub min: f32,
    pub max: f32,
    pub default: f32,
    pub unit: Option<String>,
    pub description: Option<String>,
}

impl ParameterDefinition {
    /// Panics if `default` lies outside `range`; layouts are static tables.
    pub fn new(
        id: impl Into<ParameterId>,
        name: impl Into<String>,
        range: RangeInclusive<f32>,
        default: f32,
    ) -> Self {
        let min = *range.start();
        let max = *range.end();
        assert!(min <= max, "parameter min must be <= max");
        assert!(default >= min && default <= max, "default outside range");
        Self {
            id: id.into(),
            name: name.into(),
            min,
            max,
            default,
            unit: None,
            description: None,
        }
    }

    pub fn with_unit(mut self, unit: impl Into<String>) -> Self {
        self.unit = Some(unit.into());
        self
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn validate(&self, value: f32) -> Result<(), ParameterError> {
        if !value.is_finite() {
            return Err(ParameterError::NonFinite {
                id: self.id.clone(),
            });
        }
        if value < self.min || value > self.max {
            return Err(ParameterError::OutOfRange {
                id: self.id.clone(),
                min: self.min,
                max: self.max,
                value,
            });
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ParameterLayout {
    parameters: Vec<ParameterDefinition>,
}

impl ParameterLayout {
    pub fn new(parameters: Vec<ParameterDefinition>) -> Self {
        Self { parameters }
    }

    pub fn parameters(&self) -> &[ParameterDefinition] {
        &self.parameters
    }

    pub fn find(&self, id: &str) -> Option<&ParameterDefinition> {
        self.parameters
            .iter()
            .find(|definition| definition.id.as_str() == id)
    }

    pub fn defaults(&self) -> Settings {
        self.parameters
            .iter()
            .map(|definition| (definition.id.to_string(), definition.default))
            .collect()
    }
}

/// Active values for one layout. Keys are fixed by the layout: updates
/// change values but never add or remove entries.
#[derive(Debug, Clone)]
pub struct ParameterSet {
    layout: &'static ParameterLayout,
    values: HashMap<ParameterId, f32>,
}

impl ParameterSet {
    pub fn new(layout: &'static ParameterLayout) -> Self {
        let values = layout
            .parameters()
            .iter()
            .map(|parameter| (parameter.id.clone(), parameter.default))
            .collect();
        Self { layout, values }
    }

    pub fn layout(&self) -> &'static ParameterLayout {
        self.layout
    }

    pub fn get(&self, id: &str) -> Option<f32> {
        self.values.get(&ParameterId::from(id)).copied()
    }

    /// Value of `id`, or `0.0` for an id the layout does not know.
    pub fn value(&self, id: &str) -> f32 {
        self.get(id).unwrap_or_default()
    }

    pub fn set(&mut self, id: &str, value: f32) -> Result<(), ParameterError> {
        let definition = self
            .layout
            .find(id)
            .ok_or_else(|| ParameterError::UnknownParameter(ParameterId::from(id)))?;
        definition.validate(value)?;
        self.values.insert(definition.id.clone(), value);
        Ok(())
    }

    /// Applies every override or none of them.
    pub fn apply<'a, I>(&mut self, overrides: I) -> Result<(), ParameterError>
    where
        I: IntoIterator<Item = (&'a str, f32)>,
    {
        let mut staged = self.clone();
        for (id, value) in overrides {
            staged.set(id, value)?;
        }
        *self = staged;
        Ok(())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&ParameterId, f32)> {
        self.values.iter().map(|(id, value)| (id, *value))
    }

    pub fn snapshot(&self) -> Settings {
        self.values
            .iter()
            .map(|(id, value)| (id.to_string(), *value))
            .collect()
    }
}

impl PartialEq for ParameterSet {
    fn eq(&self, other: &Self) -> bool {
        std::ptr::eq(self.layout, other.layout) && self.values == other.values
    }
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum ParameterError {
    #[error("unknown parameter `{0}`")]
    UnknownParameter(ParameterId),
    #[error("parameter `{id}` received value {value} outside of range {min}..={max}")]
    OutOfRange {
        id: ParameterId,
        min: f32,
        max: f32,
        value: f32,
    },
    #[error("parameter `{id}` received a non-finite value")]
    NonFinite { id: ParameterId },
}

#[cfg(test)]
mod tests {
    use once_cell::sync::Lazy;

    use super::*;

    static LAYOUT: Lazy<ParameterLayout> = Lazy::new(|| {
        ParameterLayout::new(vec![
            ParameterDefinition::new("drive_db", "Drive", 0.0..=48.0, 8.0).with_unit("dB"),
            ParameterDefinition::new("mix", "Mix", 0.0..=1.0, 0.3),
        ])
    });

    #[test]
    fn set_validates_against_layout() {
        let mut params = ParameterSet::new(&LAYOUT);
        params.set("mix", 0.5).unwrap();
        assert_eq!(params.get("mix"), Some(0.5));
        assert!(matches!(
            params.set("missing", 1.0),
            Err(ParameterError::UnknownParameter(_))
        ));
        assert!(matches!(
            params.set("mix", 2.0),
            Err(ParameterError::OutOfRange { .. })
        ));
        assert!(matches!(
            params.set("drive_db", f32::NAN),
            Err(ParameterError::NonFinite { .. })
        ));
    }

    #[test]
    fn apply_is_all_or_nothing() {
        let mut params = ParameterSet::new(&LAYOUT);
        let result = params.apply([("drive_db", 12.0), ("bogus", 1.0)]);
        assert!(result.is_err());
        assert_eq!(params.get("drive_db"), Some(8.0));
        assert_eq!(params.snapshot(), LAYOUT.defaults());
    }
}
