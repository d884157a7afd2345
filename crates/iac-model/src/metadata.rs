//! Extracted image metadata.
//!
//! The backend returns metadata as a flat JSON object whose keys are human
//! readable field names ("Camera Make", "Date Taken", ...). Apart from the
//! reserved `Flags` key the values are treated as opaque display data, so the
//! object is kept as an ordered JSON map rather than a fixed struct.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::{ModelError, Result};

/// Reserved key holding the consistency warnings.
pub const FLAGS_KEY: &str = "Flags";

/// Key the simulation endpoint may add to simulated metadata; never shown as a row.
pub const SIMULATED_FLAGS_KEY: &str = "Simulated Flags";

/// Value the backend uses for an EXIF tag it could not read.
pub const MISSING_VALUE: &str = "Could not retrieve";

/// Ordered mapping of field name to displayable value.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Metadata(Map<String, Value>);

impl Metadata {
    pub fn new() -> Self {
        Self::default()
    }

    /// Wrap an arbitrary JSON value, rejecting anything that is not an object.
    pub fn from_value(value: Value) -> Result<Self> {
        match value {
            Value::Object(map) => Ok(Self(map)),
            other => Err(ModelError::MetadataShape(json_kind(&other).to_string())),
        }
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    /// Whether `key` is an ordinary field that a simulation may edit.
    pub fn is_editable(&self, key: &str) -> bool {
        key != FLAGS_KEY && self.0.contains_key(key)
    }

    /// Insert or replace a field, keeping the position of an existing key.
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<Value>) {
        self.0.insert(key.into(), value.into());
    }

    /// Consistency warnings in backend order.
    ///
    /// A missing or malformed `Flags` entry yields no warnings.
    pub fn flags(&self) -> Vec<String> {
        match self.0.get(FLAGS_KEY) {
            Some(Value::Array(items)) => items.iter().map(display_value).collect(),
            _ => Vec::new(),
        }
    }

    /// Ordinary fields in backend order, excluding the reserved `Flags` key.
    pub fn fields(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.0
            .iter()
            .filter(|(key, _)| key.as_str() != FLAGS_KEY)
            .map(|(key, value)| (key.as_str(), value))
    }

    /// Number of ordinary fields.
    pub fn field_count(&self) -> usize {
        self.fields().count()
    }

    /// Names of fields the backend could not retrieve.
    pub fn missing_fields(&self) -> Vec<&str> {
        self.fields()
            .filter(|(_, value)| value.as_str() == Some(MISSING_VALUE))
            .map(|(key, _)| key)
            .collect()
    }

    pub fn as_map(&self) -> &Map<String, Value> {
        &self.0
    }
}

impl From<Map<String, Value>> for Metadata {
    fn from(map: Map<String, Value>) -> Self {
        Self(map)
    }
}

impl<K: Into<String>, V: Into<Value>> FromIterator<(K, V)> for Metadata {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self(
            iter.into_iter()
                .map(|(key, value)| (key.into(), value.into()))
                .collect(),
        )
    }
}

/// Working copy of [`Metadata`] edited during a manipulation simulation.
///
/// The draft owns its own map; editing it never touches the metadata it was
/// seeded from.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SimulationDraft(Metadata);

impl SimulationDraft {
    pub fn seed(metadata: &Metadata) -> Self {
        Self(metadata.clone())
    }

    /// Replace a single field with user-entered text.
    ///
    /// Only fields present in the seeded metadata can be edited; the reserved
    /// `Flags` key and unknown names are refused.
    pub fn set_field(&mut self, key: &str, value: impl Into<String>) -> Result<()> {
        if !self.0.is_editable(key) {
            return Err(ModelError::FieldNotEditable(key.to_string()));
        }
        self.0.insert(key, Value::String(value.into()));
        Ok(())
    }

    /// Current text of an editable field, empty when unset.
    pub fn field_text(&self, key: &str) -> String {
        self.0.get(key).map(display_value).unwrap_or_default()
    }

    pub fn as_metadata(&self) -> &Metadata {
        &self.0
    }
}

/// Render a metadata value as table text.
pub fn display_value(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(text) => text.clone(),
        Value::Bool(flag) => flag.to_string(),
        Value::Number(number) => number.to_string(),
        Value::Array(items) => items
            .iter()
            .map(display_value)
            .collect::<Vec<_>>()
            .join(", "),
        Value::Object(_) => value.to_string(),
    }
}

/// Whether a simulated value should be highlighted as changed.
///
/// This is a shallow inequality: scalars compare by value, while arrays and
/// objects are always reported as changed because two separately decoded
/// containers are never the same value. A field absent from the original
/// counts as changed.
pub fn shallow_ne(original: Option<&Value>, simulated: &Value) -> bool {
    match original {
        None => true,
        Some(original) if is_scalar(original) && is_scalar(simulated) => original != simulated,
        Some(_) => true,
    }
}

fn is_scalar(value: &Value) -> bool {
    !matches!(value, Value::Array(_) | Value::Object(_))
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
