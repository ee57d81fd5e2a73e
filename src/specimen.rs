//! User-supplied specimen metadata.
//!
//! A JSON file per specimen carries the datastore fields that cannot be read
//! from a silhouette file: the Aphia ID used for the taxonomy lookup, the
//! body part to export (`anatomical_feature`), the `shape_type`, units and
//! any descriptive fields the datastore schema defines.

use crate::constants::fields;
use crate::error::{KrmError, Result};
use serde_json::{Map, Value};
use std::path::{Path, PathBuf};
use tracing::debug;

/// Specimen metadata loaded from JSON
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SpecimenMetadata {
    pub path: Option<PathBuf>,
    pub fields: Map<String, Value>,
}

impl SpecimenMetadata {
    /// Load a JSON object from a file
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Err(KrmError::FileNotFound {
                path: path.to_path_buf(),
            });
        }

        let content = std::fs::read_to_string(path)?;
        let mut metadata = Self::from_json_str(&content)?;
        metadata.path = Some(path.to_path_buf());

        debug!(
            "Loaded {} specimen fields from {}",
            metadata.fields.len(),
            path.display()
        );
        Ok(metadata)
    }

    /// Parse a JSON object from text
    pub fn from_json_str(content: &str) -> Result<Self> {
        match serde_json::from_str::<Value>(content)? {
            Value::Object(fields) => Ok(Self { path: None, fields }),
            other => Err(KrmError::Configuration {
                message: format!(
                    "Specimen metadata must be a JSON object, found {}",
                    json_type_name(&other)
                ),
            }),
        }
    }

    pub fn from_fields(fields: Map<String, Value>) -> Self {
        Self { path: None, fields }
    }

    pub fn get_str(&self, key: &str) -> Option<&str> {
        self.fields.get(key).and_then(Value::as_str)
    }

    /// Aphia ID, accepted either as a number or as a numeric string
    pub fn aphia_id(&self) -> Option<i64> {
        match self.fields.get(fields::APHIA_ID)? {
            Value::Number(n) => n.as_i64(),
            Value::String(s) => s.trim().parse().ok(),
            _ => None,
        }
    }

    pub fn anatomical_feature(&self) -> Option<&str> {
        self.get_str(fields::ANATOMICAL_FEATURE)
            .filter(|s| !s.trim().is_empty())
    }

    /// Requested shape type, when present as a non-empty string
    pub fn shape_type(&self) -> Option<&str> {
        self.get_str(fields::SHAPE_TYPE)
            .filter(|s| !s.trim().is_empty())
    }

    pub fn specimen_length_unit(&self) -> Option<&str> {
        self.get_str(fields::SPECIMEN_LENGTH_UNIT)
            .filter(|s| !s.is_empty())
    }

    pub fn to_value(&self) -> Value {
        Value::Object(self.fields.clone())
    }
}

fn json_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
