//! Datastore schema loading and validation.
//!
//! Wraps a compiled JSON Schema so the specimen metadata and the merged
//! record can be checked against the datastore schema before output.

use crate::error::{KrmError, Result};
use jsonschema::Validator;
use serde_json::Value;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

/// Outcome of one validation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationReport {
    pub valid: bool,
    /// Human-readable list of violations when invalid
    pub reason: Option<String>,
}

impl ValidationReport {
    pub fn passed() -> Self {
        Self {
            valid: true,
            reason: None,
        }
    }
}

/// Compiled datastore schema
pub struct SchemaValidator {
    path: PathBuf,
    validator: Validator,
}

impl std::fmt::Debug for SchemaValidator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SchemaValidator")
            .field("path", &self.path)
            .finish_non_exhaustive()
    }
}

impl SchemaValidator {
    /// Read and compile a schema file
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Err(KrmError::FileNotFound {
                path: path.to_path_buf(),
            });
        }

        let content = std::fs::read_to_string(path)?;
        let schema: Value = serde_json::from_str(&content).map_err(|e| KrmError::Schema {
            path: path.to_path_buf(),
            reason: format!("not valid JSON: {}", e),
        })?;

        let validator = Self::from_value(path, &schema)?;
        info!("Loaded schema {}", path.display());
        Ok(validator)
    }

    /// Compile an in-memory schema document
    pub fn from_value(path: impl Into<PathBuf>, schema: &Value) -> Result<Self> {
        let path = path.into();
        let validator = jsonschema::validator_for(schema).map_err(|e| KrmError::Schema {
            path: path.clone(),
            reason: e.to_string(),
        })?;

        Ok(Self { path, validator })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Validate a document, collecting every violation
    pub fn validate(&self, instance: &Value) -> ValidationReport {
        let errors: Vec<String> = self
            .validator
            .iter_errors(instance)
            .map(|error| error.to_string())
            .collect();

        if errors.is_empty() {
            debug!("Document adheres to {}", self.path.display());
            return ValidationReport::passed();
        }

        let reason = errors.join("; ");
        warn!("Document does not adhere to the schema: {}", reason);
        ValidationReport {
            valid: false,
            reason: Some(reason),
        }
    }

    /// Validate and turn a failure into an error
    pub fn require_valid(&self, subject: &str, instance: &Value) -> Result<()> {
        let report = self.validate(instance);
        match report.reason {
            Some(reason) if !report.valid => Err(KrmError::ValidationFailed {
                subject: subject.to_string(),
                reason,
            }),
            _ => Ok(()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn datastore_schema() -> Value {
        json!({
            "$schema": "https://json-schema.org/draft/2020-12/schema",
            "type": "object",
            "required": ["aphia_id", "shape_data"],
            "properties": {
                "aphia_id": {"type": "integer"},
                "shape_data": {
                    "type": "object",
                    "required": ["shape_type", "x"],
                    "properties": {
                        "shape_type": {"enum": ["outline"]},
                        "x": {"type": "array", "items": {"type": "number"}}
                    }
                }
            }
        })
    }

    #[test]
    fn test_valid_document() {
        let validator = SchemaValidator::from_value("schema.json", &datastore_schema()).unwrap();

        let report = validator.validate(&json!({
            "aphia_id": 126417,
            "shape_data": {"shape_type": "outline", "x": [0.0, 1.5]}
        }));

        assert_eq!(report, ValidationReport::passed());
    }

    #[test]
    fn test_invalid_document_reports_reason() {
        let validator = SchemaValidator::from_value("schema.json", &datastore_schema()).unwrap();

        let report = validator.validate(&json!({
            "aphia_id": "herring",
            "shape_data": {"shape_type": "voxels", "x": []}
        }));

        assert!(!report.valid);
        let reason = report.reason.unwrap();
        assert!(reason.contains("herring"));
        assert!(reason.contains("voxels"));
    }

    #[test]
    fn test_require_valid() {
        let validator = SchemaValidator::from_value("schema.json", &datastore_schema()).unwrap();

        match validator.require_valid("merged record", &json!({})).unwrap_err() {
            KrmError::ValidationFailed { subject, reason } => {
                assert_eq!(subject, "merged record");
                assert!(reason.contains("aphia_id"));
            }
            other => panic!("Expected ValidationFailed error, got {:?}", other),
        }
    }

    #[test]
    fn test_invalid_schema_is_rejected() {
        let result = SchemaValidator::from_value("bad.json", &json!({"type": 12}));
        assert!(matches!(result, Err(KrmError::Schema { .. })));
    }

    #[test]
    fn test_load_schema_file() {
        let mut temp_file = NamedTempFile::new().unwrap();
        writeln!(temp_file, "{}", datastore_schema()).unwrap();

        let validator = SchemaValidator::load(temp_file.path()).unwrap();

        assert_eq!(validator.path(), temp_file.path());
    }

    #[test]
    fn test_load_schema_that_is_not_json() {
        let mut temp_file = NamedTempFile::new().unwrap();
        writeln!(temp_file, "not json").unwrap();

        assert!(matches!(
            SchemaValidator::load(temp_file.path()),
            Err(KrmError::Schema { .. })
        ));
    }
}
