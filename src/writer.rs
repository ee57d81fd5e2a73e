//! TOML output of merged datastore records.

use crate::constants::OUTPUT_EXTENSION;
use crate::error::{KrmError, Result};
use crate::models::MergedRecord;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Renders merged records in the datastore TOML layout
#[derive(Debug, Clone, Default)]
pub struct TomlWriter {
    pretty: bool,
}

impl TomlWriter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Put every array element on its own line
    pub fn pretty(mut self) -> Self {
        self.pretty = true;
        self
    }

    pub fn to_toml_string(&self, record: &MergedRecord) -> Result<String> {
        let rendered = if self.pretty {
            toml::to_string_pretty(record)?
        } else {
            toml::to_string(record)?
        };
        Ok(rendered)
    }

    /// Render and write a record, creating the parent directory if needed
    pub fn write(&self, record: &MergedRecord, path: &Path) -> Result<PathBuf> {
        let rendered = self.to_toml_string(record)?;

        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent).map_err(|e| KrmError::Configuration {
                message: format!(
                    "Failed to create output directory '{}': {}",
                    parent.display(),
                    e
                ),
            })?;
        }

        std::fs::write(path, &rendered)?;
        debug!("Wrote {} bytes", rendered.len());
        info!("Datastore record written to {}", path.display());
        Ok(path.to_path_buf())
    }
}

/// Default output location: the metadata file with a `.toml` extension
pub fn default_output_path(metadata_path: &Path) -> PathBuf {
    metadata_path.with_extension(OUTPUT_EXTENSION)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use tempfile::TempDir;

    fn record() -> MergedRecord {
        match json!({
            "aphia_id": 126417,
            "description": ["Pilchard 11", "Digitised by J. Horne"],
            "specimen_length": 189.0,
            "shape_data": {
                "shape_type": "outline",
                "x": [0.0, 10.0],
                "width": [0.0, 4.0]
            }
        }) {
            serde_json::Value::Object(fields) => MergedRecord { fields },
            _ => unreachable!(),
        }
    }

    #[test]
    fn test_toml_layout() {
        let rendered = TomlWriter::new().to_toml_string(&record()).unwrap();

        assert!(rendered.contains("aphia_id = 126417"));
        assert!(rendered.contains("specimen_length = 189.0"));
        assert!(rendered.contains("[shape_data]"));
        assert!(rendered.contains("shape_type = \"outline\""));

        let parsed: toml::Value = toml::from_str(&rendered).unwrap();
        assert_eq!(
            parsed["shape_data"]["width"].as_array().map(Vec::len),
            Some(2)
        );
        assert_eq!(parsed["description"][1].as_str(), Some("Digitised by J. Horne"));
    }

    #[test]
    fn test_write_creates_directories() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("out").join("herring.toml");

        let written = TomlWriter::new().pretty().write(&record(), &path).unwrap();

        assert_eq!(written, path);
        let content = std::fs::read_to_string(&path).unwrap();
        let parsed: toml::Value = toml::from_str(&content).unwrap();
        assert_eq!(parsed["aphia_id"].as_integer(), Some(126417));
    }

    #[test]
    fn test_default_output_path() {
        assert_eq!(
            default_output_path(Path::new("/data/Clupea_harengus_bd.json")),
            PathBuf::from("/data/Clupea_harengus_bd.toml")
        );
    }
}
