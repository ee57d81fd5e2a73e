//! Core data structures and types for KRM processing.
//!
//! Defines the silhouette file formats, the metadata and body-part records
//! produced by the parser, the canonical shape produced by the coordinate
//! transform, and the merged record handed to validation and output.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::path::PathBuf;
use tracing::warn;

/// Silhouette file layouts
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SourceFormat {
    /// Legacy layout: four fixed metadata lines plus a trailing comment line
    FormatA,
    /// Layout with a `<meta>` ... `</meta>` keyword block
    FormatB,
}

impl SourceFormat {
    /// Whether header lines and labels have their quote characters stripped
    pub fn strips_header_quotes(&self) -> bool {
        matches!(self, SourceFormat::FormatA)
    }
}

/// Metadata extracted from a silhouette file
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MetadataRecord {
    #[serde(skip_serializing_if = "Vec::is_empty", default)]
    pub description: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub specimen_length: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub specimen_weight: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub length_unit: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub specimen_weight_unit: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rotate: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rotate_method: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub smooth: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub smooth_method: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub straighten: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub straighten_method: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image_files: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub date_created: Option<String>,
    /// Inclusion count; controls parsing and is not part of the output record
    #[serde(skip_serializing, default)]
    pub nsb: Option<usize>,
}

impl MetadataRecord {
    /// Append a description entry
    pub fn push_description(&mut self, entry: impl Into<String>) {
        self.description.push(entry.into());
    }

    /// Flatten into a JSON object for merging
    pub fn to_layer(&self) -> Map<String, Value> {
        match serde_json::to_value(self) {
            Ok(Value::Object(map)) => map,
            Ok(other) => {
                warn!("File metadata did not serialize to an object: {}", other);
                Map::new()
            }
            Err(e) => {
                warn!("File metadata could not be serialized: {}", e);
                Map::new()
            }
        }
    }
}

/// Outline of one body part as read from the file
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BodyPart {
    pub label: String,
    /// Declared number of coordinate rows
    pub point_count: usize,
    /// Raw coordinate rows; always `point_count + 1` entries
    pub nodes: Vec<String>,
}

/// All body parts of a file, in file order
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BodyPartTable {
    /// Column header line shared by all body parts
    pub header: String,
    pub parts: Vec<BodyPart>,
}

impl BodyPartTable {
    pub fn labels(&self) -> Vec<&str> {
        self.parts.iter().map(|p| p.label.as_str()).collect()
    }

    /// Find a body part by label.
    ///
    /// An exact label match wins; otherwise the last label that contains
    /// `target` is returned (labels often carry an operation suffix such as
    /// "swimbladder smoothed").
    pub fn select(&self, target: &str) -> Option<&BodyPart> {
        let target = target.trim();
        self.parts
            .iter()
            .find(|p| p.label == target)
            .or_else(|| self.parts.iter().rev().find(|p| p.label.contains(target)))
    }
}

/// Result of parsing one silhouette file
#[derive(Debug, Clone)]
pub struct ParsedSilhouette {
    pub path: PathBuf,
    pub format: SourceFormat,
    pub metadata: MetadataRecord,
    pub body_parts: BodyPartTable,
}

/// Centerline plus half-extent outline
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CanonicalShape {
    pub x: Vec<f64>,
    pub y: Vec<f64>,
    pub z: Vec<f64>,
    pub height: Vec<f64>,
    pub width: Vec<f64>,
}

impl CanonicalShape {
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            x: Vec::with_capacity(capacity),
            y: Vec::with_capacity(capacity),
            z: Vec::with_capacity(capacity),
            height: Vec::with_capacity(capacity),
            width: Vec::with_capacity(capacity),
        }
    }

    pub fn len(&self) -> usize {
        self.x.len()
    }

    pub fn is_empty(&self) -> bool {
        self.x.is_empty()
    }
}

/// Final output record
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MergedRecord {
    pub fields: Map<String, Value>,
}

impl MergedRecord {
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.fields.get(key)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.fields.contains_key(key)
    }

    pub fn to_value(&self) -> Value {
        Value::Object(self.fields.clone())
    }
}

/// Statistics for one conversion run
#[derive(Debug, Default)]
pub struct ConversionStats {
    pub format: Option<SourceFormat>,
    pub lines_read: usize,
    pub body_parts: usize,
    pub selected_body_part: String,
    pub points: usize,
    pub record_valid: Option<bool>,
    pub output_path: Option<PathBuf>,
    pub processing_time_ms: u128,
}
