//! Assembly of the merged datastore record.
//!
//! Layers are applied in increasing precedence, later layers overwriting
//! earlier ones key by key:
//!
//! 1. taxonomy (`aphia_id`, `specimen_<rank>`, `specimen_vernaculars`)
//! 2. specimen metadata from the user JSON file
//! 3. metadata read from the silhouette file
//! 4. `shape_data` built from the selected body part
//!
//! The datastore holds one anatomical feature per record, so only the body
//! part named by `anatomical_feature` is converted.

use crate::constants::fields;
use crate::error::{KrmError, Result};
use crate::models::{CanonicalShape, MergedRecord, ParsedSilhouette};
use crate::specimen::SpecimenMetadata;
use crate::taxonomy::TaxonomyRecord;
use crate::transform::{TransformOptions, to_canonical};
use serde_json::{Map, Value, json};
use tracing::{debug, warn};

/// Result of a merge
#[derive(Debug, Clone, Default)]
pub struct MergeOutcome {
    pub record: MergedRecord,
    /// Label of the converted body part
    pub body_part: Option<String>,
    pub shape: Option<CanonicalShape>,
    /// Why the shape block was left out, if it was
    pub shape_omitted: Option<String>,
}

/// Combines the metadata sources and the converted shape
#[derive(Debug, Default)]
pub struct MergeAssembler<'a> {
    taxonomy: Option<&'a TaxonomyRecord>,
    specimen: Option<&'a SpecimenMetadata>,
    silhouette: Option<&'a ParsedSilhouette>,
    transform: TransformOptions,
}

impl<'a> MergeAssembler<'a> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_taxonomy(mut self, taxonomy: &'a TaxonomyRecord) -> Self {
        self.taxonomy = Some(taxonomy);
        self
    }

    pub fn with_specimen(mut self, specimen: &'a SpecimenMetadata) -> Self {
        self.specimen = Some(specimen);
        self
    }

    pub fn with_silhouette(mut self, silhouette: &'a ParsedSilhouette) -> Self {
        self.silhouette = Some(silhouette);
        self
    }

    pub fn with_transform_options(mut self, options: TransformOptions) -> Self {
        self.transform = options;
        self
    }

    pub fn merge(&self) -> Result<MergeOutcome> {
        let mut merged = Map::new();

        if let Some(taxonomy) = self.taxonomy {
            overlay(&mut merged, taxonomy.to_layer());
        }
        if let Some(specimen) = self.specimen {
            overlay(&mut merged, specimen.fields.clone());
        }

        let mut outcome = MergeOutcome::default();

        if let Some(silhouette) = self.silhouette {
            overlay(&mut merged, silhouette.metadata.to_layer());

            let target = self
                .specimen
                .and_then(SpecimenMetadata::anatomical_feature)
                .ok_or_else(|| KrmError::missing_field(fields::ANATOMICAL_FEATURE))?;

            let part = silhouette.body_parts.select(target).ok_or_else(|| {
                KrmError::BodyPartNotFound {
                    label: target.to_string(),
                    available: silhouette.body_parts.labels().join(", "),
                }
            })?;
            debug!("Selected body part '{}' for '{}'", part.label, target);

            let shape = to_canonical(part, &self.transform)?;

            match self.specimen.and_then(SpecimenMetadata::shape_type) {
                Some(shape_type) => {
                    merged.insert(
                        fields::SHAPE_DATA.to_string(),
                        shape_data(shape_type, &shape),
                    );
                }
                None => {
                    warn!("Shape type is missing or not valid; shape data will not be merged");
                    outcome.shape_omitted =
                        Some(format!("'{}' missing or not a non-empty string", fields::SHAPE_TYPE));
                }
            }

            outcome.body_part = Some(part.label.clone());
            outcome.shape = Some(shape);
        }

        strip_nulls(&mut merged);
        outcome.record = MergedRecord { fields: merged };

        debug!("Merged record has {} top-level fields", outcome.record.fields.len());
        Ok(outcome)
    }
}

/// The `shape_data` table of the datastore
pub fn shape_data(shape_type: &str, shape: &CanonicalShape) -> Value {
    json!({
        "shape_type": shape_type,
        "x": shape.x,
        "y": shape.y,
        "z": shape.z,
        "height": shape.height,
        "width": shape.width,
    })
}

/// Copy every key of `layer` into `base`, replacing existing values
pub fn overlay(base: &mut Map<String, Value>, layer: Map<String, Value>) {
    for (key, value) in layer {
        base.insert(key, value);
    }
}

/// Remove JSON nulls, which have no TOML representation
pub fn strip_nulls(map: &mut Map<String, Value>) {
    map.retain(|_, value| !value.is_null());
    for value in map.values_mut() {
        strip_value_nulls(value);
    }
}

fn strip_value_nulls(value: &mut Value) {
    match value {
        Value::Object(map) => strip_nulls(map),
        Value::Array(items) => {
            items.retain(|item| !item.is_null());
            items.iter_mut().for_each(strip_value_nulls);
        }
        _ => {}
    }
}
