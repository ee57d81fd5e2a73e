//! Conversion pipeline for one specimen.
//!
//! Orchestrates a single run: specimen metadata loading, taxonomy lookup,
//! silhouette parsing, record assembly, schema validation and TOML output.

use crate::config::KrmConfig;
use crate::constants::{UNKNOWN_UNIT, fields, unit_scale_to_meter};
use crate::error::{KrmError, Result};
use crate::merge::MergeAssembler;
use crate::models::ConversionStats;
use crate::parser::{SourceFile, parse_silhouette};
use crate::report::{ShapeSink, SilhouetteSummary, print_conversion_summary};
use crate::schema::SchemaValidator;
use crate::specimen::SpecimenMetadata;
use crate::taxonomy::{TaxonomyRecord, WormsClient};
use crate::writer::{TomlWriter, default_output_path};

use colored::*;
use serde_json::Value;
use std::path::PathBuf;
use std::time::Instant;
use tracing::{debug, info, warn};

/// Input and output locations of one conversion
#[derive(Debug, Clone)]
pub struct ConversionJob {
    pub dat_path: PathBuf,
    pub metadata_path: PathBuf,
    pub schema_path: Option<PathBuf>,
    pub output_path: Option<PathBuf>,
}

impl ConversionJob {
    pub fn new(dat_path: impl Into<PathBuf>, metadata_path: impl Into<PathBuf>) -> Self {
        Self {
            dat_path: dat_path.into(),
            metadata_path: metadata_path.into(),
            schema_path: None,
            output_path: None,
        }
    }

    pub fn with_schema(mut self, schema_path: impl Into<PathBuf>) -> Self {
        self.schema_path = Some(schema_path.into());
        self
    }

    pub fn with_output(mut self, output_path: impl Into<PathBuf>) -> Self {
        self.output_path = Some(output_path.into());
        self
    }

    /// Explicit output path, else next to the metadata file
    pub fn resolved_output_path(&self) -> PathBuf {
        self.output_path
            .clone()
            .unwrap_or_else(|| default_output_path(&self.metadata_path))
    }
}

/// Runs conversions with a fixed configuration
#[derive(Debug)]
pub struct KrmProcessor {
    config: KrmConfig,
}

impl KrmProcessor {
    pub fn new(config: KrmConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self { config })
    }

    pub fn config(&self) -> &KrmConfig {
        &self.config
    }

    /// Convert one specimen, printing a silhouette summary when configured
    pub async fn run(&self, job: &ConversionJob) -> Result<ConversionStats> {
        let mut summary = SilhouetteSummary::new();
        let stats = self.run_with_sink(job, &mut summary).await?;

        if self.config.print_summary {
            summary.print();
            print_conversion_summary(&stats);
        }
        Ok(stats)
    }

    /// Convert one specimen, handing the converted shape to `sink`
    pub async fn run_with_sink(
        &self,
        job: &ConversionJob,
        sink: &mut dyn ShapeSink,
    ) -> Result<ConversionStats> {
        let start_time = Instant::now();
        let output_path = job.resolved_output_path();

        println!("{}", "Starting KRM conversion".bright_green().bold());
        println!("  {} {}", "Silhouette:".bright_cyan(), job.dat_path.display());
        println!("  {} {}", "Metadata:".bright_cyan(), job.metadata_path.display());

        // Step 1: Specimen metadata, checked against the schema if one is given
        let specimen = SpecimenMetadata::load(&job.metadata_path)?;
        let validator = job
            .schema_path
            .as_deref()
            .map(SchemaValidator::load)
            .transpose()?;

        if let Some(validator) = &validator {
            if self.config.validate_specimen {
                self.check_schema(validator, "specimen metadata", &specimen.to_value())?;
            }
        }

        // Step 2: Taxonomy
        let taxonomy = self.resolve_taxonomy(&specimen).await?;

        // Step 3: Silhouette file
        let source = SourceFile::load(&job.dat_path)?;
        let silhouette = parse_silhouette(&source)?;
        println!(
            "  {} {:?} with {} body parts",
            "Parsed".bright_green(),
            silhouette.format,
            silhouette.body_parts.parts.len().to_string().bright_white().bold()
        );

        // Step 4: Merge
        let mut assembler = MergeAssembler::new()
            .with_specimen(&specimen)
            .with_silhouette(&silhouette)
            .with_transform_options(self.config.transform_options());
        if let Some(taxonomy) = &taxonomy {
            assembler = assembler.with_taxonomy(taxonomy);
        }
        let outcome = assembler.merge()?;

        if let Some(reason) = &outcome.shape_omitted {
            debug!("Shape block omitted: {}", reason);
            return Err(KrmError::missing_field(fields::SHAPE_TYPE));
        }

        let unit = silhouette
            .metadata
            .length_unit
            .as_deref()
            .or_else(|| specimen.specimen_length_unit())
            .unwrap_or(UNKNOWN_UNIT);
        debug!(
            "Length unit '{}' is {} m (coordinates scaled by {})",
            unit,
            unit_scale_to_meter(unit),
            self.config.length_scale
        );

        let points = match &outcome.shape {
            Some(shape) => {
                sink.receive(shape, unit);
                shape.len()
            }
            None => 0,
        };

        // Step 5: Validate the merged record
        let record_valid = match &validator {
            Some(validator) => {
                Some(self.check_schema(validator, "merged record", &outcome.record.to_value())?)
            }
            None => None,
        };

        // Step 6: Write
        let mut writer = TomlWriter::new();
        if self.config.pretty_output {
            writer = writer.pretty();
        }
        let written = writer.write(&outcome.record, &output_path)?;
        println!("  {} {}", "Wrote".bright_green(), written.display());

        Ok(ConversionStats {
            format: Some(silhouette.format),
            lines_read: source.len(),
            body_parts: silhouette.body_parts.parts.len(),
            selected_body_part: outcome.body_part.unwrap_or_default(),
            points,
            record_valid,
            output_path: Some(written),
            processing_time_ms: start_time.elapsed().as_millis(),
        })
    }

    /// Taxonomy layer for the specimen's Aphia ID
    async fn resolve_taxonomy(&self, specimen: &SpecimenMetadata) -> Result<Option<TaxonomyRecord>> {
        let aphia_id = specimen.aphia_id();

        if self.config.taxonomy.offline {
            info!("Offline mode: skipping WoRMS lookup");
            return Ok(aphia_id.map(TaxonomyRecord::offline));
        }

        let aphia_id = aphia_id.ok_or_else(|| KrmError::missing_field(fields::APHIA_ID))?;
        let client = WormsClient::new(&self.config.taxonomy.base_url)?;
        let record = client
            .lookup(aphia_id, &self.config.taxonomy.language)
            .await?;
        Ok(Some(record))
    }

    /// Validate a document, returning whether it passed
    fn check_schema(&self, validator: &SchemaValidator, subject: &str, value: &Value) -> Result<bool> {
        if self.config.fail_on_invalid {
            validator.require_valid(subject, value)?;
            return Ok(true);
        }

        let report = validator.validate(value);
        if let Some(reason) = &report.reason {
            warn!("The {} does not adhere to the schema: {}", subject, reason);
        }
        Ok(report.valid)
    }
}
