//! KRM Processor Library
//!
//! A Rust library for converting fish silhouette files digitised for the
//! Kirchhoff-ray mode (KRM) acoustic scattering model into records for an
//! echoSMs-style anatomical datastore.
//!
//! This library provides tools for:
//! - Parsing both KRM `.dat` layouts (legacy and `<meta>` block)
//! - Converting body-part outlines into centerline plus half-extent arrays
//! - Looking up specimen taxonomy in the WoRMS REST service
//! - Merging taxonomy, specimen metadata and shape data into one record
//! - Validating the record against a JSON Schema and writing it as TOML

pub mod cli;
pub mod config;
pub mod constants;
pub mod error;
pub mod merge;
pub mod models;
pub mod parser;
pub mod processor;
pub mod report;
pub mod schema;
pub mod specimen;
pub mod taxonomy;
pub mod transform;
pub mod writer;

// Re-export commonly used types
pub use config::KrmConfig;
pub use error::{KrmError, Result};
pub use models::{
    BodyPart, BodyPartTable, CanonicalShape, ConversionStats, MergedRecord, MetadataRecord,
    ParsedSilhouette, SourceFormat,
};
pub use processor::{ConversionJob, KrmProcessor};
