//! Error handling for KRM conversion operations.
//!
//! Provides error types with context for silhouette file parsing,
//! coordinate conversion, metadata merging and output failures.

use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum KrmError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("File not found: {path}")]
    FileNotFound { path: PathBuf },

    #[error("No content to parse in file: {path}")]
    EmptyInput { path: PathBuf },

    #[error("File truncated at line {line} (of {total}) while reading {context}")]
    TruncatedFile {
        line: usize,
        total: usize,
        context: String,
    },

    #[error("Malformed header at line {line}: {reason}")]
    MalformedHeader { line: usize, reason: String },

    #[error("Unsupported coordinate arity in body part '{body_part}': {found} fields (expected 4 or 6)")]
    UnsupportedCoordinateArity { body_part: String, found: usize },

    #[error("Invalid coordinate value '{value}' in body part '{body_part}', row {row}")]
    InvalidCoordinate {
        body_part: String,
        row: usize,
        value: String,
    },

    #[error("Required field missing: {field}")]
    MissingField { field: String },

    #[error("Body part '{label}' not found (available: {available})")]
    BodyPartNotFound { label: String, available: String },

    #[error("Date parsing failed for '{value}': {source}")]
    InvalidDate {
        value: String,
        #[source]
        source: chrono::ParseError,
    },

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("TOML serialization error: {0}")]
    TomlSerialize(#[from] toml::ser::Error),

    #[error("TOML parsing error: {0}")]
    TomlParse(#[from] toml::de::Error),

    #[error("Schema error in {path}: {reason}")]
    Schema { path: PathBuf, reason: String },

    #[error("Validation failed for {subject}: {reason}")]
    ValidationFailed { subject: String, reason: String },

    #[error("Taxonomy lookup failed for Aphia ID {aphia_id}: {source}")]
    Taxonomy {
        aphia_id: i64,
        #[source]
        source: reqwest::Error,
    },

    #[error("Configuration error: {message}")]
    Configuration { message: String },
}

impl KrmError {
    pub fn missing_field(field: impl Into<String>) -> Self {
        Self::MissingField {
            field: field.into(),
        }
    }

    pub fn malformed_header(line: usize, reason: impl Into<String>) -> Self {
        Self::MalformedHeader {
            line,
            reason: reason.into(),
        }
    }
}

pub type Result<T> = std::result::Result<T, KrmError>;
