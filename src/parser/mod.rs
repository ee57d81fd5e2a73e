//! KRM silhouette (.dat) file parser
//!
//! Reads the body and inclusion outlines digitised for the Kirchhoff-ray
//! mode (KRM) scattering model. Two layouts exist:
//!
//! - **Format A** (legacy): four metadata lines (title, fish length, fish
//!   mass, number of swimbladder chambers), a column header, the body-part
//!   sections, and a closing comment line.
//! - **Format B**: the same body-part sections preceded by a
//!   `<meta>` ... `</meta>` block of keyword lines.
//!
//! ## Architecture
//!
//! - [`source`] - whole-file line buffer and the parse cursor
//! - [`format`] - layout detection from the first line
//! - [`metadata`] - the two metadata grammars
//! - [`body_parts`] - header and body-part sections, shared by both layouts
//!
//! ## Usage
//!
//! ```no_run
//! use krm_processor::parser::parse_silhouette_file;
//!
//! # fn example() -> krm_processor::error::Result<()> {
//! let parsed = parse_silhouette_file(std::path::Path::new("aherr001.dat"))?;
//! println!("{:?}: {:?}", parsed.format, parsed.body_parts.labels());
//! # Ok(())
//! # }
//! ```

pub mod body_parts;
pub mod format;
pub mod metadata;
pub mod source;

#[cfg(test)]
mod tests;

pub use body_parts::parse_body_parts;
pub use format::detect_format;
pub use metadata::parse_metadata;
pub use source::{ParseSession, SourceFile};

use crate::error::{KrmError, Result};
use crate::models::ParsedSilhouette;
use std::path::Path;
use tracing::debug;

/// Load and parse a silhouette file
pub fn parse_silhouette_file(path: &Path) -> Result<ParsedSilhouette> {
    let source = SourceFile::load(path)?;
    parse_silhouette(&source)
}

/// Parse an already loaded silhouette file
pub fn parse_silhouette(source: &SourceFile) -> Result<ParsedSilhouette> {
    let format = detect_format(source)?;
    let mut session = ParseSession::new(source);

    let metadata = parse_metadata(format, &mut session)?;
    let nsb = metadata.nsb.ok_or_else(|| KrmError::missing_field("nsb"))?;

    let body_parts = parse_body_parts(&mut session, format, nsb)?;

    debug!(
        "Parsed {} as {:?}: {} body parts, stopped at line {} of {}",
        source.path().display(),
        format,
        body_parts.parts.len(),
        session.cursor(),
        source.len()
    );

    Ok(ParsedSilhouette {
        path: source.path().to_path_buf(),
        format,
        metadata,
        body_parts,
    })
}
