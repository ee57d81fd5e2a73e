//! Silhouette file format detection.

use super::source::SourceFile;
use crate::constants::META_OPEN_MARKER;
use crate::error::{KrmError, Result};
use crate::models::SourceFormat;

/// Classify a file by its first line.
///
/// Format B files open with a line that is exactly `<meta>` once trimmed;
/// everything else is treated as the legacy Format A layout.
pub fn detect_format(source: &SourceFile) -> Result<SourceFormat> {
    let first = source.first_line().ok_or_else(|| KrmError::EmptyInput {
        path: source.path().to_path_buf(),
    })?;

    Ok(classify_first_line(first))
}

pub fn classify_first_line(line: &str) -> SourceFormat {
    if line.trim() == META_OPEN_MARKER {
        SourceFormat::FormatB
    } else {
        SourceFormat::FormatA
    }
}
