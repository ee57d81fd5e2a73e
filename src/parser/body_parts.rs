//! Body-part section parsing, shared by both file layouts.
//!
//! After the metadata, a file holds one column header line followed by
//! `nsb + 1` sections (the body, then each inclusion):
//!
//! ```text
//! "fishbody"
//! 38
//! 0.0  0.0  0.0  0.0
//! ...
//! ```
//!
//! A section declaring `N` points is followed by `N + 1` coordinate rows.
//! The extra row is part of the format and is kept.

use super::source::{ParseSession, strip_quotes};
use crate::error::{KrmError, Result};
use crate::models::{BodyPart, BodyPartTable, SourceFormat};
use tracing::{debug, warn};

/// Read the header line and `nsb + 1` body-part sections
pub fn parse_body_parts(
    session: &mut ParseSession,
    format: SourceFormat,
    nsb: usize,
) -> Result<BodyPartTable> {
    let header = session.next_line("body part header")?;
    let header = if format.strips_header_quotes() {
        strip_quotes(header.trimmed())
    } else {
        header.trimmed().to_string()
    };

    let mut table = BodyPartTable {
        header,
        parts: Vec::new(),
    };

    for _ in 0..=nsb {
        let part = parse_section(session)?;

        // A repeated label replaces the earlier section
        if let Some(existing) = table.parts.iter_mut().find(|p| p.label == part.label) {
            warn!("Body part '{}' appears more than once; keeping the later section", part.label);
            *existing = part;
        } else {
            table.parts.push(part);
        }
    }

    debug!(
        "Parsed {} body parts: {:?}",
        table.parts.len(),
        table.labels()
    );

    Ok(table)
}

fn parse_section(session: &mut ParseSession) -> Result<BodyPart> {
    let label = strip_quotes(session.next_line("body part label")?.trimmed());

    let count_line = session.next_line(&format!("point count of '{}'", label))?;
    let token = count_line.text.split_whitespace().next().ok_or_else(|| {
        KrmError::malformed_header(
            count_line.number,
            format!("missing point count for body part '{}'", label),
        )
    })?;
    let point_count = token.parse::<usize>().map_err(|e| {
        KrmError::malformed_header(
            count_line.number,
            format!("invalid point count '{}' for body part '{}' ({})", token, label, e),
        )
    })?;

    let rows = point_count.checked_add(1).ok_or_else(|| {
        KrmError::malformed_header(
            count_line.number,
            format!("point count {} for body part '{}' is out of range", point_count, label),
        )
    })?;

    // Sized by the rows actually read, not by the declared count
    let context = format!("coordinates of '{}'", label);
    let mut nodes = Vec::new();
    for _ in 0..rows {
        nodes.push(session.next_line(&context)?.trimmed().to_string());
    }

    Ok(BodyPart {
        label,
        point_count,
        nodes,
    })
}
