//! Metadata extraction for both silhouette file layouts.
//!
//! Format A carries four fixed lines at the top of the file plus a trailing
//! comment on the very last line. Format B wraps keyword lines in a
//! `<meta>` ... `</meta>` block. Both grammars fill the same
//! [`MetadataRecord`] and leave the session cursor on the body-part header.

use super::source::{Line, ParseSession, has_text, last_token, rest_of_line, strip_quotes};
use crate::constants::{
    CREATED_DATE_INPUT_FORMAT, CREATED_DATE_OUTPUT_FORMAT, CREATED_DATE_TOKENS,
    KEYWORD_VALUE_OFFSET, META_CLOSE_MARKER, detect_unit, keywords, legacy_phrases,
};
use crate::error::{KrmError, Result};
use crate::models::{MetadataRecord, SourceFormat};
use chrono::NaiveDate;
use tracing::{debug, warn};

/// Parse the metadata section of a file in the given layout
pub fn parse_metadata(format: SourceFormat, session: &mut ParseSession) -> Result<MetadataRecord> {
    match format {
        SourceFormat::FormatA => parse_legacy_metadata(session),
        SourceFormat::FormatB => {
            // Step over the <meta> marker
            session.advance(1);
            parse_meta_block(session)
        }
    }
}

/// Parse the four legacy metadata lines starting at the cursor.
///
/// Also appends the last line of the file to the description: legacy files
/// close with a free-text comment that belongs to the metadata even though
/// it sits after all body-part sections.
pub fn parse_legacy_metadata(session: &mut ParseSession) -> Result<MetadataRecord> {
    let mut record = MetadataRecord::default();

    let title = session.next_line("title line")?;
    record.push_description(strip_quotes(title.trimmed()));

    let length = session.next_line("fish length line")?;
    let text = length.trimmed();
    if text.contains(legacy_phrases::FISH_LENGTH) {
        record.specimen_length = Some(parse_last_float(&length)?);
        record.length_unit =
            Some(detect_unit(text, legacy_phrases::LENGTH_UNITS).to_string());
    } else {
        warn!(
            "Line {} does not describe the fish length: {}",
            length.number, text
        );
    }

    let mass = session.next_line("fish mass line")?;
    let text = mass.trimmed();
    if text.contains(legacy_phrases::FISH_MASS) {
        record.specimen_weight = Some(clamp_mass(parse_last_float(&mass)?));
    } else {
        warn!("Line {} does not describe the fish mass: {}", mass.number, text);
    }
    record.specimen_weight_unit =
        Some(detect_unit(text, legacy_phrases::WEIGHT_UNITS).to_string());

    let chambers = session.next_line("inclusion count line")?;
    record.nsb = Some(parse_last_count(&chambers)?);

    if let Some(comment) = session.source().last_line() {
        record.push_description(strip_quotes(comment.trim()));
    }

    debug!(
        "Legacy metadata: length={:?} {:?}, weight={:?} {:?}, nsb={:?}",
        record.specimen_length,
        record.length_unit,
        record.specimen_weight,
        record.specimen_weight_unit,
        record.nsb
    );

    Ok(record)
}

/// Keyword lines recognised inside a `<meta>` block
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MetaKeyword {
    Title,
    FishLength,
    FishMass,
    Nsb,
    BladderType,
    Rotated,
    Smooth,
    Straighten,
    Images,
    Preparer,
    FileCreated,
}

/// Prefixes in match order; the first prefix a line starts with wins
const KEYWORD_ORDER: &[(&str, MetaKeyword)] = &[
    (keywords::TITLE, MetaKeyword::Title),
    (keywords::FISH_LENGTH, MetaKeyword::FishLength),
    (keywords::FISH_MASS, MetaKeyword::FishMass),
    (keywords::NSB, MetaKeyword::Nsb),
    (keywords::BLADDER_TYPE, MetaKeyword::BladderType),
    (keywords::ROTATED, MetaKeyword::Rotated),
    (keywords::SMOOTH, MetaKeyword::Smooth),
    (keywords::STRAIGHTEN, MetaKeyword::Straighten),
    (keywords::IMAGES, MetaKeyword::Images),
    (keywords::PREPARER, MetaKeyword::Preparer),
    (keywords::FILE_CREATED, MetaKeyword::FileCreated),
];

impl MetaKeyword {
    pub fn classify(line: &str) -> Option<Self> {
        KEYWORD_ORDER
            .iter()
            .find(|(prefix, _)| line.starts_with(prefix))
            .map(|(_, keyword)| *keyword)
    }
}

/// Parse keyword lines until `</meta>`, starting one line past `<meta>`.
///
/// The cursor ends one line past the closing marker.
pub fn parse_meta_block(session: &mut ParseSession) -> Result<MetadataRecord> {
    let mut record = MetadataRecord::default();

    loop {
        let line = session.next_line("metadata block (missing </meta>)")?;
        let text = line.trimmed();

        if text == META_CLOSE_MARKER {
            break;
        }
        if !has_text(text) {
            continue;
        }

        apply_meta_line(&mut record, &line)?;
    }

    debug!(
        "Metadata block closed at line {}: {} description entries, nsb={:?}",
        session.cursor(),
        record.description.len(),
        record.nsb
    );

    Ok(record)
}

fn apply_meta_line(record: &mut MetadataRecord, line: &Line) -> Result<()> {
    let text = line.trimmed();
    let rest = || rest_of_line(text, KEYWORD_VALUE_OFFSET);

    match MetaKeyword::classify(text) {
        Some(MetaKeyword::Title) => record.push_description(rest()),
        Some(MetaKeyword::FishLength) => {
            record.specimen_length = Some(parse_last_float(line)?);
        }
        Some(MetaKeyword::FishMass) => {
            record.specimen_weight = Some(clamp_mass(parse_last_float(line)?));
        }
        Some(MetaKeyword::Nsb) => {
            record.nsb = Some(parse_last_count(line)?);
        }
        Some(MetaKeyword::BladderType) => {
            record.push_description(format!("{}{}", keywords::BLADDER_TYPE_LABEL, rest()));
        }
        Some(MetaKeyword::Rotated) => {
            record.rotate = Some(true);
            record.rotate_method = Some(rest());
        }
        Some(MetaKeyword::Smooth) => {
            record.smooth = Some(true);
            record.smooth_method = Some(rest());
        }
        Some(MetaKeyword::Straighten) => {
            record.straighten = Some(true);
            record.straighten_method = Some(rest());
        }
        Some(MetaKeyword::Images) => record.image_files = Some(rest()),
        Some(MetaKeyword::Preparer) => {
            record.push_description(format!("{}{}", keywords::PREPARER_LABEL, rest()));
        }
        Some(MetaKeyword::FileCreated) => {
            record.date_created = Some(parse_created_date(line.number, &rest())?);
        }
        None => record.push_description(text),
    }

    Ok(())
}

/// Reformat a ctime-style timestamp (`Tue Mar 14 10:22:01 2006`) as `YYYY-MM-DD`
pub fn parse_created_date(line_number: usize, value: &str) -> Result<String> {
    let tokens: Vec<&str> = value.split_whitespace().collect();
    let [year, month, day] = CREATED_DATE_TOKENS;

    if tokens.len() <= year.max(month).max(day) {
        return Err(KrmError::malformed_header(
            line_number,
            format!("creation date has too few fields: '{}'", value),
        ));
    }

    let assembled = format!("{}-{}-{}", tokens[year], tokens[month], tokens[day]);
    let date = NaiveDate::parse_from_str(&assembled, CREATED_DATE_INPUT_FORMAT).map_err(
        |source| KrmError::InvalidDate {
            value: assembled.clone(),
            source,
        },
    )?;

    Ok(date.format(CREATED_DATE_OUTPUT_FORMAT).to_string())
}

/// Negative masses are recorded as zero
pub fn clamp_mass(mass: f64) -> f64 {
    if mass < 0.0 { 0.0 } else { mass }
}

fn parse_last_float(line: &Line) -> Result<f64> {
    let token = last_token(line.text).ok_or_else(|| {
        KrmError::malformed_header(line.number, "expected a numeric value, found an empty line")
    })?;

    let value = token.parse::<f64>().map_err(|e| {
        KrmError::malformed_header(
            line.number,
            format!("invalid number '{}' ({})", token, e),
        )
    })?;

    if !value.is_finite() {
        return Err(KrmError::malformed_header(
            line.number,
            format!("number '{}' is not finite", token),
        ));
    }
    Ok(value)
}

fn parse_last_count(line: &Line) -> Result<usize> {
    let token = last_token(line.text).ok_or_else(|| {
        KrmError::malformed_header(line.number, "expected an inclusion count, found an empty line")
    })?;

    token.parse::<usize>().map_err(|e| {
        KrmError::malformed_header(
            line.number,
            format!("invalid inclusion count '{}' ({})", token, e),
        )
    })
}
