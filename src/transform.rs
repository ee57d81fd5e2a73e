//! Conversion of raw KRM outline rows to the canonical shape representation.
//!
//! KRM files store each outline row as upper/lower (and optionally
//! starboard/port) extents. The datastore describes outlines by a centerline
//! (x, y, z) plus half-height and half-width, so every row is folded into
//! those five values.

use crate::constants::{ASYMMETRIC_ARITY, COORDINATE_DECIMALS, DEFAULT_LENGTH_SCALE, SYMMETRIC_ARITY};
use crate::error::{KrmError, Result};
use crate::models::{BodyPart, CanonicalShape};
use tracing::debug;

/// Row layouts found in KRM files
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RowLayout {
    /// `x z_upper z_lower width`, symmetric about the x axis
    Symmetric,
    /// `x z_upper z_lower _ y_stbd y_port`
    Asymmetric,
}

impl RowLayout {
    pub fn from_arity(arity: usize) -> Option<Self> {
        match arity {
            SYMMETRIC_ARITY => Some(RowLayout::Symmetric),
            ASYMMETRIC_ARITY => Some(RowLayout::Asymmetric),
            _ => None,
        }
    }

    pub fn arity(&self) -> usize {
        match self {
            RowLayout::Symmetric => SYMMETRIC_ARITY,
            RowLayout::Asymmetric => ASYMMETRIC_ARITY,
        }
    }
}

/// Options for the coordinate transform
#[derive(Debug, Clone, PartialEq)]
pub struct TransformOptions {
    /// Multiplier applied to every coordinate before rounding
    pub length_scale: f64,
    /// Reject rows whose field count differs from the first row
    pub strict_arity: bool,
}

impl Default for TransformOptions {
    fn default() -> Self {
        Self {
            length_scale: DEFAULT_LENGTH_SCALE,
            strict_arity: false,
        }
    }
}

/// Convert a body part's raw rows into a canonical shape.
///
/// The layout is decided by the first row. In lenient mode later rows are
/// read with that layout as long as they carry enough fields; in strict
/// mode every row must have exactly the first row's field count. Either
/// way an error leaves no partial shape behind.
pub fn to_canonical(part: &BodyPart, options: &TransformOptions) -> Result<CanonicalShape> {
    let first_arity = part
        .nodes
        .first()
        .map(|row| row.split_whitespace().count())
        .unwrap_or(0);

    let layout = RowLayout::from_arity(first_arity).ok_or_else(|| {
        KrmError::UnsupportedCoordinateArity {
            body_part: part.label.clone(),
            found: first_arity,
        }
    })?;

    let mut shape = CanonicalShape::with_capacity(part.nodes.len());

    for (index, row) in part.nodes.iter().enumerate() {
        let fields = parse_row(&part.label, index, row)?;

        let too_short = fields.len() < layout.arity();
        let mismatched = options.strict_arity && fields.len() != layout.arity();
        if too_short || mismatched {
            return Err(KrmError::UnsupportedCoordinateArity {
                body_part: part.label.clone(),
                found: fields.len(),
            });
        }

        let scaled: Vec<f64> = fields.iter().map(|v| v * options.length_scale).collect();
        push_row(&mut shape, layout, &scaled);
    }

    debug!(
        "Converted '{}' ({:?}, {} rows, scale {})",
        part.label,
        layout,
        shape.len(),
        options.length_scale
    );

    Ok(shape)
}

fn parse_row(label: &str, index: usize, row: &str) -> Result<Vec<f64>> {
    row.split_whitespace()
        .map(|token| {
            token
                .parse::<f64>()
                .ok()
                .filter(|value| value.is_finite())
                .ok_or_else(|| KrmError::InvalidCoordinate {
                    body_part: label.to_string(),
                    row: index + 1,
                    value: token.to_string(),
                })
        })
        .collect()
}

fn push_row(shape: &mut CanonicalShape, layout: RowLayout, c: &[f64]) {
    let (y, width) = match layout {
        RowLayout::Symmetric => (0.0, c[3] / 2.0),
        RowLayout::Asymmetric => ((c[4] + c[5]) / 2.0, (c[4] - c[5]) / 2.0),
    };

    shape.x.push(round_coordinate(c[0]));
    shape.y.push(round_coordinate(y));
    shape.z.push(round_coordinate((c[1] + c[2]) / 2.0));
    shape.height.push(round_coordinate((c[1] - c[2]) / 2.0));
    shape.width.push(round_coordinate(width));
}

/// Round to the number of decimals kept in the datastore.
///
/// Rounds the exact stored value through its decimal expansion, so
/// `0.123455` (stored just below the tie) becomes `0.12345`.
pub fn round_coordinate(value: f64) -> f64 {
    format!("{:.*}", COORDINATE_DECIMALS, value)
        .parse()
        .unwrap_or(value)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn body_part(rows: &[&str]) -> BodyPart {
        BodyPart {
            label: "fishbody".to_string(),
            point_count: rows.len().saturating_sub(1),
            nodes: rows.iter().map(|r| r.to_string()).collect(),
        }
    }

    #[test]
    fn test_symmetric_row() {
        let shape = to_canonical(&body_part(&["10.0 5.0 -3.0 8.0"]), &TransformOptions::default())
            .unwrap();

        assert_eq!(shape.x, vec![10.0]);
        assert_eq!(shape.y, vec![0.0]);
        assert_eq!(shape.z, vec![1.0]);
        assert_eq!(shape.height, vec![4.0]);
        assert_eq!(shape.width, vec![4.0]);
    }

    #[test]
    fn test_asymmetric_row() {
        let shape = to_canonical(
            &body_part(&["10.0 5.0 -3.0 0.0 2.0 -2.0"]),
            &TransformOptions::default(),
        )
        .unwrap();

        assert_eq!(shape.x, vec![10.0]);
        assert_eq!(shape.y, vec![0.0]);
        assert_eq!(shape.z, vec![1.0]);
        assert_eq!(shape.height, vec![4.0]);
        assert_eq!(shape.width, vec![2.0]);
    }

    #[test]
    fn test_asymmetric_offset_centerline() {
        let shape = to_canonical(
            &body_part(&["4.0 3.0 1.0 9.9 3.0 1.0"]),
            &TransformOptions::default(),
        )
        .unwrap();

        assert_eq!(shape.y, vec![2.0]);
        assert_eq!(shape.z, vec![2.0]);
        assert_eq!(shape.height, vec![1.0]);
        assert_eq!(shape.width, vec![1.0]);
    }

    #[test]
    fn test_rounding_to_five_decimals() {
        let shape = to_canonical(
            &body_part(&["0.1234567 1.0 0.0 0.333333333"]),
            &TransformOptions::default(),
        )
        .unwrap();

        assert_eq!(shape.x, vec![0.12346]);
        assert_eq!(shape.z, vec![0.5]);
        assert_eq!(shape.width, vec![0.16667]);
    }

    #[test]
    fn test_rounding_uses_stored_value() {
        assert_eq!(round_coordinate(0.123455), 0.12345);
        assert_eq!(round_coordinate(10.000015), 10.00001);
        assert_eq!(round_coordinate(-3.1415926), -3.14159);
        assert_eq!(round_coordinate(2.0), 2.0);
    }

    #[test]
    fn test_non_finite_field() {
        let result = to_canonical(&body_part(&["0 0 0 0", "1 nan 3 4"]), &TransformOptions::default());

        assert!(matches!(
            result,
            Err(KrmError::InvalidCoordinate { row: 2, .. })
        ));
    }

    #[test]
    fn test_five_field_row_is_rejected() {
        let result = to_canonical(
            &body_part(&["10.0 5.0 -3.0 0.0 2.0"]),
            &TransformOptions::default(),
        );

        match result.unwrap_err() {
            KrmError::UnsupportedCoordinateArity { body_part, found } => {
                assert_eq!(body_part, "fishbody");
                assert_eq!(found, 5);
            }
            other => panic!("Expected UnsupportedCoordinateArity error, got {:?}", other),
        }
    }

    #[test]
    fn test_lenient_mode_ignores_extra_fields_on_later_rows() {
        let shape = to_canonical(
            &body_part(&["0 0 0 0", "10.0 5.0 -3.0 8.0 99"]),
            &TransformOptions::default(),
        )
        .unwrap();

        assert_eq!(shape.len(), 2);
        assert_eq!(shape.width, vec![0.0, 4.0]);
    }

    #[test]
    fn test_short_later_row_is_rejected() {
        let result = to_canonical(
            &body_part(&["0 0 0 0 0 0", "1 2 3 4"]),
            &TransformOptions::default(),
        );

        assert!(matches!(
            result,
            Err(KrmError::UnsupportedCoordinateArity { found: 4, .. })
        ));
    }

    #[test]
    fn test_strict_mode_rejects_mixed_rows() {
        let options = TransformOptions {
            strict_arity: true,
            ..TransformOptions::default()
        };

        let result = to_canonical(&body_part(&["0 0 0 0", "1 2 3 4 5"]), &options);

        assert!(matches!(
            result,
            Err(KrmError::UnsupportedCoordinateArity { found: 5, .. })
        ));
    }

    #[test]
    fn test_non_numeric_field() {
        let result = to_canonical(&body_part(&["0 0 0 0", "1 two 3 4"]), &TransformOptions::default());

        match result.unwrap_err() {
            KrmError::InvalidCoordinate { row, value, .. } => {
                assert_eq!(row, 2);
                assert_eq!(value, "two");
            }
            other => panic!("Expected InvalidCoordinate error, got {:?}", other),
        }
    }

    #[test]
    fn test_length_scale_hook() {
        let options = TransformOptions {
            length_scale: 0.001,
            ..TransformOptions::default()
        };

        let shape = to_canonical(&body_part(&["100 50 -30 80"]), &options).unwrap();

        assert_eq!(shape.x, vec![0.1]);
        assert_eq!(shape.z, vec![0.01]);
        assert_eq!(shape.height, vec![0.04]);
        assert_eq!(shape.width, vec![0.04]);
    }

    #[test]
    fn test_layout_from_arity() {
        assert_eq!(RowLayout::from_arity(4), Some(RowLayout::Symmetric));
        assert_eq!(RowLayout::from_arity(6), Some(RowLayout::Asymmetric));
        assert_eq!(RowLayout::from_arity(5), None);
        assert_eq!(RowLayout::Asymmetric.arity(), 6);
    }
}
