//! Human-readable output of a conversion run.
//!
//! The canonical shape is handed to a [`ShapeSink`] for inspection. The
//! bundled [`SilhouetteSummary`] reduces it to the extents seen in the
//! dorsal (x against y ± width) and lateral (x against z ± height) views.

use crate::models::{CanonicalShape, ConversionStats};
use colored::*;

/// Receives a converted shape together with its length unit
pub trait ShapeSink {
    fn receive(&mut self, shape: &CanonicalShape, unit: &str);
}

/// Closed interval covered by a set of coordinates
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Extent {
    pub min: f64,
    pub max: f64,
}

impl Extent {
    fn of(values: impl IntoIterator<Item = f64>) -> Option<Self> {
        values.into_iter().fold(None, |extent, value| match extent {
            None => Some(Self {
                min: value,
                max: value,
            }),
            Some(Self { min, max }) => Some(Self {
                min: min.min(value),
                max: max.max(value),
            }),
        })
    }

    pub fn span(&self) -> f64 {
        self.max - self.min
    }
}

/// Outline extents of one shape
#[derive(Debug, Clone, PartialEq)]
pub struct ShapeExtents {
    pub unit: String,
    pub points: usize,
    /// Along the body axis
    pub length: Extent,
    /// Dorsal view, across the body
    pub breadth: Extent,
    /// Lateral view, vertical
    pub depth: Extent,
}

/// Collects shape extents for printing
#[derive(Debug, Default)]
pub struct SilhouetteSummary {
    extents: Vec<ShapeExtents>,
}

impl SilhouetteSummary {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn extents(&self) -> &[ShapeExtents] {
        &self.extents
    }

    pub fn print(&self) {
        for extents in &self.extents {
            println!("\n{}", "Silhouette".bright_green().bold());
            println!(
                "  {} {}",
                "Points:".bright_cyan(),
                extents.points.to_string().bright_white()
            );
            print_extent("Length:", &extents.length, &extents.unit);
            print_extent("Dorsal width:", &extents.breadth, &extents.unit);
            print_extent("Lateral depth:", &extents.depth, &extents.unit);
        }
    }
}

impl ShapeSink for SilhouetteSummary {
    fn receive(&mut self, shape: &CanonicalShape, unit: &str) {
        let length = Extent::of(shape.x.iter().copied());
        let breadth = Extent::of(
            shape
                .y
                .iter()
                .zip(&shape.width)
                .flat_map(|(y, w)| [y + w, y - w]),
        );
        let depth = Extent::of(
            shape
                .z
                .iter()
                .zip(&shape.height)
                .flat_map(|(z, h)| [z + h, z - h]),
        );

        // An empty shape has nothing to report
        if let (Some(length), Some(breadth), Some(depth)) = (length, breadth, depth) {
            self.extents.push(ShapeExtents {
                unit: unit.to_string(),
                points: shape.len(),
                length,
                breadth,
                depth,
            });
        }
    }
}

fn print_extent(label: &str, extent: &Extent, unit: &str) {
    println!(
        "  {} {} {} ({} to {})",
        label.bright_cyan(),
        format!("{:.3}", extent.span()).bright_white().bold(),
        unit,
        extent.min,
        extent.max
    );
}

/// Print the closing summary of a conversion run
pub fn print_conversion_summary(stats: &ConversionStats) {
    println!("\n{}", "Conversion Summary".bright_green().bold());
    println!(
        "  {} {}ms",
        "Time elapsed:".bright_cyan(),
        stats.processing_time_ms.to_string().bright_white()
    );
    if let Some(format) = &stats.format {
        println!("  {} {:?}", "Source format:".bright_cyan(), format);
    }
    println!(
        "  {} {} ({} lines)",
        "Body parts:".bright_cyan(),
        stats.body_parts.to_string().bright_white(),
        stats.lines_read
    );
    println!(
        "  {} {} with {} points",
        "Converted:".bright_cyan(),
        stats.selected_body_part.bright_white().bold(),
        stats.points
    );
    match stats.record_valid {
        Some(true) => println!("  {} {}", "Schema:".bright_cyan(), "valid".bright_green()),
        Some(false) => println!("  {} {}", "Schema:".bright_red(), "invalid".bright_red().bold()),
        None => {}
    }
    if let Some(path) = &stats.output_path {
        println!("  {} {}", "Output:".bright_cyan(), path.display());
    }
}
