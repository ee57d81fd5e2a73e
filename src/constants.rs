//! Application constants for KRM processor
//!
//! This module contains the file-format markers, keyword vocabularies,
//! unit mappings and default values used throughout the KRM processor.

// =============================================================================
// Silhouette File Markers
// =============================================================================

/// Opening marker of the Format B metadata block
pub const META_OPEN_MARKER: &str = "<meta>";

/// Closing marker of the Format B metadata block
pub const META_CLOSE_MARKER: &str = "</meta>";

/// Quote character stripped from Format A titles, labels and the header line
pub const QUOTE_CHAR: char = '"';

/// Number of whitespace tokens preceding the value of a Format B keyword line
/// (`Keyword : value ...`)
pub const KEYWORD_VALUE_OFFSET: usize = 2;

// =============================================================================
// Format A Metadata Phrases
// =============================================================================

/// Phrases and unit markers searched for in the legacy metadata lines
pub mod legacy_phrases {
    /// Substring identifying the specimen length line
    pub const FISH_LENGTH: &str = "fish length";

    /// Substring identifying the specimen mass line
    pub const FISH_MASS: &str = "fish mass";

    /// Length unit markers, checked in order
    pub const LENGTH_UNITS: &[(&str, &str)] = &[(" mm ", "millimeter"), (" cm ", "centimeter")];

    /// Weight unit markers, checked in order
    pub const WEIGHT_UNITS: &[(&str, &str)] = &[(" g ", "gram"), (" kg ", "kilogram")];
}

/// Unit label used when no unit marker is present
pub const UNKNOWN_UNIT: &str = "unknown";

// =============================================================================
// Format B Keyword Prefixes
// =============================================================================

/// Keyword prefixes recognised in the `<meta>` block
///
/// Matching is case-sensitive and ordered: the first prefix a line starts
/// with decides how it is interpreted.
pub mod keywords {
    pub const TITLE: &str = "Title";
    pub const FISH_LENGTH: &str = "Fish_Length";
    pub const FISH_MASS: &str = "Fish_Mass";
    pub const NSB: &str = "nsb";
    pub const BLADDER_TYPE: &str = "Bladder_Type";
    pub const ROTATED: &str = "Rotated";
    pub const SMOOTH: &str = "Smooth";
    pub const STRAIGHTEN: &str = "straighten";
    pub const IMAGES: &str = "Images";
    pub const PREPARER: &str = "Preparer";
    pub const FILE_CREATED: &str = "File created";

    /// Description prefix for bladder type lines
    pub const BLADDER_TYPE_LABEL: &str = "bladder type: ";

    /// Description prefix for preparer lines
    pub const PREPARER_LABEL: &str = "preparer: ";
}

/// Positions of year, month and day within the "File created" value tokens
/// (`Tue Mar 14 10:22:01 2006`)
pub const CREATED_DATE_TOKENS: [usize; 3] = [4, 1, 2];

/// Input format of the reassembled creation date
pub const CREATED_DATE_INPUT_FORMAT: &str = "%Y-%b-%d";

/// Output format of `date_created`
pub const CREATED_DATE_OUTPUT_FORMAT: &str = "%Y-%m-%d";

// =============================================================================
// Coordinate Transform
// =============================================================================

/// Field count of a symmetric row: x, z-upper, z-lower, width
pub const SYMMETRIC_ARITY: usize = 4;

/// Field count of an asymmetric row: x, z-upper, z-lower, (unused), y-stbd, y-port
pub const ASYMMETRIC_ARITY: usize = 6;

/// Decimal places kept in canonical coordinates
pub const COORDINATE_DECIMALS: usize = 5;

/// Default length scale applied to coordinates
pub const DEFAULT_LENGTH_SCALE: f64 = 1.0;

// =============================================================================
// Merged Record Keys
// =============================================================================

/// Keys read from or written to the merged record
pub mod fields {
    pub const APHIA_ID: &str = "aphia_id";
    pub const ANATOMICAL_FEATURE: &str = "anatomical_feature";
    pub const SHAPE_TYPE: &str = "shape_type";
    pub const SHAPE_DATA: &str = "shape_data";
    pub const SPECIMEN_LENGTH_UNIT: &str = "specimen_length_unit";
    pub const NSB: &str = "nsb";

    /// Prefix applied to taxonomic ranks and vernaculars
    pub const SPECIMEN_PREFIX: &str = "specimen_";
    pub const VERNACULARS: &str = "vernaculars";
}

// =============================================================================
// Taxonomy Service
// =============================================================================

/// WoRMS REST service base URL
pub const WORMS_BASE_URL: &str = "https://www.marinespecies.org/rest";

/// Taxonomic ranks kept from a classification, highest first
pub const TAXON_RANKS: &[&str] = &["class", "order", "family", "genus", "species"];

/// Default language for vernacular names
pub const DEFAULT_VERNACULAR_LANGUAGE: &str = "English";

// =============================================================================
// Output
// =============================================================================

/// Extension of the generated datastore file
pub const OUTPUT_EXTENSION: &str = "toml";

/// Application name used for the config directory and log filter
pub const APP_NAME: &str = "krm_processor";

/// Config file name inside the user config directory
pub const CONFIG_FILE_NAME: &str = "config.toml";

/// Scale factor from a length unit label to meters
pub fn unit_scale_to_meter(unit: &str) -> f64 {
    match unit {
        "millimeter" => 0.001,
        "centimeter" => 0.01,
        "meter" => 1.0,
        _ => 1.0,
    }
}

/// Look up the first unit marker contained in a line
pub fn detect_unit(line: &str, markers: &[(&str, &'static str)]) -> &'static str {
    markers
        .iter()
        .find(|(marker, _)| line.contains(marker))
        .map(|(_, unit)| *unit)
        .unwrap_or(UNKNOWN_UNIT)
}
