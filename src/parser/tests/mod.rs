//! Test fixtures for silhouette file parsing
//!
//! Provides sample files in both layouts and helpers shared by the parser
//! test modules.

use std::io::Write;
use tempfile::NamedTempFile;

use super::source::SourceFile;


/// Legacy layout: one body and one swimbladder chamber
pub fn legacy_fixture() -> String {
    r#""Pilchard 11, Namibia, June 99, CL=189"
"total fish length mm =" 189
"fish mass g =" 99
"number of swimbladder chambers=" 1
"x, z-upper, z-lower, width"
"fishbody"
2
0.0 0.0 0.0 0.0
10.0 5.0 -3.0 8.0
20.0 0.0 0.0 0.0
"swimbladder"
1
5.0 1.0 -1.0 2.0
6.0 1.0 -1.0 2.0
"Digitised by J. Horne""#
        .to_string()
}

/// Metadata-block layout with asymmetric coordinates
pub fn meta_fixture() -> String {
    r#"<meta>
Title : Atlantic herring 001
Fish_Length : 245.0
Fish_Mass : -50
nsb : 1
Bladder_Type : physostome

Rotated : yes rotated 3 deg
Smooth : 5-point running mean
straighten : none
Images : aherr001_lat.jpg aherr001_dor.jpg
Preparer : J. Horne
File created Tue Mar 14 10:22:01 2006
Digitised from radiographs
</meta>
x z_upper z_lower width y_stbd y_port
fishbody
1
0.0 0.0 0.0 0.0 0.0 0.0
10.0 5.0 -3.0 0.0 2.0 -2.0
swimbladder
0
3.0 1.0 -1.0 0.0 0.5 -0.5"#
        .to_string()
}

/// Build an in-memory source
pub fn source_from(content: &str) -> SourceFile {
    SourceFile::from_content("test.dat", content)
}

/// Helper to create a temporary file with given content
pub fn create_temp_file(content: &str) -> NamedTempFile {
    let mut temp_file = NamedTempFile::new().unwrap();
    writeln!(temp_file, "{}", content).unwrap();
    temp_file
}
