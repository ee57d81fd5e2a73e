//! End-to-end conversion tests for both silhouette layouts
//!
//! These tests run the full pipeline offline against temporary files and
//! read the written TOML back.

use krm_processor::report::{ShapeSink, SilhouetteSummary};
use krm_processor::{ConversionJob, KrmConfig, KrmError, KrmProcessor, SourceFormat};
use serde_json::json;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

const LEGACY_DAT: &str = r#""Pilchard 11, Namibia, June 99, CL=189"
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
"Digitised by J. Horne"
"#;

const META_DAT: &str = "<meta>
Title : Atlantic herring 001
Fish_Length : 245.0
Fish_Mass : -50
nsb : 1
Bladder_Type : physostome
Rotated : yes rotated 3 deg
Preparer : J. Horne
File created Tue Mar 14 10:22:01 2006
</meta>
x z_upper z_lower width y_stbd y_port
fishbody
1
0.0 0.0 0.0 0.0 0.0 0.0
10.0 5.0 -3.0 0.0 2.0 -2.0
swimbladder
0
3.0 1.0 -1.0 0.0 0.5 -0.5
";

/// Environment variable enabling tests against the live WoRMS service
const LIVE_WORMS_ENV: &str = "KRM_LIVE_WORMS";

fn write_fixture(dir: &Path, name: &str, content: &str) -> PathBuf {
    let path = dir.join(name);
    std::fs::write(&path, content).unwrap();
    path
}

fn read_toml(path: &Path) -> toml::Value {
    let content = std::fs::read_to_string(path).unwrap();
    toml::from_str(&content).unwrap()
}

fn offline() -> KrmProcessor {
    KrmProcessor::new(KrmConfig::default().with_offline()).unwrap()
}

#[tokio::test]
async fn test_convert_legacy_file() {
    let temp_dir = TempDir::new().unwrap();
    let dat = write_fixture(temp_dir.path(), "plch11.dat", LEGACY_DAT);
    let metadata = write_fixture(
        temp_dir.path(),
        "plch11.json",
        &json!({
            "aphia_id": 126422,
            "anatomical_feature": "fishbody",
            "shape_type": "outline",
            "specimen_name": "PL11",
            "length_unit": "meter",
        })
        .to_string(),
    );

    let stats = offline().run(&ConversionJob::new(&dat, &metadata)).await.unwrap();

    assert_eq!(stats.format, Some(SourceFormat::FormatA));
    assert_eq!(stats.points, 3);

    let record = read_toml(&temp_dir.path().join("plch11.toml"));
    assert_eq!(record["aphia_id"].as_integer(), Some(126422));
    assert_eq!(record["specimen_name"].as_str(), Some("PL11"));
    // File metadata wins over the specimen JSON
    assert_eq!(record["length_unit"].as_str(), Some("millimeter"));
    assert_eq!(record["specimen_length"].as_float(), Some(189.0));
    assert_eq!(record["specimen_weight_unit"].as_str(), Some("gram"));
    assert_eq!(
        record["description"][1].as_str(),
        Some("Digitised by J. Horne")
    );
    assert!(record.get("nsb").is_none());

    let shape = &record["shape_data"];
    assert_eq!(shape["shape_type"].as_str(), Some("outline"));
    assert_eq!(shape["z"][1].as_float(), Some(1.0));
    assert_eq!(shape["height"][1].as_float(), Some(4.0));
    assert_eq!(shape["width"][1].as_float(), Some(4.0));
    assert_eq!(shape["y"].as_array().map(Vec::len), Some(3));
}

#[tokio::test]
async fn test_convert_meta_block_file() {
    let temp_dir = TempDir::new().unwrap();
    let dat = write_fixture(temp_dir.path(), "aherr001.dat", META_DAT);
    let metadata = write_fixture(
        temp_dir.path(),
        "aherr001.json",
        &json!({
            "aphia_id": 126417,
            "anatomical_feature": "swimbladder",
            "shape_type": "outline",
            "specimen_length_unit": "mm",
            "specimen_condition": null,
        })
        .to_string(),
    );
    let output = temp_dir.path().join("datastore").join("herring.toml");

    let mut summary = SilhouetteSummary::new();
    let stats = offline()
        .run_with_sink(
            &ConversionJob::new(&dat, &metadata).with_output(&output),
            &mut summary,
        )
        .await
        .unwrap();

    assert_eq!(stats.format, Some(SourceFormat::FormatB));
    assert_eq!(stats.selected_body_part, "swimbladder");
    assert_eq!(stats.output_path.as_deref(), Some(output.as_path()));
    assert_eq!(summary.extents()[0].unit, "mm");

    let record = read_toml(&output);
    assert_eq!(record["date_created"].as_str(), Some("2006-03-14"));
    assert_eq!(record["specimen_weight"].as_float(), Some(0.0));
    assert_eq!(record["rotate"].as_bool(), Some(true));
    assert_eq!(record["rotate_method"].as_str(), Some("yes rotated 3 deg"));
    assert!(record.get("specimen_condition").is_none());

    let description: Vec<&str> = record["description"]
        .as_array()
        .unwrap()
        .iter()
        .filter_map(toml::Value::as_str)
        .collect();
    assert!(description.contains(&"bladder type: physostome"));
    assert!(description.contains(&"preparer: J. Horne"));

    let shape = &record["shape_data"];
    assert_eq!(shape["x"][0].as_float(), Some(3.0));
    assert_eq!(shape["y"][0].as_float(), Some(0.0));
    assert_eq!(shape["width"][0].as_float(), Some(0.5));
    assert_eq!(shape["height"][0].as_float(), Some(1.0));
}

#[tokio::test]
async fn test_unknown_body_part_fails() {
    let temp_dir = TempDir::new().unwrap();
    let dat = write_fixture(temp_dir.path(), "plch11.dat", LEGACY_DAT);
    let metadata = write_fixture(
        temp_dir.path(),
        "plch11.json",
        &json!({"aphia_id": 126422, "anatomical_feature": "otolith", "shape_type": "outline"})
            .to_string(),
    );

    let result = offline().run(&ConversionJob::new(&dat, &metadata)).await;

    match result.unwrap_err() {
        KrmError::BodyPartNotFound { label, .. } => assert_eq!(label, "otolith"),
        other => panic!("Expected BodyPartNotFound error, got {:?}", other),
    }
    assert!(!temp_dir.path().join("plch11.toml").exists());
}

#[tokio::test]
async fn test_truncated_file_fails() {
    let temp_dir = TempDir::new().unwrap();
    let truncated: String = LEGACY_DAT.lines().take(8).collect::<Vec<_>>().join("\n");
    let dat = write_fixture(temp_dir.path(), "plch11.dat", &truncated);
    let metadata = write_fixture(
        temp_dir.path(),
        "plch11.json",
        &json!({"aphia_id": 126422, "anatomical_feature": "fishbody", "shape_type": "outline"})
            .to_string(),
    );

    let result = offline().run(&ConversionJob::new(&dat, &metadata)).await;

    assert!(matches!(result, Err(KrmError::TruncatedFile { .. })));
}

/// Live taxonomy lookup for Atlantic herring
///
/// Only runs when KRM_LIVE_WORMS is set, since it needs network access.
#[tokio::test]
async fn test_live_worms_lookup() {
    if std::env::var(LIVE_WORMS_ENV).is_err() {
        println!("Skipping live WoRMS test - set {} to enable", LIVE_WORMS_ENV);
        return;
    }

    let temp_dir = TempDir::new().unwrap();
    let dat = write_fixture(temp_dir.path(), "aherr001.dat", META_DAT);
    let metadata = write_fixture(
        temp_dir.path(),
        "aherr001.json",
        &json!({"aphia_id": 126417, "anatomical_feature": "fishbody", "shape_type": "outline"})
            .to_string(),
    );

    let processor = KrmProcessor::new(KrmConfig::default()).unwrap();
    processor
        .run(&ConversionJob::new(&dat, &metadata))
        .await
        .expect("Live conversion failed");

    let record = read_toml(&temp_dir.path().join("aherr001.toml"));
    assert_eq!(record["specimen_species"].as_str(), Some("Clupea harengus"));
    assert_eq!(record["specimen_genus"].as_str(), Some("Clupea"));
    assert!(record["specimen_vernaculars"].as_array().is_some());
}

#[test]
fn test_summary_sink_accepts_shapes() {
    let mut summary = SilhouetteSummary::new();
    let shape = krm_processor::CanonicalShape {
        x: vec![0.0, 1.0],
        y: vec![0.0, 0.0],
        z: vec![0.0, 0.0],
        height: vec![0.5, 0.5],
        width: vec![0.25, 0.25],
    };

    summary.receive(&shape, "meter");

    assert_eq!(summary.extents()[0].length.span(), 1.0);
}
