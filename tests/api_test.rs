mod common;

use common::DocBuilder;
use keymeta::api::Validator;
use keymeta::{IssueKind, KeymetaError};
use serde_json::json;
use std::fs;
use std::path::PathBuf;
use tempfile::TempDir;

fn write_doc(dir: &TempDir, name: &str, content: &str) -> PathBuf {
    let path = dir.path().join(name);
    fs::write(&path, content).unwrap();
    path
}

#[test]
fn test_batch_keeps_input_order() {
    let dir = tempfile::tempdir().unwrap();
    let good = DocBuilder::new(1, 1, 2).build().to_string();
    let bad = DocBuilder::new(1, 1, 2)
        .set("defaultKeymap", json!([["KC_A", "KC_WAT"]]))
        .build()
        .to_string();

    let paths = vec![
        write_doc(&dir, "a.json", &good),
        write_doc(&dir, "b.json", &bad),
        dir.path().join("missing.json"),
        write_doc(&dir, "c.json", "not json"),
        write_doc(&dir, "d.json", &good),
    ];

    let outcomes = Validator::default().validate_files(&paths);
    let returned: Vec<&PathBuf> = outcomes.iter().map(|o| &o.path).collect();
    assert_eq!(returned, paths.iter().collect::<Vec<_>>());

    assert!(outcomes[0].is_valid());
    assert!(outcomes[4].is_valid());

    let report = outcomes[1].result.as_ref().unwrap_err().report().unwrap();
    assert!(report.has_kind(IssueKind::UnknownSymbol));
    assert!(matches!(outcomes[2].result, Err(KeymetaError::Read { .. })));
    assert!(matches!(outcomes[3].result, Err(KeymetaError::Json(_))));
}

#[test]
fn test_validate_value_and_str_agree() {
    let doc = DocBuilder::new(2, 1, 1).build();
    let validator = Validator::default();
    let from_value = validator.validate_value(&doc).unwrap();
    let from_str = validator.validate_str(&doc.to_string()).unwrap();
    assert_eq!(from_value, from_str);
}
