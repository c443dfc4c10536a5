#[path = "common/mod.rs"]
mod common;

use common::*;
use scimine::{load_table, save_table, Record};

#[test]
fn roundtrip_preserves_every_non_derived_field() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("stackoverflow_data.csv");

    let mut with_commas = sample_record("q2", "Hello, world — again", "Body, with commas\nand a newline", -3);
    with_commas.tags = vec!["a;b".to_string()];
    let mut dateless = Record::default();
    dateless.item_id = "q3".to_string();

    let records = vec![
        sample_record("q1", "Plain title", "Plain body", 7),
        with_commas,
        dateless,
    ];
    save_table(&path, &records).unwrap();
    let loaded = load_table(&path).unwrap();

    assert_eq!(loaded.len(), records.len());
    for (before, after) in records.iter().zip(loaded.iter()) {
        assert_eq!(before.author_id, after.author_id);
        assert_eq!(before.item_id, after.item_id);
        assert_eq!(before.title, after.title);
        assert_eq!(before.abstract_text, after.abstract_text);
        assert_eq!(before.views, after.views);
        assert_eq!(before.answers, after.answers);
        assert_eq!(before.cites, after.cites);
        assert_eq!(before.created, after.created);
        assert_eq!(before.last_activity, after.last_activity);
    }
    // negative scores survive
    assert_eq!(loaded[1].cites, -3);
}

#[test]
fn missing_file_is_reported_as_not_mined_yet() {
    let dir = tempfile::tempdir().unwrap();
    let err = load_table(&dir.path().join("reddit_data.csv")).unwrap_err();
    let msg = err.to_string();
    assert!(msg.contains("not found"));
    assert!(msg.contains("mined"));
}

#[test]
fn derived_clean_fields_roundtrip_too() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("scopus_data.csv");

    let mut r = sample_record("p1", "A Title", "An abstract", 2);
    r.title_clean = "a title".to_string();
    r.abstract_clean = "an abstract".to_string();
    save_table(&path, &[r.clone()]).unwrap();

    let loaded = load_table(&path).unwrap();
    assert_eq!(loaded[0].title_clean, "a title");
    assert_eq!(loaded[0].abstract_clean, "an abstract");
}
