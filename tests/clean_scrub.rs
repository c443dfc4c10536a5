#[path = "common/mod.rs"]
mod common;

use common::*;
use scimine::{clean_text, scrub, Record};

#[test]
fn worked_example_from_the_cleaning_contract() {
    assert_eq!(clean_text("Check <a href='x'>this</a> out! 123"), "check  out");
}

#[test]
fn cleaning_is_idempotent_over_messy_inputs() {
    let inputs = [
        "Visit <a href=\"http://x.y\">my site</a> now!!!",
        "[tag] Heading <b>bold</b> 42 &quot;quoted&quot;",
        "line one\r\nline // comment\ntwo",
        "Ünïcode wörds — and; punctuation…",
        "",
    ];
    for input in inputs {
        let once = clean_text(input);
        assert_eq!(clean_text(&once), once, "re-cleaning {:?} changed output", input);
    }
}

#[test]
fn scrub_drops_bad_rows_and_fills_derived_fields() {
    let good = sample_record("1", "A Title!", "Some <p>abstract</p> text", 4);
    let no_abstract = sample_record("2", "Has title", "", 1);
    let mut no_date = sample_record("3", "Other", "Body text", 2);
    no_date.created = None;
    // digits are stripped during cleaning, leaving nothing usable
    let digits_only = sample_record("4", "Numbers", "12345", 0);

    let out = scrub(vec![good, no_abstract, no_date, digits_only]);
    assert_eq!(out.len(), 1);
    assert_eq!(out[0].item_id, "1");
    assert_eq!(out[0].title_clean, "a title");
    assert_eq!(out[0].abstract_clean, "some abstract text");
}

#[test]
fn scrub_is_a_fixed_point_on_clean_tables() {
    let records: Vec<Record> = vec![
        sample_record("1", "First title", "first abstract body", 1),
        sample_record("2", "Second title", "second abstract body", 2),
    ];
    let once = scrub(records);
    let twice = scrub(once.clone());
    assert_eq!(once, twice);
}
