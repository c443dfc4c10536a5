//! Free-text cleaning: a fixed, order-sensitive substitution sequence.
//!
//! The order matters: anchor elements must go before the generic tag strip,
//! digits before punctuation folding. Applying `clean_text` to already-clean
//! text is a no-op apart from whitespace trimming.

use crate::record::Record;
use once_cell::sync::Lazy;
use regex::Regex;

static STEPS: Lazy<Vec<(Regex, &'static str)>> = Lazy::new(|| {
    vec![
        // bracketed fragments, e.g. markdown link labels
        (Regex::new(r"\[[^\]]*\]").unwrap(), ""),
        // anchor elements including their inner text
        (Regex::new(r"<a.*?</a>").unwrap(), ""),
        (Regex::new(r"[0-9]").unwrap(), ""),
        (Regex::new(r"&quot").unwrap(), ""),
        // any remaining markup tags
        (Regex::new(r"<.*?>").unwrap(), ""),
        // line comments and brace blocks from embedded code snippets
        (Regex::new(r"//.*\n").unwrap(), ""),
        (Regex::new(r"\{\n.*\}\n").unwrap(), ""),
        (Regex::new(r"[\r\n]").unwrap(), ""),
        (Regex::new("\"").unwrap(), ""),
        // fold remaining punctuation into single spaces
        (Regex::new(r"[^\w\s]").unwrap(), " "),
    ]
});

/// Clean one free-text field. Total over any input; never fails.
pub fn clean_text(raw: &str) -> String {
    let mut text = raw.to_string();
    for (re, rep) in STEPS.iter() {
        text = re.replace_all(&text, *rep).into_owned();
    }
    text.to_lowercase().trim().to_string()
}

/// Scrub a normalized table: fill the derived clean fields and exclude rows
/// that end up with an empty abstract or carry no date. Data-quality
/// exclusion, not an error; on a table that already satisfies the invariant
/// this is a fixed point.
pub fn scrub(records: Vec<Record>) -> Vec<Record> {
    let before = records.len();
    let mut out: Vec<Record> = records
        .into_iter()
        .map(|mut r| {
            r.title_clean = clean_text(&r.title);
            r.abstract_clean = clean_text(&r.abstract_text);
            r
        })
        .collect();
    out.retain(|r| !r.abstract_clean.is_empty() && r.created.is_some());
    let dropped = before - out.len();
    if dropped > 0 {
        tracing::info!("Scrub dropped {} row(s) with empty abstract or missing date", dropped);
    }
    out
}
