#[path = "common/mod.rs"]
mod common;

use common::*;
use scimine::{build_corpus, scrub, CountVectorizer, StopWords};

#[test]
fn corpus_to_frequency_table() {
    let dtm = CountVectorizer::new().fit_transform(&[
        vec!["cat".to_string(), "dog".to_string()],
        vec!["dog".to_string(), "dog".to_string()],
    ]);
    assert_eq!(
        dtm.term_frequencies(),
        vec![("dog".to_string(), 3), ("cat".to_string(), 1)]
    );
}

#[test]
fn full_path_from_table_to_matrix_keeps_rows_aligned() {
    let records = scrub(vec![
        sample_record("1", "Parsing the config files", "We parse the files with a parser", 3),
        sample_record("2", "", "Completely unrelated topic about networks", 1),
        sample_record("3", "Parsing again", "More parsing of files", 2),
    ]);
    assert_eq!(records.len(), 3);

    let stops = StopWords::english().with_extra(["completely"]);
    let (docs, report) = build_corpus(&records, &stops);
    assert_eq!(docs.len(), records.len());
    assert_eq!(report.processed, 3);
    assert!(report.skipped.is_empty());

    // stemming folds the parse/parsing/parser family together
    assert!(docs[0].tokens.iter().any(|t| t.starts_with("pars")));
    assert!(docs[2].tokens.iter().any(|t| t.starts_with("pars")));
    // the custom stop word never reaches the tokens
    assert!(docs[1].tokens.iter().all(|t| t != "complet"));

    let tokens: Vec<Vec<String>> = docs.iter().map(|d| d.tokens.clone()).collect();
    let dtm = CountVectorizer::new().fit_transform(&tokens);
    assert_eq!(dtm.n_docs(), 3);
    assert!(dtm.n_terms() > 0);

    let freqs = dtm.term_frequencies();
    // descending frequency with no gaps
    for pair in freqs.windows(2) {
        assert!(pair[0].1 >= pair[1].1);
    }
}

#[test]
fn stop_words_removed_from_title_and_abstract_independently() {
    let records = scrub(vec![sample_record(
        "1",
        "The state of the art",
        "This is an abstract about the art of state machines",
        1,
    )]);
    let stops = StopWords::english();
    let (docs, _) = build_corpus(&records, &stops);
    assert!(!docs[0].title_terms.contains("the"));
    assert!(!docs[0].abstract_terms.contains(" is "));
    assert!(docs[0].title_terms.contains("state"));
}
