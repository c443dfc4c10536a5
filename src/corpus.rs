//! Corpus building: stop-word removal, title+abstract merge, tokenization
//! and stemming.
//!
//! The unit of failure is the single row: a row that produces no usable
//! tokens keeps its position with an empty token list so downstream matrices
//! stay row-aligned with the table, and the miss is collected into a
//! [`BatchReport`] instead of being dropped silently.

use crate::record::Record;
use ahash::AHashSet;
use rust_stemmers::{Algorithm, Stemmer};
use unicode_segmentation::UnicodeSegmentation;

/// Base English stop-word list, embedded at compile time.
const ENGLISH: &str = include_str!("stopwords_en.txt");

pub struct StopWords {
    set: AHashSet<String>,
}

impl StopWords {
    pub fn english() -> Self {
        let set = ENGLISH
            .lines()
            .map(|w| w.trim().to_lowercase())
            .filter(|w| !w.is_empty())
            .collect();
        Self { set }
    }

    /// Union the base set with caller-supplied extra words.
    pub fn with_extra<I, S>(mut self, extra: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        for w in extra {
            let w = w.as_ref().trim().to_lowercase();
            if !w.is_empty() {
                self.set.insert(w);
            }
        }
        self
    }

    pub fn len(&self) -> usize {
        self.set.len()
    }

    pub fn is_empty(&self) -> bool {
        self.set.is_empty()
    }

    pub fn contains(&self, word: &str) -> bool {
        self.set.contains(&word.to_lowercase())
    }

    /// Split on whitespace, drop stop words, rejoin with single spaces.
    pub fn remove_from(&self, text: &str) -> String {
        text.split_whitespace()
            .filter(|w| !self.set.contains(&w.to_lowercase()))
            .collect::<Vec<_>>()
            .join(" ")
    }
}

/// One corpus document, row-aligned with the source table.
#[derive(Clone, Debug, Default)]
pub struct Document {
    /// Cleaned title minus stop words (dendrogram labels, word clouds).
    pub title_terms: String,
    /// Cleaned abstract minus stop words.
    pub abstract_terms: String,
    /// Stemmed tokens of the merged title+abstract text.
    pub tokens: Vec<String>,
}

/// Outcome summary of one corpus-building pass.
#[derive(Debug, Default)]
pub struct BatchReport {
    pub processed: usize,
    pub skipped: Vec<(usize, String)>,
}

impl BatchReport {
    pub fn log(&self) {
        tracing::info!(
            "Corpus built: {} document(s), {} skipped",
            self.processed,
            self.skipped.len()
        );
        for (row, reason) in &self.skipped {
            tracing::warn!("row {}: {}", row, reason);
        }
    }
}

pub fn tokenize(text: &str) -> Vec<String> {
    text.unicode_words().map(str::to_string).collect()
}

/// Build the token corpus from a scrubbed table.
///
/// Per document: stop words are removed from cleaned title and abstract
/// independently, the two are concatenated title-first with no separator,
/// and the concatenation is tokenized and stemmed.
pub fn build_corpus(records: &[Record], stops: &StopWords) -> (Vec<Document>, BatchReport) {
    let stemmer = Stemmer::create(Algorithm::English);
    let mut docs = Vec::with_capacity(records.len());
    let mut report = BatchReport::default();

    for (row, r) in records.iter().enumerate() {
        let title_terms = stops.remove_from(&r.title_clean);
        let abstract_terms = stops.remove_from(&r.abstract_clean);
        let merged = format!("{}{}", title_terms, abstract_terms);
        let tokens: Vec<String> = tokenize(&merged)
            .iter()
            .map(|t| stemmer.stem(t).into_owned())
            .collect();

        if tokens.is_empty() {
            report
                .skipped
                .push((row, "no tokens left after cleaning and stop-word removal".to_string()));
        } else {
            report.processed += 1;
        }
        docs.push(Document { title_terms, abstract_terms, tokens });
    }

    (docs, report)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stop_word_union_and_removal() {
        let stops = StopWords::english().with_extra(["custom"]);
        assert!(stops.contains("the"));
        assert!(stops.contains("Custom"));
        assert_eq!(stops.remove_from("the quick custom fox"), "quick fox");
    }

    #[test]
    fn corpus_rows_stay_aligned() {
        let stops = StopWords::english();
        let mut a = Record::default();
        a.title_clean = "rust lifetimes".into();
        a.abstract_clean = "explained simply".into();
        let mut b = Record::default();
        b.title_clean = "the".into(); // everything is a stop word
        b.abstract_clean = "a an".into();

        let (docs, report) = build_corpus(&[a, b], &stops);
        assert_eq!(docs.len(), 2);
        assert!(!docs[0].tokens.is_empty());
        assert!(docs[1].tokens.is_empty());
        assert_eq!(report.processed, 1);
        assert_eq!(report.skipped.len(), 1);
        assert_eq!(report.skipped[0].0, 1);
    }

    #[test]
    fn merge_is_title_first_without_separator() {
        let stops = StopWords::english();
        let mut r = Record::default();
        r.title_clean = "alpha".into();
        r.abstract_clean = "beta".into();
        let (docs, _) = build_corpus(&[r], &stops);
        // concatenation glues the boundary words together
        assert_eq!(docs[0].tokens, vec!["alphabeta"]);
    }
}
