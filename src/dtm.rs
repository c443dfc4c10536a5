//! Bag-of-words vectorization and the document-term matrix.
//!
//! The vocabulary is kept in first-encountered order; frequency ties are
//! broken by that order when ranking terms.

use ahash::AHashMap;
use indexmap::IndexMap;
use ndarray::Array2;

/// Count vectorizer over token lists. `min_df` and `min_token_len` narrow
/// the vocabulary for topic-model input; both default to keeping everything.
#[derive(Clone, Debug)]
pub struct CountVectorizer {
    min_df: usize,
    min_token_len: usize,
}

impl CountVectorizer {
    pub fn new() -> Self {
        Self { min_df: 1, min_token_len: 1 }
    }

    pub fn min_df(mut self, n: usize) -> Self {
        self.min_df = n.max(1);
        self
    }

    pub fn min_token_len(mut self, n: usize) -> Self {
        self.min_token_len = n.max(1);
        self
    }

    /// Fit a vocabulary over the whole corpus and count occurrences.
    pub fn fit_transform(&self, docs: &[Vec<String>]) -> DocTermMatrix {
        // document frequency per term, plus first-encountered ordering
        let mut order: IndexMap<String, usize> = IndexMap::new();
        let mut doc_freq: AHashMap<String, usize> = AHashMap::new();
        for doc in docs {
            let mut seen: AHashMap<&str, ()> = AHashMap::new();
            for tok in doc {
                if tok.chars().count() < self.min_token_len {
                    continue;
                }
                if !order.contains_key(tok.as_str()) {
                    order.insert(tok.clone(), order.len());
                }
                if seen.insert(tok.as_str(), ()).is_none() {
                    *doc_freq.entry(tok.clone()).or_insert(0) += 1;
                }
            }
        }

        let mut vocabulary: IndexMap<String, usize> = IndexMap::new();
        for (term, _) in order.iter() {
            if doc_freq.get(term).copied().unwrap_or(0) >= self.min_df {
                let idx = vocabulary.len();
                vocabulary.insert(term.clone(), idx);
            }
        }

        let mut matrix = Array2::<f64>::zeros((docs.len(), vocabulary.len()));
        for (doc_idx, doc) in docs.iter().enumerate() {
            for tok in doc {
                if let Some(&term_idx) = vocabulary.get(tok.as_str()) {
                    matrix[[doc_idx, term_idx]] += 1.0;
                }
            }
        }

        let terms = vocabulary.keys().cloned().collect();
        DocTermMatrix { matrix, terms }
    }
}

impl Default for CountVectorizer {
    fn default() -> Self {
        Self::new()
    }
}

/// Document-term matrix: rows are documents by table position, columns are
/// vocabulary terms, cells are term counts. Rebuilt per analysis run.
#[derive(Clone, Debug)]
pub struct DocTermMatrix {
    pub matrix: Array2<f64>,
    pub terms: Vec<String>,
}

impl DocTermMatrix {
    pub fn n_docs(&self) -> usize {
        self.matrix.nrows()
    }

    pub fn n_terms(&self) -> usize {
        self.matrix.ncols()
    }

    /// (term, corpus frequency) sorted descending; ties keep vocabulary
    /// order via the stable sort.
    pub fn term_frequencies(&self) -> Vec<(String, u64)> {
        let mut freqs: Vec<(String, u64)> = self
            .terms
            .iter()
            .enumerate()
            .map(|(i, t)| (t.clone(), self.matrix.column(i).sum() as u64))
            .collect();
        freqs.sort_by(|a, b| b.1.cmp(&a.1));
        freqs
    }

    /// Terms with corpus frequency at or above `threshold`.
    pub fn top_terms(&self, threshold: u64) -> Vec<(String, u64)> {
        self.term_frequencies()
            .into_iter()
            .filter(|(_, n)| *n >= threshold)
            .collect()
    }

    /// Fraction of non-zero cells, as a percentage.
    pub fn sparsity(&self) -> f64 {
        let total = (self.n_docs() * self.n_terms()) as f64;
        if total == 0.0 {
            return 0.0;
        }
        let nonzero = self.matrix.iter().filter(|&&x| x > 0.0).count() as f64;
        nonzero / total * 100.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn docs(raw: &[&str]) -> Vec<Vec<String>> {
        raw.iter()
            .map(|d| d.split_whitespace().map(str::to_string).collect())
            .collect()
    }

    #[test]
    fn frequency_table_sorted_with_vocab_order_ties() {
        let dtm = CountVectorizer::new().fit_transform(&docs(&["cat dog", "dog dog"]));
        assert_eq!(
            dtm.term_frequencies(),
            vec![("dog".to_string(), 3), ("cat".to_string(), 1)]
        );
    }

    #[test]
    fn ties_keep_first_encountered_order() {
        let dtm = CountVectorizer::new().fit_transform(&docs(&["zebra apple", "apple zebra"]));
        // equal counts: zebra was seen first, so it ranks first
        assert_eq!(
            dtm.term_frequencies(),
            vec![("zebra".to_string(), 2), ("apple".to_string(), 2)]
        );
    }

    #[test]
    fn min_df_and_token_len_narrow_vocabulary() {
        let dtm = CountVectorizer::new()
            .min_df(2)
            .min_token_len(3)
            .fit_transform(&docs(&["ml rust topics", "rust topics", "rust once"]));
        assert_eq!(dtm.terms, vec!["rust".to_string(), "topics".to_string()]);
        assert_eq!(dtm.n_docs(), 3);
    }

    #[test]
    fn top_terms_threshold() {
        let dtm = CountVectorizer::new().fit_transform(&docs(&["a b b", "b c"]));
        assert_eq!(dtm.top_terms(2), vec![("b".to_string(), 3)]);
    }

    #[test]
    fn sparsity_percentage() {
        let dtm = CountVectorizer::new().fit_transform(&docs(&["cat dog", "dog dog"]));
        // matrix [[1,1],[0,2]] -> 3 of 4 cells populated
        assert!((dtm.sparsity() - 75.0).abs() < 1e-9);
    }
}
