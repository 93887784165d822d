//! BM25 ranking (spec §4.6).
//!
//! `score(D, Q) = Σ IDF(qᵢ) · tf(qᵢ, D) · (k1 + 1) / (tf(qᵢ, D) + k1 · (1 - b + b · |D| / avgdl))`
//! with `IDF(t) = ln((N - df(t) + 0.5) / (df(t) + 0.5) + 1)`. The raw score
//! is normalized to `[0, 1]` via `s' = s / (s + 1)`.

use std::collections::HashMap;

const K1: f64 = 1.5;
const B: f64 = 0.75;

/// Per-document token statistics, built once during the filtering pass.
#[derive(Debug, Clone, Default)]
pub struct DocStats {
    pub term_freq: HashMap<String, u32>,
    pub length: u32,
}

impl DocStats {
    pub fn from_tokens<'a>(tokens: impl IntoIterator<Item = &'a str>) -> Self {
        let mut term_freq: HashMap<String, u32> = HashMap::new();
        let mut length = 0u32;
        for token in tokens {
            *term_freq.entry(token.to_string()).or_insert(0) += 1;
            length += 1;
        }
        Self { term_freq, length }
    }
}

/// Corpus-wide statistics accumulated across every candidate document
/// (spec §4.6: document frequency, corpus size, average document length).
#[derive(Debug, Default)]
pub struct Corpus {
    doc_count: usize,
    doc_freq: HashMap<String, usize>,
    total_length: u64,
}

impl Corpus {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_document(&mut self, doc: &DocStats) {
        self.doc_count += 1;
        self.total_length += doc.length as u64;
        for term in doc.term_freq.keys() {
            *self.doc_freq.entry(term.clone()).or_insert(0) += 1;
        }
    }

    pub fn avg_doc_length(&self) -> f64 {
        if self.doc_count == 0 {
            0.0
        } else {
            self.total_length as f64 / self.doc_count as f64
        }
    }

    fn idf(&self, term: &str) -> f64 {
        let n = self.doc_count as f64;
        if n == 0.0 {
            return 0.0;
        }
        let df = *self.doc_freq.get(term).unwrap_or(&0) as f64;
        (((n - df + 0.5) / (df + 0.5)) + 1.0).ln()
    }
}

/// BM25 score for `doc` against the already-tokenized `terms`, normalized
/// to `[0, 1]`. Degenerate corpora (empty, or zero average document length)
/// score every document `0.0`; a query term absent from the corpus
/// contributes `IDF = 0` rather than erroring.
pub fn score(doc: &DocStats, terms: &[String], corpus: &Corpus) -> f64 {
    let avgdl = corpus.avg_doc_length();
    if corpus.doc_count == 0 || avgdl == 0.0 || terms.is_empty() {
        return 0.0;
    }

    let mut raw = 0.0;
    for term in terms {
        let tf = *doc.term_freq.get(term).unwrap_or(&0) as f64;
        if tf == 0.0 {
            continue;
        }
        let idf = corpus.idf(term);
        let denom = tf + K1 * (1.0 - B + B * (doc.length as f64 / avgdl));
        raw += idf * tf * (K1 + 1.0) / denom;
    }

    (raw / (raw + 1.0)).clamp(0.0, 1.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_corpus_scores_zero() {
        let corpus = Corpus::new();
        let doc = DocStats::from_tokens(["hello"]);
        assert_eq!(score(&doc, &["hello".to_string()], &corpus), 0.0);
    }

    #[test]
    fn no_query_terms_scores_zero() {
        let mut corpus = Corpus::new();
        let doc = DocStats::from_tokens(["hello", "world"]);
        corpus.add_document(&doc);
        assert_eq!(score(&doc, &[], &corpus), 0.0);
    }

    #[test]
    fn term_absent_from_corpus_contributes_nothing() {
        let mut corpus = Corpus::new();
        let doc = DocStats::from_tokens(["hello", "world"]);
        corpus.add_document(&doc);
        assert_eq!(score(&doc, &["goodbye".to_string()], &corpus), 0.0);
    }

    #[test]
    fn matching_document_scores_above_zero() {
        let mut corpus = Corpus::new();
        let doc_a = DocStats::from_tokens(["rust", "is", "great"]);
        let doc_b = DocStats::from_tokens(["python", "is", "fine"]);
        corpus.add_document(&doc_a);
        corpus.add_document(&doc_b);
        let s = score(&doc_a, &["rust".to_string()], &corpus);
        assert!(s > 0.0 && s <= 1.0);
    }

    #[test]
    fn score_is_normalized_into_unit_interval() {
        let mut corpus = Corpus::new();
        let doc = DocStats::from_tokens(std::iter::repeat("rust").take(500));
        corpus.add_document(&doc);
        let s = score(&doc, &["rust".to_string()], &corpus);
        assert!((0.0..=1.0).contains(&s));
    }
}
