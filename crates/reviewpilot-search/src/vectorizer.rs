//! TF-IDF weighting over a fitted vocabulary

use crate::analyzer::Analyzer;
use reviewpilot_core::{Error, Result};
use std::collections::{BTreeMap, HashMap};

/// Vocabulary cap used by the review index
pub const DEFAULT_MAX_FEATURES: usize = 1000;

/// Sparse L2-normalised row: `(dimension, weight)` sorted by dimension
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SparseVector {
    entries: Vec<(usize, f64)>,
}

impl SparseVector {
    fn from_weights(weights: BTreeMap<usize, f64>) -> Self {
        let norm = weights.values().map(|w| w * w).sum::<f64>().sqrt();
        if norm == 0.0 {
            return Self::default();
        }

        Self {
            entries: weights.into_iter().map(|(dim, w)| (dim, w / norm)).collect(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn entries(&self) -> &[(usize, f64)] {
        &self.entries
    }

    /// Dot product; for normalised rows this is the cosine similarity
    pub fn dot(&self, other: &SparseVector) -> f64 {
        let (mut i, mut j) = (0, 0);
        let mut sum = 0.0;

        while i < self.entries.len() && j < other.entries.len() {
            let (a_dim, a_w) = self.entries[i];
            let (b_dim, b_w) = other.entries[j];
            match a_dim.cmp(&b_dim) {
                std::cmp::Ordering::Less => i += 1,
                std::cmp::Ordering::Greater => j += 1,
                std::cmp::Ordering::Equal => {
                    sum += a_w * b_w;
                    i += 1;
                    j += 1;
                }
            }
        }

        sum
    }
}

/// Fitted TF-IDF model.
///
/// The vocabulary keeps the `max_features` terms with the highest corpus
/// counts (ties by term order) and maps them to dimensions in term order.
/// Weights are raw counts times `ln((1 + n) / (1 + df)) + 1`, rows are L2
/// normalised. Once fitted, the vocabulary never changes.
#[derive(Debug, Clone)]
pub struct TfidfVectorizer {
    analyzer: Analyzer,
    vocabulary: HashMap<String, usize>,
    idf: Vec<f64>,
}

impl TfidfVectorizer {
    /// Fit over `documents` and return the model with each document's row
    pub fn fit_transform<S: AsRef<str>>(
        analyzer: Analyzer,
        documents: &[S],
        max_features: usize,
    ) -> Result<(Self, Vec<SparseVector>)> {
        let doc_terms: Vec<Vec<String>> = documents
            .iter()
            .map(|doc| analyzer.terms(doc.as_ref()))
            .collect();

        let mut corpus_counts: BTreeMap<&str, usize> = BTreeMap::new();
        let mut doc_freq: BTreeMap<&str, usize> = BTreeMap::new();
        for terms in &doc_terms {
            let mut seen: Vec<&str> = Vec::with_capacity(terms.len());
            for term in terms {
                *corpus_counts.entry(term.as_str()).or_insert(0) += 1;
                seen.push(term.as_str());
            }
            seen.sort_unstable();
            seen.dedup();
            for term in seen {
                *doc_freq.entry(term).or_insert(0) += 1;
            }
        }

        if corpus_counts.is_empty() {
            return Err(Error::validation(
                "empty vocabulary; documents contain only stop words",
            ));
        }

        let mut ranked: Vec<(&str, usize)> = corpus_counts.into_iter().collect();
        ranked.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(b.0)));
        ranked.truncate(max_features.max(1));

        let mut kept: Vec<&str> = ranked.into_iter().map(|(term, _)| term).collect();
        kept.sort_unstable();

        let n = documents.len() as f64;
        let idf = kept
            .iter()
            .map(|term| {
                let df = doc_freq.get(term).copied().unwrap_or(0) as f64;
                ((1.0 + n) / (1.0 + df)).ln() + 1.0
            })
            .collect();

        let vocabulary = kept
            .iter()
            .enumerate()
            .map(|(dim, term)| (term.to_string(), dim))
            .collect();

        let vectorizer = Self {
            analyzer,
            vocabulary,
            idf,
        };

        let rows = doc_terms
            .iter()
            .map(|terms| vectorizer.weigh(terms))
            .collect();

        Ok((vectorizer, rows))
    }

    /// Row for unseen text; terms outside the vocabulary are ignored
    pub fn transform(&self, text: &str) -> SparseVector {
        self.weigh(&self.analyzer.terms(text))
    }

    fn weigh(&self, terms: &[String]) -> SparseVector {
        let mut weights: BTreeMap<usize, f64> = BTreeMap::new();
        for term in terms {
            if let Some(&dim) = self.vocabulary.get(term) {
                *weights.entry(dim).or_insert(0.0) += 1.0;
            }
        }
        for (dim, weight) in weights.iter_mut() {
            *weight *= self.idf[*dim];
        }
        SparseVector::from_weights(weights)
    }

    pub fn vocabulary(&self) -> &HashMap<String, usize> {
        &self.vocabulary
    }

    pub fn vocabulary_size(&self) -> usize {
        self.vocabulary.len()
    }
}
