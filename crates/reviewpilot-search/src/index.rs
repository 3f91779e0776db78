//! Immutable similarity index over one corpus snapshot

use crate::analyzer::Analyzer;
use crate::vectorizer::{SparseVector, TfidfVectorizer};
use reviewpilot_core::{IndexDocument, Result, ReviewId};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;

/// One ranked search result
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchHit {
    pub id: ReviewId,
    pub similarity: f64,
    pub text: String,
}

/// Index built from a single corpus.
///
/// `ids`, `texts` and `vectors` are aligned by position. An index is never
/// mutated after construction; a rebuild produces a new one.
#[derive(Debug, Clone, Default)]
pub struct SearchIndex {
    vectorizer: Option<TfidfVectorizer>,
    ids: Vec<ReviewId>,
    texts: Vec<String>,
    vectors: Vec<SparseVector>,
}

impl SearchIndex {
    /// Index with no documents
    pub fn empty() -> Self {
        Self::default()
    }

    /// Fit a vectorizer over `documents`. An empty corpus yields an empty index.
    pub fn build(documents: &[IndexDocument], max_features: usize) -> Result<Self> {
        if documents.is_empty() {
            return Ok(Self::empty());
        }

        let texts: Vec<String> = documents.iter().map(|d| d.text.clone()).collect();
        let (vectorizer, vectors) =
            TfidfVectorizer::fit_transform(Analyzer::new()?, &texts, max_features)?;

        Ok(Self {
            vectorizer: Some(vectorizer),
            ids: documents.iter().map(|d| d.id).collect(),
            texts,
            vectors,
        })
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    pub fn vocabulary_size(&self) -> usize {
        self.vectorizer
            .as_ref()
            .map_or(0, TfidfVectorizer::vocabulary_size)
    }

    /// Cosine similarity of `query` against every document, in corpus order
    pub fn similarities(&self, query: &str) -> Vec<f64> {
        let Some(vectorizer) = self.vectorizer.as_ref() else {
            return Vec::new();
        };

        let query = vectorizer.transform(query);
        self.vectors
            .iter()
            .map(|doc| query.dot(doc).clamp(0.0, 1.0))
            .collect()
    }

    /// Top `k` documents by similarity.
    ///
    /// Positions are stably sorted ascending, the last `k` are taken and
    /// reversed, so among equal scores the later corpus position comes first.
    pub fn search(&self, query: &str, k: usize) -> Vec<SearchHit> {
        if k == 0 || self.is_empty() {
            return Vec::new();
        }

        let similarities = self.similarities(query);
        let mut order: Vec<usize> = (0..similarities.len()).collect();
        order.sort_by(|a, b| {
            similarities[*a]
                .partial_cmp(&similarities[*b])
                .unwrap_or(Ordering::Equal)
        });

        let start = order.len().saturating_sub(k);
        order[start..]
            .iter()
            .rev()
            .map(|&pos| SearchHit {
                id: self.ids[pos],
                similarity: similarities[pos],
                text: self.texts[pos].clone(),
            })
            .collect()
    }
}
