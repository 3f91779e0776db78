//! Copy-on-write handle to the current index
//!
//! A rebuild fits the new index completely outside the lock, then swaps the
//! `Arc` under a write lock. Searches clone the `Arc` under a read lock and
//! score without holding it, so every search sees exactly one index.

use crate::index::{SearchHit, SearchIndex};
use crate::vectorizer::DEFAULT_MAX_FEATURES;
use parking_lot::RwLock;
use reviewpilot_core::IndexDocument;
use reviewpilot_telemetry::{MetricsCollector, Operation};
use serde::Serialize;
use std::sync::Arc;
use tracing::{info, warn};

/// Size and version of the published index
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct IndexStats {
    pub version: u64,
    pub documents: usize,
    pub vocabulary: usize,
}

struct Published {
    version: u64,
    index: Arc<SearchIndex>,
}

/// Shared similarity index; cloning shares the same published snapshot
#[derive(Clone)]
pub struct SharedSearchIndex {
    current: Arc<RwLock<Published>>,
    max_features: usize,
    metrics: MetricsCollector,
}

impl SharedSearchIndex {
    pub fn new(metrics: MetricsCollector) -> Self {
        Self::with_max_features(DEFAULT_MAX_FEATURES, metrics)
    }

    pub fn with_max_features(max_features: usize, metrics: MetricsCollector) -> Self {
        Self {
            current: Arc::new(RwLock::new(Published {
                version: 0,
                index: Arc::new(SearchIndex::empty()),
            })),
            max_features,
            metrics,
        }
    }

    /// The index searches currently run against
    pub fn snapshot(&self) -> Arc<SearchIndex> {
        self.current.read().index.clone()
    }

    pub fn stats(&self) -> IndexStats {
        let published = self.current.read();
        IndexStats {
            version: published.version,
            documents: published.index.len(),
            vocabulary: published.index.vocabulary_size(),
        }
    }

    /// Replace the index with one built from `documents`.
    ///
    /// Nothing is merged with the previous index. A corpus with no usable
    /// terms publishes an empty index.
    pub fn rebuild(&self, documents: &[IndexDocument]) -> IndexStats {
        let timer = self.metrics.start(Operation::IndexRebuild);

        let index = match SearchIndex::build(documents, self.max_features) {
            Ok(index) => index,
            Err(e) => {
                warn!(documents = documents.len(), error = %e, "Index rebuild produced no vocabulary");
                SearchIndex::empty()
            }
        };

        let stats = self.publish(index);
        timer.finish();

        info!(
            version = stats.version,
            documents = stats.documents,
            vocabulary = stats.vocabulary,
            "Search index rebuilt"
        );
        stats
    }

    /// Publish an empty index
    pub fn clear(&self) -> IndexStats {
        self.publish(SearchIndex::empty())
    }

    fn publish(&self, index: SearchIndex) -> IndexStats {
        let index = Arc::new(index);
        let documents = index.len();
        let vocabulary = index.vocabulary_size();

        let mut published = self.current.write();
        published.version += 1;
        published.index = index;

        IndexStats {
            version: published.version,
            documents,
            vocabulary,
        }
    }

    /// Top `k` matches for `query`. Never fails; an empty index yields no hits.
    pub fn search(&self, query: &str, k: usize) -> Vec<SearchHit> {
        let timer = self.metrics.start(Operation::Search);
        let hits = self.snapshot().search(query, k);
        timer.finish();
        hits
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn docs(texts: &[&str]) -> Vec<IndexDocument> {
        texts
            .iter()
            .enumerate()
            .map(|(i, t)| IndexDocument::new(i as i64 + 1, *t))
            .collect()
    }

    #[test]
    fn test_unbuilt_index_is_empty() {
        let shared = SharedSearchIndex::new(MetricsCollector::new());
        assert!(shared.search("anything", 5).is_empty());
        assert_eq!(shared.stats().version, 0);
    }

    #[test]
    fn test_rebuild_replaces_instead_of_merging() {
        let metrics = MetricsCollector::new();
        let shared = SharedSearchIndex::new(metrics.clone());

        shared.rebuild(&docs(&["tasty pasta", "cold soup"]));
        assert_eq!(shared.search("pasta", 5).len(), 2);

        let stats = shared.rebuild(&docs(&["parking lot"]));
        assert_eq!(stats.version, 2);
        assert_eq!(stats.documents, 1);

        let hits = shared.search("pasta", 5);
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].text, "parking lot");
        assert_eq!(hits[0].similarity, 0.0);

        assert_eq!(metrics.stats(Operation::IndexRebuild).count, 2);
        assert_eq!(metrics.stats(Operation::Search).count, 2);
    }

    #[test]
    fn test_rebuild_with_empty_corpus() {
        let shared = SharedSearchIndex::new(MetricsCollector::new());
        shared.rebuild(&docs(&["tasty pasta"]));
        shared.rebuild(&[]);
        assert!(shared.search("anything", 5).is_empty());
    }

    #[test]
    fn test_stop_word_corpus_publishes_empty_index() {
        let shared = SharedSearchIndex::new(MetricsCollector::new());
        let stats = shared.rebuild(&docs(&["the and", "of it"]));
        assert_eq!(stats.documents, 0);
        assert!(shared.search("the", 3).is_empty());
    }

    #[test]
    fn test_snapshot_survives_rebuild() {
        let shared = SharedSearchIndex::new(MetricsCollector::new());
        shared.rebuild(&docs(&["tasty pasta", "cold soup"]));

        let old = shared.snapshot();
        shared.rebuild(&docs(&["parking lot"]));

        assert_eq!(old.len(), 2);
        assert_eq!(shared.snapshot().len(), 1);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_searches_see_whole_index() {
        let shared = SharedSearchIndex::new(MetricsCollector::new());
        let small = docs(&["tasty pasta", "cold soup"]);
        let large = docs(&["tasty pasta", "cold soup", "slow service", "parking lot"]);
        shared.rebuild(&small);

        let mut handles = Vec::new();
        for _ in 0..4 {
            let shared = shared.clone();
            handles.push(tokio::spawn(async move {
                for _ in 0..200 {
                    let len = shared.search("pasta", 10).len();
                    assert!(len == 2 || len == 4, "saw partial index of {len}");
                }
            }));
        }

        for i in 0..50 {
            shared.rebuild(if i % 2 == 0 { &large } else { &small });
        }

        for handle in handles {
            handle.await.unwrap();
        }
    }
}
