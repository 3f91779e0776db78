//! Review store interface and the in-memory implementation

use async_trait::async_trait;
use parking_lot::RwLock;
use reviewpilot_core::{Error, IndexDocument, Result, Review, ReviewId, Sentiment, Topic};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use tracing::debug;

/// Filters for paginated listing. Unset fields match everything.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ReviewFilters {
    #[serde(default)]
    pub location: Option<String>,

    #[serde(default)]
    pub sentiment: Option<Sentiment>,

    /// Case-insensitive substring of the review text
    #[serde(default)]
    pub q: Option<String>,

    #[serde(default)]
    pub rating_min: Option<u8>,

    #[serde(default)]
    pub rating_max: Option<u8>,

    /// Inclusive lower bound, compared as strings
    #[serde(default)]
    pub date_from: Option<String>,

    /// Inclusive upper bound, compared as strings
    #[serde(default)]
    pub date_to: Option<String>,
}

impl ReviewFilters {
    pub fn matches(&self, review: &Review) -> bool {
        if let Some(location) = &self.location {
            if &review.location != location {
                return false;
            }
        }
        if let Some(sentiment) = self.sentiment {
            if review.sentiment != Some(sentiment) {
                return false;
            }
        }
        if let Some(q) = &self.q {
            if !review.text.to_lowercase().contains(&q.to_lowercase()) {
                return false;
            }
        }
        if self.rating_min.is_some_and(|min| review.rating < min) {
            return false;
        }
        if self.rating_max.is_some_and(|max| review.rating > max) {
            return false;
        }
        if self
            .date_from
            .as_deref()
            .is_some_and(|from| review.date.as_str() < from)
        {
            return false;
        }
        if self
            .date_to
            .as_deref()
            .is_some_and(|to| review.date.as_str() > to)
        {
            return false;
        }
        true
    }
}

/// One page of reviews, newest-ingested first
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReviewPage {
    pub reviews: Vec<Review>,
    pub total: usize,
    pub page: usize,
    pub page_size: usize,
    pub total_pages: usize,
    pub has_next: bool,
    pub has_prev: bool,
}

/// Group-by counts over the stored reviews
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AggregateCounts {
    /// Only reviews with a sentiment
    pub sentiment: BTreeMap<Sentiment, u64>,
    /// Only reviews with a topic
    pub topic: BTreeMap<Topic, u64>,
    pub location: BTreeMap<String, u64>,
    pub rating: BTreeMap<u8, u64>,
    pub total: u64,
}

/// Persisted review store consumed by the pipeline
#[async_trait]
pub trait ReviewStore: Send + Sync {
    /// Insert or replace by id; returns the number of rows written
    async fn insert(&self, reviews: Vec<Review>) -> Result<usize>;

    async fn get_by_id(&self, id: ReviewId) -> Result<Option<Review>>;

    /// `page` is 1-based
    async fn get_paginated(
        &self,
        filters: &ReviewFilters,
        page: usize,
        page_size: usize,
    ) -> Result<ReviewPage>;

    /// Attach analysis results; `false` when the id is unknown
    async fn update_analysis(&self, id: ReviewId, sentiment: Sentiment, topic: Topic)
        -> Result<bool>;

    /// Every review's text, ordered by id
    async fn all_text_for_indexing(&self) -> Result<Vec<IndexDocument>>;

    /// Reviews missing a sentiment or a topic, ordered by id
    async fn unanalyzed(&self) -> Result<Vec<IndexDocument>>;

    async fn raw_aggregate_counts(&self) -> Result<AggregateCounts>;
}

struct StoredReview {
    seq: u64,
    review: Review,
}

#[derive(Default)]
struct Rows {
    by_id: BTreeMap<ReviewId, StoredReview>,
    next_seq: u64,
}

/// Review store held in process memory
#[derive(Default)]
pub struct InMemoryReviewStore {
    rows: RwLock<Rows>,
}

impl InMemoryReviewStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.rows.read().by_id.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[async_trait]
impl ReviewStore for InMemoryReviewStore {
    async fn insert(&self, reviews: Vec<Review>) -> Result<usize> {
        for review in &reviews {
            review.validate()?;
        }

        let written = reviews.len();
        let mut rows = self.rows.write();
        for review in reviews {
            let seq = rows.next_seq;
            rows.next_seq += 1;
            rows.by_id.insert(review.id, StoredReview { seq, review });
        }

        debug!(written, total = rows.by_id.len(), "Reviews stored");
        Ok(written)
    }

    async fn get_by_id(&self, id: ReviewId) -> Result<Option<Review>> {
        Ok(self.rows.read().by_id.get(&id).map(|row| row.review.clone()))
    }

    async fn get_paginated(
        &self,
        filters: &ReviewFilters,
        page: usize,
        page_size: usize,
    ) -> Result<ReviewPage> {
        if page == 0 || page_size == 0 {
            return Err(Error::validation("page and page_size must be at least 1"));
        }

        let mut matching: Vec<(u64, Review)> = {
            let rows = self.rows.read();
            rows.by_id
                .values()
                .filter(|row| filters.matches(&row.review))
                .map(|row| (row.seq, row.review.clone()))
                .collect()
        };
        matching.sort_by(|a, b| b.0.cmp(&a.0));

        let total = matching.len();
        let total_pages = total.div_ceil(page_size);
        let reviews = matching
            .into_iter()
            .skip((page - 1).saturating_mul(page_size))
            .take(page_size)
            .map(|(_, review)| review)
            .collect();

        Ok(ReviewPage {
            reviews,
            total,
            page,
            page_size,
            total_pages,
            has_next: page < total_pages,
            has_prev: page > 1,
        })
    }

    async fn update_analysis(
        &self,
        id: ReviewId,
        sentiment: Sentiment,
        topic: Topic,
    ) -> Result<bool> {
        let mut rows = self.rows.write();
        match rows.by_id.get_mut(&id) {
            Some(row) => {
                row.review.sentiment = Some(sentiment);
                row.review.topic = Some(topic);
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn all_text_for_indexing(&self) -> Result<Vec<IndexDocument>> {
        Ok(self
            .rows
            .read()
            .by_id
            .values()
            .map(|row| IndexDocument::from(&row.review))
            .collect())
    }

    async fn unanalyzed(&self) -> Result<Vec<IndexDocument>> {
        Ok(self
            .rows
            .read()
            .by_id
            .values()
            .filter(|row| row.review.needs_analysis())
            .map(|row| IndexDocument::from(&row.review))
            .collect())
    }

    async fn raw_aggregate_counts(&self) -> Result<AggregateCounts> {
        let rows = self.rows.read();
        let mut counts = AggregateCounts::default();

        for row in rows.by_id.values() {
            let review = &row.review;
            if let Some(sentiment) = review.sentiment {
                *counts.sentiment.entry(sentiment).or_insert(0) += 1;
            }
            if let Some(topic) = review.topic {
                *counts.topic.entry(topic).or_insert(0) += 1;
            }
            *counts.location.entry(review.location.clone()).or_insert(0) += 1;
            *counts.rating.entry(review.rating).or_insert(0) += 1;
            counts.total += 1;
        }

        Ok(counts)
    }
}
