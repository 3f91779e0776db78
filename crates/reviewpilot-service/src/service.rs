//! The review intelligence service
//!
//! One constructed object owns the models, the search index, the reply
//! generator and the analytics aggregator. Callers share it by reference;
//! nothing lives in process-wide statics.

use crate::config::ServiceConfig;
use futures::stream::{self, StreamExt};
use reviewpilot_classifiers::{
    ModelRegistry, SentimentAnalysis, SentimentClassifier, Summarizer, TopicExtractor,
};
use reviewpilot_core::{Error, Result, Review, ReviewId, Sentiment, Topic};
use reviewpilot_reply::{ReplyCatalog, ReplyGenerator, ReplySuggestion};
use reviewpilot_search::{IndexStats, SearchHit, SharedSearchIndex};
use reviewpilot_store::{
    AnalyticsAggregator, AnalyticsReport, CacheStore, Clock, InMemoryCacheStore,
    InMemoryReviewStore, ReviewFilters, ReviewPage, ReviewStore,
};
use reviewpilot_telemetry::{MetricsCollector, Operation, OperationStats};
use serde::Serialize;
use std::collections::BTreeMap;
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::{info, warn};

/// Overall health
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum HealthStatus {
    Healthy,
    Degraded,
}

/// Health summary; `degraded` when no pluggable model is loaded
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HealthReport {
    pub status: HealthStatus,
    pub models_loaded: BTreeMap<String, bool>,
    pub metrics: BTreeMap<Operation, OperationStats>,
    pub index: IndexStats,
}

/// Ranked search results for one query
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SearchResults {
    pub query: String,
    pub results: Vec<SearchHit>,
    pub total: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct IngestSummary {
    pub ingested: usize,
    pub index: IndexStats,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BatchSummary {
    /// Reviews tagged and persisted
    pub processed: usize,
    /// Reviews that needed analysis
    pub total: usize,
}

/// Reply for a stored review with the tags it was based on
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SuggestedReply {
    pub reply: String,
    pub sentiment: Sentiment,
    pub topic: Topic,
    pub reasoning_log: String,
}

/// Assembles a [`ReviewIntelligence`]
pub struct ServiceBuilder {
    config: ServiceConfig,
    reviews: Option<Arc<dyn ReviewStore>>,
    cache: Option<Arc<dyn CacheStore>>,
    clock: Option<Arc<dyn Clock>>,
    models: Option<ModelRegistry>,
    catalog: Option<ReplyCatalog>,
}

impl ServiceBuilder {
    pub fn new(config: ServiceConfig) -> Self {
        Self {
            config,
            reviews: None,
            cache: None,
            clock: None,
            models: None,
            catalog: None,
        }
    }

    pub fn reviews(mut self, store: Arc<dyn ReviewStore>) -> Self {
        self.reviews = Some(store);
        self
    }

    pub fn cache(mut self, cache: Arc<dyn CacheStore>) -> Self {
        self.cache = Some(cache);
        self
    }

    pub fn clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = Some(clock);
        self
    }

    /// Use these models instead of loading the configured ones
    pub fn models(mut self, models: ModelRegistry) -> Self {
        self.models = Some(models);
        self
    }

    /// Use this catalog instead of the configured or built-in one
    pub fn catalog(mut self, catalog: ReplyCatalog) -> Self {
        self.catalog = Some(catalog);
        self
    }

    /// Load models, build the initial index and sweep stale cache rows
    pub async fn start(self) -> Result<ReviewIntelligence> {
        ReviewIntelligence::start(self).await
    }
}

/// Review analysis, search, replies and analytics
#[derive(Clone)]
pub struct ReviewIntelligence {
    config: ServiceConfig,
    reviews: Arc<dyn ReviewStore>,
    metrics: MetricsCollector,
    models: ModelRegistry,
    classifier: SentimentClassifier,
    topics: TopicExtractor,
    summarizer: Summarizer,
    replies: ReplyGenerator,
    index: SharedSearchIndex,
    /// Serializes read-then-publish so an older corpus never lands last
    rebuild_lock: Arc<Mutex<()>>,
    analytics: AnalyticsAggregator,
}

impl ReviewIntelligence {
    pub fn builder(config: ServiceConfig) -> ServiceBuilder {
        ServiceBuilder::new(config)
    }

    async fn start(builder: ServiceBuilder) -> Result<Self> {
        let ServiceBuilder {
            config,
            reviews,
            cache,
            clock,
            models,
            catalog,
        } = builder;
        config.validate()?;

        info!("Starting review intelligence service");

        let models = match models {
            Some(models) => models,
            None => {
                let models_config = config.models.clone();
                tokio::task::spawn_blocking(move || ModelRegistry::load(&models_config))
                    .await
                    .map_err(|e| Error::internal(format!("model loading task failed: {e}")))?
            }
        };

        let catalog = match (catalog, &config.replies.catalog) {
            (Some(catalog), _) => catalog,
            (None, Some(path)) => {
                info!(path = %path.display(), "Loading reply catalog");
                ReplyCatalog::load(path)?
            }
            (None, None) => ReplyCatalog::builtin(),
        };

        let reviews = reviews
            .unwrap_or_else(|| Arc::new(InMemoryReviewStore::new()) as Arc<dyn ReviewStore>);
        let cache = cache.unwrap_or_else(|| Arc::new(InMemoryCacheStore::new()) as Arc<dyn CacheStore>);

        let metrics = MetricsCollector::with_window(config.metrics.window);
        let classifier = SentimentClassifier::new(models.sentiment(), metrics.clone());
        let summarizer = Summarizer::new(models.summarization(), metrics.clone());

        let mut replies = ReplyGenerator::new(
            classifier.clone(),
            summarizer.clone(),
            Arc::new(catalog),
            metrics.clone(),
        );
        if let Some(seed) = config.replies.seed {
            replies = replies.with_seed(seed);
        }

        let index = SharedSearchIndex::with_max_features(config.search.max_features, metrics.clone());

        let mut analytics = AnalyticsAggregator::new(reviews.clone(), cache)
            .with_ttl_secs(config.analytics.ttl_secs);
        if let Some(clock) = clock {
            analytics = analytics.with_clock(clock);
        }

        let service = Self {
            config,
            reviews,
            metrics,
            models,
            classifier,
            topics: TopicExtractor::new(),
            summarizer,
            replies,
            index,
            rebuild_lock: Arc::new(Mutex::new(())),
            analytics,
        };

        service.rebuild_index().await?;
        service.analytics.sweep_expired().await;

        let health = service.health_check();
        info!(
            status = ?health.status,
            documents = health.index.documents,
            "Review intelligence service ready"
        );
        Ok(service)
    }

    /// Drop metric samples and publish an empty index
    pub fn shutdown(&self) {
        self.metrics.reset();
        self.index.clear();
        info!("Review intelligence service shut down");
    }

    pub fn config(&self) -> &ServiceConfig {
        &self.config
    }

    pub fn metrics(&self) -> &MetricsCollector {
        &self.metrics
    }

    pub fn index(&self) -> &SharedSearchIndex {
        &self.index
    }

    pub async fn classify(&self, text: &str) -> SentimentAnalysis {
        self.classifier.classify(text).await
    }

    pub fn extract_topic(&self, text: &str) -> Topic {
        self.topics.extract(text)
    }

    pub async fn summarize(&self, text: &str) -> String {
        self.summarizer.summarize(text).await
    }

    pub async fn generate_reply(
        &self,
        text: &str,
        rating: u8,
        sentiment: Option<Sentiment>,
        summary: Option<String>,
    ) -> Result<ReplySuggestion> {
        self.require(self.config.features.enable_ai_replies, "AI reply generation")?;
        Ok(self.replies.generate(text, rating, sentiment, summary).await)
    }

    /// Top matches for `query`; `k` defaults to `search.default_k` and is
    /// clamped to `search.max_k`
    pub fn search(&self, query: &str, k: Option<usize>) -> Result<SearchResults> {
        self.require(self.config.features.enable_search, "search")?;

        let k = k
            .unwrap_or(self.config.search.default_k)
            .min(self.config.search.max_k);
        let results = self.index.search(query, k);

        Ok(SearchResults {
            query: query.to_string(),
            total: results.len(),
            results,
        })
    }

    /// Rebuild the index from every stored review
    pub async fn rebuild_index(&self) -> Result<IndexStats> {
        let _guard = self.rebuild_lock.lock().await;
        let documents = self.reviews.all_text_for_indexing().await?;
        Ok(self.index.rebuild(&documents))
    }

    pub async fn get_analytics(&self) -> Result<AnalyticsReport> {
        self.require(self.config.features.enable_analytics, "analytics")?;
        self.analytics.get_analytics().await
    }

    pub fn health_check(&self) -> HealthReport {
        let status = if self.models.any_loaded() {
            HealthStatus::Healthy
        } else {
            HealthStatus::Degraded
        };

        HealthReport {
            status,
            models_loaded: self.models.models_loaded(),
            metrics: self.metrics.summary(),
            index: self.index.stats(),
        }
    }

    /// Store a batch of reviews and rebuild the index. With `ai_enabled`
    /// off the index is left as it was.
    pub async fn ingest(&self, reviews: Vec<Review>) -> Result<IngestSummary> {
        if reviews.is_empty() {
            return Err(Error::validation("no reviews provided"));
        }
        for review in &reviews {
            review.validate()?;
        }

        let ingested = self.reviews.insert(reviews).await?;
        let index = if self.config.features.ai_enabled {
            self.rebuild_index().await?
        } else {
            self.index.stats()
        };

        info!(ingested, documents = index.documents, "Reviews ingested");
        Ok(IngestSummary { ingested, index })
    }

    /// Tag every review missing a sentiment or topic, then rebuild the index
    pub async fn process_reviews(&self) -> Result<BatchSummary> {
        self.require(self.config.features.enable_batch_processing, "batch processing")?;
        self.require(self.config.features.ai_enabled, "AI processing")?;

        let pending = self.reviews.unanalyzed().await?;
        let total = pending.len();

        let processed = stream::iter(pending)
            .map(|doc| async move {
                let sentiment = self.classifier.classify(&doc.text).await.label;
                let topic = self.topics.extract(&doc.text);

                match self.reviews.update_analysis(doc.id, sentiment, topic).await {
                    Ok(true) => true,
                    Ok(false) => {
                        warn!(review_id = doc.id, "Review vanished during batch processing");
                        false
                    }
                    Err(e) => {
                        warn!(review_id = doc.id, error = %e, "Failed to persist analysis");
                        false
                    }
                }
            })
            .buffer_unordered(self.config.batch.concurrency)
            .filter(|stored| futures::future::ready(*stored))
            .count()
            .await;

        self.rebuild_index().await?;

        info!(processed, total, "Batch analysis complete");
        Ok(BatchSummary { processed, total })
    }

    /// Reply for a stored review, tagging it first when needed
    pub async fn suggest_reply(&self, id: ReviewId) -> Result<SuggestedReply> {
        self.require(self.config.features.enable_ai_replies, "AI reply generation")?;

        let review = self.get_review(id).await?;
        let sentiment = match review.sentiment {
            Some(sentiment) => sentiment,
            None => self.classifier.classify(&review.text).await.label,
        };
        let topic = review
            .topic
            .unwrap_or_else(|| self.topics.extract(&review.text));

        if review.needs_analysis() {
            self.reviews.update_analysis(id, sentiment, topic).await?;
        }

        let suggestion = self
            .replies
            .generate(&review.text, review.rating, Some(sentiment), None)
            .await;

        Ok(SuggestedReply {
            reply: suggestion.reply,
            sentiment,
            topic,
            reasoning_log: suggestion.reasoning_log,
        })
    }

    pub async fn get_review(&self, id: ReviewId) -> Result<Review> {
        self.reviews
            .get_by_id(id)
            .await?
            .ok_or_else(|| Error::not_found(format!("review {id}")))
    }

    /// One page of reviews; `page_size` defaults to the configured size
    pub async fn list_reviews(
        &self,
        filters: &ReviewFilters,
        page: usize,
        page_size: Option<usize>,
    ) -> Result<ReviewPage> {
        let page_size = page_size.unwrap_or(self.config.pagination.default_page_size);
        if page_size > self.config.pagination.max_page_size {
            return Err(Error::validation(format!(
                "page_size {page_size} exceeds {}",
                self.config.pagination.max_page_size
            )));
        }
        self.reviews.get_paginated(filters, page, page_size).await
    }

    fn require(&self, enabled: bool, feature: &str) -> Result<()> {
        if enabled {
            Ok(())
        } else {
            Err(Error::feature_disabled(format!("{feature} is currently disabled")))
        }
    }
}
