//! Reply generation pipeline

use crate::catalog::{render, ReplyBucket, ReplyCatalog, DEFAULT_TEMPLATE};
use parking_lot::Mutex;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use reviewpilot_classifiers::{truncate_chars, SentimentClassifier, Summarizer, TopicExtractor};
use reviewpilot_core::{Error, Result, Sentiment, Topic};
use reviewpilot_telemetry::{MetricsCollector, Operation};
use serde::Serialize;
use std::sync::Arc;
use tracing::{debug, warn};

const SUMMARY_EXCERPT_CHARS: usize = 50;

/// A suggested reply with a trace of how it was chosen
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReplySuggestion {
    pub reply: String,
    pub reasoning_log: String,
    /// Sentiment that picked the bucket
    pub sentiment: Sentiment,
    pub topic: Topic,
    pub bucket: ReplyBucket,
    /// Set when the pipeline failed and the fallback answered
    pub degraded: bool,
}

/// Composes replies from the template catalog.
///
/// Template choice is uniform over the selected bucket. The random source is
/// shared by clones and can be seeded for reproducible selection.
#[derive(Clone)]
pub struct ReplyGenerator {
    classifier: SentimentClassifier,
    topics: TopicExtractor,
    summarizer: Summarizer,
    catalog: Arc<ReplyCatalog>,
    rng: Arc<Mutex<StdRng>>,
    metrics: MetricsCollector,
}

impl ReplyGenerator {
    pub fn new(
        classifier: SentimentClassifier,
        summarizer: Summarizer,
        catalog: Arc<ReplyCatalog>,
        metrics: MetricsCollector,
    ) -> Self {
        Self {
            classifier,
            topics: TopicExtractor::new(),
            summarizer,
            catalog,
            rng: Arc::new(Mutex::new(StdRng::from_entropy())),
            metrics,
        }
    }

    /// Use a seeded random source
    pub fn with_seed(self, seed: u64) -> Self {
        self.with_rng(StdRng::seed_from_u64(seed))
    }

    pub fn with_rng(mut self, rng: StdRng) -> Self {
        self.rng = Arc::new(Mutex::new(rng));
        self
    }

    pub fn catalog(&self) -> &ReplyCatalog {
        &self.catalog
    }

    /// Suggest a reply. Never fails.
    ///
    /// `sentiment` picks the bucket when given; otherwise the classified
    /// sentiment does. A missing `summary` is computed.
    pub async fn generate(
        &self,
        text: &str,
        rating: u8,
        sentiment: Option<Sentiment>,
        summary: Option<String>,
    ) -> ReplySuggestion {
        let timer = self.metrics.start(Operation::ReplyGeneration);

        let suggestion = match self.try_generate(text, rating, sentiment, summary).await {
            Ok(suggestion) => suggestion,
            Err(e) => {
                warn!(rating, error = %e, "Reply generation failed, using fallback reply");
                self.fallback(text, rating, sentiment, &e)
            }
        };

        timer.finish();
        suggestion
    }

    async fn try_generate(
        &self,
        text: &str,
        rating: u8,
        requested: Option<Sentiment>,
        summary: Option<String>,
    ) -> Result<ReplySuggestion> {
        if !(1..=5).contains(&rating) {
            return Err(Error::validation(format!("rating {rating} outside 1..=5")));
        }

        let analysis = self.classifier.classify(text).await;
        let topic = self.topics.extract(text);
        let summary = match summary {
            Some(summary) => summary,
            None => self.summarizer.summarize(text).await,
        };

        let sentiment = requested.unwrap_or(analysis.label);
        let bucket = ReplyBucket::select(sentiment, rating);
        let (variant, template) = self.choose(bucket)?;
        let variants = self.catalog.templates(bucket).len();

        let requested = requested.map_or("none", |s| s.as_str());
        let reasoning_log = format!(
            "Analysis: {sentiment} sentiment (requested: {requested}, classified: {} at {:.2}, {} confidence) | Topic: {topic} | Summary: {}... | Rating: {rating}/5 | Template: {bucket} {}/{variants}",
            analysis.label,
            analysis.score,
            analysis.confidence.as_str(),
            truncate_chars(&summary, SUMMARY_EXCERPT_CHARS),
            variant + 1,
        );

        debug!(%bucket, variant, %topic, "Reply template selected");

        Ok(ReplySuggestion {
            reply: render(template, topic),
            reasoning_log,
            sentiment,
            topic,
            bucket,
            degraded: false,
        })
    }

    /// Reply from the requested sentiment and the extracted topic only
    fn fallback(
        &self,
        text: &str,
        rating: u8,
        requested: Option<Sentiment>,
        error: &Error,
    ) -> ReplySuggestion {
        let topic = self.topics.extract(text);
        let sentiment = requested.unwrap_or(Sentiment::Neutral);
        let bucket = ReplyBucket::select(sentiment, rating.clamp(1, 5));

        let reply = match self.choose(bucket) {
            Ok((_, template)) => render(template, topic),
            Err(_) => render(DEFAULT_TEMPLATE, topic),
        };

        ReplySuggestion {
            reply,
            reasoning_log: format!(
                "Fallback reply generated due to reply pipeline error: {error} | Sentiment: {sentiment} | Topic: {topic} | Rating: {rating}/5"
            ),
            sentiment,
            topic,
            bucket,
            degraded: true,
        }
    }

    fn choose(&self, bucket: ReplyBucket) -> Result<(usize, &str)> {
        let templates = self.catalog.templates(bucket);
        if templates.is_empty() {
            return Err(Error::template(format!("bucket '{bucket}' has no templates")));
        }
        let variant = self.rng.lock().gen_range(0..templates.len());
        Ok((variant, templates[variant].as_str()))
    }
}
