//! Sentiment classification with a fixed fallback
//!
//! The classifier wraps an optional [`SentimentModel`]. Whatever the model
//! reports is normalized to one of three labels; when the model is missing or
//! fails, the call degrades to `neutral / 0.5 / low` instead of erroring.

use crate::model::{LabelScore, ModelOutput, SentimentModel};
use aho_corasick::AhoCorasick;
use async_trait::async_trait;
use reviewpilot_core::{ConfidenceTier, Error, Result, Sentiment};
use reviewpilot_telemetry::{MetricsCollector, Operation};
use serde::Serialize;
use std::sync::Arc;
use tracing::{debug, warn};

const POSITIVE_MARKERS: [&str; 3] = ["positive", "joy", "love"];
const NEGATIVE_MARKERS: [&str; 3] = ["negative", "sad", "anger"];

const FALLBACK_SCORE: f32 = 0.5;

/// Normalized classifier verdict
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct SentimentAnalysis {
    pub label: Sentiment,
    pub score: f32,
    pub confidence: ConfidenceTier,
}

impl SentimentAnalysis {
    /// The verdict returned whenever no model answer is available
    pub fn fallback() -> Self {
        Self {
            label: Sentiment::Neutral,
            score: FALLBACK_SCORE,
            confidence: ConfidenceTier::Low,
        }
    }

    fn from_label_score(best: &LabelScore) -> Self {
        Self {
            label: normalize_label(&best.label),
            score: best.score.clamp(0.0, 1.0),
            confidence: ConfidenceTier::from_score(best.score),
        }
    }
}

/// Map an arbitrary model label onto the three sentiments
pub fn normalize_label(label: &str) -> Sentiment {
    let label = label.to_lowercase();
    if POSITIVE_MARKERS.iter().any(|m| label.contains(m)) {
        Sentiment::Positive
    } else if NEGATIVE_MARKERS.iter().any(|m| label.contains(m)) {
        Sentiment::Negative
    } else {
        Sentiment::Neutral
    }
}

/// Sentiment classifier over an optional model
#[derive(Clone)]
pub struct SentimentClassifier {
    model: Option<Arc<dyn SentimentModel>>,
    metrics: MetricsCollector,
}

impl SentimentClassifier {
    pub fn new(model: Option<Arc<dyn SentimentModel>>, metrics: MetricsCollector) -> Self {
        Self { model, metrics }
    }

    /// Classifier with no model; every call returns the fallback
    pub fn without_model(metrics: MetricsCollector) -> Self {
        Self::new(None, metrics)
    }

    pub fn has_model(&self) -> bool {
        self.model.is_some()
    }

    /// Classify text. Never fails.
    pub async fn classify(&self, text: &str) -> SentimentAnalysis {
        let timer = self.metrics.start(Operation::SentimentAnalysis);

        let analysis = match self.try_classify(text).await {
            Ok(analysis) => analysis,
            Err(Error::ModelUnavailable(_)) => SentimentAnalysis::fallback(),
            Err(e) => {
                warn!(error = %e, "Sentiment inference failed, using fallback");
                SentimentAnalysis::fallback()
            }
        };

        timer.finish();
        analysis
    }

    async fn try_classify(&self, text: &str) -> Result<SentimentAnalysis> {
        let model = self
            .model
            .as_ref()
            .ok_or_else(|| Error::model_unavailable("sentiment"))?;

        let output = model.predict(text).await?;
        let analysis = match output.best() {
            Some(best) => SentimentAnalysis::from_label_score(best),
            None => SentimentAnalysis::fallback(),
        };

        debug!(
            model = model.name(),
            label = %analysis.label,
            score = analysis.score,
            "Sentiment classified"
        );
        Ok(analysis)
    }
}

/// Lexicon-based sentiment model.
///
/// Counts positive and negative cue words and reports scores for all three
/// classes. Text without cues is confidently neutral.
pub struct LexiconSentimentModel {
    name: String,
    positive: AhoCorasick,
    negative: AhoCorasick,
}

impl LexiconSentimentModel {
    pub fn new() -> Result<Self> {
        Self::with_name("sentiment-lexicon")
    }

    pub fn with_name(name: impl Into<String>) -> Result<Self> {
        let positive = vec![
            "good",
            "great",
            "excellent",
            "love",
            "amazing",
            "wonderful",
            "delicious",
            "fantastic",
            "awesome",
            "best",
            "friendly",
            "perfect",
        ];
        let negative = vec![
            "bad",
            "terrible",
            "awful",
            "hate",
            "horrible",
            "worst",
            "rude",
            "slow",
            "cold",
            "dirty",
            "disappointing",
            "disappointed",
            "poor",
        ];

        let positive = AhoCorasick::builder()
            .ascii_case_insensitive(true)
            .build(positive)
            .map_err(|e| {
                Error::model_unavailable(format!("failed to build positive sentiment matcher: {e}"))
            })?;

        let negative = AhoCorasick::builder()
            .ascii_case_insensitive(true)
            .build(negative)
            .map_err(|e| {
                Error::model_unavailable(format!("failed to build negative sentiment matcher: {e}"))
            })?;

        Ok(Self {
            name: name.into(),
            positive,
            negative,
        })
    }
}

#[async_trait]
impl SentimentModel for LexiconSentimentModel {
    async fn predict(&self, text: &str) -> Result<ModelOutput> {
        let positive_hits = self.positive.find_iter(text).count() as f32;
        let negative_hits = self.negative.find_iter(text).count() as f32;
        let total = positive_hits + negative_hits + 1.0;

        Ok(ModelOutput::MultiScore(vec![
            LabelScore::new("neutral", 1.0 / total),
            LabelScore::new("negative", negative_hits / total),
            LabelScore::new("positive", positive_hits / total),
        ]))
    }

    fn name(&self) -> &str {
        &self.name
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_label_normalization() {
        assert_eq!(normalize_label("POSITIVE"), Sentiment::Positive);
        assert_eq!(normalize_label("joy"), Sentiment::Positive);
        assert_eq!(normalize_label("love"), Sentiment::Positive);
        assert_eq!(normalize_label("Negative"), Sentiment::Negative);
        assert_eq!(normalize_label("sadness"), Sentiment::Negative);
        assert_eq!(normalize_label("anger"), Sentiment::Negative);
        assert_eq!(normalize_label("optimism"), Sentiment::Neutral);
        assert_eq!(normalize_label("LABEL_1"), Sentiment::Neutral);
    }

    #[tokio::test]
    async fn test_fallback_without_model() {
        let metrics = MetricsCollector::new();
        let classifier = SentimentClassifier::without_model(metrics.clone());

        for text in ["Amazing food!", "Terrible service", ""] {
            let result = classifier.classify(text).await;
            assert_eq!(result, SentimentAnalysis::fallback());
            assert_eq!(result.label, Sentiment::Neutral);
            assert_eq!(result.score, 0.5);
            assert_eq!(result.confidence, ConfidenceTier::Low);
        }

        assert_eq!(metrics.stats(Operation::SentimentAnalysis).count, 3);
    }

    #[tokio::test]
    async fn test_lexicon_model_scores() {
        let model = LexiconSentimentModel::new().unwrap();

        let output = model.predict("Great food, amazing staff").await.unwrap();
        let best = output.best().unwrap();
        assert_eq!(best.label, "positive");
        assert!((best.score - 2.0 / 3.0).abs() < 1e-6);

        let output = model.predict("The table was by the window").await.unwrap();
        let best = output.best().unwrap();
        assert_eq!(best.label, "neutral");
        assert_eq!(best.score, 1.0);
    }

    #[tokio::test]
    async fn test_classifier_with_lexicon_model() {
        let model: Arc<dyn SentimentModel> = Arc::new(LexiconSentimentModel::new().unwrap());
        let classifier = SentimentClassifier::new(Some(model), MetricsCollector::new());

        let result = classifier
            .classify("Terrible, awful, rude and slow. Worst visit.")
            .await;
        assert_eq!(result.label, Sentiment::Negative);
        assert_eq!(result.confidence, ConfidenceTier::High);

        let result = classifier.classify("Good burger, great fries").await;
        assert_eq!(result.label, Sentiment::Positive);
        assert_eq!(result.confidence, ConfidenceTier::Medium);

        // One cue ties with the neutral prior, which is listed first
        let result = classifier.classify("Good burger").await;
        assert_eq!(result.label, Sentiment::Neutral);
    }
}
