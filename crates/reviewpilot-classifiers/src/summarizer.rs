//! Review digests
//!
//! A summarization model gets at most [`MODEL_INPUT_LIMIT`] characters. When
//! there is no model, or it fails, the digest is the text itself if short, or
//! its first [`FALLBACK_LIMIT`] characters plus an ellipsis.

use crate::model::SummarizationModel;
use async_trait::async_trait;
use reviewpilot_core::{Error, Result};
use reviewpilot_telemetry::{MetricsCollector, Operation};
use std::sync::Arc;
use tracing::warn;

/// Characters submitted to a summarization model
pub const MODEL_INPUT_LIMIT: usize = 1000;

/// Characters kept by the truncation fallback
pub const FALLBACK_LIMIT: usize = 100;

const ELLIPSIS: &str = "...";

/// First `max_chars` characters of `text`, respecting char boundaries
pub fn truncate_chars(text: &str, max_chars: usize) -> &str {
    match text.char_indices().nth(max_chars) {
        Some((idx, _)) => &text[..idx],
        None => text,
    }
}

/// Truncation digest used when no model answer is available
pub fn fallback_summary(text: &str) -> String {
    if text.chars().count() <= FALLBACK_LIMIT {
        text.to_string()
    } else {
        format!("{}{}", truncate_chars(text, FALLBACK_LIMIT), ELLIPSIS)
    }
}

/// Summarizer over an optional model
#[derive(Clone)]
pub struct Summarizer {
    model: Option<Arc<dyn SummarizationModel>>,
    metrics: MetricsCollector,
}

impl Summarizer {
    pub fn new(model: Option<Arc<dyn SummarizationModel>>, metrics: MetricsCollector) -> Self {
        Self { model, metrics }
    }

    pub fn without_model(metrics: MetricsCollector) -> Self {
        Self::new(None, metrics)
    }

    pub fn has_model(&self) -> bool {
        self.model.is_some()
    }

    /// Summarize text. Never fails.
    pub async fn summarize(&self, text: &str) -> String {
        let Some(model) = self.model.as_ref() else {
            return fallback_summary(text);
        };

        let timer = self.metrics.start(Operation::Summarization);
        let input = truncate_chars(text, MODEL_INPUT_LIMIT);

        let summary = match model.summarize(input).await {
            Ok(Some(summary)) => summary,
            Ok(None) => fallback_summary(input),
            Err(e) => {
                warn!(model = model.name(), error = %e, "Summarization failed, truncating instead");
                fallback_summary(input)
            }
        };

        timer.finish();
        summary
    }
}

/// Extractive model that keeps the leading sentence.
///
/// Returns nothing for blank input so the caller falls back to truncation.
pub struct LeadSentenceModel {
    name: String,
    max_chars: usize,
}

impl LeadSentenceModel {
    pub fn new() -> Self {
        Self {
            name: "lead-sentence".to_string(),
            max_chars: 150,
        }
    }

    pub fn with_max_chars(mut self, max_chars: usize) -> Self {
        self.max_chars = max_chars;
        self
    }

    fn lead_sentence(text: &str) -> &str {
        let text = text.trim();
        let end = text
            .char_indices()
            .find(|(_, c)| matches!(c, '.' | '!' | '?'))
            .map(|(idx, c)| idx + c.len_utf8())
            .unwrap_or(text.len());
        text[..end].trim()
    }
}

impl Default for LeadSentenceModel {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl SummarizationModel for LeadSentenceModel {
    async fn summarize(&self, text: &str) -> Result<Option<String>> {
        if self.max_chars == 0 {
            return Err(Error::inference("lead-sentence model configured with zero length"));
        }

        let sentence = Self::lead_sentence(text);
        if sentence.is_empty() {
            return Ok(None);
        }

        if sentence.chars().count() <= self.max_chars {
            return Ok(Some(sentence.to_string()));
        }

        let truncated = truncate_chars(sentence, self.max_chars.saturating_sub(ELLIPSIS.len()));
        let cut = truncated.rfind(' ').map_or(truncated, |space| &truncated[..space]);
        Ok(Some(format!("{cut}{ELLIPSIS}")))
    }

    fn name(&self) -> &str {
        &self.name
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_truncate_chars_multibyte() {
        assert_eq!(truncate_chars("héllo", 2), "hé");
        assert_eq!(truncate_chars("abc", 10), "abc");
        assert_eq!(truncate_chars("", 3), "");
    }

    #[test]
    fn test_fallback_summary() {
        let short = "Short and sweet.";
        assert_eq!(fallback_summary(short), short);

        let exact = "x".repeat(100);
        assert_eq!(fallback_summary(&exact), exact);

        let long = "y".repeat(101);
        let summary = fallback_summary(&long);
        assert_eq!(summary, format!("{}...", "y".repeat(100)));
    }

    #[tokio::test]
    async fn test_summarizer_without_model_truncates() {
        let metrics = MetricsCollector::new();
        let summarizer = Summarizer::without_model(metrics);
        let text = "a".repeat(250);
        assert_eq!(summarizer.summarize(&text).await, format!("{}...", "a".repeat(100)));
    }

    #[tokio::test]
    async fn test_lead_sentence_model() {
        let model = LeadSentenceModel::new();
        let summary = model
            .summarize("The pasta was cold. Service was fine otherwise.")
            .await
            .unwrap();
        assert_eq!(summary.as_deref(), Some("The pasta was cold."));

        assert_eq!(model.summarize("   ").await.unwrap(), None);
        assert!(LeadSentenceModel::new()
            .with_max_chars(0)
            .summarize("x")
            .await
            .is_err());
    }

    #[tokio::test]
    async fn test_lead_sentence_model_shortens_long_sentence() {
        let model = LeadSentenceModel::new().with_max_chars(20);
        let summary = model
            .summarize("Absolutely loved every single bite of dinner")
            .await
            .unwrap()
            .unwrap();
        assert!(summary.ends_with("..."));
        assert!(summary.chars().count() <= 20);
    }

    #[tokio::test]
    async fn test_summarizer_records_latency_with_model() {
        let metrics = MetricsCollector::new();
        let summarizer = Summarizer::new(Some(Arc::new(LeadSentenceModel::new())), metrics.clone());

        let summary = summarizer.summarize("Loved it! Will come back.").await;
        assert_eq!(summary, "Loved it!");
        assert_eq!(metrics.stats(Operation::Summarization).count, 1);
    }
}
