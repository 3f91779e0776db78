//! Pluggable model traits and their normalized outputs

use async_trait::async_trait;
use reviewpilot_core::Result;

/// One label with its score as reported by a model
#[derive(Debug, Clone, PartialEq)]
pub struct LabelScore {
    pub label: String,
    pub score: f32,
}

impl LabelScore {
    pub fn new(label: impl Into<String>, score: f32) -> Self {
        Self {
            label: label.into(),
            score,
        }
    }
}

/// Raw output of a sentiment model.
///
/// Some models report every class, some only the winner. Both shapes are
/// folded into a single winner by [`ModelOutput::best`] before any business
/// logic looks at them.
#[derive(Debug, Clone, PartialEq)]
pub enum ModelOutput {
    /// All class scores
    MultiScore(Vec<LabelScore>),

    /// Only the winning class
    SingleScore(LabelScore),

    /// Model produced nothing usable
    Empty,
}

impl ModelOutput {
    /// The winning label. Ties go to the earliest entry.
    pub fn best(&self) -> Option<&LabelScore> {
        match self {
            Self::MultiScore(scores) => scores.iter().fold(None, |best, candidate| match best {
                Some(current) if current.score >= candidate.score => Some(current),
                _ => Some(candidate),
            }),
            Self::SingleScore(score) => Some(score),
            Self::Empty => None,
        }
    }
}

/// Sentiment model backing the classifier
#[async_trait]
pub trait SentimentModel: Send + Sync {
    /// Score the given text
    async fn predict(&self, text: &str) -> Result<ModelOutput>;

    /// Get the model name
    fn name(&self) -> &str;
}

/// Summarization model backing the summarizer
#[async_trait]
pub trait SummarizationModel: Send + Sync {
    /// Summarize the given text. `Ok(None)` means the model had nothing to say.
    async fn summarize(&self, text: &str) -> Result<Option<String>>;

    /// Get the model name
    fn name(&self) -> &str;
}
