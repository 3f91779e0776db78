//! ReviewPilot Classifiers
//!
//! Analysis stages that turn raw review text into tags and digests:
//! - Sentiment: pluggable model output normalized to positive/negative/neutral
//! - Topic: keyword scoring over six fixed topics
//! - Summary: model digest with a truncation fallback
//!
//! Every stage is total. Missing or failing models degrade to deterministic
//! fallbacks instead of surfacing errors.

pub mod model;
pub mod registry;
pub mod sentiment;
pub mod summarizer;
pub mod topic;

pub use model::{LabelScore, ModelOutput, SentimentModel, SummarizationModel};
pub use registry::{ModelRegistry, ModelsConfig, SentimentModelKind, SummarizationModelKind};
pub use sentiment::{normalize_label, LexiconSentimentModel, SentimentAnalysis, SentimentClassifier};
pub use summarizer::{fallback_summary, truncate_chars, LeadSentenceModel, Summarizer};
pub use topic::{TopicExtractor, DEFAULT_TOPIC};

/// Prelude for convenient imports
pub mod prelude {
    pub use crate::model::{ModelOutput, SentimentModel, SummarizationModel};
    pub use crate::registry::ModelRegistry;
    pub use crate::sentiment::{SentimentAnalysis, SentimentClassifier};
    pub use crate::summarizer::Summarizer;
    pub use crate::topic::TopicExtractor;
}
