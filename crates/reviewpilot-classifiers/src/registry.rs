//! One-time model loading
//!
//! Models are loaded once, before the pipeline serves requests. A model that
//! fails to load stays absent for the rest of the process; its stage runs on
//! the fallback path instead of retrying.

use crate::model::{SentimentModel, SummarizationModel};
use crate::sentiment::LexiconSentimentModel;
use crate::summarizer::LeadSentenceModel;
use reviewpilot_core::Result;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::sync::Arc;
use tracing::{info, warn};

/// Which sentiment model to load
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SentimentModelKind {
    #[default]
    Lexicon,
    None,
}

/// Which summarization model to load
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SummarizationModelKind {
    #[default]
    LeadSentence,
    None,
}

/// Model selection
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ModelsConfig {
    #[serde(default)]
    pub sentiment: SentimentModelKind,

    #[serde(default)]
    pub summarization: SummarizationModelKind,
}

impl ModelsConfig {
    /// Configuration that loads nothing
    pub fn disabled() -> Self {
        Self {
            sentiment: SentimentModelKind::None,
            summarization: SummarizationModelKind::None,
        }
    }
}

/// Loaded model handles shared by the pipeline stages
#[derive(Clone, Default)]
pub struct ModelRegistry {
    sentiment: Option<Arc<dyn SentimentModel>>,
    summarization: Option<Arc<dyn SummarizationModel>>,
}

impl ModelRegistry {
    /// Registry with no models
    pub fn empty() -> Self {
        Self::default()
    }

    /// Load every configured model. Load failures are logged, never returned.
    pub fn load(config: &ModelsConfig) -> Self {
        info!("Loading models");

        let sentiment = match config.sentiment {
            SentimentModelKind::Lexicon => {
                load_model("sentiment", || {
                    LexiconSentimentModel::new().map(|m| Arc::new(m) as Arc<dyn SentimentModel>)
                })
            }
            SentimentModelKind::None => None,
        };

        let summarization = match config.summarization {
            SummarizationModelKind::LeadSentence => load_model("summarization", || {
                Ok(Arc::new(LeadSentenceModel::new()) as Arc<dyn SummarizationModel>)
            }),
            SummarizationModelKind::None => None,
        };

        let registry = Self {
            sentiment,
            summarization,
        };

        let models = registry.models_loaded();
        let loaded = models.values().filter(|v| **v).count();
        info!("Model registry initialized with {}/{} models", loaded, models.len());
        registry
    }

    /// Replace the sentiment model
    pub fn with_sentiment(mut self, model: Arc<dyn SentimentModel>) -> Self {
        self.sentiment = Some(model);
        self
    }

    /// Replace the summarization model
    pub fn with_summarization(mut self, model: Arc<dyn SummarizationModel>) -> Self {
        self.summarization = Some(model);
        self
    }

    pub fn sentiment(&self) -> Option<Arc<dyn SentimentModel>> {
        self.sentiment.clone()
    }

    pub fn summarization(&self) -> Option<Arc<dyn SummarizationModel>> {
        self.summarization.clone()
    }

    /// Load state per model name
    pub fn models_loaded(&self) -> BTreeMap<String, bool> {
        BTreeMap::from([
            ("sentiment".to_string(), self.sentiment.is_some()),
            ("summarization".to_string(), self.summarization.is_some()),
        ])
    }

    /// Whether any model is available
    pub fn any_loaded(&self) -> bool {
        self.sentiment.is_some() || self.summarization.is_some()
    }
}

fn load_model<T: ?Sized>(name: &str, loader: impl FnOnce() -> Result<Arc<T>>) -> Option<Arc<T>> {
    match loader() {
        Ok(model) => {
            info!("✓ Loaded model: {}", name);
            Some(model)
        }
        Err(e) => {
            warn!("✗ Failed to load model {}: {}", name, e);
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use reviewpilot_core::Error;

    #[test]
    fn test_load_default_config() {
        let registry = ModelRegistry::load(&ModelsConfig::default());
        assert!(registry.sentiment().is_some());
        assert!(registry.summarization().is_some());
        assert!(registry.any_loaded());
    }

    #[test]
    fn test_load_disabled_config() {
        let registry = ModelRegistry::load(&ModelsConfig::disabled());
        assert!(!registry.any_loaded());
        assert_eq!(
            registry.models_loaded(),
            BTreeMap::from([
                ("sentiment".to_string(), false),
                ("summarization".to_string(), false),
            ])
        );
    }

    #[test]
    fn test_failed_load_is_absent() {
        let model: Option<Arc<dyn SentimentModel>> =
            load_model("broken", || Err(Error::model_unavailable("weights missing")));
        assert!(model.is_none());
    }

    #[test]
    fn test_models_config_yaml() {
        let yaml = r#"
sentiment: none
summarization: lead-sentence
"#;
        let config: ModelsConfig = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(config.sentiment, SentimentModelKind::None);
        assert_eq!(config.summarization, SummarizationModelKind::LeadSentence);

        let config: ModelsConfig = serde_yaml::from_str("{}").unwrap();
        assert_eq!(config, ModelsConfig::default());
    }
}
