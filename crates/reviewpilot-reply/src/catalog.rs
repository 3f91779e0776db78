//! Reply template catalog
//!
//! Five buckets keyed by sentiment and rating range. Every template carries a
//! `{topic}` placeholder that is filled with the detected topic.

use reviewpilot_core::{Error, Result, Sentiment, Topic};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;

/// Placeholder replaced by the topic name
pub const TOPIC_PLACEHOLDER: &str = "{topic}";

/// Used when a bucket has nothing to offer
pub const DEFAULT_TEMPLATE: &str =
    "Thank you for your feedback about our {topic}! We appreciate you taking the time to share your experience with us.";

/// Template bucket chosen from sentiment and rating
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReplyBucket {
    /// Positive, rating 4 or 5
    PositiveHigh,
    /// Positive, rating below 4
    PositiveLow,
    /// Negative, rating 1 or 2
    NegativeSevere,
    /// Negative, rating above 2
    NegativeMild,
    /// Neutral, any rating
    Neutral,
}

impl ReplyBucket {
    pub const ALL: [ReplyBucket; 5] = [
        ReplyBucket::PositiveHigh,
        ReplyBucket::PositiveLow,
        ReplyBucket::NegativeSevere,
        ReplyBucket::NegativeMild,
        ReplyBucket::Neutral,
    ];

    pub fn select(sentiment: Sentiment, rating: u8) -> Self {
        match sentiment {
            Sentiment::Positive if rating >= 4 => Self::PositiveHigh,
            Sentiment::Positive => Self::PositiveLow,
            Sentiment::Negative if rating <= 2 => Self::NegativeSevere,
            Sentiment::Negative => Self::NegativeMild,
            Sentiment::Neutral => Self::Neutral,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::PositiveHigh => "positive_high",
            Self::PositiveLow => "positive_low",
            Self::NegativeSevere => "negative_severe",
            Self::NegativeMild => "negative_mild",
            Self::Neutral => "neutral",
        }
    }
}

impl fmt::Display for ReplyBucket {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Fill the topic placeholder of `template`
pub fn render(template: &str, topic: Topic) -> String {
    template.replace(TOPIC_PLACEHOLDER, topic.as_str())
}

/// Immutable set of reply templates per bucket
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReplyCatalog {
    pub positive_high: Vec<String>,
    pub positive_low: Vec<String>,
    pub negative_severe: Vec<String>,
    pub negative_mild: Vec<String>,
    pub neutral: Vec<String>,
}

impl ReplyCatalog {
    /// The catalog shipped with the service
    pub fn builtin() -> Self {
        fn owned(templates: &[&str]) -> Vec<String> {
            templates.iter().map(|t| t.to_string()).collect()
        }

        Self {
            positive_high: owned(&[
                "Thank you for your wonderful feedback! We're thrilled that you enjoyed our {topic} and look forward to serving you again!",
                "We're delighted to hear about your positive experience with our {topic}! Thank you for taking the time to share your feedback.",
                "Thank you for your amazing review! We're so happy that you loved our {topic} and we can't wait to welcome you back!",
                "We truly appreciate your kind words about our {topic}! Thank you for choosing us and we look forward to serving you again soon!",
            ]),
            positive_low: owned(&[
                "Thank you for your positive feedback about our {topic}! We appreciate your support and hope to see you again soon!",
                "We're glad you had a good experience with our {topic}! Thank you for sharing your thoughts with us.",
                "Thank you for your kind words about our {topic}! We value your feedback and look forward to serving you again.",
            ]),
            negative_severe: owned(&[
                "Thank you for bringing this to our attention. We sincerely apologize for not meeting your expectations with our {topic}. Please contact us directly so we can address your concerns.",
                "We're sorry to hear about your disappointing experience with our {topic}. We take all feedback seriously and would like to make this right. Please reach out to us directly.",
                "Thank you for your honest feedback about our {topic}. We apologize for falling short of your expectations and would appreciate the opportunity to discuss this with you directly.",
                "We're disappointed to hear about your experience with our {topic}. Your feedback is important to us, and we'd like to address your concerns personally. Please contact us.",
            ]),
            negative_mild: owned(&[
                "Thank you for your feedback about our {topic}. We understand your concerns and would like to discuss this with you directly to make things right.",
                "We appreciate you sharing your experience with our {topic}. We'd like to address your concerns and ensure you have a better experience next time.",
            ]),
            neutral: owned(&[
                "Thank you for your feedback about our {topic}! We appreciate you taking the time to share your experience and will use your comments to continue improving our service.",
                "We value your input about our {topic}! Thank you for sharing your experience with us, and we'll use your feedback to enhance our service.",
                "Thank you for taking the time to review our {topic}! We appreciate your feedback and will continue working to provide the best possible experience.",
                "We're grateful for your honest feedback about our {topic}! Your input helps us improve, and we appreciate you sharing your experience with us.",
            ]),
        }
    }

    /// Parse and validate a YAML catalog
    pub fn from_yaml(yaml: &str) -> Result<Self> {
        let catalog: Self = serde_yaml::from_str(yaml)
            .map_err(|e| Error::template(format!("invalid reply catalog: {e}")))?;
        catalog.validate()?;
        Ok(catalog)
    }

    /// Load and validate a YAML catalog file
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let content = std::fs::read_to_string(path.as_ref())?;
        Self::from_yaml(&content)
    }

    /// Every bucket must be non-empty and every template must use the placeholder
    pub fn validate(&self) -> Result<()> {
        for bucket in ReplyBucket::ALL {
            let templates = self.templates(bucket);
            if templates.is_empty() {
                return Err(Error::template(format!("bucket '{bucket}' has no templates")));
            }
            if let Some(pos) = templates.iter().position(|t| !t.contains(TOPIC_PLACEHOLDER)) {
                return Err(Error::template(format!(
                    "template {} in bucket '{bucket}' lacks the {TOPIC_PLACEHOLDER} placeholder",
                    pos + 1
                )));
            }
        }
        Ok(())
    }

    pub fn templates(&self, bucket: ReplyBucket) -> &[String] {
        match bucket {
            ReplyBucket::PositiveHigh => &self.positive_high,
            ReplyBucket::PositiveLow => &self.positive_low,
            ReplyBucket::NegativeSevere => &self.negative_severe,
            ReplyBucket::NegativeMild => &self.negative_mild,
            ReplyBucket::Neutral => &self.neutral,
        }
    }

    /// Replace one bucket without validation
    pub fn with_templates(mut self, bucket: ReplyBucket, templates: Vec<String>) -> Self {
        let slot = match bucket {
            ReplyBucket::PositiveHigh => &mut self.positive_high,
            ReplyBucket::PositiveLow => &mut self.positive_low,
            ReplyBucket::NegativeSevere => &mut self.negative_severe,
            ReplyBucket::NegativeMild => &mut self.negative_mild,
            ReplyBucket::Neutral => &mut self.neutral,
        };
        *slot = templates;
        self
    }
}

impl Default for ReplyCatalog {
    fn default() -> Self {
        Self::builtin()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bucket_selection() {
        for rating in 1..=5 {
            let expected = if rating >= 4 {
                ReplyBucket::PositiveHigh
            } else {
                ReplyBucket::PositiveLow
            };
            assert_eq!(ReplyBucket::select(Sentiment::Positive, rating), expected);

            let expected = if rating <= 2 {
                ReplyBucket::NegativeSevere
            } else {
                ReplyBucket::NegativeMild
            };
            assert_eq!(ReplyBucket::select(Sentiment::Negative, rating), expected);

            assert_eq!(ReplyBucket::select(Sentiment::Neutral, rating), ReplyBucket::Neutral);
        }
    }

    #[test]
    fn test_builtin_catalog_shape() {
        let catalog = ReplyCatalog::builtin();
        catalog.validate().unwrap();
        assert_eq!(catalog.templates(ReplyBucket::PositiveHigh).len(), 4);
        assert_eq!(catalog.templates(ReplyBucket::PositiveLow).len(), 3);
        assert_eq!(catalog.templates(ReplyBucket::NegativeSevere).len(), 4);
        assert_eq!(catalog.templates(ReplyBucket::NegativeMild).len(), 2);
        assert_eq!(catalog.templates(ReplyBucket::Neutral).len(), 4);
    }

    #[test]
    fn test_render() {
        assert_eq!(render("Loved the {topic}!", Topic::Atmosphere), "Loved the atmosphere!");
        assert!(render(DEFAULT_TEMPLATE, Topic::Price).contains("price"));
    }

    #[test]
    fn test_yaml_catalog_validation() {
        let valid = r#"
positive_high: ["Great {topic}!"]
positive_low: ["Good {topic}."]
negative_severe: ["Sorry about the {topic}."]
negative_mild: ["We hear you on {topic}."]
neutral: ["Thanks for the {topic} notes."]
"#;
        let catalog = ReplyCatalog::from_yaml(valid).unwrap();
        assert_eq!(catalog.templates(ReplyBucket::Neutral), ["Thanks for the {topic} notes."]);

        let missing_placeholder = valid.replace("Good {topic}.", "Good.");
        let err = ReplyCatalog::from_yaml(&missing_placeholder).unwrap_err();
        assert!(matches!(err, Error::Template(_)));

        let empty_bucket = valid.replace(r#"["We hear you on {topic}."]"#, "[]");
        assert!(ReplyCatalog::from_yaml(&empty_bucket).is_err());

        assert!(ReplyCatalog::from_yaml("positive_high: 3").is_err());
    }

    #[test]
    fn test_with_templates_skips_validation() {
        let catalog = ReplyCatalog::builtin().with_templates(ReplyBucket::Neutral, Vec::new());
        assert!(catalog.templates(ReplyBucket::Neutral).is_empty());
        assert!(catalog.validate().is_err());
    }
}
