//! Core types for ReviewPilot

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Review identifier as issued by the ingesting system
pub type ReviewId = i64;

/// Coarse sentiment label attached to a review
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Sentiment {
    Positive,
    Negative,
    Neutral,
}

impl Sentiment {
    pub const ALL: [Sentiment; 3] = [Sentiment::Positive, Sentiment::Negative, Sentiment::Neutral];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Positive => "positive",
            Self::Negative => "negative",
            Self::Neutral => "neutral",
        }
    }
}

impl fmt::Display for Sentiment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Sentiment {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "positive" => Ok(Self::Positive),
            "negative" => Ok(Self::Negative),
            "neutral" => Ok(Self::Neutral),
            other => Err(Error::validation(format!("unknown sentiment '{other}'"))),
        }
    }
}

/// Review topic. Declaration order is the tie-break order for topic scoring.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Topic {
    Food,
    Service,
    Atmosphere,
    Price,
    Location,
    Cleanliness,
}

impl Topic {
    /// All topics in scoring order
    pub const ALL: [Topic; 6] = [
        Topic::Food,
        Topic::Service,
        Topic::Atmosphere,
        Topic::Price,
        Topic::Location,
        Topic::Cleanliness,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Food => "food",
            Self::Service => "service",
            Self::Atmosphere => "atmosphere",
            Self::Price => "price",
            Self::Location => "location",
            Self::Cleanliness => "cleanliness",
        }
    }
}

impl fmt::Display for Topic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Topic {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Topic::ALL
            .into_iter()
            .find(|t| t.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| Error::validation(format!("unknown topic '{s}'")))
    }
}

/// Confidence bucket derived from a classifier score
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ConfidenceTier {
    High,
    Medium,
    Low,
}

impl ConfidenceTier {
    /// `> 0.8` is high, `> 0.6` is medium, anything else is low
    pub fn from_score(score: f32) -> Self {
        if score > 0.8 {
            Self::High
        } else if score > 0.6 {
            Self::Medium
        } else {
            Self::Low
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::High => "high",
            Self::Medium => "medium",
            Self::Low => "low",
        }
    }
}

/// A stored customer review
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Review {
    pub id: ReviewId,
    pub location: String,
    pub rating: u8,
    pub text: String,
    pub date: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sentiment: Option<Sentiment>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub topic: Option<Topic>,
}

impl Review {
    /// Create an unanalyzed review
    pub fn new(
        id: ReviewId,
        location: impl Into<String>,
        rating: u8,
        text: impl Into<String>,
        date: impl Into<String>,
    ) -> Self {
        Self {
            id,
            location: location.into(),
            rating,
            text: text.into(),
            date: date.into(),
            sentiment: None,
            topic: None,
        }
    }

    pub fn with_analysis(mut self, sentiment: Sentiment, topic: Topic) -> Self {
        self.sentiment = Some(sentiment);
        self.topic = Some(topic);
        self
    }

    /// Whether the analysis pipeline still has to tag this review
    pub fn needs_analysis(&self) -> bool {
        self.sentiment.is_none() || self.topic.is_none()
    }

    /// Check the invariants a review must satisfy before it is stored
    pub fn validate(&self) -> Result<()> {
        if !(1..=5).contains(&self.rating) {
            return Err(Error::validation(format!(
                "review {} has rating {} outside 1..=5",
                self.id, self.rating
            )));
        }
        if self.location.trim().is_empty() {
            return Err(Error::validation(format!("review {} has no location", self.id)));
        }
        Ok(())
    }
}

/// A document fed to the similarity index
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IndexDocument {
    pub id: ReviewId,
    pub text: String,
}

impl IndexDocument {
    pub fn new(id: ReviewId, text: impl Into<String>) -> Self {
        Self {
            id,
            text: text.into(),
        }
    }
}

impl From<&Review> for IndexDocument {
    fn from(review: &Review) -> Self {
        Self::new(review.id, review.text.clone())
    }
}
