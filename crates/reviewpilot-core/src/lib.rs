//! ReviewPilot Core
//!
//! Core types and error handling shared across the ReviewPilot crates.
//!
//! This crate provides:
//! - Review records and the sentiment/topic/confidence vocabularies
//! - Documents handed to the similarity index
//! - Error types and result handling

pub mod error;
pub mod types;

pub use error::{Error, Result};
pub use types::{ConfidenceTier, IndexDocument, Review, ReviewId, Sentiment, Topic};

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::error::{Error, Result};
    pub use crate::types::{ConfidenceTier, IndexDocument, Review, ReviewId, Sentiment, Topic};
}
