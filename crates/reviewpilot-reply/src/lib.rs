//! ReviewPilot Reply
//!
//! Suggested replies to customer reviews. A reply is one template from the
//! bucket matching the review's sentiment and rating, with the detected topic
//! filled in. Generation never fails; pipeline errors produce a fallback reply
//! and a reasoning log that says so.

pub mod catalog;
pub mod generator;

pub use catalog::{render, ReplyBucket, ReplyCatalog, DEFAULT_TEMPLATE, TOPIC_PLACEHOLDER};
pub use generator::{ReplyGenerator, ReplySuggestion};
