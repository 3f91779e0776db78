//! ReviewPilot Service
//!
//! The review intelligence pipeline assembled into one service object:
//! sentiment, topics and summaries, similarity search, reply suggestions,
//! cached analytics, batch analysis and health reporting.

pub mod cli;
pub mod config;
pub mod service;

pub use config::{
    AnalyticsConfig, BatchConfig, FeatureFlags, MetricsConfig, PaginationConfig, RepliesConfig,
    SearchConfig, ServiceConfig,
};
pub use service::{
    BatchSummary, HealthReport, HealthStatus, IngestSummary, ReviewIntelligence, SearchResults,
    ServiceBuilder, SuggestedReply,
};
