//! ReviewPilot Store
//!
//! Storage seams consumed by the intelligence pipeline:
//! - [`ReviewStore`]: persisted reviews, filtering, pagination and counts
//! - [`CacheStore`]: keyed cache rows with an expiry
//! - [`AnalyticsAggregator`]: group-by counts cached for a fixed TTL
//!
//! In-memory implementations back the service binary and the tests.

pub mod analytics;
pub mod cache;
pub mod reviews;

pub use analytics::{
    AnalyticsAggregator, AnalyticsReport, AnalyticsSnapshot, ANALYTICS_CACHE_KEY, DEFAULT_TTL_SECS,
    MAX_TTL_SECS,
};
pub use cache::{CacheEntry, CacheStore, Clock, InMemoryCacheStore, ManualClock, SystemClock};
pub use reviews::{AggregateCounts, InMemoryReviewStore, ReviewFilters, ReviewPage, ReviewStore};
