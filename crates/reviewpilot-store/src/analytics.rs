//! Cached corpus analytics
//!
//! The aggregator reads one cache row under a fixed key. A valid row is
//! returned verbatim; a missing or stale one triggers a recount from the
//! review store, which is written back with a fresh expiry.

use crate::cache::{CacheEntry, CacheStore, Clock, SystemClock};
use crate::reviews::{AggregateCounts, ReviewStore};
use chrono::{DateTime, Duration, Utc};
use reviewpilot_core::Result;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Cache key of the analytics row
pub const ANALYTICS_CACHE_KEY: &str = "analytics_data";

/// Lifetime of a computed snapshot
pub const DEFAULT_TTL_SECS: u64 = 300;

/// Longest accepted snapshot lifetime, ten years
pub const MAX_TTL_SECS: u64 = 10 * 365 * 24 * 60 * 60;

/// Corpus-wide counts.
///
/// `total_reviews` belongs to the cached snapshot like every other field, so
/// it reports the row count at computation time rather than a live count.
/// Reviews ingested within the TTL show up after the next recompute.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AnalyticsReport {
    pub sentiment_counts: BTreeMap<String, u64>,
    pub topic_counts: BTreeMap<String, u64>,
    pub location_counts: BTreeMap<String, u64>,
    /// Keyed by the rating rendered as a string
    pub rating_distribution: BTreeMap<String, u64>,
    pub total_reviews: u64,
}

impl From<AggregateCounts> for AnalyticsReport {
    fn from(counts: AggregateCounts) -> Self {
        Self {
            sentiment_counts: counts
                .sentiment
                .into_iter()
                .map(|(k, v)| (k.to_string(), v))
                .collect(),
            topic_counts: counts
                .topic
                .into_iter()
                .map(|(k, v)| (k.to_string(), v))
                .collect(),
            location_counts: counts.location,
            rating_distribution: counts
                .rating
                .into_iter()
                .map(|(k, v)| (k.to_string(), v))
                .collect(),
            total_reviews: counts.total,
        }
    }
}

/// A report together with its cache lifetime
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AnalyticsSnapshot {
    pub payload: AnalyticsReport,
    pub computed_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
}

/// Computes and caches [`AnalyticsReport`]s
#[derive(Clone)]
pub struct AnalyticsAggregator {
    reviews: Arc<dyn ReviewStore>,
    cache: Arc<dyn CacheStore>,
    clock: Arc<dyn Clock>,
    ttl: Duration,
}

impl AnalyticsAggregator {
    pub fn new(reviews: Arc<dyn ReviewStore>, cache: Arc<dyn CacheStore>) -> Self {
        Self {
            reviews,
            cache,
            clock: Arc::new(SystemClock),
            ttl: Duration::seconds(DEFAULT_TTL_SECS as i64),
        }
    }

    /// Lifetime of computed snapshots, capped at [`MAX_TTL_SECS`]
    pub fn with_ttl_secs(mut self, ttl_secs: u64) -> Self {
        let secs = ttl_secs.min(MAX_TTL_SECS) as i64;
        self.ttl = Duration::try_seconds(secs).unwrap_or(self.ttl);
        self
    }

    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    /// Current analytics, from cache while it is valid.
    ///
    /// Cache failures are logged and treated as a miss. Only a failing review
    /// store surfaces as an error.
    pub async fn get_analytics(&self) -> Result<AnalyticsReport> {
        Ok(self.snapshot().await?.payload)
    }

    /// Like [`get_analytics`](Self::get_analytics) but with the cache lifetime
    pub async fn snapshot(&self) -> Result<AnalyticsSnapshot> {
        let now = self.clock.now();

        if let Some(snapshot) = self.cached(now).await {
            debug!(expires_at = %snapshot.expires_at, "Analytics cache hit");
            return Ok(snapshot);
        }

        debug!("Analytics cache miss, recomputing");
        let payload = AnalyticsReport::from(self.reviews.raw_aggregate_counts().await?);
        let entry = CacheEntry::new(serde_json::to_string(&payload)?, now, self.ttl);
        let snapshot = AnalyticsSnapshot {
            payload,
            computed_at: entry.computed_at,
            expires_at: entry.expires_at,
        };

        if let Err(e) = self.cache.put(ANALYTICS_CACHE_KEY, entry).await {
            warn!(error = %e, "Failed to cache analytics");
        }

        Ok(snapshot)
    }

    async fn cached(&self, now: DateTime<Utc>) -> Option<AnalyticsSnapshot> {
        let entry = match self.cache.get(ANALYTICS_CACHE_KEY).await {
            Ok(Some(entry)) if entry.is_valid_at(now) => entry,
            Ok(_) => return None,
            Err(e) => {
                warn!(error = %e, "Analytics cache read failed");
                return None;
            }
        };

        match serde_json::from_str(&entry.payload) {
            Ok(payload) => Some(AnalyticsSnapshot {
                payload,
                computed_at: entry.computed_at,
                expires_at: entry.expires_at,
            }),
            Err(e) => {
                warn!(error = %e, "Discarding unreadable analytics cache row");
                None
            }
        }
    }

    /// Delete expired cache rows. Housekeeping only; expiry is checked on read.
    pub async fn sweep_expired(&self) -> usize {
        match self.cache.sweep_expired(self.clock.now()).await {
            Ok(removed) => {
                if removed > 0 {
                    info!(removed, "Swept expired analytics cache rows");
                }
                removed
            }
            Err(e) => {
                warn!(error = %e, "Analytics cache sweep failed");
                0
            }
        }
    }
}
