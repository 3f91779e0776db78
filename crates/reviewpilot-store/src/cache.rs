//! Expiring cache rows and the clock that judges them

use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use parking_lot::Mutex;
use reviewpilot_core::Result;
use std::collections::HashMap;

/// Source of the current time
pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;
}

/// Wall clock
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// Clock that only moves when told to
#[derive(Debug)]
pub struct ManualClock {
    now: Mutex<DateTime<Utc>>,
}

impl ManualClock {
    pub fn new(start: DateTime<Utc>) -> Self {
        Self {
            now: Mutex::new(start),
        }
    }

    pub fn advance(&self, by: Duration) {
        *self.now.lock() += by;
    }
}

impl Clock for ManualClock {
    fn now(&self) -> DateTime<Utc> {
        *self.now.lock()
    }
}

/// A cached payload and its lifetime
#[derive(Debug, Clone, PartialEq)]
pub struct CacheEntry {
    pub payload: String,
    pub computed_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
}

impl CacheEntry {
    /// Expiry saturates at the latest representable instant
    pub fn new(payload: String, computed_at: DateTime<Utc>, ttl: Duration) -> Self {
        Self {
            payload,
            computed_at,
            expires_at: computed_at
                .checked_add_signed(ttl)
                .unwrap_or(DateTime::<Utc>::MAX_UTC),
        }
    }

    /// Valid strictly before `expires_at`
    pub fn is_valid_at(&self, now: DateTime<Utc>) -> bool {
        now < self.expires_at
    }
}

/// Keyed store of cache rows
#[async_trait]
pub trait CacheStore: Send + Sync {
    async fn get(&self, key: &str) -> Result<Option<CacheEntry>>;

    /// Insert or overwrite the row for `key`
    async fn put(&self, key: &str, entry: CacheEntry) -> Result<()>;

    /// Delete rows no longer valid at `now`; returns how many went
    async fn sweep_expired(&self, now: DateTime<Utc>) -> Result<usize>;
}

/// Cache rows held in process memory
#[derive(Default)]
pub struct InMemoryCacheStore {
    rows: Mutex<HashMap<String, CacheEntry>>,
}

impl InMemoryCacheStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.rows.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[async_trait]
impl CacheStore for InMemoryCacheStore {
    async fn get(&self, key: &str) -> Result<Option<CacheEntry>> {
        Ok(self.rows.lock().get(key).cloned())
    }

    async fn put(&self, key: &str, entry: CacheEntry) -> Result<()> {
        self.rows.lock().insert(key.to_string(), entry);
        Ok(())
    }

    async fn sweep_expired(&self, now: DateTime<Utc>) -> Result<usize> {
        let mut rows = self.rows.lock();
        let before = rows.len();
        rows.retain(|_, entry| entry.is_valid_at(now));
        Ok(before - rows.len())
    }
}
