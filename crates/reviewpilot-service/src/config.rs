//! Service configuration

use reviewpilot_classifiers::ModelsConfig;
use reviewpilot_core::{Error, Result};
use reviewpilot_store::MAX_TTL_SECS;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Service configuration, normally read from YAML
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ServiceConfig {
    /// Which pluggable models to load
    #[serde(default)]
    pub models: ModelsConfig,

    #[serde(default)]
    pub search: SearchConfig,

    #[serde(default)]
    pub analytics: AnalyticsConfig,

    #[serde(default)]
    pub metrics: MetricsConfig,

    #[serde(default)]
    pub replies: RepliesConfig,

    #[serde(default)]
    pub batch: BatchConfig,

    #[serde(default)]
    pub pagination: PaginationConfig,

    #[serde(default)]
    pub features: FeatureFlags,
}

impl ServiceConfig {
    /// Load from `path`; a missing file yields the defaults
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        if !path.exists() {
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(path)?;
        Self::from_yaml(&content)
    }

    pub fn from_yaml(yaml: &str) -> Result<Self> {
        let config: Self = serde_yaml::from_str(yaml)
            .map_err(|e| Error::config(format!("invalid service configuration: {e}")))?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.search.max_features == 0 {
            return Err(Error::config("search.max_features must be at least 1"));
        }
        if self.search.max_k == 0 {
            return Err(Error::config("search.max_k must be at least 1"));
        }
        if self.batch.concurrency == 0 {
            return Err(Error::config("batch.concurrency must be at least 1"));
        }
        if !(1..=MAX_TTL_SECS).contains(&self.analytics.ttl_secs) {
            return Err(Error::config(format!(
                "analytics.ttl_secs must be between 1 and {MAX_TTL_SECS}"
            )));
        }
        if self.metrics.window == 0 {
            return Err(Error::config("metrics.window must be at least 1"));
        }
        if self.pagination.default_page_size == 0
            || self.pagination.default_page_size > self.pagination.max_page_size
        {
            return Err(Error::config(
                "pagination.default_page_size must be between 1 and pagination.max_page_size",
            ));
        }
        Ok(())
    }
}

/// Similarity search settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchConfig {
    /// Vocabulary cap of the TF-IDF index
    #[serde(default = "default_max_features")]
    pub max_features: usize,

    /// Results returned when the caller gives no `k`
    #[serde(default = "default_k")]
    pub default_k: usize,

    /// Upper bound for a requested `k`
    #[serde(default = "default_k")]
    pub max_k: usize,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            max_features: default_max_features(),
            default_k: default_k(),
            max_k: default_k(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalyticsConfig {
    #[serde(default = "default_ttl_secs")]
    pub ttl_secs: u64,
}

impl Default for AnalyticsConfig {
    fn default() -> Self {
        Self {
            ttl_secs: default_ttl_secs(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetricsConfig {
    /// Latency samples kept per operation
    #[serde(default = "default_window")]
    pub window: usize,
}

impl Default for MetricsConfig {
    fn default() -> Self {
        Self {
            window: default_window(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RepliesConfig {
    /// YAML catalog replacing the built-in templates
    #[serde(default)]
    pub catalog: Option<PathBuf>,

    /// Seed for template selection; unset draws from entropy
    #[serde(default)]
    pub seed: Option<u64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BatchConfig {
    /// Reviews analyzed concurrently during batch processing
    #[serde(default = "default_concurrency")]
    pub concurrency: usize,
}

impl Default for BatchConfig {
    fn default() -> Self {
        Self {
            concurrency: default_concurrency(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PaginationConfig {
    #[serde(default = "default_page_size")]
    pub default_page_size: usize,

    #[serde(default = "default_max_page_size")]
    pub max_page_size: usize,
}

impl Default for PaginationConfig {
    fn default() -> Self {
        Self {
            default_page_size: default_page_size(),
            max_page_size: default_max_page_size(),
        }
    }
}

/// Switches for the outer service calls
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeatureFlags {
    /// Master switch for model-driven work: batch tagging and the index
    /// refresh after ingest
    #[serde(default = "default_true")]
    pub ai_enabled: bool,

    #[serde(default = "default_true")]
    pub enable_search: bool,

    #[serde(default = "default_true")]
    pub enable_analytics: bool,

    #[serde(default = "default_true")]
    pub enable_ai_replies: bool,

    #[serde(default = "default_true")]
    pub enable_batch_processing: bool,
}

impl Default for FeatureFlags {
    fn default() -> Self {
        Self {
            ai_enabled: true,
            enable_search: true,
            enable_analytics: true,
            enable_ai_replies: true,
            enable_batch_processing: true,
        }
    }
}

fn default_max_features() -> usize {
    reviewpilot_search::DEFAULT_MAX_FEATURES
}

fn default_k() -> usize {
    20
}

fn default_ttl_secs() -> u64 {
    reviewpilot_store::DEFAULT_TTL_SECS
}

fn default_window() -> usize {
    reviewpilot_telemetry::DEFAULT_WINDOW
}

fn default_concurrency() -> usize {
    4
}

fn default_page_size() -> usize {
    10
}

fn default_max_page_size() -> usize {
    100
}

fn default_true() -> bool {
    true
}
