//! Metrics collection and reporting

use parking_lot::RwLock;
use serde::Serialize;
use std::collections::{BTreeMap, VecDeque};
use std::sync::Arc;
use std::time::Instant;
use tracing::debug;

/// Samples retained per operation unless configured otherwise
pub const DEFAULT_WINDOW: usize = 1000;

const HISTOGRAM_NAME: &str = "reviewpilot_operation_seconds";

/// Pipeline operations whose latency is tracked
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Operation {
    SentimentAnalysis,
    Summarization,
    ReplyGeneration,
    Search,
    IndexRebuild,
}

impl Operation {
    pub const ALL: [Operation; 5] = [
        Operation::SentimentAnalysis,
        Operation::Summarization,
        Operation::ReplyGeneration,
        Operation::Search,
        Operation::IndexRebuild,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::SentimentAnalysis => "sentiment_analysis",
            Self::Summarization => "summarization",
            Self::ReplyGeneration => "reply_generation",
            Self::Search => "search",
            Self::IndexRebuild => "index_rebuild",
        }
    }
}

/// Aggregate latency figures for one operation
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
pub struct OperationStats {
    pub avg_secs: f64,
    pub min_secs: f64,
    pub max_secs: f64,
    /// Samples currently in the window
    pub count: usize,
    /// Samples recorded over the collector's lifetime
    pub recorded: u64,
}

/// Metrics collector for pipeline latencies.
///
/// Each operation keeps a ring buffer of its most recent `window` samples so a
/// long-running process never grows without bound. Cloning shares the state.
#[derive(Clone)]
pub struct MetricsCollector {
    inner: Arc<RwLock<MetricsInner>>,
}

struct MetricsInner {
    window: usize,
    samples: BTreeMap<Operation, VecDeque<f64>>,
    recorded: BTreeMap<Operation, u64>,
}

impl MetricsCollector {
    /// Create a new metrics collector
    pub fn new() -> Self {
        Self::with_window(DEFAULT_WINDOW)
    }

    /// Create a collector keeping at most `window` samples per operation
    pub fn with_window(window: usize) -> Self {
        Self {
            inner: Arc::new(RwLock::new(MetricsInner {
                window: window.max(1),
                samples: BTreeMap::new(),
                recorded: BTreeMap::new(),
            })),
        }
    }

    /// Record a completed operation
    pub fn record(&self, operation: Operation, duration_secs: f64) {
        ::metrics::histogram!(HISTOGRAM_NAME, "operation" => operation.as_str()).record(duration_secs);

        let mut inner = self.inner.write();
        let window = inner.window;

        let samples = inner.samples.entry(operation).or_default();
        samples.push_back(duration_secs);
        if samples.len() > window {
            samples.pop_front();
        }

        *inner.recorded.entry(operation).or_insert(0) += 1;
    }

    /// Start timing an operation; the sample is recorded by [`Timer::finish`]
    pub fn start(&self, operation: Operation) -> Timer {
        Timer {
            collector: self.clone(),
            operation,
            started: Instant::now(),
        }
    }

    /// Stats for a single operation. No samples yields all zeros.
    pub fn stats(&self, operation: Operation) -> OperationStats {
        let inner = self.inner.read();
        let recorded = inner.recorded.get(&operation).copied().unwrap_or(0);

        match inner.samples.get(&operation) {
            Some(samples) if !samples.is_empty() => {
                let count = samples.len();
                let sum: f64 = samples.iter().sum();
                let min = samples.iter().copied().fold(f64::INFINITY, f64::min);
                let max = samples.iter().copied().fold(f64::NEG_INFINITY, f64::max);

                OperationStats {
                    avg_secs: sum / count as f64,
                    min_secs: min,
                    max_secs: max,
                    count,
                    recorded,
                }
            }
            _ => OperationStats {
                recorded,
                ..Default::default()
            },
        }
    }

    /// Stats for every tracked operation
    pub fn summary(&self) -> BTreeMap<Operation, OperationStats> {
        Operation::ALL
            .into_iter()
            .map(|operation| (operation, self.stats(operation)))
            .collect()
    }

    /// Reset all metrics
    pub fn reset(&self) {
        let mut inner = self.inner.write();
        inner.samples.clear();
        inner.recorded.clear();
        debug!("Latency metrics reset");
    }
}

impl Default for MetricsCollector {
    fn default() -> Self {
        Self::new()
    }
}

/// In-flight measurement of one operation
pub struct Timer {
    collector: MetricsCollector,
    operation: Operation,
    started: Instant,
}

impl Timer {
    /// Record the elapsed time and return it in seconds
    pub fn finish(self) -> f64 {
        let elapsed = self.started.elapsed().as_secs_f64();
        self.collector.record(self.operation, elapsed);
        elapsed
    }
}
