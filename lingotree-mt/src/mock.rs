//! Mock Machine Translator for testing
//!
//! This module provides a deterministic, network-free translator for
//! exercising the batch runner. Besides producing predictable output it keeps
//! counters of how many requests were started and how many were in flight at
//! once, so concurrency limits and cancellation can be asserted.
//!
//! # Example
//!
//! ```ignore
//! use lingotree_mt::{MachineTranslator, MockTranslator, MockMode};
//!
//! #[tokio::test]
//! async fn test_translation() {
//!     let mock = MockTranslator::new(MockMode::Suffix("zh".to_string()));
//!     let result = mock.translate("hello").await.unwrap();
//!     assert_eq!(result, "hello_zh");
//! }
//! ```

use async_trait::async_trait;
use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use crate::error::{MtError, MtResult};
use crate::translator::MachineTranslator;

/// Mock translation modes for testing different scenarios
#[derive(Debug, Clone)]
pub enum MockMode {
    /// Append a suffix: "hello" → "hello_zh"
    Suffix(String),

    /// Use predefined mappings, falling back to the `_mt` suffix
    Mappings(HashMap<String, String>),

    /// Every request fails with this message
    Error(String),

    /// Requests for these texts answer HTTP 500; the rest get the `_mt` suffix
    FailOn(HashSet<String>),

    /// No-op: return input unchanged
    NoOp,
}

/// Request counters shared by all clones of a mock
#[derive(Debug, Default)]
pub struct MockStats {
    calls: AtomicUsize,
    in_flight: AtomicUsize,
    max_in_flight: AtomicUsize,
    completed: AtomicUsize,
}

impl MockStats {
    /// Requests started so far
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    /// Highest number of requests observed in flight at the same time
    pub fn max_in_flight(&self) -> usize {
        self.max_in_flight.load(Ordering::SeqCst)
    }

    /// Requests that ran to the end rather than being dropped
    pub fn completed(&self) -> usize {
        self.completed.load(Ordering::SeqCst)
    }
}

/// Decrements the in-flight counter even if the request future is dropped
struct InFlight<'a>(&'a MockStats);

impl<'a> InFlight<'a> {
    fn enter(stats: &'a MockStats) -> Self {
        stats.calls.fetch_add(1, Ordering::SeqCst);
        let now = stats.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        stats.max_in_flight.fetch_max(now, Ordering::SeqCst);
        InFlight(stats)
    }
}

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        self.0.in_flight.fetch_sub(1, Ordering::SeqCst);
    }
}

/// Mock translator that simulates various translation scenarios
#[derive(Debug, Clone)]
pub struct MockTranslator {
    mode: MockMode,
    /// Simulated network delay (in milliseconds)
    delay_ms: u64,
    /// Per-text delays overriding `delay_ms`
    delays: HashMap<String, u64>,
    stats: Arc<MockStats>,
}

impl MockTranslator {
    pub fn new(mode: MockMode) -> Self {
        Self {
            mode,
            delay_ms: 0,
            delays: HashMap::new(),
            stats: Arc::new(MockStats::default()),
        }
    }

    /// Create a MockTranslator with simulated network delay
    ///
    /// # Example
    ///
    /// ```ignore
    /// let mock = MockTranslator::with_delay(MockMode::NoOp, 50);
    /// // Each translation will take ~50ms
    /// ```
    pub fn with_delay(mode: MockMode, delay_ms: u64) -> Self {
        Self {
            delay_ms,
            ..Self::new(mode)
        }
    }

    /// Give one source text its own latency, to reorder completions
    pub fn delay_for(mut self, text: &str, delay_ms: u64) -> Self {
        self.delays.insert(text.to_string(), delay_ms);
        self
    }

    pub fn stats(&self) -> Arc<MockStats> {
        Arc::clone(&self.stats)
    }

    async fn apply_delay(&self, text: &str) {
        let delay = self.delays.get(text).copied().unwrap_or(self.delay_ms);
        if delay > 0 {
            tokio::time::sleep(Duration::from_millis(delay)).await;
        }
    }

    fn apply_translation(&self, text: &str) -> MtResult<String> {
        match &self.mode {
            MockMode::Suffix(suffix) => Ok(format!("{}_{}", text, suffix)),
            MockMode::Mappings(map) => Ok(map
                .get(text)
                .cloned()
                .unwrap_or_else(|| format!("{}_mt", text))),
            MockMode::Error(msg) => Err(MtError::Network(msg.clone())),
            MockMode::FailOn(failing) if failing.contains(text) => Err(MtError::Http {
                status: 500,
                body: "mock failure".to_string(),
            }),
            MockMode::FailOn(_) => Ok(format!("{}_mt", text)),
            MockMode::NoOp => Ok(text.to_string()),
        }
    }
}

#[async_trait]
impl MachineTranslator for MockTranslator {
    async fn translate(&self, text: &str) -> MtResult<String> {
        let _in_flight = InFlight::enter(&self.stats);
        self.apply_delay(text).await;
        let result = self.apply_translation(text);
        self.stats.completed.fetch_add(1, Ordering::SeqCst);
        result
    }

    fn provider_name(&self) -> &str {
        "Mock Translator"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // ========== Mode Tests ==========

    #[tokio::test]
    async fn test_suffix_translation() {
        let mock = MockTranslator::new(MockMode::Suffix("zh".to_string()));
        assert_eq!(mock.translate("hello").await.unwrap(), "hello_zh");
    }

    #[tokio::test]
    async fn test_mapping_with_fallback() {
        let mut map = HashMap::new();
        map.insert("hello".to_string(), "你好".to_string());

        let mock = MockTranslator::new(MockMode::Mappings(map));
        assert_eq!(mock.translate("hello").await.unwrap(), "你好");
        assert_eq!(mock.translate("unknown").await.unwrap(), "unknown_mt");
    }

    #[tokio::test]
    async fn test_error_mode_returns_error() {
        let mock = MockTranslator::new(MockMode::Error("API unavailable".to_string()));
        match mock.translate("hello").await {
            Err(MtError::Network(msg)) => assert_eq!(msg, "API unavailable"),
            other => panic!("Expected Network error, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_fail_on_selected_texts() {
        let failing: HashSet<String> = ["bad".to_string()].into_iter().collect();
        let mock = MockTranslator::new(MockMode::FailOn(failing));

        assert!(matches!(
            mock.translate("bad").await,
            Err(MtError::Http { status: 500, .. })
        ));
        assert_eq!(mock.translate("good").await.unwrap(), "good_mt");
    }

    #[tokio::test]
    async fn test_noop_returns_unchanged() {
        let mock = MockTranslator::new(MockMode::NoOp);
        assert_eq!(mock.translate("Hello world").await.unwrap(), "Hello world");
    }

    // ========== Delay and Counter Tests ==========

    #[tokio::test]
    async fn test_delay_adds_latency() {
        let mock = MockTranslator::with_delay(MockMode::NoOp, 50);
        let start = std::time::Instant::now();
        let _ = mock.translate("hello").await.unwrap();
        assert!(start.elapsed().as_millis() >= 50);
    }

    #[tokio::test]
    async fn test_counters_track_parallel_requests() {
        let mock = MockTranslator::with_delay(MockMode::NoOp, 20);
        let stats = mock.stats();

        let (a, b, c) = tokio::join!(
            mock.translate("a"),
            mock.translate("b"),
            mock.translate("c")
        );
        assert!(a.is_ok() && b.is_ok() && c.is_ok());
        assert_eq!(stats.calls(), 3);
        assert_eq!(stats.completed(), 3);
        assert_eq!(stats.max_in_flight(), 3);
    }

    #[tokio::test]
    async fn test_dropped_request_does_not_complete() {
        let mock = MockTranslator::with_delay(MockMode::NoOp, 1_000);
        let stats = mock.stats();

        let outcome =
            tokio::time::timeout(Duration::from_millis(20), mock.translate("slow")).await;
        assert!(outcome.is_err());
        assert_eq!(stats.calls(), 1);
        assert_eq!(stats.completed(), 0);
    }

    #[test]
    fn test_provider_name() {
        let mock = MockTranslator::new(MockMode::NoOp);
        assert_eq!(mock.provider_name(), "Mock Translator");
    }
}
