//! Metrics collection using Prometheus
//!
//! Every store, view and delivery flow reports into one collector. Label
//! values are the board name (`overall`/`daily`), the query name, or the kind
//! of render fault.

use crate::types::StatsWindow;
use anyhow::Result;
use prometheus::{
    Encoder, HistogramOpts, HistogramVec, IntCounter, IntCounterVec, Opts, Registry, TextEncoder,
};
use std::sync::Arc;
use std::time::{Duration, Instant};

/// Main metrics collector for the spotlight service
#[derive(Clone)]
pub struct MetricsCollector {
    /// Prometheus registry
    registry: Arc<Registry>,

    /// Rendered views
    view_metrics: ViewMetrics,

    /// Recovered faults
    fault_metrics: FaultMetrics,

    /// Timings
    performance_metrics: PerformanceMetrics,
}

/// Counters for what was shown to users
#[derive(Clone)]
pub struct ViewMetrics {
    /// Leaderboard pages rendered, by board
    pub pages_rendered_total: IntCounterVec,

    /// Rank reports built
    pub rank_reports_total: IntCounter,

    /// Stats category views, by category
    pub stats_views_total: IntCounterVec,
}

/// Counters for faults that were recovered locally
#[derive(Clone)]
pub struct FaultMetrics {
    /// Store reads that failed and were replaced by a degraded default
    pub retrieval_faults_total: IntCounterVec,

    /// Delivery operations that failed, by kind
    pub render_faults_total: IntCounterVec,

    /// Action tokens that did not parse
    pub malformed_actions_total: IntCounter,
}

/// Timing histograms
#[derive(Clone)]
pub struct PerformanceMetrics {
    /// Store read duration, by query
    pub fetch_duration: HistogramVec,

    /// Page render duration, by board
    pub render_duration: HistogramVec,
}

impl MetricsCollector {
    /// Create a new metrics collector with default registry
    pub fn new() -> Result<Self> {
        let registry = Arc::new(Registry::new());
        Self::with_registry(registry)
    }

    /// Create a new metrics collector with custom registry
    pub fn with_registry(registry: Arc<Registry>) -> Result<Self> {
        let view_metrics = ViewMetrics::new(&registry)?;
        let fault_metrics = FaultMetrics::new(&registry)?;
        let performance_metrics = PerformanceMetrics::new(&registry)?;

        Ok(Self {
            registry,
            view_metrics,
            fault_metrics,
            performance_metrics,
        })
    }

    /// Get the Prometheus registry
    pub fn registry(&self) -> Arc<Registry> {
        self.registry.clone()
    }

    pub fn views(&self) -> &ViewMetrics {
        &self.view_metrics
    }

    pub fn faults(&self) -> &FaultMetrics {
        &self.fault_metrics
    }

    pub fn performance(&self) -> &PerformanceMetrics {
        &self.performance_metrics
    }

    /// Record a rendered leaderboard page
    pub fn record_page_rendered(&self, window: StatsWindow, duration: Duration) {
        let board = window.to_string();
        self.view_metrics
            .pages_rendered_total
            .with_label_values(&[board.as_str()])
            .inc();
        self.performance_metrics
            .render_duration
            .with_label_values(&[board.as_str()])
            .observe(duration.as_secs_f64());
    }

    pub fn record_rank_report(&self) {
        self.view_metrics.rank_reports_total.inc();
    }

    pub fn record_stats_view(&self, category: &str) {
        self.view_metrics
            .stats_views_total
            .with_label_values(&[category])
            .inc();
    }

    /// Record a store read and whether it fell back to a default
    pub fn record_fetch(&self, query: &str, success: bool, duration: Duration) {
        if !success {
            self.fault_metrics
                .retrieval_faults_total
                .with_label_values(&[query])
                .inc();
        }
        self.performance_metrics
            .fetch_duration
            .with_label_values(&[query])
            .observe(duration.as_secs_f64());
    }

    pub fn record_render_fault(&self, kind: &str) {
        self.fault_metrics
            .render_faults_total
            .with_label_values(&[kind])
            .inc();
    }

    pub fn record_malformed_action(&self) {
        self.fault_metrics.malformed_actions_total.inc();
    }

    /// Encode every registered metric in text exposition format
    pub fn export_text(&self) -> Result<String> {
        let encoder = TextEncoder::new();
        let mut buffer = Vec::new();
        encoder.encode(&self.registry.gather(), &mut buffer)?;
        Ok(String::from_utf8(buffer)?)
    }

    /// Create a timer for measuring operation duration
    pub fn start_timer(&self) -> MetricsTimer {
        MetricsTimer::new()
    }
}

/// Timer for measuring operation durations
pub struct MetricsTimer {
    start: Instant,
}

impl MetricsTimer {
    fn new() -> Self {
        Self {
            start: Instant::now(),
        }
    }

    /// Get the elapsed duration
    pub fn elapsed(&self) -> Duration {
        self.start.elapsed()
    }

    /// Stop the timer and return the duration
    pub fn stop(self) -> Duration {
        self.elapsed()
    }
}

impl ViewMetrics {
    fn new(registry: &Registry) -> Result<Self> {
        let pages_rendered_total = IntCounterVec::new(
            Opts::new(
                "player_spotlight_pages_rendered_total",
                "Leaderboard pages rendered",
            ),
            &["board"],
        )?;
        registry.register(Box::new(pages_rendered_total.clone()))?;

        let rank_reports_total = IntCounter::new(
            "player_spotlight_rank_reports_total",
            "Rank reports built",
        )?;
        registry.register(Box::new(rank_reports_total.clone()))?;

        let stats_views_total = IntCounterVec::new(
            Opts::new("player_spotlight_stats_views_total", "Stats views shown"),
            &["category"],
        )?;
        registry.register(Box::new(stats_views_total.clone()))?;

        Ok(Self {
            pages_rendered_total,
            rank_reports_total,
            stats_views_total,
        })
    }
}

impl FaultMetrics {
    fn new(registry: &Registry) -> Result<Self> {
        let retrieval_faults_total = IntCounterVec::new(
            Opts::new(
                "player_spotlight_retrieval_faults_total",
                "Store reads that fell back to a default",
            ),
            &["query"],
        )?;
        registry.register(Box::new(retrieval_faults_total.clone()))?;

        let render_faults_total = IntCounterVec::new(
            Opts::new(
                "player_spotlight_render_faults_total",
                "Failed delivery operations",
            ),
            &["kind"],
        )?;
        registry.register(Box::new(render_faults_total.clone()))?;

        let malformed_actions_total = IntCounter::new(
            "player_spotlight_malformed_actions_total",
            "Action tokens that did not parse",
        )?;
        registry.register(Box::new(malformed_actions_total.clone()))?;

        Ok(Self {
            retrieval_faults_total,
            render_faults_total,
            malformed_actions_total,
        })
    }
}

impl PerformanceMetrics {
    fn new(registry: &Registry) -> Result<Self> {
        let fetch_duration = HistogramVec::new(
            HistogramOpts::new(
                "player_spotlight_fetch_duration_seconds",
                "Store read duration",
            )
            .buckets(vec![0.001, 0.005, 0.01, 0.05, 0.1, 0.5, 1.0, 5.0, 10.0]),
            &["query"],
        )?;
        registry.register(Box::new(fetch_duration.clone()))?;

        let render_duration = HistogramVec::new(
            HistogramOpts::new(
                "player_spotlight_render_duration_seconds",
                "Leaderboard page render duration",
            )
            .buckets(vec![0.00001, 0.0001, 0.001, 0.005, 0.01, 0.05]),
            &["board"],
        )?;
        registry.register(Box::new(render_duration.clone()))?;

        Ok(Self {
            fetch_duration,
            render_duration,
        })
    }
}

impl Default for MetricsCollector {
    fn default() -> Self {
        Self::new().expect("Failed to create default metrics collector")
    }
}
