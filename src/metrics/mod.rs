//! Metrics for the spotlight service
//!
//! Counters and histograms live in a prometheus registry owned by
//! [`MetricsCollector`]; the CLI can dump it in text exposition format.

pub mod collector;

pub use collector::{
    FaultMetrics, MetricsCollector, MetricsTimer, PerformanceMetrics, ViewMetrics,
};
