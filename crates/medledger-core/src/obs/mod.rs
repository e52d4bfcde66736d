//! Observability: process-local command counters and the sink boundary.
//!
//! Operations never touch `metrics` directly; everything flows through
//! `sink::record`.

pub(crate) mod metrics;
pub(crate) mod sink;

// re-exports
pub use metrics::{CommandCounters, EventOps, EventReport};
pub use sink::{CommandKind, MetricsEvent, MetricsSink, metrics_report, metrics_reset_all};
