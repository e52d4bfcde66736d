//! Metrics sink boundary.
//!
//! Core operations MUST NOT depend on obs::metrics directly.
//! All instrumentation flows through MetricsEvent and MetricsSink.
use crate::{error::ErrorOrigin, obs::metrics};
use std::{cell::RefCell, fmt, rc::Rc};

thread_local! {
    static SINK_OVERRIDE: RefCell<Option<Rc<dyn MetricsSink>>> = RefCell::new(None);
}

///
/// CommandKind
///

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum CommandKind {
    Init,
    Write,
    Read,
    Scan,
    History,
}

impl CommandKind {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Init => "init",
            Self::Write => "init_patient",
            Self::Read => "get_patient",
            Self::Scan => "get_AllPatients",
            Self::History => "get_TxHisBypatId",
        }
    }
}

impl fmt::Display for CommandKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

///
/// MetricsEvent
///

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum MetricsEvent {
    CommandStart { kind: CommandKind },
    CommandFinish { kind: CommandKind, ok: bool },
    CommandRejected,
    RowsScanned { rows: u64 },
    HistoryRead { entries: u64 },
    DecodeMasked { origin: ErrorOrigin },
}

///
/// MetricsSink
///

pub trait MetricsSink {
    fn record(&self, event: MetricsEvent);
}

/// GlobalMetricsSink
/// Default sink that writes into the thread-local counters.
/// Acts as the concrete sink when no scoped override is installed.

pub(crate) struct GlobalMetricsSink;

impl MetricsSink for GlobalMetricsSink {
    fn record(&self, event: MetricsEvent) {
        match event {
            MetricsEvent::CommandStart { kind } => metrics::with_state_mut(|m| {
                let counter = match kind {
                    CommandKind::Init => &mut m.ops.init_calls,
                    CommandKind::Write => &mut m.ops.write_calls,
                    CommandKind::Read => &mut m.ops.read_calls,
                    CommandKind::Scan => &mut m.ops.scan_calls,
                    CommandKind::History => &mut m.ops.history_calls,
                };
                *counter = counter.saturating_add(1);

                let entry = m.commands.entry(kind.as_str().to_string()).or_default();
                entry.calls = entry.calls.saturating_add(1);
            }),

            MetricsEvent::CommandFinish { kind, ok } => {
                if !ok {
                    metrics::with_state_mut(|m| {
                        m.ops.failures = m.ops.failures.saturating_add(1);
                        let entry = m.commands.entry(kind.as_str().to_string()).or_default();
                        entry.failures = entry.failures.saturating_add(1);
                    });
                }
            }

            MetricsEvent::CommandRejected => metrics::with_state_mut(|m| {
                m.ops.rejected = m.ops.rejected.saturating_add(1);
                m.ops.failures = m.ops.failures.saturating_add(1);
            }),

            MetricsEvent::RowsScanned { rows } => metrics::with_state_mut(|m| {
                m.ops.rows_scanned = m.ops.rows_scanned.saturating_add(rows);
            }),

            MetricsEvent::HistoryRead { entries } => metrics::with_state_mut(|m| {
                m.ops.history_entries = m.ops.history_entries.saturating_add(entries);
            }),

            MetricsEvent::DecodeMasked { .. } => metrics::with_state_mut(|m| {
                m.ops.decode_masked = m.ops.decode_masked.saturating_add(1);
            }),
        }
    }
}

pub(crate) fn record(event: MetricsEvent) {
    let sink = SINK_OVERRIDE.with(|cell| cell.borrow().clone());

    match sink {
        Some(sink) => sink.record(event),
        None => GlobalMetricsSink.record(event),
    }
}

/// Snapshot the current metrics state.
#[must_use]
pub fn metrics_report() -> metrics::EventReport {
    metrics::with_state(metrics::EventReport::clone)
}

/// Reset all metrics state.
pub fn metrics_reset_all() {
    metrics::reset_all();
}

/// Run a closure with a temporary metrics sink override.
#[cfg_attr(not(test), expect(dead_code))]
pub(crate) fn with_metrics_sink<T>(sink: Rc<dyn MetricsSink>, f: impl FnOnce() -> T) -> T {
    struct Guard(Option<Rc<dyn MetricsSink>>);

    impl Drop for Guard {
        fn drop(&mut self) {
            let prev = self.0.take();
            SINK_OVERRIDE.with(|cell| *cell.borrow_mut() = prev);
        }
    }

    let prev = SINK_OVERRIDE.with(|cell| cell.borrow_mut().replace(sink));
    let _guard = Guard(prev);

    f()
}

///
/// Span
/// RAII guard that emits start/finish events for one command.
/// A span dropped without `succeed` is counted as a failure.
///

pub(crate) struct Span {
    kind: CommandKind,
    ok: bool,
}

impl Span {
    #[must_use]
    pub(crate) fn new(kind: CommandKind) -> Self {
        record(MetricsEvent::CommandStart { kind });

        Self { kind, ok: false }
    }

    pub(crate) const fn succeed(&mut self) {
        self.ok = true;
    }
}

impl Drop for Span {
    fn drop(&mut self) {
        record(MetricsEvent::CommandFinish {
            kind: self.kind,
            ok: self.ok,
        });
    }
}
