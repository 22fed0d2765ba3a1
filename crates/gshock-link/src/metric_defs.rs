//! Metric declarations.
//!
//! Every counter the link emits is declared here once, with its description
//! and label keys, and registered with the `metrics` facade by
//! [`describe_metrics`]. No exporter is installed; the host application
//! picks one.

use metrics::{describe_counter, Unit};

/// A counter declaration with its metadata.
#[derive(Debug, Clone)]
pub struct Metric {
    /// The metric name.
    pub name: &'static str,
    /// Human-readable description.
    pub description: &'static str,
    /// Expected label keys.
    pub labels: &'static [&'static str],
}

impl Metric {
    const fn counter(name: &'static str, description: &'static str) -> Self {
        Metric {
            name,
            description,
            labels: &[],
        }
    }

    const fn with_labels(mut self, labels: &'static [&'static str]) -> Self {
        self.labels = labels;
        self
    }

    /// Register this metric's description with the installed recorder.
    pub fn describe(&self) {
        describe_counter!(self.name, Unit::Count, self.description);
    }
}

/// Outbound actions dispatched to a feature sender.
pub const DISPATCH_OUTBOUND: Metric =
    Metric::counter("gshock.dispatch.outbound", "Outbound actions dispatched")
        .with_labels(&["action"]);

/// Inbound frames routed to a feature receiver.
pub const DISPATCH_INBOUND: Metric =
    Metric::counter("gshock.dispatch.inbound", "Inbound frames routed to a feature")
        .with_labels(&["feature"]);

/// Inbound frames whose id matched no feature.
pub const DISPATCH_UNKNOWN: Metric = Metric::counter(
    "gshock.dispatch.unknown",
    "Inbound frames routed to the unknown handler",
);

/// Correlated requests answered by the watch.
pub const PENDING_RESOLVED: Metric =
    Metric::counter("gshock.pending.resolved", "Correlated requests resolved")
        .with_labels(&["feature"]);

/// Correlated requests cancelled or timed out.
pub const PENDING_CANCELLED: Metric = Metric::counter(
    "gshock.pending.cancelled",
    "Correlated requests cancelled or timed out",
)
.with_labels(&["feature"]);

/// Correlating features that received a value nobody asked for.
pub const PENDING_UNSOLICITED: Metric = Metric::counter(
    "gshock.pending.unsolicited",
    "Values received with no request outstanding",
)
.with_labels(&["feature"]);

/// All metrics declared by this crate.
pub const ALL_METRICS: &[Metric] = &[
    DISPATCH_OUTBOUND,
    DISPATCH_INBOUND,
    DISPATCH_UNKNOWN,
    PENDING_RESOLVED,
    PENDING_CANCELLED,
    PENDING_UNSOLICITED,
];

/// Register descriptions for every metric in [`ALL_METRICS`].
pub fn describe_metrics() {
    for metric in ALL_METRICS {
        metric.describe();
    }
}
