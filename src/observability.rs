//! Negotiation counters

use std::sync::atomic::{AtomicU64, Ordering};

use crate::negotiate::NegotiatedOutcome;

/// Counters per negotiated outcome kind
#[derive(Debug, Default)]
pub struct Metrics {
    representations: AtomicU64,
    no_content: AtomicU64,
    not_acceptable: AtomicU64,
    passthrough: AtomicU64,
    failures: AtomicU64,
}

impl Metrics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&self, outcome: &NegotiatedOutcome) {
        let counter = match outcome {
            NegotiatedOutcome::Representation(_) => &self.representations,
            NegotiatedOutcome::NoContent => &self.no_content,
            NegotiatedOutcome::NotAcceptable { .. } => &self.not_acceptable,
            NegotiatedOutcome::Passthrough(_) => &self.passthrough,
        };
        counter.fetch_add(1, Ordering::Relaxed);
        tracing::debug!(counter = outcome.label(), "Metric incremented");
    }

    pub fn failure(&self) {
        self.failures.fetch_add(1, Ordering::Relaxed);
        tracing::debug!(counter = "failures", "Metric incremented");
    }

    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            representations: self.representations.load(Ordering::Relaxed),
            no_content: self.no_content.load(Ordering::Relaxed),
            not_acceptable: self.not_acceptable.load(Ordering::Relaxed),
            passthrough: self.passthrough.load(Ordering::Relaxed),
            failures: self.failures.load(Ordering::Relaxed),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, serde::Serialize)]
pub struct MetricsSnapshot {
    pub representations: u64,
    pub no_content: u64,
    pub not_acceptable: u64,
    pub passthrough: u64,
    pub failures: u64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_record_outcomes() {
        let metrics = Metrics::new();
        metrics.record(&NegotiatedOutcome::NoContent);
        metrics.record(&NegotiatedOutcome::NotAcceptable {
            request_path: "/x".to_string(),
            body: None,
        });
        metrics.record(&NegotiatedOutcome::NoContent);
        metrics.failure();

        assert_eq!(
            metrics.snapshot(),
            MetricsSnapshot {
                no_content: 2,
                not_acceptable: 1,
                failures: 1,
                ..MetricsSnapshot::default()
            }
        );
    }
}
