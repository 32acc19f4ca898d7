//! In-process atomic pipeline counters exposed at `/stats` (§1 ambient
//! stack), generalized from the teacher's HFT performance counters to
//! repricing pipeline stages.

use std::sync::atomic::{AtomicU64, Ordering};

use serde::Serialize;

#[derive(Default)]
pub struct Metrics {
    pub events_received: AtomicU64,
    pub events_normalized: AtomicU64,
    pub decisions_made: AtomicU64,
    pub skipped_total: AtomicU64,
    pub prices_calculated: AtomicU64,
    pub prices_written: AtomicU64,
    pub retried_total: AtomicU64,
}

#[derive(Debug, Serialize)]
pub struct MetricsSnapshot {
    pub events_received: u64,
    pub events_normalized: u64,
    pub decisions_made: u64,
    pub skipped_total: u64,
    pub prices_calculated: u64,
    pub prices_written: u64,
    pub retried_total: u64,
}

impl Metrics {
    pub fn inc_received(&self) {
        self.events_received.fetch_add(1, Ordering::Relaxed);
    }
    pub fn inc_normalized(&self) {
        self.events_normalized.fetch_add(1, Ordering::Relaxed);
    }
    pub fn inc_decided(&self) {
        self.decisions_made.fetch_add(1, Ordering::Relaxed);
    }
    pub fn inc_skipped(&self) {
        self.skipped_total.fetch_add(1, Ordering::Relaxed);
    }
    pub fn inc_priced(&self) {
        self.prices_calculated.fetch_add(1, Ordering::Relaxed);
    }
    pub fn inc_written(&self) {
        self.prices_written.fetch_add(1, Ordering::Relaxed);
    }
    pub fn inc_retried(&self) {
        self.retried_total.fetch_add(1, Ordering::Relaxed);
    }

    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            events_received: self.events_received.load(Ordering::Relaxed),
            events_normalized: self.events_normalized.load(Ordering::Relaxed),
            decisions_made: self.decisions_made.load(Ordering::Relaxed),
            skipped_total: self.skipped_total.load(Ordering::Relaxed),
            prices_calculated: self.prices_calculated.load(Ordering::Relaxed),
            prices_written: self.prices_written.load(Ordering::Relaxed),
            retried_total: self.retried_total.load(Ordering::Relaxed),
        }
    }
}
