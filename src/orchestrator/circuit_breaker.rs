//! Circuit breaker around C6 (§5): trips open on repeated transient store
//! errors, fails fast for a cool-down window, then half-opens.

use std::sync::atomic::{AtomicU64, AtomicU8, Ordering};
use std::sync::Mutex;
use std::time::{Duration, Instant};

const CLOSED: u8 = 0;
const OPEN: u8 = 1;
const HALF_OPEN: u8 = 2;

pub struct CircuitBreaker {
    state: AtomicU8,
    window: Duration,
    cooldown: Duration,
    failure_ratio_trip: f64,
    successes: AtomicU64,
    failures: AtomicU64,
    window_started_at: Mutex<Instant>,
    opened_at: Mutex<Option<Instant>>,
}

impl CircuitBreaker {
    pub fn new(window: Duration, cooldown: Duration, failure_ratio_trip: f64) -> Self {
        Self {
            state: AtomicU8::new(CLOSED),
            window,
            cooldown,
            failure_ratio_trip,
            successes: AtomicU64::new(0),
            failures: AtomicU64::new(0),
            window_started_at: Mutex::new(Instant::now()),
            opened_at: Mutex::new(None),
        }
    }

    /// Whether a call to C6 should be attempted right now.
    pub fn allow_request(&self) -> bool {
        match self.state.load(Ordering::Acquire) {
            CLOSED => true,
            OPEN => {
                let mut opened_at = self.opened_at.lock().unwrap();
                if opened_at.is_some_and(|t| t.elapsed() >= self.cooldown) {
                    self.state.store(HALF_OPEN, Ordering::Release);
                    *opened_at = None;
                    true
                } else {
                    false
                }
            }
            _ => true, // HALF_OPEN: allow a probe through
        }
    }

    pub fn record_success(&self) {
        if self.state.load(Ordering::Acquire) == HALF_OPEN {
            self.reset();
            return;
        }
        self.roll_window_if_needed();
        self.successes.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_failure(&self) {
        if self.state.load(Ordering::Acquire) == HALF_OPEN {
            self.trip();
            return;
        }
        self.roll_window_if_needed();
        self.failures.fetch_add(1, Ordering::Relaxed);

        let failures = self.failures.load(Ordering::Relaxed) as f64;
        let successes = self.successes.load(Ordering::Relaxed) as f64;
        let total = failures + successes;
        if total >= 4.0 && failures / total >= self.failure_ratio_trip {
            self.trip();
        }
    }

    fn roll_window_if_needed(&self) {
        let mut started_at = self.window_started_at.lock().unwrap();
        if started_at.elapsed() >= self.window {
            self.successes.store(0, Ordering::Relaxed);
            self.failures.store(0, Ordering::Relaxed);
            *started_at = Instant::now();
        }
    }

    fn trip(&self) {
        self.state.store(OPEN, Ordering::Release);
        *self.opened_at.lock().unwrap() = Some(Instant::now());
        tracing::warn!("circuit breaker tripped open around store gateway");
    }

    fn reset(&self) {
        self.state.store(CLOSED, Ordering::Release);
        self.successes.store(0, Ordering::Relaxed);
        self.failures.store(0, Ordering::Relaxed);
        tracing::info!("circuit breaker closed, store gateway recovered");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn trips_after_majority_failure() {
        let breaker = CircuitBreaker::new(Duration::from_secs(30), Duration::from_millis(50), 0.5);
        breaker.record_success();
        for _ in 0..3 {
            breaker.record_failure();
        }
        // 3 failures / 4 total >= 0.5 trips it open.
        assert!(!breaker.allow_request());
    }

    #[test]
    fn half_opens_after_cooldown() {
        let breaker = CircuitBreaker::new(Duration::from_secs(30), Duration::from_millis(10), 0.5);
        for _ in 0..4 {
            breaker.record_failure();
        }
        assert!(!breaker.allow_request());
        std::thread::sleep(Duration::from_millis(20));
        assert!(breaker.allow_request());
    }

    #[test]
    fn closed_by_default() {
        let breaker = CircuitBreaker::new(Duration::from_secs(30), Duration::from_secs(5), 0.5);
        assert!(breaker.allow_request());
    }
}
