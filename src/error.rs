//! Error taxonomy shared across components (§7).
//!
//! Components below the orchestrator never bubble exceptions; C4/C5 return
//! `RepricingDecision`/`StrategyOutcome` sum types (see `crate::decision`,
//! `crate::strategy`) and only C6 produces a classified error enum that C3
//! maps onto an ack/retry decision.

use thiserror::Error;

/// Errors C6 (the store gateway) can return. The orchestrator maps
/// `Transient` to `retry` and `Structural` to `skip` (§7 taxonomy items 4 and 1/5).
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("transient store error: {0}")]
    Transient(String),
    #[error("structural decode error: {0}")]
    Structural(String),
    #[error("not found")]
    NotFound,
}

impl StoreError {
    pub fn is_transient(&self) -> bool {
        matches!(self, StoreError::Transient(_))
    }
}

impl From<redis::RedisError> for StoreError {
    fn from(err: redis::RedisError) -> Self {
        if err.is_timeout() || err.is_connection_dropped() || err.is_connection_refusal() {
            StoreError::Transient(err.to_string())
        } else {
            StoreError::Structural(err.to_string())
        }
    }
}

impl From<serde_json::Error> for StoreError {
    fn from(err: serde_json::Error) -> Self {
        StoreError::Structural(format!("json decode: {err}"))
    }
}
