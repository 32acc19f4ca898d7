//! C2: the message normalizer. Parses the two heterogeneous wire payloads
//! into the canonical `OfferChange` record (§4.2, §6).

pub mod source_a;
pub mod source_b;

use thiserror::Error;

use crate::error::StoreError;

/// Fail-fast conditions (§4.2) plus the "unknown owner" skip, which is not a
/// malformation but still terminates the pipeline successfully (ack, no
/// decision made).
#[derive(Debug, Error)]
pub enum NormalizeError {
    #[error("malformed payload: {0}")]
    Malformed(String),
    #[error("missing asin")]
    MissingAsin,
    #[error("empty offers list")]
    EmptyOffers,
    #[error("could not resolve owning seller for this asin")]
    UnknownOwner,
    #[error(transparent)]
    Store(#[from] StoreError),
}

impl NormalizeError {
    /// `true` when the source message should still be acked (dropped, not
    /// redelivered) — every normalize failure is this, by design (§4.2, §7 item 1).
    pub fn is_terminal_skip(&self) -> bool {
        !matches!(self, NormalizeError::Store(e) if e.is_transient())
    }
}

pub use source_a::normalize_source_a;
pub use source_b::normalize_source_b;
