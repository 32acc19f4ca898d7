//! `CalculatedPrice`: the record C5 emits and C6 persists (§3).

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CalculatedPrice {
    pub seller_id: String,
    pub sku: String,
    pub asin: String,
    pub new_price: Decimal,
    pub old_price: Option<Decimal>,
    pub strategy_used: String,
    pub strategy_id: String,
    pub competitor_price: Option<Decimal>,
    pub calculated_at: DateTime<Utc>,
    pub price_changed: bool,
    /// End-to-end pipeline latency for the event that produced this record (§4.3).
    pub processing_time_ms: u64,
    /// Per-tier sub-records for a B2B listing (§4.5); empty for a non-B2B listing
    /// or when no tier could be priced. Carried on the same record rather than a
    /// separate key, since §6's key layout is externally fixed.
    pub tier_prices: Vec<CalculatedPriceTier>,
}

/// One priced B2B quantity tier, emitted alongside the standard price (§4.5).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CalculatedPriceTier {
    pub min_quantity: u32,
    pub new_price: Decimal,
}
