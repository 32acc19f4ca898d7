//! The externally-authored `Strategy` configuration a listing points at.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum CompeteWith {
    LowestPrice,
    LowestFbaPrice,
    MatchBuybox,
}

/// The rule applied when a raw computed price falls outside `[min_price, max_price]` (§4.5).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PriceBoundRule {
    JumpToMin,
    JumpToMax,
    JumpToAvg,
    DoNothing,
    DefaultPrice,
    MatchCompetitor,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum B2bCompeteFor {
    Low,
    High,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum B2bPriceRule {
    Average,
    BeatBy,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Strategy {
    pub strategy_id: String,
    pub compete_with: CompeteWith,
    pub beat_by: Decimal,
    pub min_price_rule: PriceBoundRule,
    pub max_price_rule: PriceBoundRule,
    pub b2b_compete_for: Option<B2bCompeteFor>,
    pub b2b_price_rule: Option<B2bPriceRule>,
}
