//! Redis-backed implementation of `StoreGateway`.
//!
//! Connection pooling is a small hand-rolled round-robin over several
//! `redis::aio::ConnectionManager` handles — each one is already a
//! multiplexed, auto-reconnecting single connection, so "≥20 connections"
//! (§4.6) means ≥20 independent multiplexed pipes rather than a classic
//! checkout pool.

use std::collections::HashMap;
use std::str::FromStr;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use redis::aio::ConnectionManager;
use redis::AsyncCommands;
use rust_decimal::Decimal;
use tracing::warn;

use crate::error::StoreError;
use crate::model::{
    B2bCompeteFor, B2bPriceRule, CalculatedPrice, CompeteWith, PriceBoundRule, ProductListing,
    Strategy,
};

use super::keys::{calculated_prices_hash_key, listing_hash_key, strategy_hash_key};
use super::{StoreGateway, RECORD_TTL_SECS};

#[derive(Debug, Clone)]
pub struct StoreConfig {
    pub redis_url: String,
    pub pool_size: usize,
}

impl StoreConfig {
    pub fn from_env() -> Self {
        let redis_url =
            std::env::var("REDIS_URL").unwrap_or_else(|_| "redis://127.0.0.1:6379".to_string());
        let pool_size = std::env::var("STORE_POOL_SIZE")
            .ok()
            .and_then(|v| v.parse::<usize>().ok())
            .filter(|&v| v > 0)
            .unwrap_or(20);
        Self {
            redis_url,
            pool_size,
        }
    }
}

pub struct RedisStoreGateway {
    connections: Vec<ConnectionManager>,
    next: AtomicUsize,
}

impl RedisStoreGateway {
    pub async fn connect(config: &StoreConfig) -> Result<Self, StoreError> {
        let client = redis::Client::open(config.redis_url.clone())
            .map_err(|e| StoreError::Transient(e.to_string()))?;

        let mut connections = Vec::with_capacity(config.pool_size);
        for _ in 0..config.pool_size {
            let conn = client
                .get_connection_manager()
                .await
                .map_err(|e| StoreError::Transient(e.to_string()))?;
            connections.push(conn);
        }

        Ok(Self {
            connections,
            next: AtomicUsize::new(0),
        })
    }

    fn connection(&self) -> ConnectionManager {
        let idx = self.next.fetch_add(1, Ordering::Relaxed) % self.connections.len();
        self.connections[idx].clone()
    }
}

#[async_trait]
impl StoreGateway for RedisStoreGateway {
    async fn get_listing(&self, asin: &str, seller_id: &str) -> Result<ProductListing, StoreError> {
        let mut conn = self.connection();
        let fields: HashMap<String, String> = conn.hgetall(listing_hash_key(asin)).await?;

        let prefix = format!("{seller_id}:");
        let raw = fields
            .iter()
            .find(|(field, _)| field.starts_with(&prefix))
            .map(|(_, value)| value)
            .ok_or(StoreError::NotFound)?;

        if listing_is_expired(raw) {
            return Err(StoreError::NotFound);
        }

        let listing: ProductListing = serde_json::from_str(raw)?;
        if let Err(e) = listing.validate() {
            return Err(StoreError::Structural(format!(
                "listing failed invariants: {e}"
            )));
        }
        Ok(listing)
    }

    async fn get_strategy(&self, strategy_id: &str) -> Result<Strategy, StoreError> {
        let mut conn = self.connection();
        let fields: HashMap<String, String> =
            conn.hgetall(strategy_hash_key(strategy_id)).await?;

        if fields.is_empty() {
            return Err(StoreError::NotFound);
        }

        parse_strategy(strategy_id, &fields)
    }

    async fn put_calculated_price(&self, record: &CalculatedPrice) -> Result<(), StoreError> {
        let key = calculated_prices_hash_key(&record.seller_id);
        let value = serde_json::to_string(record)?;

        let mut conn = self.connection();
        let mut pipe = redis::pipe();
        pipe.atomic()
            .hset(&key, &record.sku, value)
            .ignore()
            .expire(&key, RECORD_TTL_SECS)
            .ignore();
        pipe.query_async(&mut conn).await?;
        Ok(())
    }

    async fn find_owning_seller(
        &self,
        asin: &str,
        candidate_seller_ids: &[String],
    ) -> Result<Option<String>, StoreError> {
        let mut conn = self.connection();
        let fields: HashMap<String, String> = conn.hgetall(listing_hash_key(asin)).await?;
        if fields.is_empty() {
            return Ok(None);
        }

        for candidate in candidate_seller_ids {
            let prefix = format!("{candidate}:");
            if fields.keys().any(|field| field.starts_with(&prefix)) {
                return Ok(Some(candidate.clone()));
            }
        }
        Ok(None)
    }
}

/// Populators may embed an explicit `expires_at` (unix seconds) alongside the
/// TTL the store itself enforces; stale-but-not-yet-TTL'd records must still
/// read as NotFound (§4.6).
fn listing_is_expired(raw: &str) -> bool {
    let Ok(value) = serde_json::from_str::<serde_json::Value>(raw) else {
        return false;
    };
    let Some(expires_at) = value.get("expires_at").and_then(|v| v.as_i64()) else {
        return false;
    };
    expires_at <= chrono::Utc::now().timestamp()
}

fn parse_strategy(
    strategy_id: &str,
    fields: &HashMap<String, String>,
) -> Result<Strategy, StoreError> {
    let field = |name: &str| -> Result<&str, StoreError> {
        fields
            .get(name)
            .map(|s| s.as_str())
            .ok_or_else(|| StoreError::Structural(format!("strategy missing field '{name}'")))
    };

    let compete_with = match field("compete_with")? {
        "LOWEST_PRICE" => CompeteWith::LowestPrice,
        "LOWEST_FBA_PRICE" => CompeteWith::LowestFbaPrice,
        "MATCH_BUYBOX" => CompeteWith::MatchBuybox,
        other => {
            return Err(StoreError::Structural(format!(
                "unknown compete_with '{other}'"
            )))
        }
    };

    let beat_by = Decimal::from_str(field("beat_by")?)
        .map_err(|e| StoreError::Structural(format!("bad beat_by: {e}")))?;

    let min_price_rule = parse_bound_rule(field("min_price_rule")?)?;
    let max_price_rule = parse_bound_rule(field("max_price_rule")?)?;

    let b2b_compete_for = match fields.get("b2b_compete_for").map(String::as_str) {
        Some("LOW") => Some(B2bCompeteFor::Low),
        Some("HIGH") => Some(B2bCompeteFor::High),
        Some(other) => {
            warn!(strategy_id, value = other, "unknown b2b_compete_for, ignoring");
            None
        }
        None => None,
    };

    let b2b_price_rule = match fields.get("b2b_price_rule").map(String::as_str) {
        Some("AVERAGE") => Some(B2bPriceRule::Average),
        Some("BEAT_BY") => Some(B2bPriceRule::BeatBy),
        Some(other) => {
            warn!(strategy_id, value = other, "unknown b2b_price_rule, ignoring");
            None
        }
        None => None,
    };

    Ok(Strategy {
        strategy_id: strategy_id.to_string(),
        compete_with,
        beat_by,
        min_price_rule,
        max_price_rule,
        b2b_compete_for,
        b2b_price_rule,
    })
}

fn parse_bound_rule(raw: &str) -> Result<PriceBoundRule, StoreError> {
    Ok(match raw {
        "JUMP_TO_MIN" => PriceBoundRule::JumpToMin,
        "JUMP_TO_MAX" => PriceBoundRule::JumpToMax,
        "JUMP_TO_AVG" => PriceBoundRule::JumpToAvg,
        "DO_NOTHING" => PriceBoundRule::DoNothing,
        "DEFAULT_PRICE" => PriceBoundRule::DefaultPrice,
        "MATCH_COMPETITOR" => PriceBoundRule::MatchCompetitor,
        other => {
            return Err(StoreError::Structural(format!(
                "unknown price bound rule '{other}'"
            )))
        }
    })
}
