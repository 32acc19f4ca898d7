//! C6: the store gateway. Owns all access to the key-value store; every
//! other component consumes and returns pure values (§3 "Ownership").

mod keys;
mod redis_gateway;

use async_trait::async_trait;

use crate::error::StoreError;
use crate::model::{CalculatedPrice, ProductListing, Strategy};

pub use redis_gateway::{RedisStoreGateway, StoreConfig};

/// Seconds a container key's TTL is refreshed to on every write (§3, §6): 2 hours.
pub const RECORD_TTL_SECS: i64 = 2 * 60 * 60;

#[async_trait]
pub trait StoreGateway: Send + Sync {
    /// The sku is not known ahead of the read (neither wire payload carries
    /// one, §6) — it comes back as part of the resolved `ProductListing`
    /// (one active sku per (asin, seller_id) is assumed, consistent with
    /// our-seller resolution already being implementation-local to C6, §4.2).
    async fn get_listing(&self, asin: &str, seller_id: &str) -> Result<ProductListing, StoreError>;

    async fn get_strategy(&self, strategy_id: &str) -> Result<Strategy, StoreError>;

    async fn put_calculated_price(&self, record: &CalculatedPrice) -> Result<(), StoreError>;

    /// Resolve which of our sellers owns a given ASIN, given the seller ids visible
    /// in the offer-change event (§4.2 "our-seller resolution", §4.6 supplement).
    async fn find_owning_seller(
        &self,
        asin: &str,
        candidate_seller_ids: &[String],
    ) -> Result<Option<String>, StoreError>;
}
