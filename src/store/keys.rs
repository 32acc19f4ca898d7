//! Key-value store layout (§6). Fixed by external consumers (admin UI, data
//! populator) — never change these formats without a corresponding migration
//! of those out-of-scope collaborators.

/// Container hash key for a product's listings across all our sellers.
pub fn listing_hash_key(asin: &str) -> String {
    format!("ASIN_{asin}")
}

/// Field within the listing hash for one (seller, sku) pair.
pub fn listing_field(seller_id: &str, sku: &str) -> String {
    format!("{seller_id}:{sku}")
}

/// Hash key for a strategy configuration.
pub fn strategy_hash_key(strategy_id: &str) -> String {
    format!("strategy.{strategy_id}")
}

/// Container hash key for a seller's calculated prices.
pub fn calculated_prices_hash_key(seller_id: &str) -> String {
    format!("CALCULATED_PRICES:{seller_id}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn key_formats_match_external_layout() {
        assert_eq!(listing_hash_key("X1"), "ASIN_X1");
        assert_eq!(listing_field("S1", "K1"), "S1:K1");
        assert_eq!(strategy_hash_key("2"), "strategy.2");
        assert_eq!(calculated_prices_hash_key("S1"), "CALCULATED_PRICES:S1");
    }
}
