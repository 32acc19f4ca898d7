//! Product listing: the seller-side record a repricing decision is made against.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum FulfillmentChannel {
    Amazon,
    Merchant,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ListingStatus {
    Active,
    Inactive,
}

/// A single B2B quantity-tier price point.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct B2bTier {
    pub min_quantity: u32,
    pub price: Decimal,
    pub min_price: Option<Decimal>,
    pub max_price: Option<Decimal>,
    pub default_price: Option<Decimal>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProductListing {
    pub asin: String,
    pub seller_id: String,
    pub sku: String,
    pub listed_price: Option<Decimal>,
    pub min_price: Option<Decimal>,
    pub max_price: Option<Decimal>,
    pub default_price: Option<Decimal>,
    pub strategy_id: Option<String>,
    pub item_condition: String,
    pub fulfillment_channel: FulfillmentChannel,
    pub status: ListingStatus,
    pub quantity: i64,
    pub is_b2b: bool,
    pub b2b_tiers: Vec<B2bTier>,
    pub repricing_paused: bool,
}

/// Why a `ProductListing` failed its constructor invariants (§3).
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum ListingInvariantError {
    #[error("min_price {min} > max_price {max}")]
    BoundsInverted { min: String, max: String },
    #[error("price {0} is negative")]
    NegativePrice(String),
    #[error("listed_price {listed} outside bounds [{min}, {max}]")]
    ListedOutsideBounds {
        listed: String,
        min: String,
        max: String,
    },
    #[error("default_price {default} outside bounds [{min}, {max}]")]
    DefaultOutsideBounds {
        default: String,
        min: String,
        max: String,
    },
    #[error("b2b tiers are not strictly increasing by min_quantity")]
    TiersNotOrdered,
}

impl ProductListing {
    /// Validate the cross-field invariants from §3. Construction elsewhere in
    /// the pipeline (the JSON decode path in `crate::store`) always runs this
    /// before a listing is handed to C4/C5.
    pub fn validate(&self) -> Result<(), ListingInvariantError> {
        for price in [self.listed_price, self.min_price, self.max_price, self.default_price]
            .into_iter()
            .flatten()
        {
            if price.is_sign_negative() {
                return Err(ListingInvariantError::NegativePrice(price.to_string()));
            }
        }

        if let (Some(min), Some(max)) = (self.min_price, self.max_price) {
            if min > max {
                return Err(ListingInvariantError::BoundsInverted {
                    min: min.to_string(),
                    max: max.to_string(),
                });
            }

            if let Some(listed) = self.listed_price {
                if listed < min || listed > max {
                    return Err(ListingInvariantError::ListedOutsideBounds {
                        listed: listed.to_string(),
                        min: min.to_string(),
                        max: max.to_string(),
                    });
                }
            }

            if let Some(default) = self.default_price {
                if default < min || default > max {
                    return Err(ListingInvariantError::DefaultOutsideBounds {
                        default: default.to_string(),
                        min: min.to_string(),
                        max: max.to_string(),
                    });
                }
            }
        }

        if !self
            .b2b_tiers
            .windows(2)
            .all(|w| w[0].min_quantity < w[1].min_quantity)
        {
            return Err(ListingInvariantError::TiersNotOrdered);
        }

        Ok(())
    }

    /// `true` when min and max are both set but identical — no room to reprice (§4.4 gate 5).
    pub fn bounds_have_no_room(&self) -> bool {
        matches!((self.min_price, self.max_price), (Some(min), Some(max)) if min == max)
    }

    /// `true` when bounds are internally inconsistent for the purposes of gate 5
    /// (distinct from `validate`, which already rejects inverted bounds upstream —
    /// this is the decision-engine's own re-check per §4.4).
    pub fn bounds_consistent(&self) -> bool {
        match (self.min_price, self.max_price) {
            (Some(min), Some(max)) => min <= max && min != max,
            _ => true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn base_listing() -> ProductListing {
        ProductListing {
            asin: "X1".into(),
            seller_id: "S1".into(),
            sku: "K1".into(),
            listed_price: Some(dec!(29.99)),
            min_price: Some(dec!(20.00)),
            max_price: Some(dec!(50.00)),
            default_price: None,
            strategy_id: Some("2".into()),
            item_condition: "new".into(),
            fulfillment_channel: FulfillmentChannel::Amazon,
            status: ListingStatus::Active,
            quantity: 5,
            is_b2b: false,
            b2b_tiers: vec![],
            repricing_paused: false,
        }
    }

    #[test]
    fn valid_listing_passes() {
        assert!(base_listing().validate().is_ok());
    }

    #[test]
    fn inverted_bounds_rejected() {
        let mut listing = base_listing();
        listing.min_price = Some(dec!(50.00));
        listing.max_price = Some(dec!(20.00));
        assert!(matches!(
            listing.validate(),
            Err(ListingInvariantError::BoundsInverted { .. })
        ));
    }

    #[test]
    fn listed_outside_bounds_rejected() {
        let mut listing = base_listing();
        listing.listed_price = Some(dec!(100.00));
        assert!(matches!(
            listing.validate(),
            Err(ListingInvariantError::ListedOutsideBounds { .. })
        ));
    }

    #[test]
    fn equal_bounds_have_no_room() {
        let mut listing = base_listing();
        listing.min_price = Some(dec!(30.00));
        listing.max_price = Some(dec!(30.00));
        assert!(listing.bounds_have_no_room());
        assert!(!listing.bounds_consistent());
    }

    #[test]
    fn unordered_tiers_rejected() {
        let mut listing = base_listing();
        listing.b2b_tiers = vec![
            B2bTier {
                min_quantity: 10,
                price: dec!(22.00),
                min_price: None,
                max_price: None,
                default_price: None,
            },
            B2bTier {
                min_quantity: 5,
                price: dec!(24.00),
                min_price: None,
                max_price: None,
                default_price: None,
            },
        ];
        assert!(matches!(
            listing.validate(),
            Err(ListingInvariantError::TiersNotOrdered)
        ));
    }
}
