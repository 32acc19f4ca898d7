//! `OfferChange`: the canonical record C2 produces from either source payload (§3).

use std::collections::HashMap;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::listing::{B2bTier, FulfillmentChannel};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Source {
    A,
    B,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CompetitorOffer {
    pub seller_id: String,
    pub listing_price: Decimal,
    /// Present only for source A, which distinguishes listing vs. landed (shipping-inclusive) price.
    pub landed_price: Option<Decimal>,
    pub fulfillment_channel: FulfillmentChannel,
    pub is_buybox_winner: bool,
    pub sub_condition: Option<String>,
    /// Mirrors `ProductListing::b2b_tiers` on the competitor side; empty when not a B2B offer.
    pub b2b_tiers: Vec<B2bTier>,
}

impl CompetitorOffer {
    /// The price a strategy should compare against: landed price when known, else listing price (§4.2).
    pub fn comparison_price(&self) -> Decimal {
        self.landed_price.unwrap_or(self.listing_price)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OfferChange {
    pub source: Source,
    pub asin: String,
    pub our_seller_id: String,
    pub marketplace: String,
    pub item_condition: String,
    pub competitor_offers: Vec<CompetitorOffer>,
    pub buybox_winner_id: Option<String>,
    pub total_offers: u32,
    pub lowest_prices_by_channel: HashMap<String, Decimal>,
    pub buybox_price: Option<Decimal>,
}

impl OfferChange {
    /// Offers excluding anything listed under our own seller id.
    pub fn competitor_offers_excluding_us(&self) -> impl Iterator<Item = &CompetitorOffer> {
        self.competitor_offers
            .iter()
            .filter(move |o| o.seller_id != self.our_seller_id)
    }

    /// `true` when every visible offer belongs to us (§4.4 gate 6, "sole_seller_trivial").
    pub fn we_are_sole_seller(&self) -> bool {
        !self.competitor_offers.is_empty()
            && self
                .competitor_offers
                .iter()
                .all(|o| o.seller_id == self.our_seller_id)
    }
}
