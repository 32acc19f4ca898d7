//! Marketplace-A "AnyOfferChanged" queue payload (§4.2, §6).

use std::collections::HashMap;

use rust_decimal::Decimal;
use serde::Deserialize;

use crate::model::{CompetitorOffer, FulfillmentChannel, OfferChange, Source};
use crate::store::StoreGateway;

use super::NormalizeError;

#[derive(Debug, Deserialize)]
struct Envelope {
    #[serde(rename = "Payload")]
    payload: Payload,
}

#[derive(Debug, Deserialize)]
struct Payload {
    #[serde(rename = "OfferChangeTrigger")]
    offer_change_trigger: OfferChangeTrigger,
    #[serde(rename = "Summary")]
    summary: Option<Summary>,
    #[serde(rename = "Offers")]
    offers: Vec<RawOffer>,
}

#[derive(Debug, Deserialize)]
struct OfferChangeTrigger {
    #[serde(rename = "MarketplaceId")]
    marketplace_id: String,
    #[serde(rename = "ASIN")]
    asin: String,
    #[serde(rename = "ItemCondition")]
    item_condition: String,
}

#[derive(Debug, Deserialize)]
struct Summary {
    #[serde(rename = "NumberOfOffers", default)]
    number_of_offers: Vec<NumberOfOffers>,
    #[serde(rename = "LowestPrices", default)]
    lowest_prices: Vec<LowestPrice>,
    #[serde(rename = "BuyBoxPrices", default)]
    buy_box_prices: Vec<BuyBoxPrice>,
}

#[derive(Debug, Deserialize)]
struct NumberOfOffers {
    #[serde(rename = "OfferCount")]
    offer_count: u32,
}

#[derive(Debug, Deserialize)]
struct LowestPrice {
    #[serde(rename = "FulfillmentChannel")]
    fulfillment_channel: FulfillmentChannel,
    #[serde(rename = "LandedPrice")]
    landed_price: Money,
}

#[derive(Debug, Deserialize)]
struct BuyBoxPrice {
    #[serde(rename = "LandedPrice")]
    landed_price: Money,
}

#[derive(Debug, Deserialize)]
struct RawOffer {
    #[serde(rename = "SellerId")]
    seller_id: String,
    #[serde(rename = "SubCondition")]
    sub_condition: Option<String>,
    #[serde(rename = "ListingPrice")]
    listing_price: Money,
    #[serde(rename = "LandedPrice")]
    landed_price: Option<Money>,
    #[serde(rename = "IsBuyBoxWinner", default)]
    is_buy_box_winner: bool,
    #[serde(rename = "FulfillmentChannel")]
    fulfillment_channel: FulfillmentChannel,
}

#[derive(Debug, Deserialize)]
struct Money {
    #[serde(rename = "Amount")]
    amount: Decimal,
}

impl RawOffer {
    fn into_competitor_offer(self) -> CompetitorOffer {
        CompetitorOffer {
            seller_id: self.seller_id,
            listing_price: self.listing_price.amount,
            landed_price: self.landed_price.map(|m| m.amount),
            fulfillment_channel: self.fulfillment_channel,
            is_buybox_winner: self.is_buy_box_winner,
            sub_condition: self.sub_condition,
            b2b_tiers: vec![],
        }
    }
}

/// Parse and resolve a single marketplace-A notification. `our_seller_ids` is
/// the full set of seller ids this deployment operates, used as the
/// candidate pool for `StoreGateway::find_owning_seller` (§4.2, §4.6).
pub async fn normalize_source_a(
    raw: &str,
    store: &dyn StoreGateway,
    our_seller_ids: &[String],
) -> Result<OfferChange, NormalizeError> {
    let envelope: Envelope =
        serde_json::from_str(raw).map_err(|e| NormalizeError::Malformed(e.to_string()))?;

    let trigger = envelope.payload.offer_change_trigger;
    if trigger.asin.is_empty() {
        return Err(NormalizeError::MissingAsin);
    }
    if envelope.payload.offers.is_empty() {
        return Err(NormalizeError::EmptyOffers);
    }

    let our_seller_id = store
        .find_owning_seller(&trigger.asin, our_seller_ids)
        .await?
        .ok_or(NormalizeError::UnknownOwner)?;

    let buybox_winner_id = envelope
        .payload
        .offers
        .iter()
        .find(|o| o.is_buy_box_winner)
        .map(|o| o.seller_id.clone());

    let total_offers = envelope
        .payload
        .summary
        .as_ref()
        .filter(|s| !s.number_of_offers.is_empty())
        .map(|s| s.number_of_offers.iter().map(|n| n.offer_count).sum())
        .unwrap_or(envelope.payload.offers.len() as u32);

    let mut lowest_prices_by_channel: HashMap<String, Decimal> = HashMap::new();
    let mut buybox_price = None;
    if let Some(summary) = &envelope.payload.summary {
        for lp in &summary.lowest_prices {
            lowest_prices_by_channel.insert(
                format!("{:?}", lp.fulfillment_channel).to_uppercase(),
                lp.landed_price.amount,
            );
        }
        buybox_price = summary.buy_box_prices.first().map(|b| b.landed_price.amount);
    }

    let competitor_offers = envelope
        .payload
        .offers
        .into_iter()
        .map(RawOffer::into_competitor_offer)
        .collect();

    Ok(OfferChange {
        source: Source::A,
        asin: trigger.asin,
        our_seller_id,
        marketplace: trigger.marketplace_id,
        item_condition: trigger.item_condition,
        competitor_offers,
        buybox_winner_id,
        total_offers,
        lowest_prices_by_channel,
        buybox_price,
    })
}
