//! Marketplace-B "buybox_changed" webhook payload (§4.2, §6).

use std::collections::HashMap;

use rust_decimal::Decimal;
use serde::Deserialize;

use crate::model::{CompetitorOffer, FulfillmentChannel, OfferChange, Source};

use super::NormalizeError;

#[derive(Debug, Deserialize)]
struct WebhookPayload {
    #[serde(rename = "itemId")]
    item_id: String,
    #[serde(rename = "sellerId")]
    seller_id: String,
    #[serde(rename = "currentBuyboxPrice")]
    current_buybox_price: Option<Decimal>,
    #[serde(rename = "currentBuyboxWinner")]
    current_buybox_winner: Option<String>,
    #[serde(default)]
    offers: Vec<RawOffer>,
}

#[derive(Debug, Deserialize)]
struct RawOffer {
    #[serde(rename = "sellerId")]
    seller_id: String,
    price: Decimal,
    condition: Option<String>,
}

/// Parse a single marketplace-B webhook body. Our seller id is carried
/// directly in the payload, unlike source A (§4.2).
pub fn normalize_source_b(raw: &str) -> Result<OfferChange, NormalizeError> {
    let payload: WebhookPayload =
        serde_json::from_str(raw).map_err(|e| NormalizeError::Malformed(e.to_string()))?;

    if payload.item_id.is_empty() {
        return Err(NormalizeError::MissingAsin);
    }
    if payload.offers.is_empty() {
        return Err(NormalizeError::EmptyOffers);
    }

    let total_offers = payload.offers.len() as u32;
    let item_condition = payload
        .offers
        .first()
        .and_then(|o| o.condition.clone())
        .unwrap_or_default();

    let competitor_offers: Vec<CompetitorOffer> = payload
        .offers
        .into_iter()
        .map(|o| CompetitorOffer {
            seller_id: o.seller_id,
            listing_price: o.price,
            landed_price: None,
            fulfillment_channel: FulfillmentChannel::Merchant,
            is_buybox_winner: payload
                .current_buybox_winner
                .as_deref()
                .is_some_and(|w| w == o.seller_id),
            sub_condition: o.condition,
            b2b_tiers: vec![],
        })
        .collect();

    Ok(OfferChange {
        source: Source::B,
        asin: payload.item_id,
        our_seller_id: payload.seller_id,
        marketplace: "marketplace-b".to_string(),
        item_condition,
        competitor_offers,
        buybox_winner_id: payload.current_buybox_winner,
        total_offers,
        lowest_prices_by_channel: HashMap::new(),
        buybox_price: payload.current_buybox_price,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"{
        "eventType": "buybox_changed",
        "itemId": "X1",
        "sellerId": "S1",
        "timestamp": "2026-01-01T00:00:00Z",
        "currentBuyboxPrice": "26.50",
        "currentBuyboxWinner": "S2",
        "offers": [
            {"sellerId": "S2", "price": "26.50", "condition": "new"},
            {"sellerId": "S3", "price": "27.00", "condition": "new"}
        ]
    }"#;

    #[test]
    fn parses_webhook_payload() {
        let event = normalize_source_b(SAMPLE).unwrap();
        assert_eq!(event.asin, "X1");
        assert_eq!(event.our_seller_id, "S1");
        assert_eq!(event.buybox_winner_id.as_deref(), Some("S2"));
        assert_eq!(event.total_offers, 2);
        assert_eq!(event.buybox_price, Some(rust_decimal::Decimal::new(2650, 2)));
    }

    #[test]
    fn empty_offers_rejected() {
        let raw = r#"{"itemId":"X1","sellerId":"S1","offers":[]}"#;
        let err = normalize_source_b(raw).unwrap_err();
        assert!(matches!(err, NormalizeError::EmptyOffers));
    }

    #[test]
    fn missing_item_id_rejected() {
        let raw = r#"{"itemId":"","sellerId":"S1","offers":[{"sellerId":"S2","price":"1.00"}]}"#;
        let err = normalize_source_b(raw).unwrap_err();
        assert!(matches!(err, NormalizeError::MissingAsin));
    }

    #[test]
    fn malformed_json_rejected() {
        let err = normalize_source_b("{not json}").unwrap_err();
        assert!(matches!(err, NormalizeError::Malformed(_)));
    }
}
