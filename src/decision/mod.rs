//! C4: the decision engine. Pure function of (event, listing, strategy) to a
//! should-reprice verdict — no I/O, no store access (that already happened
//! in C3's "Read" step).
//!
//! `MaximiseProfit` (§9 design note c) is a selectable strategy mode for a
//! configuration where self-competing sub-accounts are excluded upstream; the
//! gates below make it unreachable from the default self-competing-buybox
//! check, which is intentional and documented rather than silently dropped.

use crate::model::{CompeteWith, OfferChange, ProductListing, Strategy};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RepricingDecision {
    pub should_reprice: bool,
    pub reason: &'static str,
}

impl RepricingDecision {
    fn skip(reason: &'static str) -> Self {
        Self {
            should_reprice: false,
            reason,
        }
    }

    fn ok() -> Self {
        Self {
            should_reprice: true,
            reason: "ok",
        }
    }
}

/// Run the ordered eligibility/self-competition gates (§4.4). `listing` and
/// `strategy` must already have resolved successfully in C3's read step.
pub fn decide(event: &OfferChange, listing: &ProductListing, strategy: &Strategy) -> RepricingDecision {
    use crate::model::ListingStatus;

    if listing.status != ListingStatus::Active {
        return RepricingDecision::skip("inactive");
    }
    if listing.repricing_paused {
        return RepricingDecision::skip("paused");
    }
    if listing.quantity <= 0 {
        return RepricingDecision::skip("out_of_stock");
    }
    if listing.strategy_id.is_none() {
        return RepricingDecision::skip("strategy_missing");
    }
    if !listing.bounds_consistent() || listing.bounds_have_no_room() {
        return RepricingDecision::skip("no_price_room");
    }

    if let Some(winner) = &event.buybox_winner_id {
        if winner == &event.our_seller_id {
            return RepricingDecision::skip("self_competing_buybox");
        }
    }

    let is_only_seller = event.competitor_offers_excluding_us().next().is_none()
        || event.total_offers <= 1;

    if event.we_are_sole_seller() && !is_only_seller {
        return RepricingDecision::skip("sole_seller_trivial");
    }

    match strategy.compete_with {
        CompeteWith::LowestPrice => {
            if let Some(lowest) = lowest_visible_price(event) {
                if let Some(ours) = our_own_price(event) {
                    if ours <= lowest {
                        return RepricingDecision::skip("self_competing_lowest");
                    }
                }
            }
        }
        CompeteWith::LowestFbaPrice => {
            if let Some(lowest) = lowest_fba_price(event) {
                if let Some(ours) = our_own_fba_price(event) {
                    if ours <= lowest {
                        return RepricingDecision::skip("self_competing_fba_lowest");
                    }
                }
            }
        }
        CompeteWith::MatchBuybox => {}
    }

    RepricingDecision::ok()
}

fn lowest_visible_price(event: &OfferChange) -> Option<rust_decimal::Decimal> {
    event
        .competitor_offers
        .iter()
        .map(|o| o.comparison_price())
        .min()
}

fn our_own_price(event: &OfferChange) -> Option<rust_decimal::Decimal> {
    event
        .competitor_offers
        .iter()
        .find(|o| o.seller_id == event.our_seller_id)
        .map(|o| o.comparison_price())
}

fn lowest_fba_price(event: &OfferChange) -> Option<rust_decimal::Decimal> {
    use crate::model::FulfillmentChannel;
    event
        .competitor_offers
        .iter()
        .filter(|o| o.fulfillment_channel == FulfillmentChannel::Amazon)
        .map(|o| o.comparison_price())
        .min()
}

fn our_own_fba_price(event: &OfferChange) -> Option<rust_decimal::Decimal> {
    use crate::model::FulfillmentChannel;
    event
        .competitor_offers
        .iter()
        .find(|o| o.seller_id == event.our_seller_id && o.fulfillment_channel == FulfillmentChannel::Amazon)
        .map(|o| o.comparison_price())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{CompetitorOffer, FulfillmentChannel, ListingStatus, Source};
    use rust_decimal_macros::dec;
    use std::collections::HashMap;

    fn listing() -> ProductListing {
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

    fn strategy() -> Strategy {
        Strategy {
            strategy_id: "2".into(),
            compete_with: CompeteWith::MatchBuybox,
            beat_by: dec!(-0.01),
            min_price_rule: crate::model::PriceBoundRule::JumpToMin,
            max_price_rule: crate::model::PriceBoundRule::JumpToMax,
            b2b_compete_for: None,
            b2b_price_rule: None,
        }
    }

    fn offer(seller: &str, price: rust_decimal::Decimal, buybox: bool) -> CompetitorOffer {
        CompetitorOffer {
            seller_id: seller.into(),
            listing_price: price,
            landed_price: None,
            fulfillment_channel: FulfillmentChannel::Merchant,
            is_buybox_winner: buybox,
            sub_condition: None,
            b2b_tiers: vec![],
        }
    }

    fn base_event() -> OfferChange {
        OfferChange {
            source: Source::B,
            asin: "X1".into(),
            our_seller_id: "S1".into(),
            marketplace: "MB".into(),
            item_condition: "new".into(),
            competitor_offers: vec![offer("S2", dec!(26.50), true), offer("S3", dec!(27.00), false)],
            buybox_winner_id: Some("S2".into()),
            total_offers: 2,
            lowest_prices_by_channel: HashMap::new(),
            buybox_price: Some(dec!(26.50)),
        }
    }

    #[test]
    fn passes_all_gates() {
        let decision = decide(&base_event(), &listing(), &strategy());
        assert_eq!(decision, RepricingDecision::ok());
    }

    #[test]
    fn self_competing_buybox_skips() {
        let mut event = base_event();
        event.buybox_winner_id = Some("S1".into());
        let decision = decide(&event, &listing(), &strategy());
        assert_eq!(decision.reason, "self_competing_buybox");
        assert!(!decision.should_reprice);
    }

    #[test]
    fn out_of_stock_skips() {
        let mut l = listing();
        l.quantity = 0;
        let decision = decide(&base_event(), &l, &strategy());
        assert_eq!(decision.reason, "out_of_stock");
    }

    #[test]
    fn paused_skips() {
        let mut l = listing();
        l.repricing_paused = true;
        let decision = decide(&base_event(), &l, &strategy());
        assert_eq!(decision.reason, "paused");
    }

    #[test]
    fn equal_bounds_have_no_room_skips() {
        let mut l = listing();
        l.min_price = Some(dec!(30.00));
        l.max_price = Some(dec!(30.00));
        let decision = decide(&base_event(), &l, &strategy());
        assert_eq!(decision.reason, "no_price_room");
    }

    #[test]
    fn sole_seller_skips_for_competitive_strategy() {
        let mut event = base_event();
        event.competitor_offers = vec![offer("S1", dec!(26.50), true)];
        event.buybox_winner_id = Some("S1".into());
        let decision = decide(&event, &listing(), &strategy());
        // buybox gate fires first, since we are also the buybox winner here.
        assert_eq!(decision.reason, "self_competing_buybox");
    }

    #[test]
    fn self_competing_lowest_skips() {
        let mut event = base_event();
        event.competitor_offers.push(offer("S1", dec!(20.00), false));
        event.buybox_winner_id = Some("S2".into());
        let mut strat = strategy();
        strat.compete_with = CompeteWith::LowestPrice;
        let decision = decide(&event, &listing(), &strat);
        assert_eq!(decision.reason, "self_competing_lowest");
    }
}
