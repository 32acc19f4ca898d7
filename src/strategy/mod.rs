//! C5: the strategy engine. Given a `should_reprice` decision plus the event,
//! listing, and strategy, computes the final price (or a skip reason).
//!
//! The three strategies share one interface — select a competitor, compute a
//! raw price, clamp to bounds — modeled as a closed set of variants with a
//! dispatch function rather than an inheritance tree (§9).

pub mod b2b;
pub mod bounds;

use chrono::Utc;
use rust_decimal::{Decimal, RoundingStrategy};

use crate::model::{CalculatedPrice, CompeteWith, CompetitorOffer, OfferChange, ProductListing, Strategy};

use bounds::{clamp, ClampInputs, ClampOutcome};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StrategyKind {
    OnlySeller,
    MaximiseProfit,
    ChaseBuyBox,
}

impl StrategyKind {
    pub fn name(&self) -> &'static str {
        match self {
            StrategyKind::OnlySeller => "OnlySeller",
            StrategyKind::MaximiseProfit => "MaximiseProfit",
            StrategyKind::ChaseBuyBox => "ChaseBuyBox",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum StrategyOutcome {
    Write(CalculatedPrice),
    Skip(&'static str),
}

/// Round half-up to 2 decimal places (§3, P2). `rust_decimal`'s default
/// rounding is banker's rounding; the spec calls for half-up explicitly.
pub fn round_half_up(value: Decimal) -> Decimal {
    value.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero)
}

pub fn select_strategy(event: &OfferChange, listing: &ProductListing) -> StrategyKind {
    let no_real_competitors =
        event.competitor_offers_excluding_us().next().is_none() || event.total_offers <= 1;

    if no_real_competitors {
        return StrategyKind::OnlySeller;
    }

    let we_hold_buybox = event
        .buybox_winner_id
        .as_deref()
        .is_some_and(|winner| winner == event.our_seller_id);

    if we_hold_buybox && !listing.is_b2b {
        return StrategyKind::MaximiseProfit;
    }

    StrategyKind::ChaseBuyBox
}

fn select_competitor<'a>(
    event: &'a OfferChange,
    compete_with: CompeteWith,
    item_condition: &str,
) -> Result<&'a CompetitorOffer, &'static str> {
    use crate::model::FulfillmentChannel;

    let competitor = match compete_with {
        CompeteWith::LowestPrice => event
            .competitor_offers_excluding_us()
            .min_by(|a, b| {
                a.comparison_price()
                    .cmp(&b.comparison_price())
                    .then_with(|| a.seller_id.cmp(&b.seller_id))
            }),
        CompeteWith::LowestFbaPrice => {
            let candidate = event
                .competitor_offers_excluding_us()
                .filter(|o| {
                    o.fulfillment_channel == FulfillmentChannel::Amazon
                        && o.sub_condition.as_deref().unwrap_or(item_condition) == item_condition
                })
                .min_by(|a, b| {
                    a.comparison_price()
                        .cmp(&b.comparison_price())
                        .then_with(|| a.seller_id.cmp(&b.seller_id))
                });
            if candidate.is_none() {
                return Err("no_fba_competitor");
            }
            candidate
        }
        CompeteWith::MatchBuybox => {
            let winner_id = event.buybox_winner_id.as_deref();
            event
                .competitor_offers_excluding_us()
                .find(|o| Some(o.seller_id.as_str()) == winner_id)
        }
    };

    competitor.ok_or("no_valid_competitor")
}

/// Apply the selected strategy, producing the standard `CalculatedPrice`.
/// `processing_time_ms` is stamped by the orchestrator after this returns.
pub fn apply(event: &OfferChange, listing: &ProductListing, strategy: &Strategy) -> StrategyOutcome {
    let kind = select_strategy(event, listing);

    let mut tier_competitor: Option<&CompetitorOffer> = None;

    let (raw, competitor_price) = match kind {
        StrategyKind::OnlySeller => match only_seller_raw(listing) {
            Ok(raw) => (raw, None),
            Err(reason) => return StrategyOutcome::Skip(reason),
        },
        StrategyKind::MaximiseProfit | StrategyKind::ChaseBuyBox => {
            let competitor = match select_competitor(event, strategy.compete_with, &listing.item_condition) {
                Ok(c) => c,
                Err(reason) => return StrategyOutcome::Skip(reason),
            };
            tier_competitor = Some(competitor);
            let competitor_price = competitor.comparison_price();

            let raw = match kind {
                StrategyKind::MaximiseProfit => {
                    let Some(listed) = listing.listed_price else {
                        return StrategyOutcome::Skip("already_cheaper");
                    };
                    if competitor_price <= listed {
                        return StrategyOutcome::Skip("already_cheaper");
                    }
                    competitor_price
                }
                StrategyKind::ChaseBuyBox => competitor_price + strategy.beat_by,
                StrategyKind::OnlySeller => unreachable!(),
            };
            (raw, Some(competitor_price))
        }
    };

    let raw = round_half_up(raw);

    let inputs = ClampInputs {
        raw,
        min_price: listing.min_price,
        max_price: listing.max_price,
        default_price: listing.default_price,
        competitor_price,
        min_price_rule: strategy.min_price_rule,
        max_price_rule: strategy.max_price_rule,
    };

    let final_price = match clamp(&inputs) {
        ClampOutcome::Final(price) => price,
        ClampOutcome::Skip(reason) => return StrategyOutcome::Skip(reason),
    };

    // B2B tiers are priced independently of, and in addition to, the standard
    // price above (§4.5: "standard price is always computed too").
    let tier_prices = if listing.is_b2b && !listing.b2b_tiers.is_empty() {
        match (tier_competitor, strategy.b2b_compete_for, strategy.b2b_price_rule) {
            (Some(competitor), Some(compete_for), Some(price_rule)) => b2b::price_tiers(
                &listing.b2b_tiers,
                competitor,
                compete_for,
                price_rule,
                strategy.beat_by,
                listing.min_price,
                listing.max_price,
            ),
            _ => {
                tracing::warn!(
                    asin = %listing.asin,
                    "b2b listing has tiers but no competitor or b2b strategy config, skipping tier pricing"
                );
                Vec::new()
            }
        }
    } else {
        Vec::new()
    };

    let old_price = listing.listed_price;
    let price_changed = old_price.map(round_half_up) != Some(round_half_up(final_price));

    StrategyOutcome::Write(CalculatedPrice {
        seller_id: listing.seller_id.clone(),
        sku: listing.sku.clone(),
        asin: listing.asin.clone(),
        new_price: final_price,
        old_price,
        strategy_used: kind.name().to_string(),
        strategy_id: strategy.strategy_id.clone(),
        competitor_price,
        calculated_at: Utc::now(),
        price_changed,
        processing_time_ms: 0,
        tier_prices,
    })
}

fn only_seller_raw(listing: &ProductListing) -> Result<Decimal, &'static str> {
    if let Some(default) = listing.default_price {
        return Ok(default);
    }
    match (listing.min_price, listing.max_price) {
        (Some(min), Some(max)) => Ok((min + max) / Decimal::from(2)),
        _ => Err("no_default"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{
        B2bCompeteFor, B2bPriceRule, B2bTier, FulfillmentChannel, ListingStatus, PriceBoundRule, Source,
    };
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

    fn offer(seller: &str, price: Decimal, channel: FulfillmentChannel, buybox: bool) -> CompetitorOffer {
        CompetitorOffer {
            seller_id: seller.into(),
            listing_price: price,
            landed_price: None,
            fulfillment_channel: channel,
            is_buybox_winner: buybox,
            sub_condition: None,
            b2b_tiers: vec![],
        }
    }

    fn event(offers: Vec<CompetitorOffer>, winner: Option<&str>, total: u32) -> OfferChange {
        OfferChange {
            source: Source::B,
            asin: "X1".into(),
            our_seller_id: "S1".into(),
            marketplace: "MB".into(),
            item_condition: "new".into(),
            competitor_offers: offers,
            buybox_winner_id: winner.map(String::from),
            total_offers: total,
            lowest_prices_by_channel: HashMap::new(),
            buybox_price: None,
        }
    }

    fn strategy(compete_with: CompeteWith, beat_by: Decimal) -> Strategy {
        Strategy {
            strategy_id: "2".into(),
            compete_with,
            beat_by,
            min_price_rule: PriceBoundRule::JumpToMin,
            max_price_rule: PriceBoundRule::JumpToMax,
            b2b_compete_for: None,
            b2b_price_rule: None,
        }
    }

    #[test]
    fn s1_chase_buybox_undercut() {
        let event = event(
            vec![
                offer("S2", dec!(26.50), FulfillmentChannel::Merchant, true),
                offer("S3", dec!(27.00), FulfillmentChannel::Merchant, false),
            ],
            Some("S2"),
            2,
        );
        let strategy = strategy(CompeteWith::MatchBuybox, dec!(-0.01));
        let outcome = apply(&event, &listing(), &strategy);
        match outcome {
            StrategyOutcome::Write(record) => {
                assert_eq!(record.new_price, dec!(26.49));
                assert_eq!(record.strategy_used, "ChaseBuyBox");
                assert!(record.price_changed);
            }
            other => panic!("expected write, got {other:?}"),
        }
    }

    #[test]
    fn s3_bounds_clamp_to_min() {
        let mut l = listing();
        l.min_price = Some(dec!(25.00));
        l.max_price = Some(dec!(40.00));
        l.listed_price = Some(dec!(30.00));

        let event = event(
            vec![offer("S2", dec!(10.00), FulfillmentChannel::Merchant, false)],
            None,
            2,
        );
        let strategy = strategy(CompeteWith::LowestPrice, dec!(-0.05));
        let outcome = apply(&event, &l, &strategy);
        match outcome {
            StrategyOutcome::Write(record) => assert_eq!(record.new_price, dec!(25.00)),
            other => panic!("expected write, got {other:?}"),
        }
    }

    #[test]
    fn s4_only_seller_mean() {
        let mut l = listing();
        l.min_price = Some(dec!(10.00));
        l.max_price = Some(dec!(20.00));
        l.default_price = None;

        let event = event(vec![], None, 0);
        let strategy = strategy(CompeteWith::MatchBuybox, dec!(0));
        let outcome = apply(&event, &l, &strategy);
        match outcome {
            StrategyOutcome::Write(record) => {
                assert_eq!(record.new_price, dec!(15.00));
                assert_eq!(record.strategy_used, "OnlySeller");
                assert!(record.competitor_price.is_none());
            }
            other => panic!("expected write, got {other:?}"),
        }
    }

    #[test]
    fn s5_maximise_profit_already_cheaper() {
        let mut l = listing();
        l.listed_price = Some(dec!(30.00));

        let event = event(
            vec![
                offer("S2", dec!(25.00), FulfillmentChannel::Merchant, false),
                offer("S3", dec!(26.00), FulfillmentChannel::Merchant, false),
            ],
            Some("S3"),
            2,
        );
        let strategy = strategy(CompeteWith::MatchBuybox, dec!(0));
        let outcome = apply(&event, &l, &strategy);
        assert_eq!(outcome, StrategyOutcome::Skip("already_cheaper"));
    }

    #[test]
    fn no_fba_competitor_skips() {
        let event = event(
            vec![offer("S2", dec!(26.50), FulfillmentChannel::Merchant, false)],
            None,
            2,
        );
        let strategy = strategy(CompeteWith::LowestFbaPrice, dec!(0));
        let outcome = apply(&event, &listing(), &strategy);
        assert_eq!(outcome, StrategyOutcome::Skip("no_fba_competitor"));
    }

    #[test]
    fn ties_broken_lexicographically() {
        let event = event(
            vec![
                offer("S3", dec!(20.00), FulfillmentChannel::Merchant, false),
                offer("S2", dec!(20.00), FulfillmentChannel::Merchant, false),
            ],
            None,
            2,
        );
        let strategy = strategy(CompeteWith::LowestPrice, dec!(0));
        let outcome = apply(&event, &listing(), &strategy);
        match outcome {
            StrategyOutcome::Write(record) => assert_eq!(record.competitor_price, Some(dec!(20.00))),
            other => panic!("expected write, got {other:?}"),
        }
    }

    #[test]
    fn b2b_tiers_use_shared_round_half_up() {
        let listing_tiers = vec![B2bTier {
            min_quantity: 5,
            price: dec!(24.00),
            min_price: None,
            max_price: None,
            default_price: None,
        }];
        let competitor = offer("S2", dec!(24.50), FulfillmentChannel::Merchant, false);
        let mut competitor = competitor;
        competitor.b2b_tiers = vec![B2bTier {
            min_quantity: 5,
            price: dec!(24.50),
            min_price: None,
            max_price: None,
            default_price: None,
        }];

        let priced = b2b::price_tiers(
            &listing_tiers,
            &competitor,
            B2bCompeteFor::Low,
            B2bPriceRule::BeatBy,
            dec!(-0.10),
            None,
            None,
        );
        assert_eq!(priced[0].new_price, dec!(24.40));
    }

    #[test]
    fn s6_b2b_listing_emits_tier_prices_through_apply() {
        let mut l = listing();
        l.is_b2b = true;
        l.b2b_tiers = vec![
            B2bTier {
                min_quantity: 5,
                price: dec!(24.00),
                min_price: None,
                max_price: None,
                default_price: None,
            },
            B2bTier {
                min_quantity: 10,
                price: dec!(22.00),
                min_price: None,
                max_price: None,
                default_price: None,
            },
        ];

        let mut competitor = offer("S2", dec!(26.50), FulfillmentChannel::Merchant, true);
        competitor.b2b_tiers = vec![
            B2bTier {
                min_quantity: 5,
                price: dec!(24.50),
                min_price: None,
                max_price: None,
                default_price: None,
            },
            B2bTier {
                min_quantity: 10,
                price: dec!(22.50),
                min_price: None,
                max_price: None,
                default_price: None,
            },
        ];
        let event = event(vec![competitor], Some("S2"), 2);

        let mut strategy = strategy(CompeteWith::MatchBuybox, dec!(-0.10));
        strategy.b2b_compete_for = Some(B2bCompeteFor::Low);
        strategy.b2b_price_rule = Some(B2bPriceRule::BeatBy);

        match apply(&event, &l, &strategy) {
            StrategyOutcome::Write(record) => {
                assert_eq!(record.tier_prices.len(), 2);
                assert_eq!(record.tier_prices[0].new_price, dec!(24.40));
                assert_eq!(record.tier_prices[1].new_price, dec!(22.40));
            }
            other => panic!("expected write, got {other:?}"),
        }
    }

    #[test]
    fn b2b_listing_without_tier_strategy_config_skips_tiers_not_the_record() {
        let mut l = listing();
        l.is_b2b = true;
        l.b2b_tiers = vec![B2bTier {
            min_quantity: 5,
            price: dec!(24.00),
            min_price: None,
            max_price: None,
            default_price: None,
        }];

        let event = event(
            vec![offer("S2", dec!(26.50), FulfillmentChannel::Merchant, true)],
            Some("S2"),
            2,
        );
        // compete_for/price_rule left unset.
        let strategy = strategy(CompeteWith::MatchBuybox, dec!(-0.01));

        match apply(&event, &l, &strategy) {
            StrategyOutcome::Write(record) => assert!(record.tier_prices.is_empty()),
            other => panic!("expected write, got {other:?}"),
        }
    }
}
