//! B2B tier pricing (§4.5 "B2B tier pricing"). Each listing tier is priced
//! independently against a tier-matched competitor tier; a failure on one
//! tier logs and continues, the standard (non-tier) price is always computed
//! separately in `crate::strategy`.

use rust_decimal::Decimal;
use tracing::warn;

use crate::model::{B2bCompeteFor, B2bPriceRule, B2bTier, CalculatedPriceTier, CompetitorOffer};

use super::bounds::{clamp, ClampInputs, ClampOutcome};

/// Price every tier on `listing_tiers` against the chosen competitor's tiers,
/// skipping (and logging) any tier that has no match or fails bounds.
pub fn price_tiers(
    listing_tiers: &[B2bTier],
    competitor: &CompetitorOffer,
    compete_for: B2bCompeteFor,
    price_rule: B2bPriceRule,
    beat_by: Decimal,
    listing_min: Option<Decimal>,
    listing_max: Option<Decimal>,
) -> Vec<CalculatedPriceTier> {
    let mut out = Vec::with_capacity(listing_tiers.len());

    for tier in listing_tiers {
        let Some(competitor_tier) = select_competitor_tier(&competitor.b2b_tiers, tier.min_quantity, compete_for)
        else {
            warn!(min_quantity = tier.min_quantity, "no matching competitor b2b tier, skipping");
            continue;
        };

        let raw = match price_rule {
            B2bPriceRule::Average => (tier.price + competitor_tier.price) / Decimal::from(2),
            B2bPriceRule::BeatBy => competitor_tier.price + beat_by,
        };
        let raw = super::round_half_up(raw);

        let inputs = ClampInputs {
            raw,
            min_price: tier.min_price.or(listing_min),
            max_price: tier.max_price.or(listing_max),
            default_price: tier.default_price,
            competitor_price: Some(competitor_tier.price),
            min_price_rule: crate::model::PriceBoundRule::JumpToMin,
            max_price_rule: crate::model::PriceBoundRule::JumpToMax,
        };

        match clamp(&inputs) {
            ClampOutcome::Final(price) => out.push(CalculatedPriceTier {
                min_quantity: tier.min_quantity,
                new_price: price,
            }),
            ClampOutcome::Skip(reason) => {
                warn!(min_quantity = tier.min_quantity, reason, "b2b tier skipped");
            }
        }
    }

    out
}

/// LOW: the competitor tier whose `min_quantity` is the largest that is still
/// ≤ ours. HIGH: the smallest competitor tier whose `min_quantity` is ≥ ours.
fn select_competitor_tier(
    competitor_tiers: &[B2bTier],
    our_min_quantity: u32,
    compete_for: B2bCompeteFor,
) -> Option<&B2bTier> {
    match compete_for {
        B2bCompeteFor::Low => competitor_tiers
            .iter()
            .filter(|t| t.min_quantity <= our_min_quantity)
            .max_by_key(|t| t.min_quantity),
        B2bCompeteFor::High => competitor_tiers
            .iter()
            .filter(|t| t.min_quantity >= our_min_quantity)
            .min_by_key(|t| t.min_quantity),
    }
}
