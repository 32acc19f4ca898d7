//! Bounds-clamping sub-engine: a pure function from (raw, bounds, rule,
//! default, competitor) to a final price or a skip reason (§4.5, §9 design
//! note "decorator-based model validators → ... a bounds-clamping pure
//! function").

use rust_decimal::Decimal;

use crate::model::PriceBoundRule;

use super::round_half_up;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ClampOutcome {
    Final(Decimal),
    Skip(&'static str),
}

pub struct ClampInputs {
    pub raw: Decimal,
    pub min_price: Option<Decimal>,
    pub max_price: Option<Decimal>,
    pub default_price: Option<Decimal>,
    pub competitor_price: Option<Decimal>,
    pub min_price_rule: PriceBoundRule,
    pub max_price_rule: PriceBoundRule,
}

pub fn clamp(inputs: &ClampInputs) -> ClampOutcome {
    let out_of_bounds_low = matches!(inputs.min_price, Some(min) if inputs.raw < min);
    let out_of_bounds_high = matches!(inputs.max_price, Some(max) if inputs.raw > max);

    let final_price = if out_of_bounds_low {
        match apply_rule(inputs.min_price_rule, inputs) {
            Ok(price) => price,
            Err(reason) => return ClampOutcome::Skip(reason),
        }
    } else if out_of_bounds_high {
        match apply_rule(inputs.max_price_rule, inputs) {
            Ok(price) => price,
            Err(reason) => return ClampOutcome::Skip(reason),
        }
    } else {
        inputs.raw
    };

    // A bound rule (e.g. JUMP_TO_AVG) can produce more than 2 decimal places
    // even when `raw` itself was already rounded (§3, P2).
    let final_price = round_half_up(final_price);

    if let Some(min) = inputs.min_price {
        if final_price < min {
            return ClampOutcome::Skip("bounds_violation");
        }
    }
    if let Some(max) = inputs.max_price {
        if final_price > max {
            return ClampOutcome::Skip("bounds_violation");
        }
    }

    ClampOutcome::Final(final_price)
}

fn apply_rule(rule: PriceBoundRule, inputs: &ClampInputs) -> Result<Decimal, &'static str> {
    match rule {
        PriceBoundRule::JumpToMin => inputs.min_price.ok_or("bounds_violation"),
        PriceBoundRule::JumpToMax => inputs.max_price.ok_or("bounds_violation"),
        PriceBoundRule::JumpToAvg => match (inputs.min_price, inputs.max_price) {
            (Some(min), Some(max)) => Ok((min + max) / Decimal::from(2)),
            _ => Err("bounds_violation"),
        },
        PriceBoundRule::DefaultPrice => inputs.default_price.ok_or("bounds_violation"),
        PriceBoundRule::MatchCompetitor => inputs.competitor_price.ok_or("bounds_violation"),
        PriceBoundRule::DoNothing => Err("below_min_no_action"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn base() -> ClampInputs {
        ClampInputs {
            raw: dec!(9.95),
            min_price: Some(dec!(25.00)),
            max_price: Some(dec!(40.00)),
            default_price: None,
            competitor_price: None,
            min_price_rule: PriceBoundRule::JumpToMin,
            max_price_rule: PriceBoundRule::JumpToMax,
        }
    }

    #[test]
    fn clamps_below_min_to_min() {
        assert_eq!(clamp(&base()), ClampOutcome::Final(dec!(25.00)));
    }

    #[test]
    fn clamps_above_max_to_max() {
        let mut inputs = base();
        inputs.raw = dec!(55.00);
        assert_eq!(clamp(&inputs), ClampOutcome::Final(dec!(40.00)));
    }

    #[test]
    fn do_nothing_rule_skips() {
        let mut inputs = base();
        inputs.min_price_rule = PriceBoundRule::DoNothing;
        assert_eq!(clamp(&inputs), ClampOutcome::Skip("below_min_no_action"));
    }

    #[test]
    fn jump_to_avg() {
        let mut inputs = base();
        inputs.min_price_rule = PriceBoundRule::JumpToAvg;
        assert_eq!(clamp(&inputs), ClampOutcome::Final(dec!(32.50)));
    }

    #[test]
    fn jump_to_avg_rounds_odd_cents() {
        let mut inputs = base();
        inputs.max_price = Some(dec!(40.01));
        inputs.min_price_rule = PriceBoundRule::JumpToAvg;
        // (25.00 + 40.01) / 2 = 32.505, half-up rounds to 32.51.
        assert_eq!(clamp(&inputs), ClampOutcome::Final(dec!(32.51)));
    }

    #[test]
    fn in_bounds_passes_through() {
        let mut inputs = base();
        inputs.raw = dec!(30.00);
        assert_eq!(clamp(&inputs), ClampOutcome::Final(dec!(30.00)));
    }

    #[test]
    fn unset_default_price_rule_fails() {
        let mut inputs = base();
        inputs.min_price_rule = PriceBoundRule::DefaultPrice;
        assert_eq!(clamp(&inputs), ClampOutcome::Skip("bounds_violation"));
    }
}
