//! Print price model
//!
//! Pure pricing arithmetic for per-file print configurations. Rates come
//! from the stationary service; a fixed fallback table is substituted when
//! the lookup fails, and nothing downstream distinguishes the two.

use crate::config::FileConfig;
use serde::{Deserialize, Serialize};

/// Flat per-order platform charge, in the smallest displayed currency unit.
pub const PLATFORM_FEE: u64 = 5;

/// Flat charge added for delivery orders only.
pub const DELIVERY_FEE: u64 = 20;

/// Per-shop printing rate table.
///
/// All rates are integers in the smallest displayed currency unit. Unsigned
/// fields make the "rates are non-negative" invariant unrepresentable
/// rather than merely checked.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PrintingRates {
    pub color_rate: u32,
    pub bw_rate: u32,
    pub duplex_extra: u32,
    pub hardbind_rate: u32,
    pub spiral_rate: u32,
}

impl PrintingRates {
    /// The hardcoded table used whenever the live lookup fails.
    ///
    /// Shape-identical to a live table; callers must not branch on origin.
    pub const fn fallback() -> Self {
        Self {
            color_rate: 10,
            bw_rate: 2,
            duplex_extra: 1,
            hardbind_rate: 40,
            spiral_rate: 20,
        }
    }
}

impl Default for PrintingRates {
    fn default() -> Self {
        Self::fallback()
    }
}

/// How an order is fulfilled; drives the delivery fee.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum FulfillmentMode {
    Takeaway,
    Delivery,
}

/// Price one file's print configuration against a rate table.
///
/// Base rate is color or B&W, then duplex, spiral, and hardbind surcharges
/// are added in that order, and the result is multiplied by quantity. No
/// rounding; the inputs are already in the smallest currency unit.
pub fn compute_price(config: &FileConfig, rates: &PrintingRates) -> u64 {
    let mut base: u64 = if config.coloured {
        rates.color_rate as u64
    } else {
        rates.bw_rate as u64
    };
    if config.duplex {
        base += rates.duplex_extra as u64;
    }
    if config.spiral {
        base += rates.spiral_rate as u64;
    }
    if config.hardbind {
        base += rates.hardbind_rate as u64;
    }
    // No quantity maximum is enforced, so cap instead of wrapping
    base.saturating_mul(config.quantity() as u64)
}

/// Total payable for an order: item subtotal plus the flat platform fee
/// plus, for delivery, the flat delivery fee. Strictly additive.
pub fn order_total(subtotal: u64, mode: FulfillmentMode) -> u64 {
    let delivery = match mode {
        FulfillmentMode::Delivery => DELIVERY_FEE,
        FulfillmentMode::Takeaway => 0,
    };
    subtotal + delivery + PLATFORM_FEE
}

/// Human-readable price breakdown lines for one configuration, in display
/// order: base rate, surcharges, then quantity when above one.
pub fn price_breakdown(config: &FileConfig, rates: &PrintingRates) -> Vec<String> {
    let mut lines = Vec::new();

    if config.coloured {
        lines.push(format!("Color: ₹{}", rates.color_rate));
    } else {
        lines.push(format!("B&W: ₹{}", rates.bw_rate));
    }
    if config.duplex {
        lines.push(format!("Duplex: +₹{}", rates.duplex_extra));
    }
    if config.spiral {
        lines.push(format!("Spiral: +₹{}", rates.spiral_rate));
    }
    if config.hardbind {
        lines.push(format!("Hard Bind: +₹{}", rates.hardbind_rate));
    }
    if config.quantity() > 1 {
        lines.push(format!("Qty: {}", config.quantity()));
    }

    lines
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use proptest::prelude::*;

    fn config(
        coloured: bool,
        duplex: bool,
        spiral: bool,
        hardbind: bool,
        quantity: u32,
    ) -> FileConfig {
        let mut c = FileConfig::new(Vec::new(), "test.pdf");
        c.coloured = coloured;
        c.duplex = duplex;
        c.spiral = spiral;
        c.hardbind = hardbind;
        c.set_quantity(quantity).unwrap();
        c
    }

    #[test]
    fn test_bw_single_copy_uses_bw_rate() {
        let c = config(false, false, false, false, 1);
        assert_eq!(compute_price(&c, &PrintingRates::fallback()), 2);
    }

    #[test]
    fn test_color_single_copy_uses_color_rate() {
        let c = config(true, false, false, false, 1);
        assert_eq!(compute_price(&c, &PrintingRates::fallback()), 10);
    }

    #[test]
    fn test_all_options_sum_before_quantity() {
        // (10 + 1 + 20 + 40) * 3
        let c = config(true, true, true, true, 3);
        assert_eq!(compute_price(&c, &PrintingRates::fallback()), 213);
    }

    #[test]
    fn test_fallback_rates_bw_quantity_one_is_two() {
        let c = config(false, false, false, false, 1);
        assert_eq!(compute_price(&c, &PrintingRates::default()), 2);
    }

    #[test]
    fn test_extreme_rates_and_quantity_saturate_instead_of_wrapping() {
        let rates = PrintingRates {
            color_rate: u32::MAX,
            bw_rate: u32::MAX,
            duplex_extra: u32::MAX,
            hardbind_rate: u32::MAX,
            spiral_rate: u32::MAX,
        };
        let c = config(true, true, true, true, u32::MAX);
        assert_eq!(compute_price(&c, &rates), u64::MAX);
    }

    #[test]
    fn test_compute_price_is_idempotent() {
        let c = config(true, false, true, false, 7);
        let rates = PrintingRates::fallback();
        assert_eq!(compute_price(&c, &rates), compute_price(&c, &rates));
    }

    #[test]
    fn test_order_total_takeaway_adds_platform_fee_only() {
        assert_eq!(order_total(100, FulfillmentMode::Takeaway), 105);
    }

    #[test]
    fn test_order_total_delivery_adds_both_fees() {
        assert_eq!(order_total(100, FulfillmentMode::Delivery), 125);
    }

    #[test]
    fn test_breakdown_bw_no_options() {
        let c = config(false, false, false, false, 1);
        let lines = price_breakdown(&c, &PrintingRates::fallback());
        assert_eq!(lines, vec!["B&W: ₹2".to_string()]);
    }

    #[test]
    fn test_breakdown_all_options_with_quantity() {
        let c = config(true, true, true, true, 4);
        let lines = price_breakdown(&c, &PrintingRates::fallback());
        assert_eq!(
            lines,
            vec![
                "Color: ₹10".to_string(),
                "Duplex: +₹1".to_string(),
                "Spiral: +₹20".to_string(),
                "Hard Bind: +₹40".to_string(),
                "Qty: 4".to_string(),
            ]
        );
    }

    #[test]
    fn test_fulfillment_mode_serializes_screaming_case() {
        assert_eq!(
            serde_json::to_string(&FulfillmentMode::Takeaway).unwrap(),
            "\"TAKEAWAY\""
        );
        assert_eq!(
            serde_json::to_string(&FulfillmentMode::Delivery).unwrap(),
            "\"DELIVERY\""
        );
    }

    #[test]
    fn test_rates_deserialize_wire_shape() {
        let json = r#"{"colorRate":12,"bwRate":3,"duplexExtra":2,"hardbindRate":50,"spiralRate":25}"#;
        let rates: PrintingRates = serde_json::from_str(json).unwrap();
        assert_eq!(rates.color_rate, 12);
        assert_eq!(rates.spiral_rate, 25);
    }

    proptest! {
        #[test]
        fn prop_enabling_any_flag_never_decreases_price(
            coloured in any::<bool>(),
            duplex in any::<bool>(),
            spiral in any::<bool>(),
            hardbind in any::<bool>(),
            quantity in 1u32..100,
        ) {
            let rates = PrintingRates::fallback();
            let base = config(coloured, duplex, spiral, hardbind, quantity);
            let price = compute_price(&base, &rates);

            for flag in 0..3 {
                let mut flipped = base.clone();
                match flag {
                    0 => flipped.duplex = true,
                    1 => flipped.spiral = true,
                    _ => flipped.hardbind = true,
                }
                prop_assert!(compute_price(&flipped, &rates) >= price);
            }
        }

        #[test]
        fn prop_quantity_increment_adds_exactly_base(
            coloured in any::<bool>(),
            duplex in any::<bool>(),
            spiral in any::<bool>(),
            hardbind in any::<bool>(),
            quantity in 1u32..100,
        ) {
            let rates = PrintingRates::fallback();
            let one = config(coloured, duplex, spiral, hardbind, 1);
            let per_copy = compute_price(&one, &rates);

            let n = config(coloured, duplex, spiral, hardbind, quantity);
            let n_plus = config(coloured, duplex, spiral, hardbind, quantity + 1);
            prop_assert_eq!(
                compute_price(&n_plus, &rates) - compute_price(&n, &rates),
                per_copy
            );
        }
    }
}
