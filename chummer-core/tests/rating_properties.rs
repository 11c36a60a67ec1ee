//! Property tests for rating-scaled rule expressions.

use chummer_core::equipment::{CreateOptions, Gear};
use chummer_core::expression::{attribute_value, RuleExpression};
use chummer_core::testing::sample_context;
use proptest::prelude::*;

proptest! {
    #[test]
    fn rating_times_constant_is_exact(rating in 1i32..=100, k in 0i32..=100_000) {
        let value = RuleExpression::new(format!("Rating*{k}"))
            .with_rating(rating)
            .evaluate()
            .unwrap();
        prop_assert_eq!(value, f64::from(k) * f64::from(rating));
    }

    #[test]
    fn gear_cost_scales_with_rating_and_quantity(rating in 1i32..=6, qty in 1u32..=20) {
        let ctx = sample_context();
        let mut medkit = Gear::create_named("Medkit", None, &CreateOptions::new().with_rating(rating), &ctx)
            .unwrap();
        medkit.set_quantity(f64::from(qty));
        prop_assert_eq!(medkit.own_cost(), 250.0 * f64::from(rating) * f64::from(qty));
    }

    #[test]
    fn attribute_value_never_below_one_for_positive_force(force in 1i32..=12, offset in -10i32..=10) {
        prop_assert!(attribute_value("F-2", force, offset) >= 1);
    }
}
