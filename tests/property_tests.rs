//! Property-based tests for the line calculator, the order aggregator and
//! purchase-order numbering.

use procurement_api::{
    numbering::{next_po_number, sequence_of},
    pricing::{
        aggregate, calculate, parse_lenient, round2, AmountError, FieldMode, LineField, LineItem,
    },
};
use proptest::prelude::*;
use rust_decimal::Decimal;

fn money_strategy() -> impl Strategy<Value = Decimal> {
    (0i64..10_000_000).prop_map(|cents| Decimal::new(cents, 2))
}

fn quantity_strategy() -> impl Strategy<Value = Decimal> {
    (0i64..1_000_000).prop_map(|milli| Decimal::new(milli, 3))
}

fn pct_strategy() -> impl Strategy<Value = Decimal> {
    (0i64..10_000).prop_map(|hundredths| Decimal::new(hundredths, 2))
}

/// A line whose discount never exceeds its gross amount.
fn line_strategy() -> impl Strategy<Value = LineItem> {
    (
        quantity_strategy(),
        money_strategy(),
        0u32..=100,
        pct_strategy(),
        pct_strategy(),
    )
        .prop_map(|(quantity, unit_price, share, vds_pct, tds_pct)| {
            let discount = round2(quantity * unit_price * Decimal::from(share) / Decimal::ONE_HUNDRED)
                .min(quantity * unit_price);
            LineItem::new(quantity, unit_price, discount, vds_pct, tds_pct)
                .expect("strategy values stay in range")
        })
}

fn has_at_most_two_places(value: Decimal) -> bool {
    value.round_dp(2) == value
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(500))]

    #[test]
    fn auto_fields_follow_the_formulas(line in line_strategy()) {
        let base = line.quantity * line.unit_price - line.discount;
        prop_assert_eq!(line.total_price, round2(base));
        prop_assert_eq!(line.vds, round2(base * line.vds_pct / Decimal::ONE_HUNDRED));
        prop_assert_eq!(line.tds, round2(base * line.tds_pct / Decimal::ONE_HUNDRED));
        prop_assert!(line.total_price >= Decimal::ZERO);
        prop_assert!(line.vds >= Decimal::ZERO);
        prop_assert!(line.tds >= Decimal::ZERO);
        prop_assert!(line.discount_pct >= Decimal::ZERO);
        prop_assert!(line.discount_pct <= Decimal::ONE_HUNDRED);
        prop_assert!(has_at_most_two_places(line.total_price));
    }

    #[test]
    fn calculate_is_pure(line in line_strategy()) {
        prop_assert_eq!(calculate(&line), calculate(&line));
        let mut again = line.clone();
        again.recalculate().unwrap();
        prop_assert_eq!(again, line);
    }

    #[test]
    fn manual_values_survive_later_edits(
        mut line in line_strategy(),
        pinned in money_strategy(),
        quantity in quantity_strategy(),
        unit_price in money_strategy(),
    ) {
        line.override_vds(pinned).unwrap();
        line.override_total_price(pinned).unwrap();
        line.apply_edit(LineField::Quantity, &quantity.to_string()).unwrap();
        line.apply_edit(LineField::UnitPrice, &unit_price.to_string()).unwrap();
        line.apply_edit(LineField::Discount, "0").unwrap();

        prop_assert_eq!(line.vds_mode, FieldMode::Manual);
        prop_assert_eq!(line.vds, pinned);
        prop_assert_eq!(line.total_price, pinned);
        prop_assert_eq!(line.tds_mode, FieldMode::Auto);
        prop_assert_eq!(line.tds, round2(quantity * unit_price * line.tds_pct / Decimal::ONE_HUNDRED));
    }

    #[test]
    fn totals_balance_and_are_rounded(lines in prop::collection::vec(line_strategy(), 0..20)) {
        let totals = aggregate(&lines).unwrap();
        prop_assert_eq!(totals.grand_total, totals.sub_total - totals.discount);
        prop_assert!(has_at_most_two_places(totals.sub_total));
        prop_assert!(has_at_most_two_places(totals.vds_total));
        prop_assert!(has_at_most_two_places(totals.tds_total));
        prop_assert!(totals.grand_total >= Decimal::ZERO);

        let expected_sub: Decimal = lines.iter().map(|l| l.quantity * l.unit_price).sum();
        prop_assert_eq!(totals.sub_total, round2(expected_sub));
    }

    #[test]
    fn totals_ignore_line_order(lines in prop::collection::vec(line_strategy(), 0..20)) {
        let mut reversed = lines.clone();
        reversed.reverse();
        prop_assert_eq!(aggregate(&lines), aggregate(&reversed));
    }

    #[test]
    fn products_beyond_decimal_range_are_errors_not_panics(
        quantity_exp in 15u32..28,
        price_exp in 15u32..28,
    ) {
        let mut line = LineItem::default();
        let quantity = format!("1e{}", quantity_exp);
        let unit_price = format!("1e{}", price_exp);
        line.apply_edit(LineField::Quantity, &quantity).unwrap();
        let before = line.clone();

        prop_assert_eq!(
            line.apply_edit(LineField::UnitPrice, &unit_price),
            Err(AmountError::Overflow("quantity * unit_price"))
        );
        prop_assert_eq!(line, before);
    }

    #[test]
    fn parse_lenient_reads_plain_decimals(value in money_strategy(), suffix in "[a-z ]{0,4}") {
        prop_assert_eq!(parse_lenient(&value.to_string()), value);
        let with_suffix = format!("{}{}", value, suffix);
        prop_assert_eq!(parse_lenient(&with_suffix), value);
    }

    #[test]
    fn next_number_exceeds_every_existing_one(sequences in prop::collection::vec(1u64..1_000_000, 0..30)) {
        let existing: Vec<String> = sequences.iter().map(|n| format!("PO{}", n)).collect();
        let next = next_po_number(&existing);
        let max = sequences.iter().copied().max().unwrap_or(0);

        prop_assert_eq!(&next, &format!("PO{}", max + 1));
        prop_assert!(existing.iter().all(|po_no| sequence_of(po_no) < sequence_of(&next)));
        prop_assert!(!existing.contains(&next));
    }

    #[test]
    fn unreadable_numbers_never_win(garbage in "[A-Za-z]{1,8}", sequence in 1u64..1000) {
        let existing = vec![format!("PO{}", sequence), format!("PO{}", garbage)];
        prop_assert_eq!(next_po_number(&existing), format!("PO{}", sequence + 1));
    }
}
