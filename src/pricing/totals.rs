use rust_decimal::Decimal;
use serde::Serialize;
use utoipa::ToSchema;

use super::amount::{check_order_total, checked, round2, AmountError};
use super::line_item::LineItem;

/// Order-level monetary attributes derived from the lines.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, ToSchema)]
pub struct OrderTotals {
    pub sub_total: Decimal,
    pub discount: Decimal,
    pub grand_total: Decimal,
    pub vds_total: Decimal,
    pub tds_total: Decimal,
}

/// The per-line values the aggregator reads.
pub trait TotalsSource {
    fn quantity(&self) -> Decimal;
    fn unit_price(&self) -> Decimal;
    fn discount(&self) -> Decimal;
    fn vds(&self) -> Decimal;
    fn tds(&self) -> Decimal;
}

impl TotalsSource for LineItem {
    fn quantity(&self) -> Decimal {
        self.quantity
    }
    fn unit_price(&self) -> Decimal {
        self.unit_price
    }
    fn discount(&self) -> Decimal {
        self.discount
    }
    fn vds(&self) -> Decimal {
        self.vds
    }
    fn tds(&self) -> Decimal {
        self.tds
    }
}

impl TotalsSource for crate::entities::purchase_order_detail::Model {
    fn quantity(&self) -> Decimal {
        self.quantity
    }
    fn unit_price(&self) -> Decimal {
        self.unit_price
    }
    fn discount(&self) -> Decimal {
        self.discount
    }
    fn vds(&self) -> Decimal {
        self.vds
    }
    fn tds(&self) -> Decimal {
        self.tds
    }
}

/// Sums already-calculated lines into order totals.
///
/// Sums are rounded once at the end, never per line. `grand_total` is taken
/// from the rounded `sub_total` and `discount` so that
/// `grand_total == sub_total - discount` holds for the stored values.
/// No lines gives all zeros. Totals that would not fit the order columns
/// are an error.
pub fn aggregate<'a, T, I>(lines: I) -> Result<OrderTotals, AmountError>
where
    T: TotalsSource + 'a,
    I: IntoIterator<Item = &'a T>,
{
    let mut sub_total = Decimal::ZERO;
    let mut discount = Decimal::ZERO;
    let mut vds_total = Decimal::ZERO;
    let mut tds_total = Decimal::ZERO;

    for line in lines {
        let gross = checked(line.quantity().checked_mul(line.unit_price()), "sub_total")?;
        sub_total = checked(sub_total.checked_add(gross), "sub_total")?;
        discount = checked(discount.checked_add(line.discount()), "discount")?;
        vds_total = checked(vds_total.checked_add(line.vds()), "vds_total")?;
        tds_total = checked(tds_total.checked_add(line.tds()), "tds_total")?;
    }

    let totals = OrderTotals {
        sub_total: round2(sub_total),
        discount: round2(discount),
        grand_total: checked(round2(sub_total).checked_sub(round2(discount)), "grand_total")?,
        vds_total: round2(vds_total),
        tds_total: round2(tds_total),
    };
    for (field, value) in [
        ("sub_total", totals.sub_total),
        ("discount", totals.discount),
        ("grand_total", totals.grand_total),
        ("vds_total", totals.vds_total),
        ("tds_total", totals.tds_total),
    ] {
        check_order_total(field, value)?;
    }
    Ok(totals)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn empty_order_is_all_zero() {
        let totals = aggregate::<LineItem, _>(&[]).unwrap();
        assert_eq!(totals, OrderTotals::default());
    }

    #[test]
    fn sums_lines_and_derives_grand_total() {
        let lines = vec![
            LineItem::new(dec!(3), dec!(12.50), dec!(2.50), dec!(5), dec!(2)).unwrap(),
            LineItem::new(dec!(1), dec!(99.99), dec!(0), dec!(0), dec!(10)).unwrap(),
        ];
        let totals = aggregate(&lines).unwrap();

        assert_eq!(totals.sub_total, dec!(137.49));
        assert_eq!(totals.discount, dec!(2.50));
        assert_eq!(totals.grand_total, dec!(134.99));
        assert_eq!(totals.vds_total, dec!(1.75));
        assert_eq!(totals.tds_total, dec!(10.70));
    }

    #[test]
    fn rounds_sums_not_lines() {
        // three lines of 0.333 each: per-line rounding would give 0.99
        let lines: Vec<LineItem> = (0..3)
            .map(|_| LineItem::new(dec!(1), dec!(0.333), dec!(0), dec!(0), dec!(0)).unwrap())
            .collect();
        assert_eq!(aggregate(&lines).unwrap().sub_total, dec!(1.00));
    }

    #[test]
    fn manual_vds_flows_into_total() {
        let mut line = LineItem::new(dec!(1), dec!(100), dec!(0), dec!(5), dec!(0)).unwrap();
        line.override_vds(dec!(12.345)).unwrap();
        let totals = aggregate(std::slice::from_ref(&line)).unwrap();
        assert_eq!(totals.vds_total, dec!(12.35));
    }

    #[test]
    fn totals_beyond_the_order_columns_are_rejected() {
        let big = LineItem::new(dec!(99999999), dec!(99999999), dec!(0), dec!(0), dec!(0)).unwrap();
        let lines = vec![big; 2];
        assert_eq!(
            aggregate(&lines),
            Err(AmountError::OutOfRange {
                field: "sub_total",
                limit: crate::pricing::amount::MAX_ORDER_TOTAL
            })
        );

        let huge = LineItem {
            quantity: Decimal::MAX,
            unit_price: dec!(1),
            ..Default::default()
        };
        assert_eq!(
            aggregate(&[huge.clone(), huge]),
            Err(AmountError::Overflow("sub_total"))
        );
    }
}
