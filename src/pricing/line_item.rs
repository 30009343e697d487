//! Derived fields of a single purchase-order line.
//!
//! `total_price`, `vds` and `tds` are either derived from the raw inputs
//! ([`FieldMode::Auto`]) or pinned to a value the user typed
//! ([`FieldMode::Manual`]). Manual is sticky: once a field is edited by hand
//! it is never recomputed for that line again.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::amount::{checked, parse_lenient, round2, AmountError};

const HUNDRED: Decimal = Decimal::ONE_HUNDRED;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FieldMode {
    #[default]
    Auto,
    Manual,
}

impl FieldMode {
    pub fn is_manual(self) -> bool {
        matches!(self, FieldMode::Manual)
    }
}

/// Fields a user can edit on a line.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LineField {
    Quantity,
    UnitPrice,
    Discount,
    VdsPct,
    TdsPct,
    TotalPrice,
    Vds,
    Tds,
}

/// Output of [`calculate`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub struct DerivedFields {
    pub total_price: Decimal,
    pub discount_pct: Decimal,
    pub vds: Decimal,
    pub tds: Decimal,
}

/// A line item together with its per-field override state.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct LineItem {
    pub quantity: Decimal,
    pub unit_price: Decimal,
    pub discount: Decimal,
    pub vds_pct: Decimal,
    pub tds_pct: Decimal,
    pub total_price: Decimal,
    pub discount_pct: Decimal,
    pub vds: Decimal,
    pub tds: Decimal,
    pub total_price_mode: FieldMode,
    pub vds_mode: FieldMode,
    pub tds_mode: FieldMode,
}

impl LineItem {
    pub fn new(
        quantity: Decimal,
        unit_price: Decimal,
        discount: Decimal,
        vds_pct: Decimal,
        tds_pct: Decimal,
    ) -> Result<Self, AmountError> {
        let mut item = Self {
            quantity,
            unit_price,
            discount,
            vds_pct,
            tds_pct,
            ..Default::default()
        };
        item.recalculate()?;
        Ok(item)
    }

    /// `quantity * unit_price - discount`, unrounded.
    pub fn base_amount(&self) -> Result<Decimal, AmountError> {
        checked(self.gross()?.checked_sub(self.discount), "total_price")
    }

    /// `quantity * unit_price`, unrounded.
    pub fn gross(&self) -> Result<Decimal, AmountError> {
        checked(self.quantity.checked_mul(self.unit_price), "quantity * unit_price")
    }

    /// Pins `total_price` to `value`.
    pub fn override_total_price(&mut self, value: Decimal) -> Result<(), AmountError> {
        self.edit(|item| {
            item.total_price = value;
            item.total_price_mode = FieldMode::Manual;
        })
    }

    /// Pins `vds` to `value`.
    pub fn override_vds(&mut self, value: Decimal) -> Result<(), AmountError> {
        self.edit(|item| {
            item.vds = value;
            item.vds_mode = FieldMode::Manual;
        })
    }

    /// Pins `tds` to `value`.
    pub fn override_tds(&mut self, value: Decimal) -> Result<(), AmountError> {
        self.edit(|item| {
            item.tds = value;
            item.tds_mode = FieldMode::Manual;
        })
    }

    /// Applies a raw text edit to one field and recomputes the derived ones.
    /// Unparsable input counts as zero. On error the line is left as it was.
    pub fn apply_edit(&mut self, field: LineField, raw: &str) -> Result<(), AmountError> {
        let value = parse_lenient(raw);
        match field {
            LineField::Quantity => self.edit(|item| item.quantity = value),
            LineField::UnitPrice => self.edit(|item| item.unit_price = value),
            LineField::Discount => self.edit(|item| item.discount = value),
            LineField::VdsPct => self.edit(|item| item.vds_pct = value),
            LineField::TdsPct => self.edit(|item| item.tds_pct = value),
            LineField::TotalPrice => self.override_total_price(value),
            LineField::Vds => self.override_vds(value),
            LineField::Tds => self.override_tds(value),
        }
    }

    /// Writes the output of [`calculate`] back into the line.
    pub fn recalculate(&mut self) -> Result<(), AmountError> {
        let derived = calculate(self)?;
        self.total_price = derived.total_price;
        self.discount_pct = derived.discount_pct;
        self.vds = derived.vds;
        self.tds = derived.tds;
        Ok(())
    }

    fn edit(&mut self, change: impl FnOnce(&mut Self)) -> Result<(), AmountError> {
        let mut next = self.clone();
        change(&mut next);
        next.recalculate()?;
        *self = next;
        Ok(())
    }
}

/// Computes the derived fields of `item`. Pure.
///
/// - `total_price`: manual value, else `round2(quantity * unit_price - discount)`
/// - `discount_pct`: `round2(min(discount / gross * 100, 100))` when the gross
///   amount is positive, otherwise the line's previous `discount_pct`
/// - `vds` / `tds`: manual value, else `round2(base_amount * pct / 100)`
///
/// Fails only when an intermediate product leaves the `Decimal` range.
pub fn calculate(item: &LineItem) -> Result<DerivedFields, AmountError> {
    let gross = item.gross()?;
    let base_amount = item.base_amount()?;

    let total_price = if item.total_price_mode.is_manual() {
        item.total_price
    } else {
        round2(base_amount)
    };

    let discount_pct = if gross > Decimal::ZERO {
        let share = checked(item.discount.checked_div(gross), "discount_pct")?;
        round2(checked(share.checked_mul(HUNDRED), "discount_pct")?.min(HUNDRED))
    } else {
        item.discount_pct
    };

    let vds = if item.vds_mode.is_manual() {
        item.vds
    } else {
        percent_of(base_amount, item.vds_pct, "vds")?
    };

    let tds = if item.tds_mode.is_manual() {
        item.tds
    } else {
        percent_of(base_amount, item.tds_pct, "tds")?
    };

    Ok(DerivedFields {
        total_price,
        discount_pct,
        vds,
        tds,
    })
}

fn percent_of(base: Decimal, pct: Decimal, field: &'static str) -> Result<Decimal, AmountError> {
    let scaled = checked(base.checked_mul(pct), field)?;
    Ok(round2(checked(scaled.checked_div(HUNDRED), field)?))
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn derives_all_fields_from_raw_inputs() {
        let item = LineItem::new(dec!(3), dec!(12.50), dec!(2.50), dec!(5), dec!(2)).unwrap();
        assert_eq!(item.total_price, dec!(35.00));
        assert_eq!(item.discount_pct, dec!(6.67));
        assert_eq!(item.vds, dec!(1.75));
        assert_eq!(item.tds, dec!(0.70));
    }

    #[test]
    fn discount_pct_is_capped_at_one_hundred() {
        let item = LineItem::new(dec!(1), dec!(10), dec!(25), dec!(0), dec!(0)).unwrap();
        assert_eq!(item.discount_pct, dec!(100));
    }

    #[test]
    fn discount_pct_keeps_previous_value_when_gross_is_zero() {
        let mut item = LineItem::new(dec!(2), dec!(10), dec!(5), dec!(0), dec!(0)).unwrap();
        assert_eq!(item.discount_pct, dec!(25));

        item.apply_edit(LineField::Quantity, "").unwrap();
        assert_eq!(item.discount_pct, dec!(25));

        let fresh = LineItem::new(dec!(0), dec!(10), dec!(5), dec!(0), dec!(0)).unwrap();
        assert_eq!(fresh.discount_pct, Decimal::ZERO);
    }

    #[test]
    fn manual_total_price_survives_later_input_changes() {
        let mut item = LineItem::new(dec!(2), dec!(10), dec!(0), dec!(10), dec!(0)).unwrap();
        item.apply_edit(LineField::TotalPrice, "18.333").unwrap();
        assert_eq!(item.total_price_mode, FieldMode::Manual);
        assert_eq!(item.total_price, dec!(18.333));

        item.apply_edit(LineField::Quantity, "5").unwrap();
        item.apply_edit(LineField::UnitPrice, "40").unwrap();
        assert_eq!(item.total_price, dec!(18.333));
        // vds is still derived from the real base amount
        assert_eq!(item.vds, dec!(20.00));
    }

    #[test]
    fn manual_vds_and_tds_are_independent() {
        let mut item = LineItem::new(dec!(1), dec!(100), dec!(0), dec!(5), dec!(3)).unwrap();
        item.apply_edit(LineField::Vds, "7").unwrap();
        item.apply_edit(LineField::UnitPrice, "200").unwrap();

        assert_eq!(item.vds, dec!(7));
        assert_eq!(item.tds, dec!(6.00));
        assert_eq!(item.tds_mode, FieldMode::Auto);
    }

    #[test]
    fn unparsable_inputs_read_as_zero() {
        let mut item = LineItem::new(dec!(4), dec!(5), dec!(0), dec!(0), dec!(0)).unwrap();
        item.apply_edit(LineField::UnitPrice, "n/a").unwrap();
        assert_eq!(item.total_price, Decimal::ZERO);

        item.apply_edit(LineField::Tds, "oops").unwrap();
        assert_eq!(item.tds, Decimal::ZERO);
        assert!(item.tds_mode.is_manual());
    }

    #[test]
    fn calculate_does_not_mutate() {
        let item = LineItem {
            quantity: dec!(2),
            unit_price: dec!(3),
            ..Default::default()
        };
        let derived = calculate(&item).unwrap();
        assert_eq!(derived.total_price, dec!(6));
        assert_eq!(item.total_price, Decimal::ZERO);
    }

    #[test]
    fn oversized_inputs_report_overflow_instead_of_panicking() {
        let mut item = LineItem::default();
        item.apply_edit(LineField::Quantity, "1e20").unwrap();
        assert_eq!(
            item.apply_edit(LineField::UnitPrice, "1e20"),
            Err(AmountError::Overflow("quantity * unit_price"))
        );
        // the failed edit is not half-applied
        assert_eq!(item.unit_price, Decimal::ZERO);
        assert_eq!(item.total_price, Decimal::ZERO);

        let item = LineItem {
            quantity: Decimal::MAX,
            unit_price: dec!(1),
            discount: Decimal::MIN,
            ..Default::default()
        };
        assert_eq!(calculate(&item), Err(AmountError::Overflow("total_price")));
    }
}
