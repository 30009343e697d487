//! Purchase-order arithmetic: per-line derived fields and order totals.

pub mod amount;
pub mod line_item;
pub mod totals;

pub use amount::{parse_lenient, round2, AmountError};
pub use line_item::{calculate, DerivedFields, FieldMode, LineField, LineItem};
pub use totals::{aggregate, OrderTotals, TotalsSource};
