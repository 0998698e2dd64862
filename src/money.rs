//! Monetary arithmetic for invoice totals.
//!
//! All amounts are `rust_decimal::Decimal`; the functions here are pure and
//! cheap enough to re-run after every draft mutation. The aggregate formula
//! is fixed: `subtotal = Σ line totals`, `taxable = subtotal − discount`,
//! `tax = taxable × rate / 100`, `total = taxable + tax`.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Aggregate totals for one invoice.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct InvoiceTotals {
    pub subtotal: Decimal,
    pub discount_amount: Decimal,
    pub tax_amount: Decimal,
    pub total: Decimal,
}

impl InvoiceTotals {
    pub const ZERO: InvoiceTotals = InvoiceTotals {
        subtotal: Decimal::ZERO,
        discount_amount: Decimal::ZERO,
        tax_amount: Decimal::ZERO,
        total: Decimal::ZERO,
    };
}

/// Line total for a single item: `quantity × unit_price`.
pub fn item_total(quantity: i32, unit_price: Decimal) -> Decimal {
    Decimal::from(quantity) * unit_price
}

/// Aggregate totals over the given line totals. An empty iterator yields
/// all-zero totals; callers pass `Decimal::ZERO` for an absent rate or
/// discount.
pub fn invoice_totals<I>(
    line_totals: I,
    tax_rate_percent: Decimal,
    discount_amount: Decimal,
) -> InvoiceTotals
where
    I: IntoIterator<Item = Decimal>,
{
    let subtotal: Decimal = line_totals.into_iter().sum();
    let taxable = subtotal - discount_amount;
    let tax_amount = taxable * tax_rate_percent / Decimal::ONE_HUNDRED;

    InvoiceTotals {
        subtotal,
        discount_amount,
        tax_amount,
        total: taxable + tax_amount,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn item_total_is_quantity_times_price() {
        assert_eq!(item_total(2, dec!(50.00)), dec!(100.00));
        assert_eq!(item_total(5, dec!(19.99)), dec!(99.95));
        assert_eq!(item_total(0, dec!(19.99)), Decimal::ZERO);
    }

    #[test]
    fn empty_item_list_yields_zero_totals() {
        let totals = invoice_totals([], dec!(16), Decimal::ZERO);
        assert_eq!(totals, InvoiceTotals::ZERO);
    }

    #[test]
    fn tax_and_discount_compose() {
        // 1000 gross, 100 discount, 16% on the taxable 900.
        let totals = invoice_totals([dec!(600), dec!(400)], dec!(16), dec!(100));
        assert_eq!(totals.subtotal, dec!(1000));
        assert_eq!(totals.discount_amount, dec!(100));
        assert_eq!(totals.tax_amount, dec!(144));
        assert_eq!(totals.total, dec!(1044));
    }

    #[test]
    fn subtotal_is_sum_of_line_totals() {
        let lines = [dec!(100.00), dec!(50.00), dec!(25.00)];
        let totals = invoice_totals(lines, Decimal::ZERO, Decimal::ZERO);
        assert_eq!(totals.subtotal, dec!(175.00));
        assert_eq!(totals.total, dec!(175.00));
    }

    #[test]
    fn zero_rate_and_discount_leave_total_at_subtotal() {
        let totals = invoice_totals([dec!(42.50)], Decimal::ZERO, Decimal::ZERO);
        assert_eq!(totals.tax_amount, Decimal::ZERO);
        assert_eq!(totals.total, dec!(42.50));
    }
}
