//! Property-based tests for the invoice arithmetic and draft invariants.
//!
//! These use proptest to verify the totals formulas across a wide range
//! of inputs, helping to catch edge cases that unit tests might miss.

use proptest::prelude::*;
use rust_decimal::Decimal;

use riego_api::draft::{DraftDefaults, InvoiceDraft, ItemPatch};
use riego_api::money::{invoice_totals, item_total};

// Strategies for generating test data

fn quantity_strategy() -> impl Strategy<Value = i32> {
    0i32..10_000
}

/// Prices with two decimal places, up to 10_000.00.
fn price_strategy() -> impl Strategy<Value = Decimal> {
    (0i64..1_000_000).prop_map(|cents| Decimal::new(cents, 2))
}

fn line_totals_strategy() -> impl Strategy<Value = Vec<Decimal>> {
    prop::collection::vec(price_strategy(), 0..20)
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(1000))]

    // Property: an item total is exactly quantity × unit price.
    #[test]
    fn item_total_is_product(quantity in quantity_strategy(), price in price_strategy()) {
        prop_assert_eq!(item_total(quantity, price), Decimal::from(quantity) * price);
    }

    // Property: the subtotal equals the sum of the line totals, whatever
    // the rate and discount.
    #[test]
    fn subtotal_is_sum_of_lines(
        lines in line_totals_strategy(),
        rate in 0u32..100,
        discount in price_strategy(),
    ) {
        let expected: Decimal = lines.iter().copied().sum();
        let totals = invoice_totals(lines, Decimal::from(rate), discount);
        prop_assert_eq!(totals.subtotal, expected);
    }

    // Property: total always equals taxable plus tax.
    #[test]
    fn total_composes_from_taxable_and_tax(
        lines in line_totals_strategy(),
        rate in 0u32..100,
        discount in price_strategy(),
    ) {
        let totals = invoice_totals(lines, Decimal::from(rate), discount);
        let taxable = totals.subtotal - totals.discount_amount;
        prop_assert_eq!(totals.tax_amount, taxable * Decimal::from(rate) / Decimal::ONE_HUNDRED);
        prop_assert_eq!(totals.total, taxable + totals.tax_amount);
    }

    // Property: a zero tax rate never produces tax.
    #[test]
    fn zero_rate_means_zero_tax(lines in line_totals_strategy(), discount in price_strategy()) {
        let totals = invoice_totals(lines, Decimal::ZERO, discount);
        prop_assert_eq!(totals.tax_amount, Decimal::ZERO);
    }
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(256))]

    // Property: no sequence of add/remove operations drops a draft below
    // one line item.
    #[test]
    fn draft_never_drops_below_one_item(ops in prop::collection::vec(any::<(bool, usize)>(), 0..40)) {
        let today = chrono::NaiveDate::from_ymd_opt(2026, 5, 1).unwrap();
        let mut draft = InvoiceDraft::new(today, &DraftDefaults::default());

        for (add, index) in ops {
            if add {
                draft.add_item();
            } else {
                let len = draft.items.len();
                draft.remove_item(index % (len + 1));
            }
            prop_assert!(!draft.items.is_empty());
        }
    }

    // Property: the draft's aggregate subtotal tracks its line totals
    // after arbitrary quantity/price edits.
    #[test]
    fn draft_totals_track_item_edits(
        edits in prop::collection::vec((0usize..4, quantity_strategy(), price_strategy()), 1..20)
    ) {
        let today = chrono::NaiveDate::from_ymd_opt(2026, 5, 1).unwrap();
        let mut draft = InvoiceDraft::new(today, &DraftDefaults::default());
        draft.add_item();
        draft.add_item();
        draft.add_item();

        for (index, quantity, price) in edits {
            draft.update_item(index, ItemPatch::Quantity(quantity)).unwrap();
            draft.update_item(index, ItemPatch::UnitPrice(price)).unwrap();
        }

        let expected: Decimal = draft.items.iter().map(|item| item.total).sum();
        prop_assert_eq!(draft.totals.subtotal, expected);
        for item in &draft.items {
            prop_assert_eq!(item.total, Decimal::from(item.quantity) * item.unit_price);
        }
    }
}
