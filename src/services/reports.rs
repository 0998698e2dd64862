//! Read-side projections over the invoice collection: search, status
//! filtering, sorting, overdue derivation, and dashboard aggregates.
//!
//! Everything here is pure; the persistence gateway fetches the rows and
//! these functions reduce them. Overdue is computed against a caller
//! supplied "today" so listings and tests agree on the clock.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use utoipa::ToSchema;

use crate::entities::{customer, invoice, invoice_item};
use crate::services::invoice_status::InvoiceStatus;

/// One invoice joined with its customer and line items, as fetched for
/// the list view.
#[derive(Debug, Clone)]
pub struct ListedInvoice {
    pub invoice: invoice::Model,
    pub items: Vec<invoice_item::Model>,
    pub customer: Option<customer::Model>,
}

/// Status filter for the list view. `overdue` is a derived selection,
/// not a stored status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum StatusFilter {
    #[default]
    All,
    Overdue,
    Is(InvoiceStatus),
}

impl StatusFilter {
    /// Parses the filter dropdown value; unknown values fall back to all.
    pub fn parse(raw: &str) -> Self {
        let raw = raw.trim().to_ascii_lowercase();
        match raw.as_str() {
            "" | "all" => StatusFilter::All,
            "overdue" => StatusFilter::Overdue,
            other => InvoiceStatus::from_str(other)
                .map(StatusFilter::Is)
                .unwrap_or(StatusFilter::All),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortKey {
    #[default]
    CreatedAt,
    Name,
    Status,
}

impl SortKey {
    pub fn parse(raw: &str) -> Self {
        match raw.trim().to_ascii_lowercase().as_str() {
            "name" => SortKey::Name,
            "status" => SortKey::Status,
            _ => SortKey::CreatedAt,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortOrder {
    Asc,
    Desc,
}

impl SortOrder {
    /// Default order depends on the key: newest first for dates,
    /// ascending for strings.
    pub fn default_for(key: SortKey) -> Self {
        match key {
            SortKey::CreatedAt => SortOrder::Desc,
            SortKey::Name | SortKey::Status => SortOrder::Asc,
        }
    }

    pub fn parse(raw: &str, key: SortKey) -> Self {
        match raw.trim().to_ascii_lowercase().as_str() {
            "asc" => SortOrder::Asc,
            "desc" => SortOrder::Desc,
            _ => SortOrder::default_for(key),
        }
    }
}

/// Days an invoice is past due, clamped to zero. Paid and cancelled
/// invoices are never overdue regardless of the due date.
pub fn days_overdue(due_date: NaiveDate, status: InvoiceStatus, today: NaiveDate) -> i64 {
    match status {
        InvoiceStatus::Paid | InvoiceStatus::Cancelled => 0,
        _ => (today - due_date).num_days().max(0),
    }
}

fn listed_days_overdue(entry: &ListedInvoice, today: NaiveDate) -> i64 {
    match InvoiceStatus::parse(&entry.invoice.status) {
        Ok(status) => days_overdue(entry.invoice.due_date, status, today),
        Err(_) => 0,
    }
}

/// Case-insensitive substring search over invoice number, customer
/// company name, and contact person. A blank query keeps everything.
pub fn filter_by_search(entries: Vec<ListedInvoice>, query: &str) -> Vec<ListedInvoice> {
    let needle = query.trim().to_lowercase();
    if needle.is_empty() {
        return entries;
    }

    entries
        .into_iter()
        .filter(|entry| {
            if entry.invoice.invoice_number.to_lowercase().contains(&needle) {
                return true;
            }
            match &entry.customer {
                Some(c) => {
                    c.company_name.to_lowercase().contains(&needle)
                        || c.contact_person
                            .as_deref()
                            .is_some_and(|p| p.to_lowercase().contains(&needle))
                }
                None => false,
            }
        })
        .collect()
}

/// Exact status match, `all`, or the derived overdue selection.
pub fn filter_by_status(
    entries: Vec<ListedInvoice>,
    filter: StatusFilter,
    today: NaiveDate,
) -> Vec<ListedInvoice> {
    match filter {
        StatusFilter::All => entries,
        StatusFilter::Overdue => entries
            .into_iter()
            .filter(|entry| listed_days_overdue(entry, today) > 0)
            .collect(),
        StatusFilter::Is(status) => {
            let wanted = status.to_string();
            entries
                .into_iter()
                .filter(|entry| entry.invoice.status == wanted)
                .collect()
        }
    }
}

fn company_name_folded(entry: &ListedInvoice) -> String {
    entry
        .customer
        .as_ref()
        .map(|c| c.company_name.to_lowercase())
        .unwrap_or_default()
}

/// Stable sort by the requested key; string keys compare case-folded.
pub fn sort_invoices(entries: &mut [ListedInvoice], key: SortKey, order: SortOrder) {
    entries.sort_by(|a, b| {
        let ordering = match key {
            SortKey::CreatedAt => a.invoice.created_at.cmp(&b.invoice.created_at),
            SortKey::Name => company_name_folded(a).cmp(&company_name_folded(b)),
            SortKey::Status => a.invoice.status.cmp(&b.invoice.status),
        };
        match order {
            SortOrder::Asc => ordering,
            SortOrder::Desc => ordering.reverse(),
        }
    });
}

/// Dashboard aggregates over the full collection.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct InvoiceStats {
    pub total_invoices: u64,
    /// Sum of totals still owed (status neither paid nor cancelled)
    pub total_outstanding: Decimal,
    /// Sum of totals already collected
    pub total_paid: Decimal,
    pub overdue_count: u64,
}

pub fn compute_stats(entries: &[ListedInvoice], today: NaiveDate) -> InvoiceStats {
    let mut stats = InvoiceStats {
        total_invoices: entries.len() as u64,
        total_outstanding: Decimal::ZERO,
        total_paid: Decimal::ZERO,
        overdue_count: 0,
    };

    for entry in entries {
        match InvoiceStatus::parse(&entry.invoice.status) {
            Ok(InvoiceStatus::Paid) => stats.total_paid += entry.invoice.total_amount,
            Ok(InvoiceStatus::Cancelled) => {}
            Ok(status) => {
                stats.total_outstanding += entry.invoice.total_amount;
                if days_overdue(entry.invoice.due_date, status, today) > 0 {
                    stats.overdue_count += 1;
                }
            }
            Err(_) => {}
        }
    }

    stats
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone, Utc};
    use rust_decimal_macros::dec;
    use std::cmp::Ordering;
    use uuid::Uuid;

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 4, 10).unwrap()
    }

    fn entry(
        number: &str,
        company: &str,
        status: InvoiceStatus,
        due: NaiveDate,
        total: Decimal,
        created_offset_mins: i64,
    ) -> ListedInvoice {
        let customer_id = Uuid::new_v4();
        let created = Utc.with_ymd_and_hms(2026, 4, 1, 12, 0, 0).unwrap()
            + Duration::minutes(created_offset_mins);
        ListedInvoice {
            invoice: invoice::Model {
                id: Uuid::new_v4(),
                invoice_number: number.to_string(),
                customer_id,
                quote_id: None,
                status: status.to_string(),
                issue_date: due - Duration::days(30),
                due_date: due,
                subtotal: total,
                tax_rate: Decimal::ZERO,
                tax_amount: Decimal::ZERO,
                discount_amount: Decimal::ZERO,
                total_amount: total,
                payment_terms: None,
                notes: None,
                payment_details: None,
                created_at: created,
                updated_at: None,
                sent_at: None,
                paid_at: None,
            },
            items: Vec::new(),
            customer: Some(customer::Model {
                id: customer_id,
                company_name: company.to_string(),
                contact_person: Some("Ana Robles".to_string()),
                email: None,
                phone: None,
                created_at: created,
            }),
        }
    }

    #[test]
    fn overdue_is_one_day_after_due_date() {
        let due = today() - Duration::days(1);
        assert_eq!(days_overdue(due, InvoiceStatus::Sent, today()), 1);
    }

    #[test]
    fn paid_is_never_overdue() {
        let due = today() - Duration::days(90);
        assert_eq!(days_overdue(due, InvoiceStatus::Paid, today()), 0);
    }

    #[test]
    fn future_due_date_clamps_to_zero() {
        let due = today() + Duration::days(7);
        assert_eq!(days_overdue(due, InvoiceStatus::Sent, today()), 0);
    }

    #[test]
    fn search_matches_number_company_and_contact() {
        let entries = vec![
            entry("INV-202604-0001", "AquaRiego SA", InvoiceStatus::Sent, today(), dec!(100), 0),
            entry("INV-202604-0002", "Verde Campo", InvoiceStatus::Sent, today(), dec!(200), 1),
        ];

        let by_number = filter_by_search(entries.clone(), "0002");
        assert_eq!(by_number.len(), 1);
        assert_eq!(by_number[0].invoice.invoice_number, "INV-202604-0002");

        let by_company = filter_by_search(entries.clone(), "aquariego");
        assert_eq!(by_company.len(), 1);

        let by_contact = filter_by_search(entries.clone(), "robles");
        assert_eq!(by_contact.len(), 2);

        let blank = filter_by_search(entries, "  ");
        assert_eq!(blank.len(), 2);
    }

    #[test]
    fn all_filter_returns_everything() {
        let entries = vec![
            entry("INV-1", "A", InvoiceStatus::Draft, today(), dec!(1), 0),
            entry("INV-2", "B", InvoiceStatus::Paid, today(), dec!(2), 1),
        ];
        assert_eq!(
            filter_by_status(entries.clone(), StatusFilter::All, today()).len(),
            entries.len()
        );
    }

    #[test]
    fn overdue_filter_selects_derived_overdue_rows() {
        let entries = vec![
            entry("INV-1", "A", InvoiceStatus::Sent, today() - Duration::days(3), dec!(1), 0),
            entry("INV-2", "B", InvoiceStatus::Sent, today() + Duration::days(3), dec!(2), 1),
            entry("INV-3", "C", InvoiceStatus::Paid, today() - Duration::days(3), dec!(3), 2),
        ];
        let overdue = filter_by_status(entries, StatusFilter::Overdue, today());
        assert_eq!(overdue.len(), 1);
        assert_eq!(overdue[0].invoice.invoice_number, "INV-1");
    }

    #[test]
    fn sorting_twice_is_idempotent() {
        let mut entries = vec![
            entry("INV-1", "Verde Campo", InvoiceStatus::Sent, today(), dec!(1), 2),
            entry("INV-2", "aquariego sa", InvoiceStatus::Draft, today(), dec!(2), 0),
            entry("INV-3", "Bordo Norte", InvoiceStatus::Paid, today(), dec!(3), 1),
        ];

        sort_invoices(&mut entries, SortKey::Name, SortOrder::Asc);
        let first: Vec<_> = entries
            .iter()
            .map(|e| e.invoice.invoice_number.clone())
            .collect();
        sort_invoices(&mut entries, SortKey::Name, SortOrder::Asc);
        let second: Vec<_> = entries
            .iter()
            .map(|e| e.invoice.invoice_number.clone())
            .collect();

        assert_eq!(first, second);
        assert_eq!(first, vec!["INV-2", "INV-3", "INV-1"]);
    }

    #[test]
    fn default_sort_is_created_at_descending() {
        let mut entries = vec![
            entry("INV-old", "A", InvoiceStatus::Sent, today(), dec!(1), 0),
            entry("INV-new", "B", InvoiceStatus::Sent, today(), dec!(2), 10),
        ];
        let key = SortKey::default();
        sort_invoices(&mut entries, key, SortOrder::default_for(key));
        assert_eq!(entries[0].invoice.invoice_number, "INV-new");
    }

    #[test]
    fn stats_split_outstanding_paid_and_overdue() {
        let entries = vec![
            entry("INV-1", "A", InvoiceStatus::Sent, today() - Duration::days(2), dec!(100), 0),
            entry("INV-2", "B", InvoiceStatus::Draft, today() + Duration::days(5), dec!(50), 1),
            entry("INV-3", "C", InvoiceStatus::Paid, today() - Duration::days(2), dec!(200), 2),
            entry("INV-4", "D", InvoiceStatus::Cancelled, today() - Duration::days(2), dec!(75), 3),
        ];

        let stats = compute_stats(&entries, today());
        assert_eq!(stats.total_invoices, 4);
        assert_eq!(stats.total_outstanding, dec!(150));
        assert_eq!(stats.total_paid, dec!(200));
        assert_eq!(stats.overdue_count, 1);
    }

    #[test]
    fn status_filter_parse_accepts_overdue_and_unknowns() {
        assert_eq!(StatusFilter::parse("all"), StatusFilter::All);
        assert_eq!(StatusFilter::parse("overdue"), StatusFilter::Overdue);
        assert_eq!(
            StatusFilter::parse("PAID"),
            StatusFilter::Is(InvoiceStatus::Paid)
        );
        assert_eq!(StatusFilter::parse("bogus"), StatusFilter::All);
    }

    #[test]
    fn sort_key_ordering_compares_case_folded() {
        let a = entry("INV-1", "zeta", InvoiceStatus::Sent, today(), dec!(1), 0);
        let b = entry("INV-2", "Alfa", InvoiceStatus::Sent, today(), dec!(1), 1);
        assert_eq!(
            company_name_folded(&a).cmp(&company_name_folded(&b)),
            Ordering::Greater
        );
    }
}
