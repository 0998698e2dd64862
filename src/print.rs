//! Printable HTML rendering for a single invoice.
//!
//! The export surface is a self-contained HTML document opened in a new
//! tab; the browser's print dialog does the rest. No PDF binary is
//! produced.

use crate::services::invoices::InvoiceResponse;

/// Escapes text interpolated into the document.
fn escape(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    for c in raw.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

/// Renders one invoice as a self-contained printable document.
pub fn render_invoice_html(invoice: &InvoiceResponse) -> String {
    let customer_block = match &invoice.customer {
        Some(c) => {
            let mut lines = vec![escape(&c.company_name)];
            if let Some(person) = &c.contact_person {
                lines.push(escape(person));
            }
            if let Some(email) = &c.email {
                lines.push(escape(email));
            }
            lines.join("<br>")
        }
        None => String::from("&mdash;"),
    };

    let rows: String = invoice
        .items
        .iter()
        .map(|item| {
            format!(
                "<tr><td>{name}</td><td>{description}</td><td class=\"num\">{quantity}</td>\
                 <td>{unit}</td><td class=\"num\">{unit_price}</td><td class=\"num\">{total}</td></tr>",
                name = escape(&item.name),
                description = escape(item.description.as_deref().unwrap_or("")),
                quantity = item.quantity,
                unit = escape(&item.unit),
                unit_price = item.unit_price,
                total = item.total,
            )
        })
        .collect();

    let notes_block = invoice
        .notes
        .as_deref()
        .filter(|n| !n.trim().is_empty())
        .map(|n| format!("<section class=\"notes\"><h3>Notes</h3><p>{}</p></section>", escape(n)))
        .unwrap_or_default();

    let payment_block = invoice
        .payment_details
        .as_deref()
        .filter(|p| !p.trim().is_empty())
        .map(|p| {
            format!(
                "<section class=\"notes\"><h3>Payment details</h3><p>{}</p></section>",
                escape(p)
            )
        })
        .unwrap_or_default();

    format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
<meta charset="utf-8">
<title>{number}</title>
<style>
  body {{ font-family: Helvetica, Arial, sans-serif; margin: 2.5rem; color: #1a1a1a; }}
  header {{ display: flex; justify-content: space-between; align-items: baseline; }}
  h1 {{ font-size: 1.4rem; margin: 0; }}
  .status {{ text-transform: uppercase; letter-spacing: 0.05em; font-size: 0.8rem; }}
  .meta {{ margin: 1.5rem 0; line-height: 1.5; }}
  table {{ width: 100%; border-collapse: collapse; margin-top: 1rem; }}
  th, td {{ text-align: left; padding: 0.4rem 0.6rem; border-bottom: 1px solid #ddd; }}
  th.num, td.num {{ text-align: right; }}
  tfoot td {{ border-bottom: none; font-weight: bold; }}
  .totals {{ margin-top: 1rem; margin-left: auto; width: 40%; }}
  .totals td {{ border-bottom: none; padding: 0.2rem 0.6rem; }}
  .notes {{ margin-top: 2rem; }}
  .notes h3 {{ font-size: 0.9rem; text-transform: uppercase; }}
  @media print {{ body {{ margin: 1rem; }} }}
</style>
</head>
<body onload="window.print()">
<header>
  <h1>Invoice {number}</h1>
  <span class="status">{status}</span>
</header>
<div class="meta">
  <strong>Billed to</strong><br>{customer}<br><br>
  Issue date: {issue_date}<br>
  Due date: {due_date}<br>
  Payment terms: {payment_terms}
</div>
<table>
  <thead>
    <tr><th>Item</th><th>Description</th><th class="num">Qty</th><th>Unit</th><th class="num">Unit price</th><th class="num">Total</th></tr>
  </thead>
  <tbody>{rows}</tbody>
</table>
<table class="totals">
  <tr><td>Subtotal</td><td class="num">{subtotal}</td></tr>
  <tr><td>Discount</td><td class="num">-{discount}</td></tr>
  <tr><td>Tax ({tax_rate}%)</td><td class="num">{tax_amount}</td></tr>
  <tr><td><strong>Total</strong></td><td class="num"><strong>{total}</strong></td></tr>
</table>
{notes}
{payment}
</body>
</html>
"#,
        number = escape(&invoice.invoice_number),
        status = escape(&invoice.status),
        customer = customer_block,
        issue_date = invoice.issue_date,
        due_date = invoice.due_date,
        payment_terms = escape(invoice.payment_terms.as_deref().unwrap_or("—")),
        rows = rows,
        subtotal = invoice.subtotal,
        discount = invoice.discount_amount,
        tax_rate = invoice.tax_rate,
        tax_amount = invoice.tax_amount,
        total = invoice.total_amount,
        notes = notes_block,
        payment = payment_block,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::invoices::{CustomerSummary, InvoiceItemResponse};
    use chrono::{NaiveDate, Utc};
    use rust_decimal_macros::dec;
    use uuid::Uuid;

    fn sample_invoice() -> InvoiceResponse {
        InvoiceResponse {
            id: Uuid::new_v4(),
            invoice_number: "INV-202604-0042".to_string(),
            customer_id: Uuid::new_v4(),
            quote_id: None,
            status: "sent".to_string(),
            issue_date: NaiveDate::from_ymd_opt(2026, 4, 1).unwrap(),
            due_date: NaiveDate::from_ymd_opt(2026, 5, 1).unwrap(),
            subtotal: dec!(100.00),
            tax_rate: dec!(16),
            tax_amount: dec!(16.00),
            discount_amount: dec!(0.00),
            total_amount: dec!(116.00),
            payment_terms: Some("30 days".to_string()),
            notes: Some("Deliver to <warehouse 3>".to_string()),
            payment_details: None,
            created_at: Utc::now(),
            updated_at: None,
            sent_at: None,
            paid_at: None,
            days_overdue: 0,
            customer: Some(CustomerSummary {
                id: Uuid::new_v4(),
                company_name: "Verde & Campo".to_string(),
                contact_person: Some("Ana Robles".to_string()),
                email: None,
            }),
            items: vec![InvoiceItemResponse {
                id: Uuid::new_v4(),
                name: "Drip line 16mm".to_string(),
                description: None,
                quantity: 2,
                unit: "m".to_string(),
                unit_price: dec!(50.00),
                total: dec!(100.00),
            }],
        }
    }

    #[test]
    fn document_contains_number_items_and_totals() {
        let html = render_invoice_html(&sample_invoice());
        assert!(html.contains("INV-202604-0042"));
        assert!(html.contains("Drip line 16mm"));
        assert!(html.contains("116.00"));
        assert!(html.contains("window.print()"));
    }

    #[test]
    fn user_text_is_escaped() {
        let html = render_invoice_html(&sample_invoice());
        assert!(html.contains("Verde &amp; Campo"));
        assert!(html.contains("Deliver to &lt;warehouse 3&gt;"));
        assert!(!html.contains("<warehouse 3>"));
    }
}
