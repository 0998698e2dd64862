//! End-to-end tests for the invoice lifecycle against an in-memory
//! SQLite database: create, fetch, edit with item replacement, status
//! transitions with timestamp stamping, listing projections, and hard
//! delete with cascade.

use std::sync::Arc;

use chrono::{Duration, Utc};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use sea_orm::{ColumnTrait, EntityTrait, QueryFilter};
use uuid::Uuid;

use riego_api::db::{self, DbConfig, DbPool};
use riego_api::draft::DraftDefaults;
use riego_api::entities::{invoice_item, invoice_item::ItemUnit};
use riego_api::errors::ServiceError;
use riego_api::services::customers::{CreateCustomerRequest, CustomerService};
use riego_api::services::invoice_status::InvoiceStatus;
use riego_api::services::invoices::{
    InvoiceForm, InvoiceItemInput, InvoiceService, ListingParams,
};
use riego_api::services::reports::{self, SortKey, SortOrder, StatusFilter};

struct TestApp {
    db: Arc<DbPool>,
    invoices: InvoiceService,
    customers: CustomerService,
}

impl TestApp {
    /// In-memory SQLite needs a single connection: every pooled
    /// connection would otherwise see its own empty database.
    async fn new() -> Self {
        let config = DbConfig {
            url: "sqlite::memory:".to_string(),
            max_connections: 1,
            min_connections: 1,
            ..Default::default()
        };
        let pool = db::establish_connection_with_config(&config)
            .await
            .expect("sqlite connection");
        db::run_migrations(&pool).await.expect("migrations");

        let db = Arc::new(pool);
        Self {
            invoices: InvoiceService::new(db.clone(), None, DraftDefaults::default()),
            customers: CustomerService::new(db.clone(), None),
            db,
        }
    }

    async fn seed_customer(&self, company: &str) -> Uuid {
        self.customers
            .create_customer(CreateCustomerRequest {
                company_name: company.to_string(),
                contact_person: Some("Ana Robles".to_string()),
                email: Some("billing@example.com".to_string()),
                phone: None,
            })
            .await
            .expect("customer created")
            .id
    }

    async fn item_row_count(&self, invoice_id: Uuid) -> usize {
        invoice_item::Entity::find()
            .filter(invoice_item::Column::InvoiceId.eq(invoice_id))
            .all(&*self.db)
            .await
            .expect("item rows")
            .len()
    }
}

fn item(name: &str, quantity: i32, unit_price: Decimal) -> InvoiceItemInput {
    InvoiceItemInput {
        id: None,
        name: name.to_string(),
        description: None,
        quantity,
        unit: ItemUnit::Pcs,
        unit_price,
    }
}

fn form(customer_id: Uuid, items: Vec<InvoiceItemInput>) -> InvoiceForm {
    InvoiceForm {
        customer_id: Some(customer_id),
        quote_id: None,
        issue_date: None,
        due_date: None,
        tax_rate: None,
        discount_amount: None,
        payment_terms: None,
        notes: None,
        payment_details: None,
        items,
        send_immediately: false,
    }
}

#[tokio::test]
async fn create_then_fetch_round_trips_totals() {
    let app = TestApp::new().await;
    let customer_id = app.seed_customer("AquaRiego SA").await;

    let mut request = form(customer_id, vec![item("A", 2, dec!(50.00))]);
    request.tax_rate = Some(dec!(10));

    let created = app.invoices.create_invoice(request).await.expect("created");
    assert_eq!(created.subtotal, dec!(100));
    assert_eq!(created.tax_amount, dec!(10));
    assert_eq!(created.total_amount, dec!(110));
    assert_eq!(created.status, "draft");
    assert!(created.sent_at.is_none());

    let pattern = regex::Regex::new(r"^INV-\d{6}-\d{4}$").unwrap();
    assert!(
        pattern.is_match(&created.invoice_number),
        "unexpected number: {}",
        created.invoice_number
    );

    let fetched = app.invoices.get_invoice(created.id).await.expect("fetched");
    assert_eq!(fetched.subtotal, dec!(100));
    assert_eq!(fetched.tax_amount, dec!(10));
    assert_eq!(fetched.total_amount, dec!(110));
    assert_eq!(fetched.items.len(), 1);
    assert_eq!(fetched.items[0].total, dec!(100));
    assert_eq!(
        fetched.customer.as_ref().map(|c| c.company_name.as_str()),
        Some("AquaRiego SA")
    );
}

#[tokio::test]
async fn send_immediately_persists_sent_with_timestamp() {
    let app = TestApp::new().await;
    let customer_id = app.seed_customer("Verde Campo").await;

    let mut request = form(customer_id, vec![item("Drip tape", 1, dec!(25))]);
    request.send_immediately = true;

    let created = app.invoices.create_invoice(request).await.expect("created");
    assert_eq!(created.status, "sent");
    assert!(created.sent_at.is_some());
}

#[tokio::test]
async fn validation_failures_never_reach_the_store() {
    let app = TestApp::new().await;

    // No customer selected.
    let request = InvoiceForm {
        customer_id: None,
        ..form(Uuid::new_v4(), vec![item("A", 1, dec!(10))])
    };
    let err = app.invoices.create_invoice(request).await.unwrap_err();
    assert!(matches!(err, ServiceError::ValidationError(_)));

    // Blank item name.
    let customer_id = app.seed_customer("Bordo Norte").await;
    let request = form(customer_id, vec![item("", 1, dec!(10))]);
    let err = app.invoices.create_invoice(request).await.unwrap_err();
    assert!(matches!(err, ServiceError::ValidationError(_)));

    // Unknown customer reference.
    let request = form(Uuid::new_v4(), vec![item("A", 1, dec!(10))]);
    let err = app.invoices.create_invoice(request).await.unwrap_err();
    assert!(matches!(err, ServiceError::ValidationError(_)));

    // Unknown quote reference.
    let mut request = form(customer_id, vec![item("A", 1, dec!(10))]);
    request.quote_id = Some(Uuid::new_v4());
    let err = app.invoices.create_invoice(request).await.unwrap_err();
    assert!(matches!(err, ServiceError::ValidationError(_)));

    assert!(app.invoices.list_all().await.is_empty());
}

#[tokio::test]
async fn update_replaces_the_full_item_list() {
    let app = TestApp::new().await;
    let customer_id = app.seed_customer("AquaRiego SA").await;

    let created = app
        .invoices
        .create_invoice(form(customer_id, vec![item("Old line", 1, dec!(10))]))
        .await
        .expect("created");
    assert_eq!(app.item_row_count(created.id).await, 1);

    let mut request = form(
        customer_id,
        vec![item("Filter", 2, dec!(30)), item("Valve", 1, dec!(40))],
    );
    request.tax_rate = Some(Decimal::ZERO);

    let updated = app
        .invoices
        .update_invoice(created.id, request)
        .await
        .expect("updated");

    assert_eq!(updated.items.len(), 2);
    assert_eq!(updated.subtotal, dec!(100));
    assert_eq!(updated.total_amount, dec!(100));
    assert!(updated.updated_at.is_some());
    assert_eq!(app.item_row_count(created.id).await, 2);

    let names: Vec<_> = updated.items.iter().map(|i| i.name.as_str()).collect();
    assert!(names.contains(&"Filter") && names.contains(&"Valve"));
    assert!(!names.contains(&"Old line"));
}

#[tokio::test]
async fn status_transitions_stamp_timestamps_idempotently() {
    let app = TestApp::new().await;
    let customer_id = app.seed_customer("Verde Campo").await;

    let created = app
        .invoices
        .create_invoice(form(customer_id, vec![item("Pump", 1, dec!(500))]))
        .await
        .expect("created");

    app.invoices
        .update_status(created.id, InvoiceStatus::Sent)
        .await
        .expect("sent");
    let first_sent_at = app
        .invoices
        .get_invoice(created.id)
        .await
        .expect("refetched")
        .sent_at
        .expect("sent_at stamped");

    // Repeated send keeps the original timestamp.
    let sent_again = app
        .invoices
        .update_status(created.id, InvoiceStatus::Sent)
        .await
        .expect("sent again");
    assert_eq!(sent_again.sent_at, Some(first_sent_at));

    let paid = app
        .invoices
        .update_status(created.id, InvoiceStatus::Paid)
        .await
        .expect("paid");
    assert!(paid.paid_at.is_some());
    assert_eq!(paid.sent_at, Some(first_sent_at));

    // Paid invoices are frozen.
    let err = app
        .invoices
        .update_invoice(created.id, form(customer_id, vec![item("X", 1, dec!(1))]))
        .await
        .unwrap_err();
    assert!(matches!(err, ServiceError::InvalidOperation(_)));

    // And no transition leaves paid.
    let err = app
        .invoices
        .update_status(created.id, InvoiceStatus::Cancelled)
        .await
        .unwrap_err();
    assert!(matches!(err, ServiceError::InvalidStatus(_)));
}

#[tokio::test]
async fn cancellation_is_blocked_after_payment_only() {
    let app = TestApp::new().await;
    let customer_id = app.seed_customer("Bordo Norte").await;

    let draft = app
        .invoices
        .create_invoice(form(customer_id, vec![item("Hose", 1, dec!(15))]))
        .await
        .expect("created");

    let cancelled = app
        .invoices
        .update_status(draft.id, InvoiceStatus::Cancelled)
        .await
        .expect("cancelled from draft");
    assert_eq!(cancelled.status, "cancelled");
    assert!(cancelled.paid_at.is_none());
}

#[tokio::test]
async fn delete_removes_header_and_cascades_items() {
    let app = TestApp::new().await;
    let customer_id = app.seed_customer("AquaRiego SA").await;

    let created = app
        .invoices
        .create_invoice(form(customer_id, vec![item("Timer", 1, dec!(80))]))
        .await
        .expect("created");
    assert_eq!(app.item_row_count(created.id).await, 1);

    app.invoices
        .delete_invoice(created.id)
        .await
        .expect("deleted");

    let err = app.invoices.get_invoice(created.id).await.unwrap_err();
    assert!(matches!(err, ServiceError::NotFound(_)));
    assert_eq!(app.item_row_count(created.id).await, 0);

    // Deleting again reports not found.
    let err = app.invoices.delete_invoice(created.id).await.unwrap_err();
    assert!(matches!(err, ServiceError::NotFound(_)));
}

#[tokio::test]
async fn listing_filters_sorts_and_derives_overdue() {
    let app = TestApp::new().await;
    let today = Utc::now().date_naive();

    let aqua = app.seed_customer("AquaRiego SA").await;
    let verde = app.seed_customer("Verde Campo").await;

    // One open invoice already past due.
    let mut overdue_form = form(aqua, vec![item("Drip line", 4, dec!(25))]);
    overdue_form.issue_date = Some(today - Duration::days(40));
    overdue_form.due_date = Some(today - Duration::days(1));
    overdue_form.send_immediately = true;
    let overdue = app
        .invoices
        .create_invoice(overdue_form)
        .await
        .expect("overdue invoice");

    // One draft due next month and one paid invoice.
    let open = app
        .invoices
        .create_invoice(form(verde, vec![item("Sprinkler", 2, dec!(100))]))
        .await
        .expect("open invoice");
    let paid = app
        .invoices
        .create_invoice(form(verde, vec![item("Controller", 1, dec!(300))]))
        .await
        .expect("to be paid");
    app.invoices
        .update_status(paid.id, InvoiceStatus::Sent)
        .await
        .expect("sent");
    app.invoices
        .update_status(paid.id, InvoiceStatus::Paid)
        .await
        .expect("paid");

    // Derived overdue: one day past due, only for the unpaid invoice.
    let fetched = app.invoices.get_invoice(overdue.id).await.expect("fetch");
    assert_eq!(fetched.days_overdue, 1);

    // Search by company name.
    let list = app
        .invoices
        .list_invoices(ListingParams {
            search: Some("verde".to_string()),
            ..ListingParams::default()
        })
        .await;
    assert_eq!(list.total, 2);
    assert!(list.invoices.iter().any(|i| i.id == open.id));

    // Derived-overdue filter.
    let list = app
        .invoices
        .list_invoices(ListingParams {
            status: StatusFilter::Overdue,
            ..ListingParams::default()
        })
        .await;
    assert_eq!(list.total, 1);
    assert_eq!(list.invoices[0].id, overdue.id);

    // Stored-status filter.
    let list = app
        .invoices
        .list_invoices(ListingParams {
            status: StatusFilter::Is(InvoiceStatus::Paid),
            ..ListingParams::default()
        })
        .await;
    assert_eq!(list.total, 1);
    assert_eq!(list.invoices[0].id, paid.id);

    // Sort by customer name, ascending: AquaRiego before Verde Campo.
    let list = app
        .invoices
        .list_invoices(ListingParams {
            sort_by: SortKey::Name,
            sort_order: SortOrder::Asc,
            ..ListingParams::default()
        })
        .await;
    assert_eq!(list.invoices.first().map(|i| i.id), Some(overdue.id));

    // Dashboard stats over the same collection.
    let entries = app.invoices.list_all().await;
    let stats = reports::compute_stats(&entries, today);
    assert_eq!(stats.total_invoices, 3);
    assert_eq!(stats.total_paid, dec!(348)); // 300 + 16% tax
    assert_eq!(stats.total_outstanding, dec!(348)); // 116 overdue + 232 open
    assert_eq!(stats.overdue_count, 1);
}
