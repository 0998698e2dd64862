use chrono::{DateTime, Datelike, NaiveDate, Utc};
use rand::Rng;
use rust_decimal::Decimal;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, EntityTrait, ModelTrait, QueryFilter, QueryOrder, Set,
    TransactionTrait,
};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{error, info, instrument, warn};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use crate::{
    db::DbPool,
    draft::{DraftDefaults, DraftItem, InvoiceDraft},
    entities::{customer, invoice, invoice_item, invoice_item::ItemUnit, quote},
    errors::{is_unique_violation, ServiceError},
    events::{Event, EventSender},
    money::InvoiceTotals,
    services::invoice_status::{apply_status_transition, InvoiceStatus},
    services::reports::{self, ListedInvoice, SortKey, SortOrder, StatusFilter},
};

/// Attempts at allocating a unique invoice number before giving up.
const MAX_NUMBER_ATTEMPTS: u32 = 5;

/// One line item as submitted by the form. `total` is never accepted
/// from the client; it is recomputed from quantity and unit price.
#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema)]
pub struct InvoiceItemInput {
    /// Persisted row id when editing an existing line
    pub id: Option<Uuid>,
    #[validate(length(min = 1, message = "Item name is required"))]
    pub name: String,
    pub description: Option<String>,
    #[serde(default = "default_quantity")]
    pub quantity: i32,
    #[serde(default)]
    pub unit: ItemUnit,
    #[serde(default)]
    pub unit_price: Decimal,
}

fn default_quantity() -> i32 {
    1
}

/// Shared payload for the create and edit flows; the two differ only in
/// how missing fields are defaulted and whether `send_immediately`
/// applies.
#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema)]
pub struct InvoiceForm {
    pub customer_id: Option<Uuid>,
    pub quote_id: Option<Uuid>,
    pub issue_date: Option<NaiveDate>,
    pub due_date: Option<NaiveDate>,
    pub tax_rate: Option<Decimal>,
    pub discount_amount: Option<Decimal>,
    pub payment_terms: Option<String>,
    pub notes: Option<String>,
    pub payment_details: Option<String>,
    #[validate]
    #[serde(default)]
    pub items: Vec<InvoiceItemInput>,
    /// Create only: persist as `sent` with `sent_at` stamped
    #[serde(default)]
    pub send_immediately: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema)]
pub struct UpdateInvoiceStatusRequest {
    #[validate(length(min = 1, message = "Status is required"))]
    pub status: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct InvoiceItemResponse {
    pub id: Uuid,
    pub name: String,
    pub description: Option<String>,
    pub quantity: i32,
    pub unit: String,
    pub unit_price: Decimal,
    pub total: Decimal,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct CustomerSummary {
    pub id: Uuid,
    pub company_name: String,
    pub contact_person: Option<String>,
    pub email: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct InvoiceResponse {
    pub id: Uuid,
    pub invoice_number: String,
    pub customer_id: Uuid,
    pub quote_id: Option<Uuid>,
    pub status: String,
    pub issue_date: NaiveDate,
    pub due_date: NaiveDate,
    pub subtotal: Decimal,
    pub tax_rate: Decimal,
    pub tax_amount: Decimal,
    pub discount_amount: Decimal,
    pub total_amount: Decimal,
    pub payment_terms: Option<String>,
    pub notes: Option<String>,
    pub payment_details: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: Option<DateTime<Utc>>,
    pub sent_at: Option<DateTime<Utc>>,
    pub paid_at: Option<DateTime<Utc>>,
    /// Derived at read time; zero for paid and cancelled invoices
    pub days_overdue: i64,
    pub customer: Option<CustomerSummary>,
    pub items: Vec<InvoiceItemResponse>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct InvoiceListResponse {
    pub invoices: Vec<InvoiceResponse>,
    pub total: u64,
    pub page: u64,
    pub limit: u64,
}

/// Totals preview for an in-flight draft; nothing is persisted.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct InvoicePreviewResponse {
    pub line_totals: Vec<Decimal>,
    pub totals: InvoiceTotals,
}

/// Parsed listing parameters (search box, status dropdown, sort header).
#[derive(Debug, Clone)]
pub struct ListingParams {
    pub search: Option<String>,
    pub status: StatusFilter,
    pub sort_by: SortKey,
    pub sort_order: SortOrder,
    pub page: u64,
    pub limit: u64,
}

impl Default for ListingParams {
    fn default() -> Self {
        let sort_by = SortKey::default();
        Self {
            search: None,
            status: StatusFilter::default(),
            sort_by,
            sort_order: SortOrder::default_for(sort_by),
            page: 1,
            limit: 20,
        }
    }
}

/// The only component that reads or writes invoice and line-item rows.
#[derive(Clone)]
pub struct InvoiceService {
    db_pool: Arc<DbPool>,
    event_sender: Option<Arc<EventSender>>,
    defaults: DraftDefaults,
}

impl InvoiceService {
    pub fn new(
        db_pool: Arc<DbPool>,
        event_sender: Option<Arc<EventSender>>,
        defaults: DraftDefaults,
    ) -> Self {
        Self {
            db_pool,
            event_sender,
            defaults,
        }
    }

    /// Creates an invoice together with its line items in one
    /// transaction. The invoice number is regenerated on a unique
    /// conflict, up to a bounded number of attempts.
    #[instrument(skip(self, form), fields(customer_id = ?form.customer_id))]
    pub async fn create_invoice(&self, form: InvoiceForm) -> Result<InvoiceResponse, ServiceError> {
        form.validate()?;

        let now = Utc::now();
        let draft = self.draft_for_create(&form, now.date_naive());
        draft
            .validate()
            .map_err(|errors| ServiceError::ValidationError(errors.join("; ")))?;

        self.ensure_references_exist(&draft).await?;

        let status = if form.send_immediately {
            InvoiceStatus::Sent
        } else {
            InvoiceStatus::Draft
        };

        let db = &*self.db_pool;
        let invoice_id = Uuid::new_v4();

        for attempt in 1..=MAX_NUMBER_ATTEMPTS {
            let number = generate_invoice_number(&mut rand::thread_rng(), now);
            let header = build_header_row(invoice_id, &number, &draft, status, now);
            let item_rows = build_item_rows(invoice_id, &draft.items, false);

            let txn = db.begin().await.map_err(|e| {
                error!(error = %e, "Failed to start transaction for invoice creation");
                ServiceError::DatabaseError(e)
            })?;

            match header_active_model(&header).insert(&txn).await {
                Ok(_) => {}
                Err(e) if is_unique_violation(&e) => {
                    warn!(
                        attempt,
                        invoice_number = %number,
                        "Invoice number collision, regenerating"
                    );
                    txn.rollback().await.ok();
                    continue;
                }
                Err(e) => {
                    error!(error = %e, invoice_id = %invoice_id, "Failed to insert invoice");
                    return Err(ServiceError::DatabaseError(e));
                }
            }

            invoice_item::Entity::insert_many(item_rows.iter().map(item_active_model))
                .exec(&txn)
                .await
                .map_err(|e| {
                    error!(error = %e, invoice_id = %invoice_id, "Failed to insert invoice items");
                    ServiceError::DatabaseError(e)
                })?;

            txn.commit().await.map_err(|e| {
                error!(error = %e, invoice_id = %invoice_id, "Failed to commit invoice creation");
                ServiceError::DatabaseError(e)
            })?;

            info!(
                invoice_id = %invoice_id,
                invoice_number = %number,
                status = %status,
                "Invoice created"
            );

            self.emit(Event::InvoiceCreated(invoice_id)).await;

            let customer = self.fetch_customer(header.customer_id).await?;
            return Ok(build_response(header, item_rows, customer, Utc::now().date_naive()));
        }

        Err(ServiceError::Conflict(
            "Could not allocate a unique invoice number, please retry".to_string(),
        ))
    }

    /// Fetches one invoice with its items and customer.
    #[instrument(skip(self), fields(invoice_id = %invoice_id))]
    pub async fn get_invoice(&self, invoice_id: Uuid) -> Result<InvoiceResponse, ServiceError> {
        let db = &*self.db_pool;

        let header = invoice::Entity::find_by_id(invoice_id)
            .one(db)
            .await
            .map_err(|e| {
                error!(error = %e, invoice_id = %invoice_id, "Failed to fetch invoice");
                ServiceError::DatabaseError(e)
            })?
            .ok_or_else(|| ServiceError::NotFound(format!("Invoice {invoice_id} not found")))?;

        let items = header
            .find_related(invoice_item::Entity)
            .all(db)
            .await
            .map_err(|e| {
                error!(error = %e, invoice_id = %invoice_id, "Failed to fetch invoice items");
                ServiceError::DatabaseError(e)
            })?;

        let customer = self.fetch_customer(header.customer_id).await?;

        Ok(build_response(header, items, customer, Utc::now().date_naive()))
    }

    /// Fetches every invoice joined with customer and items, newest
    /// first. A fetch failure is logged and yields an empty collection;
    /// callers cannot distinguish it from "no data" (the refresh button
    /// is the recourse).
    #[instrument(skip(self))]
    pub async fn list_all(&self) -> Vec<ListedInvoice> {
        let db = &*self.db_pool;

        let rows = match invoice::Entity::find()
            .find_with_related(invoice_item::Entity)
            .order_by_desc(invoice::Column::CreatedAt)
            .all(db)
            .await
        {
            Ok(rows) => rows,
            Err(e) => {
                error!(error = %e, "Failed to fetch invoices, returning empty collection");
                return Vec::new();
            }
        };

        let customers: HashMap<Uuid, customer::Model> = match customer::Entity::find().all(db).await
        {
            Ok(list) => list.into_iter().map(|c| (c.id, c)).collect(),
            Err(e) => {
                error!(error = %e, "Failed to fetch customers, returning empty collection");
                return Vec::new();
            }
        };

        rows.into_iter()
            .map(|(header, items)| {
                let customer = customers.get(&header.customer_id).cloned();
                ListedInvoice {
                    invoice: header,
                    items,
                    customer,
                }
            })
            .collect()
    }

    /// List view: fetch everything, project (search, status filter,
    /// sort), then paginate.
    #[instrument(skip(self))]
    pub async fn list_invoices(&self, params: ListingParams) -> InvoiceListResponse {
        let today = Utc::now().date_naive();

        let mut entries = self.list_all().await;
        if let Some(query) = &params.search {
            entries = reports::filter_by_search(entries, query);
        }
        entries = reports::filter_by_status(entries, params.status, today);
        reports::sort_invoices(&mut entries, params.sort_by, params.sort_order);

        let total = entries.len() as u64;
        let page = params.page.max(1);
        let limit = params.limit.clamp(1, 100);
        let offset = ((page - 1) * limit) as usize;

        let invoices = entries
            .into_iter()
            .skip(offset)
            .take(limit as usize)
            .map(|entry| build_response(entry.invoice, entry.items, entry.customer, today))
            .collect();

        InvoiceListResponse {
            invoices,
            total,
            page,
            limit,
        }
    }

    /// Replaces the invoice header fields and the full item list in one
    /// transaction. Paid invoices are frozen.
    #[instrument(skip(self, form), fields(invoice_id = %invoice_id))]
    pub async fn update_invoice(
        &self,
        invoice_id: Uuid,
        form: InvoiceForm,
    ) -> Result<InvoiceResponse, ServiceError> {
        form.validate()?;

        let db = &*self.db_pool;

        let header = invoice::Entity::find_by_id(invoice_id)
            .one(db)
            .await
            .map_err(|e| {
                error!(error = %e, invoice_id = %invoice_id, "Failed to fetch invoice for update");
                ServiceError::DatabaseError(e)
            })?
            .ok_or_else(|| ServiceError::NotFound(format!("Invoice {invoice_id} not found")))?;

        let status = InvoiceStatus::parse(&header.status)?;
        if !status.is_editable() {
            return Err(ServiceError::InvalidOperation(
                "Paid invoices cannot be edited".to_string(),
            ));
        }

        let existing_items = header
            .find_related(invoice_item::Entity)
            .all(db)
            .await
            .map_err(ServiceError::DatabaseError)?;

        let mut draft = InvoiceDraft::from_persisted(&header, &existing_items);
        apply_form(&mut draft, &form);
        draft
            .validate()
            .map_err(|errors| ServiceError::ValidationError(errors.join("; ")))?;
        self.ensure_references_exist(&draft).await?;

        let now = Utc::now();
        let item_rows = build_item_rows(invoice_id, &draft.items, true);

        let txn = db.begin().await.map_err(|e| {
            error!(error = %e, invoice_id = %invoice_id, "Failed to start transaction for update");
            ServiceError::DatabaseError(e)
        })?;

        let mut active: invoice::ActiveModel = header.clone().into();
        active.customer_id = Set(draft.customer_id.unwrap_or(header.customer_id));
        active.quote_id = Set(draft.quote_id);
        active.issue_date = Set(draft.issue_date.unwrap_or(header.issue_date));
        active.due_date = Set(draft.due_date.unwrap_or(header.due_date));
        active.tax_rate = Set(draft.tax_rate);
        active.subtotal = Set(draft.totals.subtotal);
        active.tax_amount = Set(draft.totals.tax_amount);
        active.discount_amount = Set(draft.totals.discount_amount);
        active.total_amount = Set(draft.totals.total);
        active.payment_terms = Set(draft.payment_terms.clone());
        active.notes = Set(draft.notes.clone());
        active.payment_details = Set(draft.payment_details.clone());
        active.updated_at = Set(Some(now));

        let updated = active.update(&txn).await.map_err(|e| {
            error!(error = %e, invoice_id = %invoice_id, "Failed to update invoice header");
            ServiceError::DatabaseError(e)
        })?;

        // Full replacement: the edit form always submits the complete
        // item list, so stale rows are dropped rather than patched.
        invoice_item::Entity::delete_many()
            .filter(invoice_item::Column::InvoiceId.eq(invoice_id))
            .exec(&txn)
            .await
            .map_err(|e| {
                error!(error = %e, invoice_id = %invoice_id, "Failed to delete invoice items");
                ServiceError::DatabaseError(e)
            })?;

        invoice_item::Entity::insert_many(item_rows.iter().map(item_active_model))
            .exec(&txn)
            .await
            .map_err(|e| {
                error!(error = %e, invoice_id = %invoice_id, "Failed to insert replacement items");
                ServiceError::DatabaseError(e)
            })?;

        txn.commit().await.map_err(|e| {
            error!(error = %e, invoice_id = %invoice_id, "Failed to commit invoice update");
            ServiceError::DatabaseError(e)
        })?;

        info!(invoice_id = %invoice_id, item_count = item_rows.len(), "Invoice updated");

        self.emit(Event::InvoiceUpdated(invoice_id)).await;

        let customer = self.fetch_customer(updated.customer_id).await?;
        Ok(build_response(updated, item_rows, customer, now.date_naive()))
    }

    /// Applies a status transition with its timestamp stamping rules.
    #[instrument(skip(self), fields(invoice_id = %invoice_id, new_status = %new_status))]
    pub async fn update_status(
        &self,
        invoice_id: Uuid,
        new_status: InvoiceStatus,
    ) -> Result<InvoiceResponse, ServiceError> {
        let db = &*self.db_pool;

        let header = invoice::Entity::find_by_id(invoice_id)
            .one(db)
            .await
            .map_err(|e| {
                error!(error = %e, invoice_id = %invoice_id, "Failed to fetch invoice for status update");
                ServiceError::DatabaseError(e)
            })?
            .ok_or_else(|| ServiceError::NotFound(format!("Invoice {invoice_id} not found")))?;

        let old_status = header.status.clone();
        let now = Utc::now();
        let active = apply_status_transition(&header, new_status, now)?;

        let updated = active.update(db).await.map_err(|e| {
            error!(error = %e, invoice_id = %invoice_id, "Failed to update invoice status");
            ServiceError::DatabaseError(e)
        })?;

        info!(
            invoice_id = %invoice_id,
            old_status = %old_status,
            new_status = %new_status,
            "Invoice status updated"
        );

        self.emit(Event::InvoiceStatusChanged {
            invoice_id,
            old_status,
            new_status: new_status.to_string(),
        })
        .await;

        let items = updated
            .find_related(invoice_item::Entity)
            .all(db)
            .await
            .map_err(ServiceError::DatabaseError)?;
        let customer = self.fetch_customer(updated.customer_id).await?;

        Ok(build_response(updated, items, customer, now.date_naive()))
    }

    /// Hard delete. Line items cascade via the FK declared in the
    /// migration; there is no archival.
    #[instrument(skip(self), fields(invoice_id = %invoice_id))]
    pub async fn delete_invoice(&self, invoice_id: Uuid) -> Result<(), ServiceError> {
        let db = &*self.db_pool;

        let result = invoice::Entity::delete_by_id(invoice_id)
            .exec(db)
            .await
            .map_err(|e| {
                error!(error = %e, invoice_id = %invoice_id, "Failed to delete invoice");
                ServiceError::DatabaseError(e)
            })?;

        if result.rows_affected == 0 {
            return Err(ServiceError::NotFound(format!(
                "Invoice {invoice_id} not found"
            )));
        }

        info!(invoice_id = %invoice_id, "Invoice deleted");
        self.emit(Event::InvoiceDeleted(invoice_id)).await;

        Ok(())
    }

    /// Recomputes totals for an unsaved draft payload; used by the form
    /// while the user edits.
    pub fn preview_totals(&self, form: &InvoiceForm) -> InvoicePreviewResponse {
        let draft = self.draft_for_create(form, Utc::now().date_naive());
        InvoicePreviewResponse {
            line_totals: draft.items.iter().map(|item| item.total).collect(),
            totals: draft.totals,
        }
    }

    fn draft_for_create(&self, form: &InvoiceForm, today: NaiveDate) -> InvoiceDraft {
        let mut draft = InvoiceDraft::new(today, &self.defaults);
        apply_form(&mut draft, form);
        draft
    }

    /// Rejects writes that reference a missing customer or quote with a
    /// validation error instead of letting the FK violation surface as a
    /// generic database failure.
    async fn ensure_references_exist(&self, draft: &InvoiceDraft) -> Result<(), ServiceError> {
        let db = &*self.db_pool;

        if let Some(customer_id) = draft.customer_id {
            let found = customer::Entity::find_by_id(customer_id)
                .one(db)
                .await
                .map_err(|e| {
                    error!(error = %e, customer_id = %customer_id, "Failed to fetch customer");
                    ServiceError::DatabaseError(e)
                })?;
            if found.is_none() {
                return Err(ServiceError::ValidationError(format!(
                    "Customer {customer_id} not found"
                )));
            }
        }

        if let Some(quote_id) = draft.quote_id {
            let found = quote::Entity::find_by_id(quote_id)
                .one(db)
                .await
                .map_err(|e| {
                    error!(error = %e, quote_id = %quote_id, "Failed to fetch quote");
                    ServiceError::DatabaseError(e)
                })?;
            if found.is_none() {
                return Err(ServiceError::ValidationError(format!(
                    "Quote {quote_id} not found"
                )));
            }
        }

        Ok(())
    }

    async fn fetch_customer(
        &self,
        customer_id: Uuid,
    ) -> Result<Option<customer::Model>, ServiceError> {
        let db = &*self.db_pool;
        customer::Entity::find_by_id(customer_id)
            .one(db)
            .await
            .map_err(|e| {
                error!(error = %e, customer_id = %customer_id, "Failed to fetch customer");
                ServiceError::DatabaseError(e)
            })
    }

    async fn emit(&self, event: Event) {
        if let Some(sender) = &self.event_sender {
            if let Err(e) = sender.send(event).await {
                warn!(error = %e, "Failed to send event");
            }
        }
    }
}

/// Overlays submitted form fields onto a draft; absent fields keep the
/// draft's current values, a submitted item list replaces the draft's.
fn apply_form(draft: &mut InvoiceDraft, form: &InvoiceForm) {
    if form.customer_id.is_some() {
        draft.customer_id = form.customer_id;
    }
    draft.quote_id = form.quote_id;
    if let Some(date) = form.issue_date {
        draft.issue_date = Some(date);
    }
    if let Some(date) = form.due_date {
        draft.due_date = Some(date);
    }
    if let Some(rate) = form.tax_rate {
        draft.tax_rate = rate;
    }
    if let Some(discount) = form.discount_amount {
        draft.discount_amount = discount;
    }
    if form.payment_terms.is_some() {
        draft.payment_terms = form.payment_terms.clone();
    }
    if form.notes.is_some() {
        draft.notes = form.notes.clone();
    }
    if form.payment_details.is_some() {
        draft.payment_details = form.payment_details.clone();
    }
    if !form.items.is_empty() {
        draft.items = form
            .items
            .iter()
            .map(|input| DraftItem {
                id: input.id,
                name: input.name.clone(),
                description: input.description.clone(),
                quantity: input.quantity,
                unit: input.unit,
                unit_price: input.unit_price,
                total: Decimal::ZERO,
            })
            .collect();
    }
    draft.recompute_totals();
}

/// `INV-YYYYMM-NNNN` with a random zero-padded suffix in 1..=9999.
fn generate_invoice_number<R: Rng>(rng: &mut R, now: DateTime<Utc>) -> String {
    let suffix: u32 = rng.gen_range(1..=9999);
    format!("INV-{:04}{:02}-{:04}", now.year(), now.month(), suffix)
}

fn build_header_row(
    invoice_id: Uuid,
    number: &str,
    draft: &InvoiceDraft,
    status: InvoiceStatus,
    now: DateTime<Utc>,
) -> invoice::Model {
    invoice::Model {
        id: invoice_id,
        invoice_number: number.to_string(),
        // validate() guarantees these are present before any write
        customer_id: draft.customer_id.unwrap_or_default(),
        quote_id: draft.quote_id,
        status: status.to_string(),
        issue_date: draft.issue_date.unwrap_or_default(),
        due_date: draft.due_date.unwrap_or_default(),
        subtotal: draft.totals.subtotal,
        tax_rate: draft.tax_rate,
        tax_amount: draft.totals.tax_amount,
        discount_amount: draft.totals.discount_amount,
        total_amount: draft.totals.total,
        payment_terms: draft.payment_terms.clone(),
        notes: draft.notes.clone(),
        payment_details: draft.payment_details.clone(),
        created_at: now,
        updated_at: Some(now),
        sent_at: (status == InvoiceStatus::Sent).then_some(now),
        paid_at: None,
    }
}

/// Materializes item rows for a write. On create every row gets a fresh
/// id; on replacement, rows keep their submitted ids so the new rows can
/// be traced to the ones they supersede.
fn build_item_rows(
    invoice_id: Uuid,
    items: &[DraftItem],
    keep_ids: bool,
) -> Vec<invoice_item::Model> {
    items
        .iter()
        .map(|item| invoice_item::Model {
            id: match item.id {
                Some(id) if keep_ids => id,
                _ => Uuid::new_v4(),
            },
            invoice_id,
            name: item.name.trim().to_string(),
            description: item.description.clone(),
            quantity: item.quantity,
            unit: item.unit.to_string(),
            unit_price: item.unit_price,
            total: item.total,
        })
        .collect()
}

fn header_active_model(row: &invoice::Model) -> invoice::ActiveModel {
    invoice::ActiveModel {
        id: Set(row.id),
        invoice_number: Set(row.invoice_number.clone()),
        customer_id: Set(row.customer_id),
        quote_id: Set(row.quote_id),
        status: Set(row.status.clone()),
        issue_date: Set(row.issue_date),
        due_date: Set(row.due_date),
        subtotal: Set(row.subtotal),
        tax_rate: Set(row.tax_rate),
        tax_amount: Set(row.tax_amount),
        discount_amount: Set(row.discount_amount),
        total_amount: Set(row.total_amount),
        payment_terms: Set(row.payment_terms.clone()),
        notes: Set(row.notes.clone()),
        payment_details: Set(row.payment_details.clone()),
        created_at: Set(row.created_at),
        updated_at: Set(row.updated_at),
        sent_at: Set(row.sent_at),
        paid_at: Set(row.paid_at),
    }
}

fn item_active_model(row: &invoice_item::Model) -> invoice_item::ActiveModel {
    invoice_item::ActiveModel {
        id: Set(row.id),
        invoice_id: Set(row.invoice_id),
        name: Set(row.name.clone()),
        description: Set(row.description.clone()),
        quantity: Set(row.quantity),
        unit: Set(row.unit.clone()),
        unit_price: Set(row.unit_price),
        total: Set(row.total),
    }
}

/// Maps a fetched row set to the API shape, deriving `days_overdue`.
pub fn build_response(
    header: invoice::Model,
    items: Vec<invoice_item::Model>,
    customer: Option<customer::Model>,
    today: NaiveDate,
) -> InvoiceResponse {
    let days_overdue = match InvoiceStatus::parse(&header.status) {
        Ok(status) => reports::days_overdue(header.due_date, status, today),
        Err(_) => 0,
    };

    InvoiceResponse {
        id: header.id,
        invoice_number: header.invoice_number,
        customer_id: header.customer_id,
        quote_id: header.quote_id,
        status: header.status,
        issue_date: header.issue_date,
        due_date: header.due_date,
        subtotal: header.subtotal,
        tax_rate: header.tax_rate,
        tax_amount: header.tax_amount,
        discount_amount: header.discount_amount,
        total_amount: header.total_amount,
        payment_terms: header.payment_terms,
        notes: header.notes,
        payment_details: header.payment_details,
        created_at: header.created_at,
        updated_at: header.updated_at,
        sent_at: header.sent_at,
        paid_at: header.paid_at,
        days_overdue,
        customer: customer.map(|c| CustomerSummary {
            id: c.id,
            company_name: c.company_name,
            contact_person: c.contact_person,
            email: c.email,
        }),
        items: items
            .into_iter()
            .map(|item| InvoiceItemResponse {
                id: item.id,
                name: item.name,
                description: item.description,
                quantity: item.quantity,
                unit: item.unit,
                unit_price: item.unit_price,
                total: item.total,
            })
            .collect(),
    }
}
