//! In-memory invoice draft backing the create and edit flows.
//!
//! A draft is decoupled from the persisted row until submit: item edits
//! recompute the affected line total and the aggregate totals
//! immediately, and `validate` gates every write so an invalid draft
//! never reaches the persistence layer. An invoice always carries at
//! least one line item; removal below that is a no-op.

use chrono::{Duration, NaiveDate};
use rust_decimal::Decimal;
use uuid::Uuid;

use crate::entities::{invoice, invoice_item, invoice_item::ItemUnit};
use crate::errors::ServiceError;
use crate::money::{self, InvoiceTotals};

/// Minimum number of line items a draft (and a persisted invoice) holds.
pub const MIN_ITEMS: usize = 1;

/// Site-wide defaults applied when a create request omits a field.
#[derive(Debug, Clone)]
pub struct DraftDefaults {
    pub due_net_days: i64,
    pub tax_rate: Decimal,
    pub payment_terms: String,
}

impl Default for DraftDefaults {
    fn default() -> Self {
        Self {
            due_net_days: 30,
            tax_rate: Decimal::from(16),
            payment_terms: "30 days".to_string(),
        }
    }
}

/// One editable line. `total` is derived and only changes through
/// `recompute_total`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DraftItem {
    /// Persisted row id when editing; `None` for freshly added lines.
    pub id: Option<Uuid>,
    pub name: String,
    pub description: Option<String>,
    pub quantity: i32,
    pub unit: ItemUnit,
    pub unit_price: Decimal,
    pub total: Decimal,
}

impl DraftItem {
    pub fn blank() -> Self {
        Self {
            id: None,
            name: String::new(),
            description: None,
            quantity: 1,
            unit: ItemUnit::default(),
            unit_price: Decimal::ZERO,
            total: Decimal::ZERO,
        }
    }

    fn recompute_total(&mut self) {
        self.total = money::item_total(self.quantity, self.unit_price);
    }
}

impl From<&invoice_item::Model> for DraftItem {
    fn from(model: &invoice_item::Model) -> Self {
        Self {
            id: Some(model.id),
            name: model.name.clone(),
            description: model.description.clone(),
            quantity: model.quantity,
            unit: ItemUnit::from_stored(&model.unit),
            unit_price: model.unit_price,
            total: model.total,
        }
    }
}

/// Single-field item edit, mirroring how the form mutates one input at a
/// time.
#[derive(Debug, Clone)]
pub enum ItemPatch {
    Name(String),
    Description(Option<String>),
    Quantity(i32),
    Unit(ItemUnit),
    UnitPrice(Decimal),
}

#[derive(Debug, Clone)]
pub struct InvoiceDraft {
    pub customer_id: Option<Uuid>,
    pub quote_id: Option<Uuid>,
    pub issue_date: Option<NaiveDate>,
    pub due_date: Option<NaiveDate>,
    pub tax_rate: Decimal,
    pub discount_amount: Decimal,
    pub payment_terms: Option<String>,
    pub notes: Option<String>,
    pub payment_details: Option<String>,
    pub items: Vec<DraftItem>,
    pub totals: InvoiceTotals,
}

impl InvoiceDraft {
    /// Fresh draft for the create flow: issue date is today, due date is
    /// today plus the configured net days, one blank line, default tax
    /// rate.
    pub fn new(today: NaiveDate, defaults: &DraftDefaults) -> Self {
        let mut draft = Self {
            customer_id: None,
            quote_id: None,
            issue_date: Some(today),
            due_date: Some(today + Duration::days(defaults.due_net_days)),
            tax_rate: defaults.tax_rate,
            discount_amount: Decimal::ZERO,
            payment_terms: Some(defaults.payment_terms.clone()),
            notes: None,
            payment_details: None,
            items: vec![DraftItem::blank()],
            totals: InvoiceTotals::ZERO,
        };
        draft.recompute_totals();
        draft
    }

    /// Deep copy of a persisted invoice for the edit flow. Items keep
    /// their row ids so the replacement write can be traced back to the
    /// rows it supersedes.
    pub fn from_persisted(header: &invoice::Model, items: &[invoice_item::Model]) -> Self {
        let mut draft = Self {
            customer_id: Some(header.customer_id),
            quote_id: header.quote_id,
            issue_date: Some(header.issue_date),
            due_date: Some(header.due_date),
            tax_rate: header.tax_rate,
            discount_amount: header.discount_amount,
            payment_terms: header.payment_terms.clone(),
            notes: header.notes.clone(),
            payment_details: header.payment_details.clone(),
            items: items.iter().map(DraftItem::from).collect(),
            totals: InvoiceTotals::ZERO,
        };
        if draft.items.is_empty() {
            draft.items.push(DraftItem::blank());
        }
        draft.recompute_totals();
        draft
    }

    /// Applies a single-field edit to one line. Quantity and unit-price
    /// changes recompute that line's total before the aggregate pass.
    pub fn update_item(&mut self, index: usize, patch: ItemPatch) -> Result<(), ServiceError> {
        let item = self.items.get_mut(index).ok_or_else(|| {
            ServiceError::InvalidOperation(format!("No line item at index {index}"))
        })?;

        match patch {
            ItemPatch::Name(name) => item.name = name,
            ItemPatch::Description(description) => item.description = description,
            ItemPatch::Unit(unit) => item.unit = unit,
            ItemPatch::Quantity(quantity) => {
                item.quantity = quantity;
                item.recompute_total();
            }
            ItemPatch::UnitPrice(unit_price) => {
                item.unit_price = unit_price;
                item.recompute_total();
            }
        }

        self.recompute_totals();
        Ok(())
    }

    pub fn add_item(&mut self) {
        self.items.push(DraftItem::blank());
        self.recompute_totals();
    }

    /// Removes one line. A draft never drops below one item, so removal
    /// at the minimum is a no-op.
    pub fn remove_item(&mut self, index: usize) {
        if self.items.len() <= MIN_ITEMS || index >= self.items.len() {
            return;
        }
        self.items.remove(index);
        self.recompute_totals();
    }

    /// Recomputes every line total and the aggregate totals.
    pub fn recompute_totals(&mut self) {
        for item in &mut self.items {
            item.recompute_total();
        }
        self.totals = money::invoice_totals(
            self.items.iter().map(|item| item.total),
            self.tax_rate,
            self.discount_amount,
        );
    }

    /// Submit-time validation. Returns every failure rather than the
    /// first one, so the form can surface them together.
    pub fn validate(&self) -> Result<(), Vec<String>> {
        let mut errors = Vec::new();

        if self.customer_id.is_none() {
            errors.push("A customer must be selected".to_string());
        }
        if self.issue_date.is_none() {
            errors.push("Issue date is required".to_string());
        }
        if self.due_date.is_none() {
            errors.push("Due date is required".to_string());
        }
        if let (Some(issue), Some(due)) = (self.issue_date, self.due_date) {
            if due < issue {
                errors.push("Due date must not be before the issue date".to_string());
            }
        }

        for (index, item) in self.items.iter().enumerate() {
            let line = index + 1;
            if item.name.trim().is_empty() {
                errors.push(format!("Line {line}: item name must not be blank"));
            }
            if item.quantity < 1 {
                errors.push(format!("Line {line}: quantity must be positive"));
            }
            if item.unit_price < Decimal::ZERO {
                errors.push(format!("Line {line}: unit price must not be negative"));
            }
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }
}
