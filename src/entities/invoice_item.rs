use rust_decimal::Decimal;
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use uuid::Uuid;
use validator::Validate;

/// Line item on an invoice. `total` is always `quantity × unit_price`,
/// recomputed whenever either factor changes; it is never set directly.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize, Validate)]
#[sea_orm(table_name = "invoice_items")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub invoice_id: Uuid,

    #[validate(length(min = 1, max = 200, message = "Item name must not be blank"))]
    pub name: String,
    pub description: Option<String>,

    #[validate(range(min = 1, message = "Quantity must be positive"))]
    pub quantity: i32,
    pub unit: String,

    #[sea_orm(column_type = "Decimal(Some((12, 2)))")]
    pub unit_price: Decimal,
    #[sea_orm(column_type = "Decimal(Some((12, 2)))")]
    pub total: Decimal,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::invoice::Entity",
        from = "Column::InvoiceId",
        to = "super::invoice::Column::Id"
    )]
    Invoice,
}

impl Related<super::invoice::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Invoice.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

/// Billing unit for a line item.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Default,
    Serialize,
    Deserialize,
    strum::Display,
    strum::EnumString,
    utoipa::ToSchema,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum ItemUnit {
    #[default]
    Pcs,
    Set,
    M,
    /// Square metres, stored as `m2`.
    M2,
    Hrs,
}

impl ItemUnit {
    /// Parses the stored string form, falling back to `pcs` for legacy
    /// rows with an unknown unit.
    pub fn from_stored(raw: &str) -> Self {
        ItemUnit::from_str(raw).unwrap_or_default()
    }
}
