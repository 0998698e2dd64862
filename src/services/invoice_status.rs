//! Invoice status state machine.
//!
//! Persisted states are `draft`, `sent`, `paid`, `cancelled`; the overdue
//! badge shown in listings is derived at read time and never stored.
//! Transitions move forward only: draft → sent → paid, with cancellation
//! allowed before payment. Each transition stamps timestamps on the
//! header row; `sent_at` keeps the original send time across repeated
//! sends.

use chrono::{DateTime, Utc};
use sea_orm::{IntoActiveModel, Set};
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use utoipa::ToSchema;

use crate::{entities::invoice, errors::ServiceError};

#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Serialize,
    Deserialize,
    strum::Display,
    strum::EnumString,
    ToSchema,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum InvoiceStatus {
    Draft,
    Sent,
    Paid,
    Cancelled,
}

impl InvoiceStatus {
    /// Parses a stored or client-supplied status string.
    pub fn parse(raw: &str) -> Result<Self, ServiceError> {
        InvoiceStatus::from_str(raw.trim().to_ascii_lowercase().as_str())
            .map_err(|_| ServiceError::InvalidStatus(format!("Unknown invoice status: {raw}")))
    }

    /// Paid invoices are frozen; everything else may still be edited.
    pub fn is_editable(self) -> bool {
        !matches!(self, InvoiceStatus::Paid)
    }
}

/// Whether `from → to` is a legal transition. Same-status is a no-op and
/// always allowed.
pub fn is_valid_transition(from: InvoiceStatus, to: InvoiceStatus) -> bool {
    use InvoiceStatus::*;
    match (from, to) {
        (Draft, Sent) => true,
        (Draft, Cancelled) => true,
        (Sent, Paid) => true,
        (Sent, Cancelled) => true,

        // Allow transitioning to the same status (no-op)
        _ if from == to => true,

        // All other transitions are invalid
        _ => false,
    }
}

/// Validates the transition and returns an active model with the status
/// and timestamp stamps applied:
/// - `sent`: stamps `sent_at` only if not already set
/// - `paid`: stamps `paid_at` unconditionally
/// - any transition: stamps `updated_at`
pub fn apply_status_transition(
    current: &invoice::Model,
    new_status: InvoiceStatus,
    now: DateTime<Utc>,
) -> Result<invoice::ActiveModel, ServiceError> {
    let old_status = InvoiceStatus::parse(&current.status)?;

    if !is_valid_transition(old_status, new_status) {
        return Err(ServiceError::InvalidStatus(format!(
            "Cannot transition invoice from '{old_status}' to '{new_status}'"
        )));
    }

    let mut active = current.clone().into_active_model();
    active.status = Set(new_status.to_string());
    active.updated_at = Set(Some(now));

    match new_status {
        InvoiceStatus::Sent if current.sent_at.is_none() => {
            active.sent_at = Set(Some(now));
        }
        InvoiceStatus::Paid => {
            active.paid_at = Set(Some(now));
        }
        _ => {}
    }

    Ok(active)
}
