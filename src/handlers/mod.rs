pub mod customers;
pub mod health;
pub mod invoices;
pub mod reports;

use std::sync::Arc;

use rust_decimal::Decimal;

use crate::config::AppConfig;
use crate::db::DbPool;
use crate::draft::DraftDefaults;
use crate::events::EventSender;

// Re-export AppState so handler modules can import it as crate::handlers::AppState
pub use crate::AppState;

/// Services layer that encapsulates business logic used by HTTP handlers
#[derive(Clone)]
pub struct AppServices {
    pub invoices: Arc<crate::services::invoices::InvoiceService>,
    pub customers: Arc<crate::services::customers::CustomerService>,
}

impl AppServices {
    pub fn new(db_pool: Arc<DbPool>, event_sender: Arc<EventSender>, config: &AppConfig) -> Self {
        let defaults = DraftDefaults {
            due_net_days: config.invoice_due_net_days,
            tax_rate: Decimal::from(config.default_tax_rate_percent),
            payment_terms: config.default_payment_terms.clone(),
        };

        let invoices = Arc::new(crate::services::invoices::InvoiceService::new(
            db_pool.clone(),
            Some(event_sender.clone()),
            defaults,
        ));
        let customers = Arc::new(crate::services::customers::CustomerService::new(
            db_pool,
            Some(event_sender),
        ));

        Self {
            invoices,
            customers,
        }
    }
}
