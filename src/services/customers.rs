use chrono::Utc;
use sea_orm::{ActiveModelTrait, EntityTrait, QueryOrder, Set};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{error, info, instrument, warn};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use crate::{
    db::DbPool,
    entities::customer,
    errors::ServiceError,
    events::{Event, EventSender},
};

#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema)]
pub struct CreateCustomerRequest {
    #[validate(length(min = 1, max = 120, message = "Company name is required"))]
    pub company_name: String,
    pub contact_person: Option<String>,
    #[validate(email(message = "Email must be a valid address"))]
    pub email: Option<String>,
    pub phone: Option<String>,
}

/// Thin CRUD collaborator: customers are owned by another part of the
/// admin console; the invoicing flows only need create and lookup.
#[derive(Clone)]
pub struct CustomerService {
    db_pool: Arc<DbPool>,
    event_sender: Option<Arc<EventSender>>,
}

impl CustomerService {
    pub fn new(db_pool: Arc<DbPool>, event_sender: Option<Arc<EventSender>>) -> Self {
        Self {
            db_pool,
            event_sender,
        }
    }

    #[instrument(skip(self, request), fields(company_name = %request.company_name))]
    pub async fn create_customer(
        &self,
        request: CreateCustomerRequest,
    ) -> Result<customer::Model, ServiceError> {
        request.validate()?;

        let db = &*self.db_pool;
        let customer_id = Uuid::new_v4();

        let active = customer::ActiveModel {
            id: Set(customer_id),
            company_name: Set(request.company_name),
            contact_person: Set(request.contact_person),
            email: Set(request.email),
            phone: Set(request.phone),
            created_at: Set(Utc::now()),
        };

        let created = active.insert(db).await.map_err(|e| {
            error!(error = %e, customer_id = %customer_id, "Failed to create customer");
            ServiceError::DatabaseError(e)
        })?;

        info!(customer_id = %customer_id, "Customer created");

        if let Some(sender) = &self.event_sender {
            if let Err(e) = sender.send(Event::CustomerCreated(customer_id)).await {
                warn!(error = %e, "Failed to send event");
            }
        }

        Ok(created)
    }

    #[instrument(skip(self), fields(customer_id = %customer_id))]
    pub async fn get_customer(&self, customer_id: Uuid) -> Result<customer::Model, ServiceError> {
        let db = &*self.db_pool;

        customer::Entity::find_by_id(customer_id)
            .one(db)
            .await
            .map_err(|e| {
                error!(error = %e, customer_id = %customer_id, "Failed to fetch customer");
                ServiceError::DatabaseError(e)
            })?
            .ok_or_else(|| ServiceError::NotFound(format!("Customer {customer_id} not found")))
    }

    /// All customers ordered by company name; feeds the customer picker
    /// in the invoice form.
    #[instrument(skip(self))]
    pub async fn list_customers(&self) -> Result<Vec<customer::Model>, ServiceError> {
        let db = &*self.db_pool;

        customer::Entity::find()
            .order_by_asc(customer::Column::CompanyName)
            .all(db)
            .await
            .map_err(|e| {
                error!(error = %e, "Failed to list customers");
                ServiceError::DatabaseError(e)
            })
    }
}
