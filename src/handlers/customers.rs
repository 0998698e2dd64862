use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    routing::get,
    Json, Router,
};
use uuid::Uuid;

use crate::services::customers::CreateCustomerRequest;
use crate::{errors::ServiceError, ApiResponse, AppState};

#[utoipa::path(
    get,
    path = "/api/v1/customers",
    responses((status = 200, description = "All customers ordered by company name")),
    tag = "customers"
)]
pub async fn list_customers(
    State(state): State<AppState>,
) -> Result<impl IntoResponse, ServiceError> {
    let customers = state.services.customers.list_customers().await?;
    Ok(Json(ApiResponse::success(customers)))
}

#[utoipa::path(
    post,
    path = "/api/v1/customers",
    request_body = CreateCustomerRequest,
    responses(
        (status = 201, description = "Customer created"),
        (status = 400, description = "Validation failed")
    ),
    tag = "customers"
)]
pub async fn create_customer(
    State(state): State<AppState>,
    Json(request): Json<CreateCustomerRequest>,
) -> Result<impl IntoResponse, ServiceError> {
    let customer = state.services.customers.create_customer(request).await?;
    Ok((StatusCode::CREATED, Json(ApiResponse::success(customer))))
}

#[utoipa::path(
    get,
    path = "/api/v1/customers/{id}",
    params(("id" = Uuid, Path, description = "Customer id")),
    responses(
        (status = 200, description = "Customer detail"),
        (status = 404, description = "Customer not found")
    ),
    tag = "customers"
)]
pub async fn get_customer(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ServiceError> {
    let customer = state.services.customers.get_customer(id).await?;
    Ok(Json(ApiResponse::success(customer)))
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_customers).post(create_customer))
        .route("/:id", get(get_customer))
}
