use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{Html, IntoResponse},
    routing::{get, post},
    Json, Router,
};
use serde::Deserialize;
use utoipa::IntoParams;
use uuid::Uuid;

use crate::print;
use crate::services::invoice_status::InvoiceStatus;
use crate::services::invoices::{InvoiceForm, ListingParams, UpdateInvoiceStatusRequest};
use crate::services::reports::{SortKey, SortOrder, StatusFilter};
use crate::{errors::ServiceError, ApiResponse, AppState};

fn default_page() -> u64 {
    1
}
fn default_limit() -> u64 {
    20
}

/// Query parameters for the invoice list view.
#[derive(Debug, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct InvoiceListQuery {
    /// Substring match over invoice number, company name, contact person
    pub search: Option<String>,
    /// `all`, a stored status, or the derived `overdue`
    pub status: Option<String>,
    /// `created_at` (default), `name`, or `status`
    pub sort_by: Option<String>,
    /// `asc` or `desc`
    pub sort_order: Option<String>,
    #[serde(default = "default_page")]
    pub page: u64,
    #[serde(default = "default_limit")]
    pub limit: u64,
}

impl From<InvoiceListQuery> for ListingParams {
    fn from(query: InvoiceListQuery) -> Self {
        let sort_by = query
            .sort_by
            .as_deref()
            .map(SortKey::parse)
            .unwrap_or_default();
        let sort_order = query
            .sort_order
            .as_deref()
            .map(|raw| SortOrder::parse(raw, sort_by))
            .unwrap_or_else(|| SortOrder::default_for(sort_by));

        ListingParams {
            search: query.search,
            status: query
                .status
                .as_deref()
                .map(StatusFilter::parse)
                .unwrap_or_default(),
            sort_by,
            sort_order,
            page: query.page,
            limit: query.limit,
        }
    }
}

#[utoipa::path(
    get,
    path = "/api/v1/invoices",
    params(InvoiceListQuery),
    responses(
        (status = 200, description = "Filtered, sorted, paginated invoice list")
    ),
    tag = "invoices"
)]
pub async fn list_invoices(
    State(state): State<AppState>,
    Query(query): Query<InvoiceListQuery>,
) -> impl IntoResponse {
    let list = state.services.invoices.list_invoices(query.into()).await;
    Json(ApiResponse::success(list))
}

#[utoipa::path(
    post,
    path = "/api/v1/invoices",
    request_body = InvoiceForm,
    responses(
        (status = 201, description = "Invoice created with its line items"),
        (status = 400, description = "Validation failed"),
        (status = 409, description = "Invoice number allocation failed")
    ),
    tag = "invoices"
)]
pub async fn create_invoice(
    State(state): State<AppState>,
    Json(form): Json<InvoiceForm>,
) -> Result<impl IntoResponse, ServiceError> {
    let invoice = state.services.invoices.create_invoice(form).await?;
    Ok((StatusCode::CREATED, Json(ApiResponse::success(invoice))))
}

#[utoipa::path(
    get,
    path = "/api/v1/invoices/{id}",
    params(("id" = Uuid, Path, description = "Invoice id")),
    responses(
        (status = 200, description = "Invoice with items and customer"),
        (status = 404, description = "Invoice not found")
    ),
    tag = "invoices"
)]
pub async fn get_invoice(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ServiceError> {
    let invoice = state.services.invoices.get_invoice(id).await?;
    Ok(Json(ApiResponse::success(invoice)))
}

#[utoipa::path(
    put,
    path = "/api/v1/invoices/{id}",
    params(("id" = Uuid, Path, description = "Invoice id")),
    request_body = InvoiceForm,
    responses(
        (status = 200, description = "Invoice updated, items replaced"),
        (status = 400, description = "Validation failed or invoice is paid"),
        (status = 404, description = "Invoice not found")
    ),
    tag = "invoices"
)]
pub async fn update_invoice(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(form): Json<InvoiceForm>,
) -> Result<impl IntoResponse, ServiceError> {
    let invoice = state.services.invoices.update_invoice(id, form).await?;
    Ok(Json(ApiResponse::success(invoice)))
}

#[utoipa::path(
    post,
    path = "/api/v1/invoices/{id}/status",
    params(("id" = Uuid, Path, description = "Invoice id")),
    request_body = UpdateInvoiceStatusRequest,
    responses(
        (status = 200, description = "Status updated with timestamps stamped"),
        (status = 404, description = "Invoice not found"),
        (status = 422, description = "Illegal status transition")
    ),
    tag = "invoices"
)]
pub async fn update_invoice_status(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(request): Json<UpdateInvoiceStatusRequest>,
) -> Result<impl IntoResponse, ServiceError> {
    let new_status = InvoiceStatus::parse(&request.status)?;
    let invoice = state.services.invoices.update_status(id, new_status).await?;
    Ok(Json(ApiResponse::success(invoice)))
}

#[utoipa::path(
    delete,
    path = "/api/v1/invoices/{id}",
    params(("id" = Uuid, Path, description = "Invoice id")),
    responses(
        (status = 204, description = "Invoice deleted, items cascade"),
        (status = 404, description = "Invoice not found")
    ),
    tag = "invoices"
)]
pub async fn delete_invoice(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ServiceError> {
    state.services.invoices.delete_invoice(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

#[utoipa::path(
    post,
    path = "/api/v1/invoices/preview",
    request_body = InvoiceForm,
    responses(
        (status = 200, description = "Recomputed totals for an unsaved draft")
    ),
    tag = "invoices"
)]
pub async fn preview_invoice(
    State(state): State<AppState>,
    Json(form): Json<InvoiceForm>,
) -> impl IntoResponse {
    let preview = state.services.invoices.preview_totals(&form);
    Json(ApiResponse::success(preview))
}

#[utoipa::path(
    get,
    path = "/api/v1/invoices/{id}/print",
    params(("id" = Uuid, Path, description = "Invoice id")),
    responses(
        (status = 200, description = "Self-contained printable HTML document", body = String, content_type = "text/html"),
        (status = 404, description = "Invoice not found")
    ),
    tag = "invoices"
)]
pub async fn print_invoice(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Html<String>, ServiceError> {
    let invoice = state.services.invoices.get_invoice(id).await?;
    Ok(Html(print::render_invoice_html(&invoice)))
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_invoices).post(create_invoice))
        .route("/preview", post(preview_invoice))
        .route(
            "/:id",
            get(get_invoice).put(update_invoice).delete(delete_invoice),
        )
        .route("/:id/status", post(update_invoice_status))
        .route("/:id/print", get(print_invoice))
}
