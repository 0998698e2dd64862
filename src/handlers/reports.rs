use axum::{extract::State, response::IntoResponse, routing::get, Json, Router};
use chrono::Utc;

use crate::services::reports;
use crate::{ApiResponse, AppState};

#[utoipa::path(
    get,
    path = "/api/v1/reports/dashboard",
    responses(
        (status = 200, description = "Counts, outstanding/paid totals, and overdue count", body = reports::InvoiceStats)
    ),
    tag = "reports"
)]
pub async fn dashboard(State(state): State<AppState>) -> impl IntoResponse {
    let entries = state.services.invoices.list_all().await;
    let stats = reports::compute_stats(&entries, Utc::now().date_naive());
    Json(ApiResponse::success(stats))
}

pub fn router() -> Router<AppState> {
    Router::new().route("/dashboard", get(dashboard))
}
