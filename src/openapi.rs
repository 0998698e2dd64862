use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use crate::entities::invoice_item::ItemUnit;
use crate::errors::ErrorResponse;
use crate::money::InvoiceTotals;
use crate::services::customers::CreateCustomerRequest;
use crate::services::invoice_status::InvoiceStatus;
use crate::services::invoices::{
    CustomerSummary, InvoiceForm, InvoiceItemInput, InvoiceItemResponse, InvoiceListResponse,
    InvoicePreviewResponse, InvoiceResponse, UpdateInvoiceStatusRequest,
};
use crate::services::reports::InvoiceStats;

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Riego Admin API",
        version = "0.3.0",
        description = r#"
Backend API for the irrigation-supplies commerce admin console.

## Invoicing

- Create, edit, and delete invoices with their line items
- Forward-only status lifecycle: draft → sent → paid, with cancellation before payment
- Totals (subtotal, discount, tax, total) recomputed from line items on every save
- Derived overdue state computed at read time, never persisted

## Listing & Reporting

List endpoints support `search`, `status`, `sort_by`, `sort_order`, `page`,
and `limit` query parameters. The dashboard aggregates outstanding, paid,
and overdue figures over the full collection.
"#
    ),
    paths(
        crate::handlers::invoices::list_invoices,
        crate::handlers::invoices::create_invoice,
        crate::handlers::invoices::get_invoice,
        crate::handlers::invoices::update_invoice,
        crate::handlers::invoices::update_invoice_status,
        crate::handlers::invoices::delete_invoice,
        crate::handlers::invoices::preview_invoice,
        crate::handlers::invoices::print_invoice,
        crate::handlers::customers::list_customers,
        crate::handlers::customers::create_customer,
        crate::handlers::customers::get_customer,
        crate::handlers::reports::dashboard,
    ),
    components(schemas(
        InvoiceForm,
        InvoiceItemInput,
        UpdateInvoiceStatusRequest,
        InvoiceResponse,
        InvoiceItemResponse,
        InvoiceListResponse,
        InvoicePreviewResponse,
        InvoiceTotals,
        InvoiceStatus,
        ItemUnit,
        InvoiceStats,
        CustomerSummary,
        CreateCustomerRequest,
        ErrorResponse,
    )),
    tags(
        (name = "invoices", description = "Invoice lifecycle and totals"),
        (name = "customers", description = "Customer collaborator CRUD"),
        (name = "reports", description = "Dashboard aggregates"),
    )
)]
pub struct ApiDoc;

/// Swagger UI mounted at `/docs`, serving the generated document.
pub fn swagger_ui() -> SwaggerUi {
    SwaggerUi::new("/docs").url("/api-docs/openapi.json", ApiDoc::openapi())
}
