//! # OpenAPI Specification Assembly
//!
//! Assembles the utoipa-documented routes into one OpenAPI document served
//! at `/openapi.json`.

use axum::routing::get;
use axum::{Json, Router};
use utoipa::OpenApi;

use crate::state::AppState;

/// Assembled OpenAPI spec for the ticket API.
#[derive(OpenApi)]
#[openapi(
    info(
        title = "Compliance Tickets API",
        version = "0.1.0",
        description = "Creates compliance tickets for companies, assigns each to the responsible officer, and enforces per-type validity rules.",
        license(name = "AGPL-3.0-or-later")
    ),
    paths(
        crate::routes::tickets::create_ticket,
        crate::routes::tickets::list_tickets,
    ),
    components(schemas(
        crate::routes::tickets::CreateTicketRequest,
        crate::routes::tickets::TicketResponse,
        crate::routes::tickets::TicketDetailsResponse,
        crate::routes::tickets::CompanyResponse,
        crate::routes::tickets::UserResponse,
        crate::error::ErrorBody,
        crate::error::ErrorDetail,
    )),
    tags(
        (name = "tickets", description = "Ticket creation and listing"),
    )
)]
pub struct ApiDoc;

/// Router serving the spec.
pub fn router() -> Router<AppState> {
    Router::new().route("/openapi.json", get(openapi_json))
}

async fn openapi_json() -> Json<utoipa::openapi::OpenApi> {
    Json(ApiDoc::openapi())
}
