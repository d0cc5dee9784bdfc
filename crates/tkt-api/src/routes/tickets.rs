//! # Tickets API
//!
//! `POST /api/v1/tickets` creates a ticket; the rule engine picks the
//! assignee and enforces the per-type validity rules. `GET /api/v1/tickets`
//! lists every ticket with its company and assignee embedded.

use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::http::StatusCode;
use axum::routing::get;
use axum::{Json, Router};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tkt_core::{
    Company, CompanyId, Ticket, TicketCategory, TicketDetails, TicketStatus, TicketType, User,
    UserRole,
};
use utoipa::ToSchema;

use crate::error::{AppError, ErrorBody};
use crate::extractors::{extract_validated_json, Validate};
use crate::middleware::metrics::{record_ticket_created, record_ticket_rejected};
use crate::state::AppState;

// -- Request DTOs -------------------------------------------------------------

/// Request to create a ticket.
#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateTicketRequest {
    /// One of `managementReport`, `registrationAddressChange`, `strikeOff`.
    #[serde(rename = "type")]
    pub ticket_type: String,
    pub company_id: i64,
}

impl Validate for CreateTicketRequest {
    fn validate(&self) -> Result<(), String> {
        if self.company_id <= 0 {
            return Err("companyId must be a positive integer".to_string());
        }
        Ok(())
    }
}

// -- Response DTOs ------------------------------------------------------------

/// A stored ticket.
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct TicketResponse {
    pub id: i64,
    #[serde(rename = "type")]
    #[schema(value_type = String, example = "managementReport")]
    pub ticket_type: TicketType,
    #[schema(value_type = String, example = "accounting")]
    pub category: TicketCategory,
    pub company_id: i64,
    pub assignee_id: i64,
    #[schema(value_type = String, example = "open")]
    pub status: TicketStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<Ticket> for TicketResponse {
    fn from(ticket: Ticket) -> Self {
        Self {
            id: ticket.id.get(),
            ticket_type: ticket.ticket_type,
            category: ticket.category,
            company_id: ticket.company_id.get(),
            assignee_id: ticket.assignee_id.get(),
            status: ticket.status,
            created_at: ticket.created_at,
            updated_at: ticket.updated_at,
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CompanyResponse {
    pub id: i64,
    pub name: String,
    pub created_at: DateTime<Utc>,
}

impl From<Company> for CompanyResponse {
    fn from(company: Company) -> Self {
        Self {
            id: company.id.get(),
            name: company.name,
            created_at: company.created_at,
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UserResponse {
    pub id: i64,
    pub name: String,
    #[schema(value_type = String, example = "director")]
    pub role: UserRole,
    pub company_id: i64,
    pub created_at: DateTime<Utc>,
}

impl From<User> for UserResponse {
    fn from(user: User) -> Self {
        Self {
            id: user.id.get(),
            name: user.name,
            role: user.role,
            company_id: user.company_id.get(),
            created_at: user.created_at,
        }
    }
}

/// A ticket with its company and assignee embedded.
#[derive(Debug, Serialize, ToSchema)]
pub struct TicketDetailsResponse {
    #[serde(flatten)]
    pub ticket: TicketResponse,
    pub company: Option<CompanyResponse>,
    pub assignee: Option<UserResponse>,
}

impl From<TicketDetails> for TicketDetailsResponse {
    fn from(details: TicketDetails) -> Self {
        Self {
            ticket: details.ticket.into(),
            company: details.company.map(Into::into),
            assignee: details.assignee.map(Into::into),
        }
    }
}

// -- Router -------------------------------------------------------------------

/// Build the tickets router.
pub fn router() -> Router<AppState> {
    Router::new().route("/api/v1/tickets", get(list_tickets).post(create_ticket))
}

// -- Handlers -----------------------------------------------------------------

/// POST /api/v1/tickets: Create a ticket and assign it.
#[utoipa::path(
    post,
    path = "/api/v1/tickets",
    request_body = CreateTicketRequest,
    responses(
        (status = 201, description = "Ticket created", body = TicketResponse),
        (status = 400, description = "Malformed body or unknown ticket type", body = ErrorBody),
        (status = 409, description = "Conflicting open ticket, ambiguous or missing assignee", body = ErrorBody),
        (status = 422, description = "Invalid companyId", body = ErrorBody),
    ),
    tag = "tickets"
)]
pub(crate) async fn create_ticket(
    State(state): State<AppState>,
    body: Result<Json<CreateTicketRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<TicketResponse>), AppError> {
    let req = extract_validated_json(body)?;

    match state
        .tickets
        .create(&req.ticket_type, CompanyId::new(req.company_id))
        .await
    {
        Ok(ticket) => {
            record_ticket_created(&ticket);
            Ok((StatusCode::CREATED, Json(ticket.into())))
        }
        Err(err) => {
            record_ticket_rejected(&err);
            Err(err.into())
        }
    }
}

/// GET /api/v1/tickets: List all tickets.
#[utoipa::path(
    get,
    path = "/api/v1/tickets",
    responses(
        (status = 200, description = "All tickets with company and assignee", body = Vec<TicketDetailsResponse>),
    ),
    tag = "tickets"
)]
pub(crate) async fn list_tickets(
    State(state): State<AppState>,
) -> Result<Json<Vec<TicketDetailsResponse>>, AppError> {
    let tickets = state.tickets.list().await?;
    Ok(Json(tickets.into_iter().map(Into::into).collect()))
}
