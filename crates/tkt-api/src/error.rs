//! # API Error Types
//!
//! Structured error type implementing `axum::response::IntoResponse`.
//! Rule engine rejections map to 400/409 with a stable machine-readable
//! code; store failures map to 500 and are never described to clients.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::{Deserialize, Serialize};
use serde_json::json;
use thiserror::Error;
use tkt_core::ValidationError;
use tkt_engine::{RuleError, RuleErrorKind};
use utoipa::ToSchema;

/// Structured JSON error response body.
///
/// All error responses use this format. `details` carries the structured
/// context of a rule rejection and is omitted for 500-class errors.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ErrorBody {
    pub error: ErrorDetail,
}

/// Inner error detail.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ErrorDetail {
    /// Machine-readable error code (e.g., "CONFLICTING_OPEN_TICKET").
    pub code: String,
    /// Human-readable error message.
    pub message: String,
    /// Additional details, present only for client errors.
    #[serde(skip_serializing_if = "Option::is_none")]
    #[schema(value_type = Option<Object>)]
    pub details: Option<serde_json::Value>,
}

/// Application-level error type that implements [`IntoResponse`] for Axum.
#[derive(Error, Debug)]
pub enum AppError {
    /// Resource not found (404).
    #[error("not found: {0}")]
    NotFound(String),

    /// Request validation failed (422).
    #[error("validation error: {0}")]
    Validation(String),

    /// Request body could not be parsed (400).
    #[error("bad request: {0}")]
    BadRequest(String),

    /// Internal server error (500). Message is logged but not returned to client.
    #[error("internal error: {0}")]
    Internal(String),

    /// Ticket creation rejected or failed inside the rule engine.
    #[error(transparent)]
    Rule(#[from] RuleError),
}

impl AppError {
    /// Return the HTTP status code and machine-readable error code for this error.
    fn status_and_code(&self) -> (StatusCode, &'static str) {
        match self {
            Self::NotFound(_) => (StatusCode::NOT_FOUND, "NOT_FOUND"),
            Self::Validation(_) => (StatusCode::UNPROCESSABLE_ENTITY, "VALIDATION_ERROR"),
            Self::BadRequest(_) => (StatusCode::BAD_REQUEST, "BAD_REQUEST"),
            Self::Internal(_) => (StatusCode::INTERNAL_SERVER_ERROR, "INTERNAL_ERROR"),
            Self::Rule(err) => {
                let kind = err.kind();
                let status = match kind {
                    RuleErrorKind::InvalidTicketType => StatusCode::BAD_REQUEST,
                    RuleErrorKind::ConflictingOpenTicket
                    | RuleErrorKind::AmbiguousAssignee
                    | RuleErrorKind::NoEligibleAssignee => StatusCode::CONFLICT,
                    RuleErrorKind::Store => StatusCode::INTERNAL_SERVER_ERROR,
                };
                (status, kind.as_str())
            }
        }
    }

    fn is_internal(&self) -> bool {
        match self {
            Self::Internal(_) => true,
            Self::Rule(err) => !err.kind().is_client_error(),
            _ => false,
        }
    }

    /// Structured context for rule rejections.
    fn details(&self) -> Option<serde_json::Value> {
        let Self::Rule(err) = self else {
            return None;
        };
        match err {
            RuleError::InvalidTicketType(ValidationError::InvalidTicketType { value, .. }) => {
                Some(json!({
                    "value": value,
                    "valid": tkt_core::TicketType::all()
                        .iter()
                        .map(|t| t.as_str())
                        .collect::<Vec<_>>(),
                }))
            }
            RuleError::InvalidTicketType(_) => None,
            RuleError::ConflictingOpenTicket {
                ticket_type,
                company_id,
            } => Some(json!({ "type": ticket_type, "companyId": company_id })),
            RuleError::AmbiguousAssignee {
                ticket_type,
                company_id,
                role,
                count,
            } => Some(json!({
                "type": ticket_type,
                "companyId": company_id,
                "role": role,
                "count": count,
            })),
            RuleError::NoEligibleAssignee {
                ticket_type,
                company_id,
                roles,
            } => Some(json!({
                "type": ticket_type,
                "companyId": company_id,
                "roles": roles,
            })),
            RuleError::Store(_) => None,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code) = self.status_and_code();

        // Never expose internal error messages to clients.
        let internal = self.is_internal();
        let message = if internal {
            "An internal error occurred".to_string()
        } else {
            self.to_string()
        };

        if internal {
            tracing::error!(error = %self, "internal server error");
        }

        let body = ErrorBody {
            error: ErrorDetail {
                code: code.to_string(),
                message,
                details: if internal { None } else { self.details() },
            },
        };

        (status, Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tkt_core::{CompanyId, TicketType, UserRole};
    use tkt_engine::StoreError;

    #[test]
    fn not_found_status_code() {
        let err = AppError::NotFound("metrics exporter".to_string());
        let (status, code) = err.status_and_code();
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(code, "NOT_FOUND");
    }

    #[test]
    fn validation_status_code() {
        let err = AppError::Validation("companyId must be positive".to_string());
        let (status, code) = err.status_and_code();
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(code, "VALIDATION_ERROR");
    }

    #[test]
    fn invalid_ticket_type_is_bad_request() {
        let err = AppError::from(RuleError::InvalidTicketType(
            ValidationError::InvalidTicketType {
                value: "audit".into(),
                valid: TicketType::valid_values(),
            },
        ));
        let (status, code) = err.status_and_code();
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(code, "INVALID_TICKET_TYPE");
        let details = err.details().unwrap();
        assert_eq!(details["value"], "audit");
        assert_eq!(details["valid"][2], "strikeOff");
    }

    #[test]
    fn rule_rejections_are_conflicts() {
        let conflicting = AppError::from(RuleError::ConflictingOpenTicket {
            ticket_type: TicketType::RegistrationAddressChange,
            company_id: CompanyId::new(3),
        });
        assert_eq!(
            conflicting.status_and_code(),
            (StatusCode::CONFLICT, "CONFLICTING_OPEN_TICKET")
        );

        let ambiguous = AppError::from(RuleError::AmbiguousAssignee {
            ticket_type: TicketType::StrikeOff,
            company_id: CompanyId::new(3),
            role: UserRole::Director,
            count: 2,
        });
        assert_eq!(
            ambiguous.status_and_code(),
            (StatusCode::CONFLICT, "AMBIGUOUS_ASSIGNEE")
        );
        let details = ambiguous.details().unwrap();
        assert_eq!(details["role"], "director");
        assert_eq!(details["count"], 2);

        let none = AppError::from(RuleError::NoEligibleAssignee {
            ticket_type: TicketType::ManagementReport,
            company_id: CompanyId::new(3),
            roles: vec![UserRole::Accountant],
        });
        assert_eq!(
            none.status_and_code(),
            (StatusCode::CONFLICT, "NO_ELIGIBLE_ASSIGNEE")
        );
    }

    #[test]
    fn store_failures_are_internal() {
        let err = AppError::from(RuleError::Store(StoreError::Backend(
            "connection reset".into(),
        )));
        assert!(err.is_internal());
        assert_eq!(err.status_and_code().0, StatusCode::INTERNAL_SERVER_ERROR);
        assert!(err.details().is_none());
    }

    #[test]
    fn internal_error_hides_message() {
        let response = AppError::Internal("secret detail".to_string()).into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
