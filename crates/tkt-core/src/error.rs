//! # Validation Errors
//!
//! Errors raised when a wire value does not name a known domain variant.
//! Each variant carries the rejected input and the accepted values so the
//! message is actionable without consulting documentation.

use thiserror::Error;

/// Validation errors for domain enumerations.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    /// The string is not one of the known ticket types.
    #[error("ticket type {value} is not valid. Valid types are: {valid}")]
    InvalidTicketType {
        /// The rejected input.
        value: String,
        /// Comma-separated list of accepted wire values.
        valid: String,
    },

    /// The string is not one of the known ticket statuses.
    #[error("invalid ticket status: \"{0}\" (expected open or resolved)")]
    InvalidTicketStatus(String),

    /// The string is not one of the known ticket categories.
    #[error("invalid ticket category: \"{0}\" (expected accounting, corporate or management)")]
    InvalidTicketCategory(String),

    /// The string is not one of the known user roles.
    #[error("invalid user role: \"{0}\" (expected director, corporateSecretary or accountant)")]
    InvalidUserRole(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn invalid_ticket_type_lists_valid_values() {
        let err = ValidationError::InvalidTicketType {
            value: "audit".to_string(),
            valid: "managementReport, strikeOff".to_string(),
        };
        let msg = format!("{err}");
        assert!(msg.contains("audit"));
        assert!(msg.contains("managementReport, strikeOff"));
    }

    #[test]
    fn invalid_role_display() {
        let err = ValidationError::InvalidUserRole("ceo".to_string());
        assert!(format!("{err}").contains("ceo"));
    }

    #[test]
    fn invalid_status_display() {
        let err = ValidationError::InvalidTicketStatus("closed".to_string());
        assert!(format!("{err}").contains("closed"));
    }
}
