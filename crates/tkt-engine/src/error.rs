//! # Rule and Store Errors
//!
//! [`RuleError`] is the taxonomy the engine raises. Each rule variant carries
//! the company, ticket type and role context needed to build an actionable
//! message. [`StoreError`] is what store implementations return; the engine
//! wraps it unchanged except for unique violations, which it reinterprets as
//! a conflicting open ticket.

use thiserror::Error;

use tkt_core::{CompanyId, TicketType, UserRole, ValidationError};

/// Errors returned by store implementations.
#[derive(Error, Debug)]
pub enum StoreError {
    /// A uniqueness constraint rejected the write.
    #[error("unique constraint violated: {0}")]
    UniqueViolation(String),

    /// A stored row could not be mapped back to a domain type.
    #[error("failed to decode stored row: {0}")]
    Decode(String),

    /// Any other backend failure (connection, query, transaction).
    #[error("store backend error: {0}")]
    Backend(String),
}

/// Errors raised while creating or listing tickets.
#[derive(Error, Debug)]
pub enum RuleError {
    /// The requested type is not one of the known ticket types.
    #[error(transparent)]
    InvalidTicketType(#[from] ValidationError),

    /// An open ticket of the same exclusive type already exists.
    #[error(
        "cannot create a ticket for company {company_id} because there is already an open ticket for {}",
        .ticket_type.label()
    )]
    ConflictingOpenTicket {
        ticket_type: TicketType,
        company_id: CompanyId,
    },

    /// More than one user qualifies under an exactly-one rule.
    #[error(
        "cannot create a {} ticket for company {company_id} because there are {count} users with role {role}",
        .ticket_type.label()
    )]
    AmbiguousAssignee {
        ticket_type: TicketType,
        company_id: CompanyId,
        role: UserRole,
        count: usize,
    },

    /// Every candidate pool for the type was empty.
    #[error(
        "cannot create a {} ticket for company {company_id}: no user with role {}",
        .ticket_type.label(),
        join_roles(.roles)
    )]
    NoEligibleAssignee {
        ticket_type: TicketType,
        company_id: CompanyId,
        /// Roles tried, in fallback order.
        roles: Vec<UserRole>,
    },

    /// The store failed.
    #[error("ticket store error: {0}")]
    Store(#[from] StoreError),
}

fn join_roles(roles: &[UserRole]) -> String {
    roles
        .iter()
        .map(|r| r.as_str())
        .collect::<Vec<_>>()
        .join(" or ")
}

/// Machine-readable classification of a [`RuleError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RuleErrorKind {
    InvalidTicketType,
    ConflictingOpenTicket,
    AmbiguousAssignee,
    NoEligibleAssignee,
    Store,
}

impl RuleErrorKind {
    /// Stable code used in API error bodies and metric labels.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::InvalidTicketType => "INVALID_TICKET_TYPE",
            Self::ConflictingOpenTicket => "CONFLICTING_OPEN_TICKET",
            Self::AmbiguousAssignee => "AMBIGUOUS_ASSIGNEE",
            Self::NoEligibleAssignee => "NO_ELIGIBLE_ASSIGNEE",
            Self::Store => "STORE_ERROR",
        }
    }

    /// Whether the caller caused the failure. Store failures are not.
    pub fn is_client_error(&self) -> bool {
        !matches!(self, Self::Store)
    }
}

impl std::fmt::Display for RuleErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl RuleError {
    /// Classify this error.
    pub fn kind(&self) -> RuleErrorKind {
        match self {
            Self::InvalidTicketType(_) => RuleErrorKind::InvalidTicketType,
            Self::ConflictingOpenTicket { .. } => RuleErrorKind::ConflictingOpenTicket,
            Self::AmbiguousAssignee { .. } => RuleErrorKind::AmbiguousAssignee,
            Self::NoEligibleAssignee { .. } => RuleErrorKind::NoEligibleAssignee,
            Self::Store(_) => RuleErrorKind::Store,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn conflicting_open_ticket_message() {
        let err = RuleError::ConflictingOpenTicket {
            ticket_type: TicketType::RegistrationAddressChange,
            company_id: CompanyId::new(12),
        };
        let msg = format!("{err}");
        assert!(msg.contains("company 12"));
        assert!(msg.contains("registration address change"));
        assert_eq!(err.kind(), RuleErrorKind::ConflictingOpenTicket);
    }

    #[test]
    fn ambiguous_assignee_message_names_role() {
        let err = RuleError::AmbiguousAssignee {
            ticket_type: TicketType::StrikeOff,
            company_id: CompanyId::new(3),
            role: UserRole::Director,
            count: 2,
        };
        let msg = format!("{err}");
        assert!(msg.contains("strike off"));
        assert!(msg.contains("2 users with role director"));
    }

    #[test]
    fn no_eligible_assignee_lists_fallback_roles() {
        let err = RuleError::NoEligibleAssignee {
            ticket_type: TicketType::RegistrationAddressChange,
            company_id: CompanyId::new(1),
            roles: vec![UserRole::CorporateSecretary, UserRole::Director],
        };
        assert!(format!("{err}").contains("corporateSecretary or director"));
    }

    #[test]
    fn store_errors_are_not_client_errors() {
        let err: RuleError = StoreError::Backend("connection reset".to_string()).into();
        assert_eq!(err.kind(), RuleErrorKind::Store);
        assert!(!err.kind().is_client_error());
        assert!(format!("{err}").contains("connection reset"));
    }

    #[test]
    fn kind_codes_are_distinct() {
        let kinds = [
            RuleErrorKind::InvalidTicketType,
            RuleErrorKind::ConflictingOpenTicket,
            RuleErrorKind::AmbiguousAssignee,
            RuleErrorKind::NoEligibleAssignee,
            RuleErrorKind::Store,
        ];
        let codes: std::collections::HashSet<_> = kinds.iter().map(|k| k.as_str()).collect();
        assert_eq!(codes.len(), kinds.len());
    }
}
