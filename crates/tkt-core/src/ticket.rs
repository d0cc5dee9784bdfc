//! # Tickets: Types, Categories and Statuses
//!
//! A ticket is a compliance workflow item owned by one company and assigned
//! to exactly one user. The [`TicketType`] enum is the single source of truth
//! for the closed set of ticket kinds; every mapping derived from it
//! (category, human label) is an exhaustive `match`, so adding a variant
//! fails to compile until every mapping addresses it.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::ValidationError;
use crate::identity::{CompanyId, TicketId, UserId};
use crate::user::{Company, User};

/// The kind of compliance work a ticket represents.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum TicketType {
    /// Periodic management report, prepared by an accountant.
    ManagementReport,
    /// Change of the company's registered address.
    RegistrationAddressChange,
    /// Removal of the company from the register.
    StrikeOff,
}

impl TicketType {
    /// Return all ticket types as a slice.
    pub fn all() -> &'static [TicketType] {
        &[
            Self::ManagementReport,
            Self::RegistrationAddressChange,
            Self::StrikeOff,
        ]
    }

    /// The total number of ticket types.
    pub const COUNT: usize = 3;

    /// Wire representation (`managementReport`, ...).
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::ManagementReport => "managementReport",
            Self::RegistrationAddressChange => "registrationAddressChange",
            Self::StrikeOff => "strikeOff",
        }
    }

    /// Human-readable label used in operator-facing messages.
    pub fn label(&self) -> &'static str {
        match self {
            Self::ManagementReport => "management report",
            Self::RegistrationAddressChange => "registration address change",
            Self::StrikeOff => "strike off",
        }
    }

    /// The category a ticket of this type is filed under.
    pub fn category(&self) -> TicketCategory {
        match self {
            Self::ManagementReport => TicketCategory::Accounting,
            Self::RegistrationAddressChange => TicketCategory::Corporate,
            Self::StrikeOff => TicketCategory::Management,
        }
    }

    /// Comma-separated wire names of every type, for error messages.
    pub fn valid_values() -> String {
        Self::all()
            .iter()
            .map(|t| t.as_str())
            .collect::<Vec<_>>()
            .join(", ")
    }
}

impl std::fmt::Display for TicketType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for TicketType {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::all()
            .iter()
            .copied()
            .find(|t| t.as_str() == s)
            .ok_or_else(|| ValidationError::InvalidTicketType {
                value: s.to_string(),
                valid: Self::valid_values(),
            })
    }
}

/// Filing category, derived from [`TicketType::category`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum TicketCategory {
    /// Bookkeeping and reporting work.
    Accounting,
    /// Corporate secretarial work.
    Corporate,
    /// Decisions reserved to the company's management.
    Management,
}

impl TicketCategory {
    /// Wire representation.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Accounting => "accounting",
            Self::Corporate => "corporate",
            Self::Management => "management",
        }
    }
}

impl std::fmt::Display for TicketCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for TicketCategory {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "accounting" => Ok(Self::Accounting),
            "corporate" => Ok(Self::Corporate),
            "management" => Ok(Self::Management),
            other => Err(ValidationError::InvalidTicketCategory(other.to_string())),
        }
    }
}

/// Ticket lifecycle status. Tickets start `Open` and only move to
/// `Resolved` when superseded by a strike-off.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum TicketStatus {
    /// Work outstanding.
    Open,
    /// No further work expected.
    Resolved,
}

impl TicketStatus {
    /// Wire representation.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Open => "open",
            Self::Resolved => "resolved",
        }
    }
}

impl std::fmt::Display for TicketStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for TicketStatus {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "open" => Ok(Self::Open),
            "resolved" => Ok(Self::Resolved),
            other => Err(ValidationError::InvalidTicketStatus(other.to_string())),
        }
    }
}

/// A persisted ticket.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Ticket {
    /// Store-generated identifier.
    pub id: TicketId,
    /// Kind of work.
    #[serde(rename = "type")]
    pub ticket_type: TicketType,
    /// Always `ticket_type.category()`.
    pub category: TicketCategory,
    /// Owning company.
    pub company_id: CompanyId,
    /// The single user responsible. Never reassigned.
    pub assignee_id: UserId,
    /// Lifecycle status.
    pub status: TicketStatus,
    /// Insert time.
    pub created_at: DateTime<Utc>,
    /// Last status change (equal to `created_at` until resolved).
    pub updated_at: DateTime<Utc>,
}

impl Ticket {
    /// Whether the ticket still needs work.
    pub fn is_open(&self) -> bool {
        self.status == TicketStatus::Open
    }
}

/// Fields supplied when inserting a ticket.
///
/// There is no category or status field: stores derive the category from
/// the type and always insert with [`TicketStatus::Open`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NewTicket {
    /// Kind of work.
    pub ticket_type: TicketType,
    /// Owning company.
    pub company_id: CompanyId,
    /// Resolved assignee.
    pub assignee_id: UserId,
}

/// Denormalized read model: a ticket with its company and assignee.
///
/// Relations are optional because the engine never validates that the
/// referenced rows exist.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TicketDetails {
    /// The ticket row.
    #[serde(flatten)]
    pub ticket: Ticket,
    /// The owning company, if it exists.
    pub company: Option<Company>,
    /// The assignee, if the user still exists.
    pub assignee: Option<User>,
}
