//! # Ticket Policy Table
//!
//! One [`TicketPolicy`] per [`TicketType`], looked up through an exhaustive
//! `match` so an unmapped type is a compile error rather than a silent
//! default.
//!
//! | type | exclusive while open | candidates (in fallback order) | supersedes |
//! |---|---|---|---|
//! | managementReport | no | accountant (most recent) | no |
//! | registrationAddressChange | yes | corporateSecretary (exactly one), then director (exactly one) | no |
//! | strikeOff | no | director (exactly one) | yes |
//!
//! A later candidate role is consulted only when every earlier pool was
//! empty. An ambiguous pool stops resolution immediately.

use tkt_core::{TicketCategory, TicketType, UserRole};

use crate::selection::Selection;

/// One step of a candidate fallback chain.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RoleRule {
    pub role: UserRole,
    pub selection: Selection,
}

/// Resolution policy for one ticket type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TicketPolicy {
    pub ticket_type: TicketType,
    /// Reject creation while an open ticket of this type exists for the company.
    pub exclusive_while_open: bool,
    /// Candidate roles in fallback order. Never empty.
    pub candidates: &'static [RoleRule],
    /// Resolve other open tickets once this one is created.
    pub supersedes_open_work: bool,
}

static MANAGEMENT_REPORT: TicketPolicy = TicketPolicy {
    ticket_type: TicketType::ManagementReport,
    exclusive_while_open: false,
    candidates: &[RoleRule {
        role: UserRole::Accountant,
        selection: Selection::MostRecent,
    }],
    supersedes_open_work: false,
};

static REGISTRATION_ADDRESS_CHANGE: TicketPolicy = TicketPolicy {
    ticket_type: TicketType::RegistrationAddressChange,
    exclusive_while_open: true,
    candidates: &[
        RoleRule {
            role: UserRole::CorporateSecretary,
            selection: Selection::ExactlyOne,
        },
        RoleRule {
            role: UserRole::Director,
            selection: Selection::ExactlyOne,
        },
    ],
    supersedes_open_work: false,
};

static STRIKE_OFF: TicketPolicy = TicketPolicy {
    ticket_type: TicketType::StrikeOff,
    exclusive_while_open: false,
    candidates: &[RoleRule {
        role: UserRole::Director,
        selection: Selection::ExactlyOne,
    }],
    supersedes_open_work: true,
};

impl TicketPolicy {
    /// The policy governing `ticket_type`.
    pub fn for_type(ticket_type: TicketType) -> &'static TicketPolicy {
        match ticket_type {
            TicketType::ManagementReport => &MANAGEMENT_REPORT,
            TicketType::RegistrationAddressChange => &REGISTRATION_ADDRESS_CHANGE,
            TicketType::StrikeOff => &STRIKE_OFF,
        }
    }

    /// Category of tickets created under this policy.
    pub fn category(&self) -> TicketCategory {
        self.ticket_type.category()
    }

    /// Roles consulted, in fallback order.
    pub fn roles(&self) -> impl Iterator<Item = UserRole> + '_ {
        self.candidates.iter().map(|rule| rule.role)
    }
}
