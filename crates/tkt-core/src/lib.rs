#![deny(missing_docs)]

//! # tkt-core: Foundational Types for Compliance Ticketing
//!
//! This crate defines the domain vocabulary shared by the rule engine and the
//! API service. It has no internal crate dependencies and performs no I/O:
//! only `serde`, `thiserror`, and `chrono` from the external ecosystem.
//!
//! ## Design Principles
//!
//! 1. **Newtype wrappers for identifiers.** [`TicketId`], [`CompanyId`] and
//!    [`UserId`] are distinct types. You cannot pass a company id where an
//!    assignee id is expected.
//!
//! 2. **Closed enumerations with one wire form.** [`TicketType`],
//!    [`TicketCategory`], [`TicketStatus`] and [`UserRole`] each serialize to
//!    a single camelCase string and parse back through `FromStr`. Unknown
//!    strings are rejected with a [`ValidationError`], never defaulted.
//!
//! 3. **Category is derived.** A ticket's category is a function of its type
//!    ([`TicketType::category`]); there is no setter.

pub mod error;
pub mod identity;
pub mod ticket;
pub mod user;

// Re-export primary types at crate root for ergonomic imports.
pub use error::ValidationError;
pub use identity::{CompanyId, TicketId, UserId};
pub use ticket::{NewTicket, Ticket, TicketCategory, TicketDetails, TicketStatus, TicketType};
pub use user::{Company, User, UserRole};
