//! # Ticket Store Contract
//!
//! The engine depends on persistence only through these two traits. A
//! [`TicketStore`] hands out [`TicketTransaction`]s; all reads and writes of
//! one creation workflow go through the same transaction, and nothing is
//! visible to other workflows until [`TicketTransaction::commit`]. Dropping a
//! transaction without committing discards its writes.
//!
//! Methods return `impl Future + Send` so that engine futures stay `Send`
//! and can be driven from Axum handlers and spawned tasks.

use std::future::Future;

use tkt_core::{CompanyId, NewTicket, Ticket, TicketDetails, TicketId, TicketType, User, UserRole};

use crate::error::StoreError;

/// What a workflow needs exclusive access to.
///
/// Stores use the scope to serialize competing workflows: two workflows for
/// the same company must not interleave their read-check-write sequences, and
/// a workflow that resolves tickets across all companies must not interleave
/// with any other.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LockScope {
    /// Tickets of one company.
    Company(CompanyId),
    /// Every ticket in the store.
    Global,
}

/// A ticket store that can open units of work.
pub trait TicketStore: Send + Sync {
    /// Transaction handle type.
    type Transaction: TicketTransaction;

    /// Open a unit of work holding the given lock scope until commit or drop.
    fn begin(
        &self,
        scope: LockScope,
    ) -> impl Future<Output = Result<Self::Transaction, StoreError>> + Send;

    /// Every ticket with its company and assignee, oldest first.
    fn list_all_tickets(
        &self,
    ) -> impl Future<Output = Result<Vec<TicketDetails>, StoreError>> + Send;
}

/// Operations available inside a unit of work.
pub trait TicketTransaction: Send {
    /// Open tickets of `ticket_type` belonging to `company_id`.
    fn find_open_tickets_by_type_and_company(
        &mut self,
        ticket_type: TicketType,
        company_id: CompanyId,
    ) -> impl Future<Output = Result<Vec<Ticket>, StoreError>> + Send;

    /// Users of `company_id` holding `role`, newest first.
    fn find_users_by_company_and_role(
        &mut self,
        company_id: CompanyId,
        role: UserRole,
    ) -> impl Future<Output = Result<Vec<User>, StoreError>> + Send;

    /// Insert an open ticket and return the stored row.
    fn create_ticket(
        &mut self,
        ticket: NewTicket,
    ) -> impl Future<Output = Result<Ticket, StoreError>> + Send;

    /// Mark every open ticket except `keep` as resolved, restricted to
    /// `company_id` when given. Returns the number of tickets transitioned.
    fn resolve_all_except(
        &mut self,
        keep: TicketId,
        company_id: Option<CompanyId>,
    ) -> impl Future<Output = Result<u64, StoreError>> + Send;

    /// Make all writes visible and release the lock scope.
    fn commit(self) -> impl Future<Output = Result<(), StoreError>> + Send;
}
