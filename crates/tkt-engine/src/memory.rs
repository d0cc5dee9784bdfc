//! # In-Memory Ticket Store
//!
//! A complete [`TicketStore`] backed by ordered maps. Used when no database
//! is configured and as the store double in tests.
//!
//! A transaction takes the store's single async mutex for its whole lifetime
//! and writes to the tables in place, recording an undo entry per change.
//! `commit` discards the undo log; dropping an uncommitted transaction
//! replays it in reverse. Every workflow is therefore serialized regardless
//! of its [`LockScope`], and a dropped transaction leaves the tables as it
//! found them.
//!
//! The mutex is `tokio::sync::Mutex` because the guard is held across the
//! `.await` points of a workflow.

use std::collections::BTreeMap;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::sync::{Mutex, OwnedMutexGuard};

use tkt_core::{
    Company, CompanyId, NewTicket, Ticket, TicketDetails, TicketId, TicketStatus, TicketType,
    User, UserId, UserRole,
};

use crate::error::StoreError;
use crate::store::{LockScope, TicketStore, TicketTransaction};

#[derive(Debug)]
struct Tables {
    companies: BTreeMap<CompanyId, Company>,
    users: BTreeMap<UserId, User>,
    tickets: BTreeMap<TicketId, Ticket>,
    next_ticket_id: i64,
}

impl Default for Tables {
    fn default() -> Self {
        Self {
            companies: BTreeMap::new(),
            users: BTreeMap::new(),
            tickets: BTreeMap::new(),
            next_ticket_id: 1,
        }
    }
}

impl Tables {
    /// Insert a ticket and advance the id sequence past it.
    ///
    /// Rejects a category that does not belong to the ticket's type and an id
    /// that leaves no room for the next one.
    fn put_ticket(&mut self, ticket: Ticket) -> Result<(), StoreError> {
        let derived = ticket.ticket_type.category();
        if ticket.category != derived {
            return Err(StoreError::Decode(format!(
                "ticket {}: category {} does not belong to type {} (expected {derived})",
                ticket.id, ticket.category, ticket.ticket_type
            )));
        }
        let next = ticket.id.get().checked_add(1).ok_or_else(|| {
            StoreError::Decode(format!("ticket {}: id exhausts the id sequence", ticket.id))
        })?;
        self.next_ticket_id = self.next_ticket_id.max(next);
        self.tickets.insert(ticket.id, ticket);
        Ok(())
    }
}

/// One reversible change made inside a transaction.
#[derive(Debug)]
enum Undo {
    Inserted {
        id: TicketId,
        previous_next_id: i64,
    },
    Resolved {
        id: TicketId,
        previous_updated_at: DateTime<Utc>,
    },
}

/// Seed data for an [`InMemoryStore`], usually read from a JSON file.
///
/// ```json
/// {
///   "companies": [{"id": 1, "name": "Acme", "createdAt": "2024-01-01T00:00:00Z"}],
///   "users": [{"id": 1, "name": "Ada", "role": "director", "companyId": 1,
///              "createdAt": "2024-01-01T00:00:00Z"}]
/// }
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Fixtures {
    #[serde(default)]
    pub companies: Vec<Company>,
    #[serde(default)]
    pub users: Vec<User>,
    #[serde(default)]
    pub tickets: Vec<Ticket>,
}

impl Fixtures {
    /// Parse a fixture document.
    pub fn from_json(json: &str) -> Result<Self, StoreError> {
        serde_json::from_str(json).map_err(|e| StoreError::Decode(format!("fixtures: {e}")))
    }
}

/// Thread-safe, cloneable in-memory store. Clones share the same tables.
#[derive(Debug, Clone, Default)]
pub struct InMemoryStore {
    tables: Arc<Mutex<Tables>>,
}

impl InMemoryStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a store pre-populated with `fixtures`.
    pub async fn with_fixtures(fixtures: Fixtures) -> Result<Self, StoreError> {
        let store = Self::new();
        store.load(fixtures).await?;
        Ok(store)
    }

    /// Insert (or replace) every record in `fixtures`.
    ///
    /// Stops at the first ticket [`put_ticket`](Tables::put_ticket) rejects;
    /// records before it stay loaded.
    pub async fn load(&self, fixtures: Fixtures) -> Result<(), StoreError> {
        let mut tables = self.tables.lock().await;
        for company in fixtures.companies {
            tables.companies.insert(company.id, company);
        }
        for user in fixtures.users {
            tables.users.insert(user.id, user);
        }
        for ticket in fixtures.tickets {
            tables.put_ticket(ticket)?;
        }
        Ok(())
    }

    /// Insert or replace a company.
    pub async fn insert_company(&self, company: Company) {
        self.tables.lock().await.companies.insert(company.id, company);
    }

    /// Insert or replace a user.
    pub async fn insert_user(&self, user: User) {
        self.tables.lock().await.users.insert(user.id, user);
    }

    /// Insert or replace a ticket, bypassing the rule engine.
    pub async fn insert_ticket(&self, ticket: Ticket) -> Result<(), StoreError> {
        self.tables.lock().await.put_ticket(ticket)
    }

    /// Fetch one ticket.
    pub async fn ticket(&self, id: TicketId) -> Option<Ticket> {
        self.tables.lock().await.tickets.get(&id).cloned()
    }

    /// All tickets in id order.
    pub async fn tickets(&self) -> Vec<Ticket> {
        self.tables.lock().await.tickets.values().cloned().collect()
    }

    /// Number of stored tickets.
    pub async fn ticket_count(&self) -> usize {
        self.tables.lock().await.tickets.len()
    }
}

impl TicketStore for InMemoryStore {
    type Transaction = InMemoryTransaction;

    async fn begin(&self, scope: LockScope) -> Result<InMemoryTransaction, StoreError> {
        let tables = Arc::clone(&self.tables).lock_owned().await;
        tracing::trace!(?scope, "in-memory transaction started");
        Ok(InMemoryTransaction {
            tables,
            undo: Vec::new(),
        })
    }

    async fn list_all_tickets(&self) -> Result<Vec<TicketDetails>, StoreError> {
        let tables = self.tables.lock().await;
        Ok(tables
            .tickets
            .values()
            .map(|ticket| TicketDetails {
                ticket: ticket.clone(),
                company: tables.companies.get(&ticket.company_id).cloned(),
                assignee: tables.users.get(&ticket.assignee_id).cloned(),
            })
            .collect())
    }
}

/// Unit of work over an [`InMemoryStore`].
#[derive(Debug)]
pub struct InMemoryTransaction {
    tables: OwnedMutexGuard<Tables>,
    undo: Vec<Undo>,
}

impl Drop for InMemoryTransaction {
    fn drop(&mut self) {
        if self.undo.is_empty() {
            return;
        }
        tracing::trace!(changes = self.undo.len(), "rolling back in-memory transaction");
        while let Some(change) = self.undo.pop() {
            match change {
                Undo::Inserted {
                    id,
                    previous_next_id,
                } => {
                    self.tables.tickets.remove(&id);
                    self.tables.next_ticket_id = previous_next_id;
                }
                Undo::Resolved {
                    id,
                    previous_updated_at,
                } => {
                    if let Some(ticket) = self.tables.tickets.get_mut(&id) {
                        ticket.status = TicketStatus::Open;
                        ticket.updated_at = previous_updated_at;
                    }
                }
            }
        }
    }
}

impl TicketTransaction for InMemoryTransaction {
    async fn find_open_tickets_by_type_and_company(
        &mut self,
        ticket_type: TicketType,
        company_id: CompanyId,
    ) -> Result<Vec<Ticket>, StoreError> {
        let mut open: Vec<Ticket> = self
            .tables
            .tickets
            .values()
            .filter(|t| t.ticket_type == ticket_type && t.company_id == company_id && t.is_open())
            .cloned()
            .collect();
        open.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id)));
        Ok(open)
    }

    async fn find_users_by_company_and_role(
        &mut self,
        company_id: CompanyId,
        role: UserRole,
    ) -> Result<Vec<User>, StoreError> {
        let mut users: Vec<User> = self
            .tables
            .users
            .values()
            .filter(|u| u.company_id == company_id && u.role == role)
            .cloned()
            .collect();
        users.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id)));
        Ok(users)
    }

    async fn create_ticket(&mut self, ticket: NewTicket) -> Result<Ticket, StoreError> {
        let now = Utc::now();
        let previous_next_id = self.tables.next_ticket_id;
        let stored = Ticket {
            id: TicketId::new(previous_next_id),
            ticket_type: ticket.ticket_type,
            category: ticket.ticket_type.category(),
            company_id: ticket.company_id,
            assignee_id: ticket.assignee_id,
            status: TicketStatus::Open,
            created_at: now,
            updated_at: now,
        };
        self.tables.put_ticket(stored.clone())?;
        self.undo.push(Undo::Inserted {
            id: stored.id,
            previous_next_id,
        });
        Ok(stored)
    }

    async fn resolve_all_except(
        &mut self,
        keep: TicketId,
        company_id: Option<CompanyId>,
    ) -> Result<u64, StoreError> {
        let now = Utc::now();
        let mut resolved = 0;
        for ticket in self.tables.tickets.values_mut() {
            let in_scope = company_id.map_or(true, |c| ticket.company_id == c);
            if ticket.id != keep && in_scope && ticket.is_open() {
                self.undo.push(Undo::Resolved {
                    id: ticket.id,
                    previous_updated_at: ticket.updated_at,
                });
                ticket.status = TicketStatus::Resolved;
                ticket.updated_at = now;
                resolved += 1;
            }
        }
        Ok(resolved)
    }

    async fn commit(mut self) -> Result<(), StoreError> {
        self.undo.clear();
        Ok(())
    }
}
