//! Ticket persistence operations.
//!
//! [`PgTicketStore`] implements the engine's store contract over the
//! `companies`, `users` and `tickets` tables. Each unit of work is one
//! Postgres transaction holding advisory locks until commit or rollback:
//!
//! - `LockScope::Company(id)` takes the namespace lock in shared mode, then
//!   an exclusive lock keyed by the company id. Workflows for different
//!   companies run in parallel.
//! - `LockScope::Global` takes the namespace lock in exclusive mode, which
//!   waits out every company-scoped workflow.
//!
//! Enum columns hold the same camelCase strings the API uses on the wire.

use chrono::{DateTime, Utc};
use sqlx::postgres::Postgres;
use sqlx::{PgPool, Transaction};
use tkt_core::{
    Company, CompanyId, NewTicket, Ticket, TicketCategory, TicketDetails, TicketId, TicketStatus,
    TicketType, User, UserId, UserRole,
};
use tkt_engine::{LockScope, StoreError, TicketStore, TicketTransaction};

/// First key of the two-key advisory lock guarding the ticket tables.
const TICKET_LOCK_NAMESPACE: i32 = 0x544b_5453;

const TICKET_COLUMNS: &str =
    "id, ticket_type, category, company_id, assignee_id, status, created_at, updated_at";

/// Map a driver error, keeping unique violations distinguishable.
fn store_error(err: sqlx::Error) -> StoreError {
    match &err {
        sqlx::Error::Database(db) if db.is_unique_violation() => {
            StoreError::UniqueViolation(db.message().to_string())
        }
        _ => StoreError::Backend(err.to_string()),
    }
}

fn decode_error(column: &str, err: impl std::fmt::Display) -> StoreError {
    StoreError::Decode(format!("{column}: {err}"))
}

/// Postgres-backed ticket store.
#[derive(Debug, Clone)]
pub struct PgTicketStore {
    pool: PgPool,
}

impl PgTicketStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

impl TicketStore for PgTicketStore {
    type Transaction = PgTicketTransaction;

    async fn begin(&self, scope: LockScope) -> Result<PgTicketTransaction, StoreError> {
        let mut tx = self.pool.begin().await.map_err(store_error)?;

        match scope {
            LockScope::Company(company_id) => {
                sqlx::query("SELECT pg_advisory_xact_lock_shared($1, 0)")
                    .bind(TICKET_LOCK_NAMESPACE)
                    .execute(&mut *tx)
                    .await
                    .map_err(store_error)?;
                sqlx::query("SELECT pg_advisory_xact_lock($1)")
                    .bind(company_id.get())
                    .execute(&mut *tx)
                    .await
                    .map_err(store_error)?;
            }
            LockScope::Global => {
                sqlx::query("SELECT pg_advisory_xact_lock($1, 0)")
                    .bind(TICKET_LOCK_NAMESPACE)
                    .execute(&mut *tx)
                    .await
                    .map_err(store_error)?;
            }
        }

        tracing::trace!(?scope, "postgres transaction started");
        Ok(PgTicketTransaction { tx })
    }

    async fn list_all_tickets(&self) -> Result<Vec<TicketDetails>, StoreError> {
        let rows = sqlx::query_as::<_, TicketDetailsRow>(
            "SELECT t.id, t.ticket_type, t.category, t.company_id, t.assignee_id, t.status,
                    t.created_at, t.updated_at,
                    c.name AS company_name, c.created_at AS company_created_at,
                    u.name AS assignee_name, u.role AS assignee_role,
                    u.company_id AS assignee_company_id, u.created_at AS assignee_created_at
             FROM tickets t
             LEFT JOIN companies c ON c.id = t.company_id
             LEFT JOIN users u ON u.id = t.assignee_id
             ORDER BY t.id",
        )
        .fetch_all(&self.pool)
        .await
        .map_err(store_error)?;

        rows.into_iter().map(TicketDetailsRow::into_details).collect()
    }
}

/// Unit of work over a [`PgTicketStore`]. Rolls back on drop.
pub struct PgTicketTransaction {
    tx: Transaction<'static, Postgres>,
}

impl std::fmt::Debug for PgTicketTransaction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PgTicketTransaction").finish_non_exhaustive()
    }
}

impl TicketTransaction for PgTicketTransaction {
    async fn find_open_tickets_by_type_and_company(
        &mut self,
        ticket_type: TicketType,
        company_id: CompanyId,
    ) -> Result<Vec<Ticket>, StoreError> {
        let rows = sqlx::query_as::<_, TicketRow>(&format!(
            "SELECT {TICKET_COLUMNS} FROM tickets
             WHERE company_id = $1 AND ticket_type = $2 AND status = $3
             ORDER BY created_at DESC, id DESC"
        ))
        .bind(company_id.get())
        .bind(ticket_type.as_str())
        .bind(TicketStatus::Open.as_str())
        .fetch_all(&mut *self.tx)
        .await
        .map_err(store_error)?;

        rows.into_iter().map(TicketRow::into_ticket).collect()
    }

    async fn find_users_by_company_and_role(
        &mut self,
        company_id: CompanyId,
        role: UserRole,
    ) -> Result<Vec<User>, StoreError> {
        let rows = sqlx::query_as::<_, UserRow>(
            "SELECT id, name, role, company_id, created_at FROM users
             WHERE company_id = $1 AND role = $2
             ORDER BY created_at DESC, id DESC",
        )
        .bind(company_id.get())
        .bind(role.as_str())
        .fetch_all(&mut *self.tx)
        .await
        .map_err(store_error)?;

        rows.into_iter().map(UserRow::into_user).collect()
    }

    async fn create_ticket(&mut self, ticket: NewTicket) -> Result<Ticket, StoreError> {
        let row = sqlx::query_as::<_, TicketRow>(&format!(
            "INSERT INTO tickets (ticket_type, category, company_id, assignee_id, status)
             VALUES ($1, $2, $3, $4, $5)
             RETURNING {TICKET_COLUMNS}"
        ))
        .bind(ticket.ticket_type.as_str())
        .bind(ticket.ticket_type.category().as_str())
        .bind(ticket.company_id.get())
        .bind(ticket.assignee_id.get())
        .bind(TicketStatus::Open.as_str())
        .fetch_one(&mut *self.tx)
        .await
        .map_err(store_error)?;

        row.into_ticket()
    }

    async fn resolve_all_except(
        &mut self,
        keep: TicketId,
        company_id: Option<CompanyId>,
    ) -> Result<u64, StoreError> {
        let result = sqlx::query(
            "UPDATE tickets SET status = $1, updated_at = now()
             WHERE id <> $2 AND status = $3
               AND ($4::BIGINT IS NULL OR company_id = $4)",
        )
        .bind(TicketStatus::Resolved.as_str())
        .bind(keep.get())
        .bind(TicketStatus::Open.as_str())
        .bind(company_id.map(|c| c.get()))
        .execute(&mut *self.tx)
        .await
        .map_err(store_error)?;

        Ok(result.rows_affected())
    }

    async fn commit(self) -> Result<(), StoreError> {
        self.tx.commit().await.map_err(store_error)
    }
}

/// Internal row type for SQLx mapping.
#[derive(sqlx::FromRow)]
struct TicketRow {
    id: i64,
    ticket_type: String,
    category: String,
    company_id: i64,
    assignee_id: i64,
    status: String,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl TicketRow {
    fn into_ticket(self) -> Result<Ticket, StoreError> {
        let ticket_type: TicketType = self
            .ticket_type
            .parse()
            .map_err(|e| decode_error("ticket_type", e))?;
        let category: TicketCategory = self
            .category
            .parse()
            .map_err(|e| decode_error("category", e))?;
        if category != ticket_type.category() {
            tracing::error!(
                id = self.id,
                ticket_type = %ticket_type,
                category = %category,
                "stored category does not match ticket type"
            );
            return Err(decode_error(
                "category",
                format!("{category} does not belong to {ticket_type}"),
            ));
        }
        let status: TicketStatus = self
            .status
            .parse()
            .map_err(|e| decode_error("status", e))?;

        Ok(Ticket {
            id: TicketId::new(self.id),
            ticket_type,
            category,
            company_id: CompanyId::new(self.company_id),
            assignee_id: UserId::new(self.assignee_id),
            status,
            created_at: self.created_at,
            updated_at: self.updated_at,
        })
    }
}

#[derive(sqlx::FromRow)]
struct UserRow {
    id: i64,
    name: String,
    role: String,
    company_id: i64,
    created_at: DateTime<Utc>,
}

impl UserRow {
    fn into_user(self) -> Result<User, StoreError> {
        Ok(User {
            id: UserId::new(self.id),
            name: self.name,
            role: self.role.parse().map_err(|e| decode_error("role", e))?,
            company_id: CompanyId::new(self.company_id),
            created_at: self.created_at,
        })
    }
}

/// Ticket joined with its company and assignee. Join columns are null when
/// the referenced row is missing.
#[derive(sqlx::FromRow)]
struct TicketDetailsRow {
    #[sqlx(flatten)]
    ticket: TicketRow,
    company_name: Option<String>,
    company_created_at: Option<DateTime<Utc>>,
    assignee_name: Option<String>,
    assignee_role: Option<String>,
    assignee_company_id: Option<i64>,
    assignee_created_at: Option<DateTime<Utc>>,
}

impl TicketDetailsRow {
    fn into_details(self) -> Result<TicketDetails, StoreError> {
        let company = match (self.company_name, self.company_created_at) {
            (Some(name), Some(created_at)) => Some(Company {
                id: CompanyId::new(self.ticket.company_id),
                name,
                created_at,
            }),
            _ => None,
        };
        let assignee = match (
            self.assignee_name,
            self.assignee_role,
            self.assignee_company_id,
            self.assignee_created_at,
        ) {
            (Some(name), Some(role), Some(company_id), Some(created_at)) => Some(
                UserRow {
                    id: self.ticket.assignee_id,
                    name,
                    role,
                    company_id,
                    created_at,
                }
                .into_user()?,
            ),
            _ => None,
        };

        Ok(TicketDetails {
            ticket: self.ticket.into_ticket()?,
            company,
            assignee,
        })
    }
}
