//! # Rule Engine
//!
//! [`RuleEngine::create`] runs the creation workflow for one `(type,
//! company)` request inside a single store transaction:
//!
//! 1. Parse the type and look up its [`TicketPolicy`].
//! 2. If the policy is exclusive while open, reject when the company already
//!    has an open ticket of that type.
//! 3. Walk the policy's candidate roles in order. An empty pool falls through
//!    to the next role; an ambiguous pool stops with `AmbiguousAssignee`; if
//!    every pool is empty the request fails with `NoEligibleAssignee`.
//! 4. Insert the ticket.
//! 5. If the policy supersedes open work, resolve the other open tickets in
//!    the configured [`SupersedeScope`].
//! 6. Commit.
//!
//! Steps 2 and 3 read only; every rejection drops the transaction before
//! step 4, so nothing is written on failure.

use tkt_core::{CompanyId, NewTicket, Ticket, TicketCategory, TicketDetails, TicketType, User};

use crate::config::{EngineConfig, SupersedeScope};
use crate::error::{RuleError, StoreError};
use crate::policy::TicketPolicy;
use crate::selection::{select_candidate, Candidate};
use crate::store::{LockScope, TicketStore, TicketTransaction};

/// Parse a wire ticket type, rejecting unknown values.
pub fn resolve_ticket_type(raw: &str) -> Result<TicketType, RuleError> {
    raw.parse::<TicketType>().map_err(RuleError::InvalidTicketType)
}

/// Category for a wire ticket type.
pub fn resolve_category(raw: &str) -> Result<TicketCategory, RuleError> {
    Ok(resolve_ticket_type(raw)?.category())
}

/// Assigns tickets against a [`TicketStore`].
///
/// Holds no ticket or user state of its own; every decision is recomputed
/// from fresh store reads.
#[derive(Debug, Clone)]
pub struct RuleEngine<S> {
    store: S,
    config: EngineConfig,
}

impl<S: TicketStore> RuleEngine<S> {
    /// Create an engine over `store`.
    pub fn new(store: S, config: EngineConfig) -> Self {
        Self { store, config }
    }

    /// The underlying store.
    pub fn store(&self) -> &S {
        &self.store
    }

    /// Active configuration.
    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Create a ticket from an unvalidated wire type.
    pub async fn create(&self, raw_type: &str, company_id: CompanyId) -> Result<Ticket, RuleError> {
        let ticket_type = match resolve_ticket_type(raw_type) {
            Ok(t) => t,
            Err(err) => {
                tracing::warn!(
                    kind = %err.kind(),
                    company_id = %company_id,
                    ticket_type = raw_type,
                    "ticket creation rejected: {err}"
                );
                return Err(err);
            }
        };
        self.create_ticket(ticket_type, company_id).await
    }

    /// Create a ticket of a known type.
    pub async fn create_ticket(
        &self,
        ticket_type: TicketType,
        company_id: CompanyId,
    ) -> Result<Ticket, RuleError> {
        let result = self.run_creation(ticket_type, company_id).await;
        if let Err(err) = &result {
            if err.kind().is_client_error() {
                tracing::warn!(
                    kind = %err.kind(),
                    company_id = %company_id,
                    ticket_type = %ticket_type,
                    "ticket creation rejected: {err}"
                );
            } else {
                tracing::error!(
                    company_id = %company_id,
                    ticket_type = %ticket_type,
                    error = %err,
                    "ticket creation failed"
                );
            }
        }
        result
    }

    /// Every ticket with its company and assignee.
    pub async fn list_tickets(&self) -> Result<Vec<TicketDetails>, RuleError> {
        Ok(self.store.list_all_tickets().await?)
    }

    async fn run_creation(
        &self,
        ticket_type: TicketType,
        company_id: CompanyId,
    ) -> Result<Ticket, RuleError> {
        let policy = TicketPolicy::for_type(ticket_type);
        let global_supersede =
            policy.supersedes_open_work && self.config.supersede_scope == SupersedeScope::Global;
        let lock = if global_supersede {
            LockScope::Global
        } else {
            LockScope::Company(company_id)
        };

        let mut tx = self.store.begin(lock).await?;

        if policy.exclusive_while_open {
            let open = tx
                .find_open_tickets_by_type_and_company(ticket_type, company_id)
                .await?;
            if !open.is_empty() {
                return Err(RuleError::ConflictingOpenTicket {
                    ticket_type,
                    company_id,
                });
            }
        }

        let assignee = resolve_assignee(&mut tx, policy, company_id).await?;

        let ticket = tx
            .create_ticket(NewTicket {
                ticket_type,
                company_id,
                assignee_id: assignee.id,
            })
            .await
            .map_err(|err| match err {
                StoreError::UniqueViolation(_) => RuleError::ConflictingOpenTicket {
                    ticket_type,
                    company_id,
                },
                other => RuleError::Store(other),
            })?;

        let mut superseded = 0;
        if policy.supersedes_open_work {
            let scope = (!global_supersede).then_some(company_id);
            superseded = tx.resolve_all_except(ticket.id, scope).await?;
        }

        tx.commit().await?;

        tracing::info!(
            ticket_id = %ticket.id,
            ticket_type = %ticket.ticket_type,
            category = %policy.category(),
            company_id = %ticket.company_id,
            assignee_id = %ticket.assignee_id,
            resolved = superseded,
            "ticket created"
        );
        Ok(ticket)
    }
}

/// Walk the policy's candidate roles and pick the assignee.
async fn resolve_assignee<T: TicketTransaction>(
    tx: &mut T,
    policy: &'static TicketPolicy,
    company_id: CompanyId,
) -> Result<User, RuleError> {
    for rule in policy.candidates {
        let pool = tx
            .find_users_by_company_and_role(company_id, rule.role)
            .await?;
        match select_candidate(&pool, rule.selection) {
            Candidate::Selected(user) => return Ok(user.clone()),
            Candidate::Ambiguous(count) => {
                return Err(RuleError::AmbiguousAssignee {
                    ticket_type: policy.ticket_type,
                    company_id,
                    role: rule.role,
                    count,
                })
            }
            Candidate::Empty => {}
        }
    }
    Err(RuleError::NoEligibleAssignee {
        ticket_type: policy.ticket_type,
        company_id,
        roles: policy.roles().collect(),
    })
}
