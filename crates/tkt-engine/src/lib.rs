//! # tkt-engine: Ticket Assignment Rule Engine
//!
//! Decides who a new compliance ticket is assigned to, or why it cannot be
//! created. Callers supply only `(type, company)`; the assignee is always
//! derived from the company's staffing at the moment of creation.
//!
//! ## Modules
//!
//! - **Policy** (`policy.rs`): the per-type rule table (precondition,
//!   ordered candidate roles with their selection rule, and whether the
//!   ticket supersedes other open work).
//!
//! - **Selection** (`selection.rs`): pure candidate selection over a list of
//!   users. No store access.
//!
//! - **Store** (`store.rs`): the persistence contract. Workflow operations run
//!   on a [`TicketTransaction`] obtained from [`TicketStore::begin`]; nothing
//!   is visible to other workflows until `commit`.
//!
//! - **Memory** (`memory.rs`): [`InMemoryStore`], a complete store for
//!   development and tests.
//!
//! - **Engine** (`engine.rs`): [`RuleEngine`], which runs the creation
//!   workflow against any store.
//!
//! ## Creation Workflow
//!
//! ```text
//! begin(lock) ─▶ open-ticket check ─▶ candidate pools ─▶ insert ─▶ supersede? ─▶ commit
//!                      │                     │
//!                      ▼                     ▼
//!          ConflictingOpenTicket   AmbiguousAssignee / NoEligibleAssignee
//! ```
//!
//! Every rejection happens before the insert and drops the transaction, so a
//! failed creation never leaves a partial ticket behind.

pub mod config;
pub mod engine;
pub mod error;
pub mod memory;
pub mod policy;
pub mod selection;
pub mod store;

pub use config::{EngineConfig, SupersedeScope};
pub use engine::{resolve_category, resolve_ticket_type, RuleEngine};
pub use error::{RuleError, RuleErrorKind, StoreError};
pub use memory::{Fixtures, InMemoryStore, InMemoryTransaction};
pub use policy::{RoleRule, TicketPolicy};
pub use selection::{select_candidate, Candidate, Selection};
pub use store::{LockScope, TicketStore, TicketTransaction};
