//! # Application State
//!
//! Shared state for the Axum application, passed to all route handlers
//! via the `State` extractor.
//!
//! The rule engine is generic over its store, so the state holds a
//! [`TicketService`] that names each concrete backend. Handlers stay
//! backend-agnostic and their futures stay `Send`.

use std::path::Path;
use std::sync::Arc;

use anyhow::Context;
use metrics_exporter_prometheus::PrometheusHandle;
use sqlx::PgPool;
use tkt_core::{CompanyId, Ticket, TicketDetails};
use tkt_engine::{EngineConfig, Fixtures, InMemoryStore, RuleEngine, RuleError};

use crate::config::AppConfig;
use crate::db::tickets::PgTicketStore;

/// Rule engine bound to one of the supported stores.
#[derive(Debug, Clone)]
pub enum TicketService {
    /// Process-local store; state does not survive restarts.
    Memory(Arc<RuleEngine<InMemoryStore>>),
    /// Postgres-backed store.
    Postgres(Arc<RuleEngine<PgTicketStore>>),
}

impl TicketService {
    /// Create a ticket from an unvalidated wire type.
    pub async fn create(&self, raw_type: &str, company_id: CompanyId) -> Result<Ticket, RuleError> {
        match self {
            Self::Memory(engine) => engine.create(raw_type, company_id).await,
            Self::Postgres(engine) => engine.create(raw_type, company_id).await,
        }
    }

    /// Every ticket with its company and assignee.
    pub async fn list(&self) -> Result<Vec<TicketDetails>, RuleError> {
        match self {
            Self::Memory(engine) => engine.list_tickets().await,
            Self::Postgres(engine) => engine.list_tickets().await,
        }
    }

    /// Name of the active backend, for logs.
    pub fn backend(&self) -> &'static str {
        match self {
            Self::Memory(_) => "memory",
            Self::Postgres(_) => "postgres",
        }
    }
}

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    pub tickets: TicketService,
    /// Render handle for `/metrics`; `None` when no recorder is installed.
    pub prometheus: Option<PrometheusHandle>,
}

impl AppState {
    /// In-memory state with an empty store and default engine settings.
    pub fn new() -> Self {
        Self::in_memory(InMemoryStore::new(), EngineConfig::default())
    }

    /// State over an existing in-memory store.
    pub fn in_memory(store: InMemoryStore, config: EngineConfig) -> Self {
        Self {
            tickets: TicketService::Memory(Arc::new(RuleEngine::new(store, config))),
            prometheus: None,
        }
    }

    /// State over a migrated Postgres pool.
    pub fn postgres(pool: PgPool, config: EngineConfig) -> Self {
        Self {
            tickets: TicketService::Postgres(Arc::new(RuleEngine::new(
                PgTicketStore::new(pool),
                config,
            ))),
            prometheus: None,
        }
    }

    /// Build state from startup configuration.
    ///
    /// Connects and migrates when a database URL is configured; otherwise
    /// opens an in-memory store seeded from the fixtures file, if any.
    pub async fn from_config(config: &AppConfig) -> anyhow::Result<Self> {
        if let Some(pool) = crate::db::init_pool(config.database_url.as_deref())
            .await
            .context("database initialization failed")?
        {
            if config.fixtures.is_some() {
                tracing::warn!("fixtures are ignored when a database is configured");
            }
            return Ok(Self::postgres(pool, config.engine()));
        }

        let store = match &config.fixtures {
            Some(path) => InMemoryStore::with_fixtures(load_fixtures(path).await?)
                .await
                .with_context(|| format!("seeding store from {}", path.display()))?,
            None => InMemoryStore::new(),
        };
        Ok(Self::in_memory(store, config.engine()))
    }

    /// Attach a Prometheus render handle.
    pub fn with_prometheus(mut self, handle: PrometheusHandle) -> Self {
        self.prometheus = Some(handle);
        self
    }
}

/// Read and parse a fixtures file.
pub async fn load_fixtures(path: &Path) -> anyhow::Result<Fixtures> {
    let json = tokio::fs::read_to_string(path)
        .await
        .with_context(|| format!("reading fixtures from {}", path.display()))?;
    let fixtures = Fixtures::from_json(&json)?;
    tracing::info!(
        path = %path.display(),
        companies = fixtures.companies.len(),
        users = fixtures.users.len(),
        tickets = fixtures.tickets.len(),
        "fixtures loaded"
    );
    Ok(fixtures)
}

impl Default for AppState {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for AppState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppState")
            .field("tickets", &self.tickets)
            .field("prometheus", &self.prometheus.is_some())
            .finish()
    }
}
