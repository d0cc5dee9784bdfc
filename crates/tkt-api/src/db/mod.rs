//! # Database Persistence Layer
//!
//! Postgres persistence for companies, users and tickets via SQLx.
//!
//! The database layer is **optional**. With a connection string the API
//! runs the rule engine over [`tickets::PgTicketStore`]. Without one it
//! operates in in-memory-only mode (suitable for development and testing).
//!
//! ## Concurrency
//!
//! Every creation runs in one transaction holding transaction-scoped
//! advisory locks (see [`tickets`]). A partial unique index on open
//! registration-address-change tickets backs the exclusivity rule in SQL.

pub mod tickets;

use sqlx::postgres::{PgPool, PgPoolOptions};

/// Initialize the database connection pool and run migrations.
///
/// Returns `None` if no URL is configured (in-memory-only mode).
/// Returns `Err` if the URL is set but the connection or migration fails.
pub async fn init_pool(database_url: Option<&str>) -> Result<Option<PgPool>, sqlx::Error> {
    let Some(url) = database_url else {
        tracing::warn!(
            "DATABASE_URL not set; running in-memory only mode. \
             Tickets will not survive restarts."
        );
        return Ok(None);
    };

    let pool = PgPoolOptions::new()
        .max_connections(20)
        .min_connections(2)
        .acquire_timeout(std::time::Duration::from_secs(5))
        .connect(url)
        .await?;

    tracing::info!("Connected to PostgreSQL");

    sqlx::migrate!("./migrations").run(&pool).await?;
    tracing::info!("Database migrations applied");

    Ok(Some(pool))
}
