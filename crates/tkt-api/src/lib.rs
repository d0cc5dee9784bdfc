//! # tkt-api: Axum API Service
//!
//! HTTP surface over the ticket rule engine. Handlers parse requests, call
//! [`tkt_engine::RuleEngine`], and map results to JSON; no assignment logic
//! lives here.
//!
//! ## API Surface
//!
//! | Method | Path                  | Module               |
//! |--------|-----------------------|----------------------|
//! | POST   | `/api/v1/tickets`     | [`routes::tickets`]  |
//! | GET    | `/api/v1/tickets`     | [`routes::tickets`]  |
//! | GET    | `/openapi.json`       | [`openapi`]          |
//! | GET    | `/metrics`            | [`middleware::metrics`] |
//! | GET    | `/health/liveness`    | this module          |
//! | GET    | `/health/readiness`   | this module          |
//!
//! ## Middleware Stack (execution order)
//!
//! ```text
//! TraceLayer → MetricsMiddleware → Handler
//! ```
//!
//! ## Persistence
//!
//! With `DATABASE_URL` set, tickets live in Postgres ([`db`]). Without it the
//! service runs on the engine's in-memory store, optionally seeded from a
//! fixtures file.

pub mod config;
pub mod db;
pub mod error;
pub mod extractors;
pub mod middleware;
pub mod openapi;
pub mod routes;
pub mod state;

use axum::middleware::from_fn;
use axum::routing::get;
use axum::Router;

pub use error::AppError;
pub use state::AppState;

/// Assemble the application router with all routes and middleware.
pub fn app(state: AppState) -> Router {
    let api = Router::new()
        .merge(routes::tickets::router())
        .merge(openapi::router())
        .merge(middleware::metrics::router())
        .layer(from_fn(middleware::metrics::metrics_middleware))
        .layer(middleware::tracing_layer::layer())
        .with_state(state);

    let health = Router::new()
        .route("/health/liveness", get(liveness))
        .route("/health/readiness", get(readiness));

    Router::new().merge(health).merge(api)
}

/// Liveness check. Always returns 200 if the process is running.
async fn liveness() -> &'static str {
    "ok"
}

/// Readiness check. Returns 200 when the application is ready to serve.
async fn readiness() -> &'static str {
    "ready"
}
