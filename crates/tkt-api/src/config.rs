//! # Service Configuration
//!
//! Command-line flags with environment fallbacks, parsed once at startup.

use std::path::PathBuf;

use clap::{Parser, ValueEnum};
use tkt_engine::{EngineConfig, SupersedeScope};

/// Log output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum LogFormat {
    /// Human-readable, for local development.
    Pretty,
    /// One JSON object per line, for log shippers.
    Json,
}

/// Runtime configuration for the ticket service.
#[derive(Clone, Parser)]
#[command(name = "tkt-api", version, about = "Compliance ticket assignment service")]
pub struct AppConfig {
    /// Port to bind the HTTP server to.
    #[arg(long, env = "PORT", default_value_t = 8080)]
    pub port: u16,

    /// Postgres connection string. In-memory mode when absent.
    #[arg(long, env = "DATABASE_URL")]
    pub database_url: Option<String>,

    /// JSON fixtures (companies, users, tickets) seeded into the in-memory store.
    #[arg(long, env = "TICKETS_FIXTURES")]
    pub fixtures: Option<PathBuf>,

    /// Which open tickets a strike-off resolves: `company` or `global`.
    #[arg(long, env = "TICKETS_SUPERSEDE_SCOPE", default_value_t = SupersedeScope::Company)]
    pub supersede_scope: SupersedeScope,

    /// Log output format.
    #[arg(long, env = "LOG_FORMAT", value_enum, default_value_t = LogFormat::Pretty)]
    pub log_format: LogFormat,

    /// Install the Prometheus recorder and serve `/metrics`.
    #[arg(long, env = "TICKETS_METRICS")]
    pub metrics: bool,
}

impl AppConfig {
    /// Rule engine settings carried by this configuration.
    pub fn engine(&self) -> EngineConfig {
        EngineConfig {
            supersede_scope: self.supersede_scope,
        }
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            port: 8080,
            database_url: None,
            fixtures: None,
            supersede_scope: SupersedeScope::default(),
            log_format: LogFormat::Pretty,
            metrics: false,
        }
    }
}

// The connection string may carry credentials.
impl std::fmt::Debug for AppConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppConfig")
            .field("port", &self.port)
            .field(
                "database_url",
                &self.database_url.as_ref().map(|_| "[REDACTED]"),
            )
            .field("fixtures", &self.fixtures)
            .field("supersede_scope", &self.supersede_scope)
            .field("log_format", &self.log_format)
            .field("metrics", &self.metrics)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_without_flags() {
        let config = AppConfig::try_parse_from(["tkt-api"]).unwrap();
        assert_eq!(config.port, 8080);
        assert_eq!(config.supersede_scope, SupersedeScope::Company);
        assert_eq!(config.log_format, LogFormat::Pretty);
    }

    #[test]
    fn flags_override_defaults() {
        let config = AppConfig::try_parse_from([
            "tkt-api",
            "--port",
            "9000",
            "--supersede-scope",
            "global",
            "--log-format",
            "json",
            "--metrics",
        ])
        .unwrap();
        assert_eq!(config.port, 9000);
        assert_eq!(config.engine().supersede_scope, SupersedeScope::Global);
        assert_eq!(config.log_format, LogFormat::Json);
        assert!(config.metrics);
    }

    #[test]
    fn unknown_scope_is_rejected() {
        assert!(AppConfig::try_parse_from(["tkt-api", "--supersede-scope", "tenant"]).is_err());
    }

    #[test]
    fn debug_redacts_database_url() {
        let config = AppConfig {
            database_url: Some("postgres://admin:hunter2@db/tickets".into()),
            ..AppConfig::default()
        };
        let debug = format!("{config:?}");
        assert!(debug.contains("[REDACTED]"));
        assert!(!debug.contains("hunter2"));
    }
}
