//! # Middleware
//!
//! Request tracing and Prometheus metrics.

pub mod metrics;
pub mod tracing_layer;
