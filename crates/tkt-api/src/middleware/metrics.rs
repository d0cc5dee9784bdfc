//! # Prometheus Metrics
//!
//! Request and ticket-outcome metrics recorded through the `metrics` facade.
//! Without an installed recorder every call is a no-op; `main` installs the
//! Prometheus recorder when metrics are enabled and `/metrics` renders it.

use std::time::Instant;

use axum::extract::{Request, State};
use axum::http::StatusCode;
use axum::middleware::Next;
use axum::response::Response;
use axum::routing::get;
use axum::Router;
use tkt_core::Ticket;
use tkt_engine::RuleError;

use crate::error::AppError;
use crate::state::AppState;

/// Tickets created, labelled by `type`.
pub const TICKETS_CREATED: &str = "tickets_created_total";
/// Creation requests rejected by the rule engine, labelled by `kind`.
pub const TICKETS_REJECTED: &str = "tickets_rejected_total";
/// HTTP requests served, labelled by `method` and `status` class.
pub const HTTP_REQUESTS: &str = "http_requests_total";
/// HTTP request latency in seconds, labelled by `method`.
pub const HTTP_REQUEST_DURATION: &str = "http_request_duration_seconds";

/// Middleware that counts requests and records their latency.
pub async fn metrics_middleware(request: Request, next: Next) -> Response {
    let method = request.method().to_string();
    let start = Instant::now();

    let response = next.run(request).await;

    metrics::counter!(
        HTTP_REQUESTS,
        "method" => method.clone(),
        "status" => status_class(response.status())
    )
    .increment(1);
    metrics::histogram!(HTTP_REQUEST_DURATION, "method" => method)
        .record(start.elapsed().as_secs_f64());

    response
}

fn status_class(status: StatusCode) -> &'static str {
    match status.as_u16() {
        100..=199 => "1xx",
        200..=299 => "2xx",
        300..=399 => "3xx",
        400..=499 => "4xx",
        _ => "5xx",
    }
}

/// Count a successful creation.
pub fn record_ticket_created(ticket: &Ticket) {
    metrics::counter!(TICKETS_CREATED, "type" => ticket.ticket_type.as_str()).increment(1);
}

/// Count a failed creation by error kind.
pub fn record_ticket_rejected(err: &RuleError) {
    metrics::counter!(TICKETS_REJECTED, "kind" => err.kind().as_str()).increment(1);
}

/// Router serving the Prometheus text exposition at `/metrics`.
pub fn router() -> Router<AppState> {
    Router::new().route("/metrics", get(render))
}

async fn render(State(state): State<AppState>) -> Result<String, AppError> {
    state
        .prometheus
        .as_ref()
        .map(|handle| handle.render())
        .ok_or_else(|| AppError::NotFound("metrics exporter is not enabled".to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use metrics_exporter_prometheus::PrometheusBuilder;
    use tkt_core::{CompanyId, TicketType, UserRole};

    #[test]
    fn status_classes() {
        assert_eq!(status_class(StatusCode::CREATED), "2xx");
        assert_eq!(status_class(StatusCode::CONFLICT), "4xx");
        assert_eq!(status_class(StatusCode::INTERNAL_SERVER_ERROR), "5xx");
    }

    #[test]
    fn rejections_are_labelled_by_kind() {
        let recorder = PrometheusBuilder::new().build_recorder();
        let handle = recorder.handle();
        let err = RuleError::AmbiguousAssignee {
            ticket_type: TicketType::StrikeOff,
            company_id: CompanyId::new(1),
            role: UserRole::Director,
            count: 2,
        };

        metrics::with_local_recorder(&recorder, || {
            record_ticket_rejected(&err);
            record_ticket_rejected(&err);
        });

        let rendered = handle.render();
        assert!(rendered.contains(r#"tickets_rejected_total{kind="AMBIGUOUS_ASSIGNEE"} 2"#));
    }
}
