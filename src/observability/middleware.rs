use axum::{
    extract::{MatchedPath, Request},
    middleware::Next,
    response::Response,
};
use opentelemetry::trace::TraceContextExt;
use std::{sync::Arc, time::Instant};
use tracing::{debug, error, info, instrument, warn, Instrument};
use tracing_opentelemetry::OpenTelemetrySpanExt;
use uuid::Uuid;

use super::{get_current_trace_id, Metrics};

/// Endpoint label for requests no route matched, so raw paths (and the ids
/// in them) never become metric labels
const UNMATCHED_ENDPOINT: &str = "unmatched";

/// Which surface of the service a request is for
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RouteKind {
    /// Catalog, sessions, carts and checkout
    Storefront,
    /// Password-gated admin pass-through
    Admin,
    /// Health checks, metrics scrapes and anything outside `/api`
    Operational,
}

impl RouteKind {
    pub fn of(path: &str) -> Self {
        if path == "/api/admin" || path.starts_with("/api/admin/") {
            RouteKind::Admin
        } else if path.starts_with("/api/") {
            RouteKind::Storefront
        } else {
            RouteKind::Operational
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            RouteKind::Storefront => "storefront",
            RouteKind::Admin => "admin",
            RouteKind::Operational => "operational",
        }
    }
}

/// Session a `/api/sessions/{id}/...` request targets, if the id is a UUID
pub fn session_id_from_path(path: &str) -> Option<Uuid> {
    path.strip_prefix("/api/sessions/")?
        .split('/')
        .next()
        .and_then(|id| Uuid::parse_str(id).ok())
}

/// Request span and HTTP metrics for every call.
///
/// Only the URI path is recorded: the admin order listing carries the
/// password in its query string. Spans carry the route kind and, for cart
/// routes, the session id, so one shopper's requests can be followed.
pub async fn observability_middleware(
    metrics: Arc<Metrics>,
    request: Request,
    next: Next,
) -> Response {
    let start_time = Instant::now();
    let method = request.method().to_string();
    let path = request.uri().path().to_string();
    let route_kind = RouteKind::of(&path);
    let is_admin = route_kind == RouteKind::Admin;

    let endpoint = request
        .extensions()
        .get::<MatchedPath>()
        .map(|matched_path| matched_path.as_str().to_string())
        .unwrap_or_else(|| UNMATCHED_ENDPOINT.to_string());

    let span_name = format!("{} {}", method, endpoint);
    let span = tracing::info_span!(
        target: "hybrid_market::http",
        "{}", span_name,
        otel.name = %span_name,
        otel.kind = "server",
        http.method = %method,
        http.route = %endpoint,
        url.path = %path,
        market.route_kind = route_kind.as_str(),
        market.admin = is_admin,
        market.session_id = tracing::field::Empty,
        http.response.status_code = tracing::field::Empty,
        http.response_time_ms = tracing::field::Empty,
    );
    if let Some(session_id) = session_id_from_path(&path) {
        span.record("market.session_id", tracing::field::display(session_id));
    }

    async move {
        metrics.increment_in_flight(&method, &endpoint);
        let trace_id = get_current_trace_id().unwrap_or_default();

        if route_kind == RouteKind::Operational {
            debug!(trace_id = %trace_id, method = %method, route = %endpoint, "Processing request");
        } else {
            info!(
                trace_id = %trace_id,
                method = %method,
                route = %endpoint,
                route_kind = route_kind.as_str(),
                "Processing request"
            );
        }

        let response = next.run(request).await;

        let duration = start_time.elapsed();
        let duration_ms = duration.as_millis();
        let status_code = response.status().as_u16();

        let current_span = tracing::Span::current();
        current_span.record("http.response.status_code", status_code);
        current_span.record("http.response_time_ms", duration_ms);

        // 4xx answers are shopper or admin mistakes (empty cart, bad password),
        // not service faults
        let context = current_span.context();
        if status_code >= 500 {
            context
                .span()
                .set_status(opentelemetry::trace::Status::error("Server error"));
        } else {
            context.span().set_status(opentelemetry::trace::Status::Ok);
        }

        metrics.record_http_request(
            &method,
            &endpoint,
            route_kind.as_str(),
            status_code,
            duration.as_secs_f64(),
        );
        metrics.decrement_in_flight(&method, &endpoint);

        if status_code >= 500 {
            error!(
                trace_id = %trace_id,
                route = %endpoint,
                status_code,
                duration_ms,
                "Request failed"
            );
        } else if is_admin && (status_code == 401 || status_code == 403) {
            warn!(
                trace_id = %trace_id,
                route = %endpoint,
                status_code,
                "Admin request rejected by backend"
            );
        } else if route_kind == RouteKind::Operational {
            debug!(route = %endpoint, status_code, duration_ms, "Request completed");
        } else {
            info!(
                trace_id = %trace_id,
                route = %endpoint,
                status_code,
                duration_ms,
                "Request completed"
            );
        }

        response
    }
    .instrument(span)
    .await
}

/// Tracing and metrics around storefront operations
pub struct BusinessTracingMiddleware {
    metrics: Arc<Metrics>,
}

impl BusinessTracingMiddleware {
    pub fn new(metrics: Arc<Metrics>) -> Self {
        Self { metrics }
    }

    /// Trace a cart operation
    #[instrument(skip_all, fields(
        operation = %operation,
        session_id = session_id,
    ))]
    pub async fn trace_cart_operation<F, T, E>(
        &self,
        operation: &str,
        session_id: Option<&str>,
        future: F,
    ) -> Result<T, E>
    where
        F: std::future::Future<Output = Result<T, E>>,
        E: std::fmt::Display,
    {
        let start_time = Instant::now();

        info!("Starting cart operation");

        match future.await {
            Ok(result) => {
                self.metrics.record_cart_operation(operation, true);

                info!(
                    duration_ms = start_time.elapsed().as_millis(),
                    "Cart operation completed successfully"
                );

                Ok(result)
            }
            Err(error) => {
                self.metrics.record_cart_operation(operation, false);

                error!(
                    error = %error,
                    duration_ms = start_time.elapsed().as_millis(),
                    "Cart operation failed"
                );

                Err(error)
            }
        }
    }

    /// Trace an order submission
    #[instrument(skip_all, fields(
        payment_method = %payment_method,
    ))]
    pub async fn trace_checkout<F, T, E>(
        &self,
        payment_method: &str,
        future: F,
    ) -> Result<T, E>
    where
        F: std::future::Future<Output = Result<T, E>>,
        E: std::fmt::Display,
    {
        let start_time = Instant::now();

        info!("Submitting order");

        match future.await {
            Ok(result) => {
                self.metrics.record_order_submission(payment_method, true);

                info!(
                    duration_ms = start_time.elapsed().as_millis(),
                    "Order submitted successfully"
                );

                Ok(result)
            }
            Err(error) => {
                self.metrics.record_order_submission(payment_method, false);

                error!(
                    error = %error,
                    duration_ms = start_time.elapsed().as_millis(),
                    "Order submission failed"
                );

                Err(error)
            }
        }
    }
}
