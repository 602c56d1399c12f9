use axum::{
    extract::State,
    http::{header, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
};
use std::sync::Arc;
use tracing::{error, instrument};

use crate::observability::Metrics;
use crate::services::CartService;

const PROMETHEUS_CONTENT_TYPE: &str = "text/plain; version=0.0.4; charset=utf-8";

/// State behind the scrape endpoint
#[derive(Clone)]
pub struct MetricsState {
    pub metrics: Arc<Metrics>,
    pub cart_service: Arc<CartService>,
}

/// Prometheus scrape endpoint.
///
/// Concurrent session changes each count and then set `active_sessions`, so
/// the gauge can trail the store by one update. It is recounted here so every
/// scrape sees the live number of carts.
#[instrument(name = "metrics_handler", skip(state))]
pub async fn metrics_handler(State(state): State<MetricsState>) -> Response {
    state.cart_service.refresh_session_gauge().await;

    let body = match state.metrics.encode() {
        Ok(body) => body,
        Err(err) => {
            error!(error = %err, "Failed to encode metrics");
            return (StatusCode::INTERNAL_SERVER_ERROR, "Failed to encode metrics")
                .into_response();
        }
    };

    let mut response = body.into_response();
    response.headers_mut().insert(
        header::CONTENT_TYPE,
        HeaderValue::from_static(PROMETHEUS_CONTENT_TYPE),
    );
    response
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clients::{MockCatalogClient, MockOrderClient};
    use crate::models::Session;
    use crate::repositories::{InMemorySessionRepository, SessionRepository};
    use crate::services::CatalogService;
    use axum::{body::Body, http::Request, routing::get, Router};
    use tower::ServiceExt;

    async fn scrape(state: MetricsState) -> (StatusCode, Option<HeaderValue>, String) {
        let app = Router::new()
            .route("/metrics", get(metrics_handler))
            .with_state(state);

        let request = Request::builder()
            .uri("/metrics")
            .body(Body::empty())
            .unwrap();
        let response = app.oneshot(request).await.unwrap();

        let status = response.status();
        let content_type = response.headers().get(header::CONTENT_TYPE).cloned();
        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        (status, content_type, String::from_utf8(body.to_vec()).unwrap())
    }

    #[tokio::test]
    async fn test_scrape_recounts_sessions() {
        let metrics = Arc::new(Metrics::new().unwrap());
        let sessions = Arc::new(InMemorySessionRepository::new());
        let cart_service = Arc::new(CartService::new(
            sessions.clone(),
            Arc::new(CatalogService::new(Arc::new(MockCatalogClient::new()))),
            Arc::new(MockOrderClient::new()),
            metrics.clone(),
        ));

        // Stored behind the service's back, so only the scrape can see them
        sessions.create(Session::new()).await.unwrap();
        sessions.create(Session::new()).await.unwrap();
        metrics.record_http_request("GET", "/api/catalog", "storefront", 200, 0.123);
        metrics.record_backend_request("list_grocery_items", "200", 0.050);

        let (status, content_type, body) = scrape(MetricsState {
            metrics,
            cart_service,
        })
        .await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(content_type.unwrap(), PROMETHEUS_CONTENT_TYPE);
        assert!(body.contains("active_sessions 2"));
        assert!(body.contains("http_requests_total"));
        assert!(body.contains("backend_requests_total"));
    }
}
