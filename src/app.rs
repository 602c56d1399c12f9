use axum::{middleware, routing::get, Router};
use std::sync::Arc;
use std::time::Duration;
use tower_http::{limit::RequestBodyLimitLayer, timeout::TimeoutLayer};

use crate::handlers::{
    admin, api, cors_middleware, health_check, metrics_handler, request_validation_middleware,
    security_headers_middleware, MetricsState,
};
use crate::observability::{observability_middleware, Metrics};
use crate::services::{AdminService, CartService, CatalogService};

/// Everything the router needs to serve requests
#[derive(Clone)]
pub struct AppServices {
    pub metrics: Arc<Metrics>,
    pub catalog_service: Arc<CatalogService>,
    pub cart_service: Arc<CartService>,
    pub admin_service: Arc<AdminService>,
}

/// Limits applied to every incoming request
#[derive(Debug, Clone, Copy)]
pub struct RequestLimits {
    pub max_request_size: usize,
    pub request_timeout: Duration,
}

/// Build the application router with all endpoints and middleware
pub fn create_app(services: AppServices, limits: RequestLimits) -> Router {
    let metrics_for_middleware = services.metrics.clone();

    let operational = Router::new()
        .route("/health/status", get(health_check))
        .route("/metrics", get(metrics_handler))
        .with_state(MetricsState {
            metrics: services.metrics,
            cart_service: services.cart_service.clone(),
        });

    Router::new()
        .merge(operational)
        .merge(api::create_api_router(
            services.catalog_service,
            services.cart_service,
        ))
        .merge(admin::create_admin_router(services.admin_service))
        // Add middleware layers (order matters - outer to inner)
        .layer(middleware::from_fn(security_headers_middleware))
        .layer(middleware::from_fn(cors_middleware))
        .layer(middleware::from_fn(request_validation_middleware))
        .layer(RequestBodyLimitLayer::new(limits.max_request_size))
        .layer(TimeoutLayer::new(limits.request_timeout))
        .layer(middleware::from_fn(move |req, next| {
            observability_middleware(metrics_for_middleware.clone(), req, next)
        }))
}
