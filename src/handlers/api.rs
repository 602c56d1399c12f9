use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::Json,
    routing::{delete, get, post},
    Router,
};
use serde::Deserialize;
use serde_json::{json, Value};
use std::sync::Arc;
use tracing::{error, info, instrument, warn};
use uuid::Uuid;

use crate::models::{
    CartLine, CartResponse, Catalog, CheckoutRequest, CheckoutResponse, RepositoryError,
    ServiceError, SessionResponse,
};
use crate::services::{CartService, CatalogService};

/// Shared application state containing the storefront services
#[derive(Clone)]
pub struct ApiState {
    pub catalog_service: Arc<CatalogService>,
    pub cart_service: Arc<CartService>,
}

/// Body for adding a butcher item. `weight_kg` is kept raw so that
/// unreadable input degrades to the minimum weight instead of failing.
#[derive(Debug, Deserialize)]
pub struct AddButcherLineRequest {
    pub item_id: String,
    #[serde(default)]
    pub weight_kg: Value,
}

/// Body for adding a grocery item. `quantity` is kept raw like `weight_kg`.
#[derive(Debug, Deserialize)]
pub struct AddGroceryLineRequest {
    pub item_id: String,
    #[serde(default)]
    pub quantity: Value,
}

/// Create API router with all storefront endpoints
pub fn create_api_router(
    catalog_service: Arc<CatalogService>,
    cart_service: Arc<CartService>,
) -> Router {
    let state = ApiState {
        catalog_service,
        cart_service,
    };

    Router::new()
        .route("/api/catalog", get(get_catalog))
        // Session and cart endpoints
        .route("/api/sessions", post(create_session))
        .route("/api/sessions/:session_id", delete(end_session))
        .route("/api/sessions/:session_id/cart", get(get_cart))
        .route("/api/sessions/:session_id/cart/butcher", post(add_butcher_line))
        .route("/api/sessions/:session_id/cart/grocery", post(add_grocery_line))
        .route("/api/sessions/:session_id/checkout", post(checkout))
        .with_state(state)
}

// =============================================================================
// CATALOG ENDPOINTS
// =============================================================================

/// Available butcher and grocery items
#[instrument(name = "get_catalog", skip(state))]
pub async fn get_catalog(
    State(state): State<ApiState>,
) -> Result<Json<Catalog>, (StatusCode, Json<Value>)> {
    match state.catalog_service.load_catalog().await {
        Ok(catalog) => {
            info!("Successfully loaded catalog with {} items", catalog.len());
            Ok(Json(catalog))
        }
        Err(err) => {
            error!("Failed to load catalog: {}", err);
            Err(service_error_to_response(err))
        }
    }
}

// =============================================================================
// SESSION AND CART ENDPOINTS
// =============================================================================

/// Start a browsing session with an empty cart
#[instrument(name = "create_session", skip(state))]
pub async fn create_session(
    State(state): State<ApiState>,
) -> Result<(StatusCode, Json<SessionResponse>), (StatusCode, Json<Value>)> {
    match state.cart_service.create_session().await {
        Ok(session) => {
            info!(session_id = %session.id, "Session started");
            Ok((
                StatusCode::CREATED,
                Json(SessionResponse {
                    session_id: session.id,
                    cart: session.to_cart_response(),
                }),
            ))
        }
        Err(err) => {
            error!("Failed to create session: {}", err);
            Err(service_error_to_response(err))
        }
    }
}

/// Current cart contents and total
#[instrument(name = "get_cart", skip(state), fields(session_id = %session_id))]
pub async fn get_cart(
    State(state): State<ApiState>,
    Path(session_id): Path<String>,
) -> Result<Json<CartResponse>, (StatusCode, Json<Value>)> {
    let session_id = parse_session_id(&session_id)?;

    match state.cart_service.get_session(session_id).await {
        Ok(session) => Ok(Json(session.to_cart_response())),
        Err(err) => {
            warn!("Failed to get cart: {}", err);
            Err(service_error_to_response(err))
        }
    }
}

/// Discard a session and its cart
#[instrument(name = "end_session", skip(state), fields(session_id = %session_id))]
pub async fn end_session(
    State(state): State<ApiState>,
    Path(session_id): Path<String>,
) -> Result<StatusCode, (StatusCode, Json<Value>)> {
    let session_id = parse_session_id(&session_id)?;

    match state.cart_service.end_session(session_id).await {
        Ok(()) => Ok(StatusCode::NO_CONTENT),
        Err(err) => {
            warn!("Failed to end session: {}", err);
            Err(service_error_to_response(err))
        }
    }
}

/// Add a butcher item by weight
#[instrument(name = "add_butcher_line", skip(state, request), fields(
    session_id = %session_id,
    item_id = %request.item_id,
))]
pub async fn add_butcher_line(
    State(state): State<ApiState>,
    Path(session_id): Path<String>,
    Json(request): Json<AddButcherLineRequest>,
) -> Result<(StatusCode, Json<CartLine>), (StatusCode, Json<Value>)> {
    let session_id = parse_session_id(&session_id)?;

    match state
        .cart_service
        .add_butcher_line(session_id, &request.item_id, &request.weight_kg)
        .await
    {
        Ok(line) => Ok((StatusCode::CREATED, Json(line))),
        Err(err) => {
            error!("Failed to add butcher line: {}", err);
            Err(service_error_to_response(err))
        }
    }
}

/// Add a grocery item by count
#[instrument(name = "add_grocery_line", skip(state, request), fields(
    session_id = %session_id,
    item_id = %request.item_id,
))]
pub async fn add_grocery_line(
    State(state): State<ApiState>,
    Path(session_id): Path<String>,
    Json(request): Json<AddGroceryLineRequest>,
) -> Result<(StatusCode, Json<CartLine>), (StatusCode, Json<Value>)> {
    let session_id = parse_session_id(&session_id)?;

    match state
        .cart_service
        .add_grocery_line(session_id, &request.item_id, &request.quantity)
        .await
    {
        Ok(line) => Ok((StatusCode::CREATED, Json(line))),
        Err(err) => {
            error!("Failed to add grocery line: {}", err);
            Err(service_error_to_response(err))
        }
    }
}

/// Submit the cart as an order
#[instrument(name = "checkout", skip(state, request), fields(session_id = %session_id))]
pub async fn checkout(
    State(state): State<ApiState>,
    Path(session_id): Path<String>,
    Json(request): Json<CheckoutRequest>,
) -> Result<(StatusCode, Json<CheckoutResponse>), (StatusCode, Json<Value>)> {
    let session_id = parse_session_id(&session_id)?;

    match state.cart_service.checkout(session_id, request).await {
        Ok(receipt) => {
            info!(order_id = %receipt.id, "Checkout completed");
            Ok((
                StatusCode::CREATED,
                Json(CheckoutResponse::from_receipt(receipt)),
            ))
        }
        Err(err) => {
            error!("Checkout failed: {}", err);
            Err(service_error_to_response(err))
        }
    }
}

/// Malformed session ids can never match a session
fn parse_session_id(raw: &str) -> Result<Uuid, (StatusCode, Json<Value>)> {
    Uuid::parse_str(raw).map_err(|_| {
        service_error_to_response(ServiceError::SessionNotFound {
            session_id: raw.to_string(),
        })
    })
}

/// Convert ServiceError to HTTP response
pub fn service_error_to_response(err: ServiceError) -> (StatusCode, Json<Value>) {
    let (status, message) = match err {
        ServiceError::Network { .. } => (StatusCode::BAD_GATEWAY, err.to_string()),
        ServiceError::Application { status, detail } => {
            // Relay the backend's own status when it is an error status
            let status = StatusCode::from_u16(status)
                .ok()
                .filter(|status| status.is_client_error() || status.is_server_error())
                .unwrap_or(StatusCode::BAD_GATEWAY);
            (status, detail)
        }
        ServiceError::EmptyCart => (StatusCode::CONFLICT, err.to_string()),
        ServiceError::SessionNotFound { .. } => (StatusCode::NOT_FOUND, err.to_string()),
        ServiceError::ItemNotFound { .. } => (StatusCode::NOT_FOUND, err.to_string()),
        ServiceError::ItemUnavailable { .. } => (StatusCode::CONFLICT, err.to_string()),
        ServiceError::ValidationError { .. } => (StatusCode::BAD_REQUEST, err.to_string()),
        ServiceError::Repository { source } => match source {
            RepositoryError::NotFound => {
                (StatusCode::NOT_FOUND, "Resource not found".to_string())
            }
            RepositoryError::ConstraintViolation { .. } => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "Internal server error".to_string(),
            ),
        },
        ServiceError::Configuration { .. } => (
            StatusCode::INTERNAL_SERVER_ERROR,
            "Configuration error".to_string(),
        ),
    };

    (
        status,
        Json(json!({
            "error": message,
            "timestamp": chrono::Utc::now().to_rfc3339(),
        })),
    )
}
