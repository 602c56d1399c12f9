use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::Json,
    routing::{get, post},
    Router,
};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::sync::Arc;
use tracing::{info, instrument, warn};

use super::service_error_to_response;
use crate::models::{NewButcherItem, NewGroceryItem, Order, OrderStatus};
use crate::services::AdminService;

/// Admin state containing services
#[derive(Clone)]
pub struct AdminState {
    pub admin_service: Arc<AdminService>,
}

/// Password carried in the query string of the order listing
#[derive(Debug, Deserialize)]
pub struct AdminAuthQuery {
    #[serde(default)]
    pub auth_password: String,
}

#[derive(Debug, Deserialize)]
pub struct CreateButcherItemRequest {
    pub title: String,
    #[serde(default)]
    pub description: String,
    pub price_per_kg: Decimal,
    #[serde(default)]
    pub password: String,
}

#[derive(Debug, Deserialize)]
pub struct CreateGroceryItemRequest {
    pub title: String,
    #[serde(default)]
    pub description: String,
    pub price: Decimal,
    #[serde(default)]
    pub password: String,
}

#[derive(Debug, Deserialize)]
pub struct UpdateOrderStatusRequest {
    #[serde(default)]
    pub password: String,
    pub status: OrderStatus,
}

/// Outcome message shown in the admin panel
#[derive(Debug, Serialize)]
pub struct AdminMessageResponse {
    pub message: String,
}

/// Create admin router with the password-gated endpoints
pub fn create_admin_router(admin_service: Arc<AdminService>) -> Router {
    let state = AdminState { admin_service };

    Router::new()
        .route("/api/admin/orders", get(list_orders))
        .route("/api/admin/orders/:order_id/status", post(update_order_status))
        .route("/api/admin/butcher", post(create_butcher_item))
        .route("/api/admin/grocery", post(create_grocery_item))
        .with_state(state)
}

/// List every order
#[instrument(name = "admin_list_orders", skip_all)]
pub async fn list_orders(
    State(state): State<AdminState>,
    Query(query): Query<AdminAuthQuery>,
) -> Result<Json<Vec<Order>>, (StatusCode, Json<Value>)> {
    match state.admin_service.list_orders(&query.auth_password).await {
        Ok(orders) => {
            info!("Listed {} orders", orders.len());
            Ok(Json(orders))
        }
        Err(err) => {
            warn!("Order listing refused: {}", err);
            Err(service_error_to_response(err))
        }
    }
}

/// Add a butcher item to the catalog
#[instrument(name = "admin_create_butcher_item", skip_all, fields(title = %request.title))]
pub async fn create_butcher_item(
    State(state): State<AdminState>,
    Json(request): Json<CreateButcherItemRequest>,
) -> Result<(StatusCode, Json<AdminMessageResponse>), (StatusCode, Json<Value>)> {
    let item = NewButcherItem {
        title: request.title,
        description: request.description,
        price_per_kg: request.price_per_kg,
    };

    match state
        .admin_service
        .create_butcher_item(&request.password, item)
        .await
    {
        Ok(message) => Ok((
            StatusCode::CREATED,
            Json(AdminMessageResponse {
                message: message.to_string(),
            }),
        )),
        Err(err) => {
            warn!("Butcher item not created: {}", err);
            Err(service_error_to_response(err))
        }
    }
}

/// Add a grocery item to the catalog
#[instrument(name = "admin_create_grocery_item", skip_all, fields(title = %request.title))]
pub async fn create_grocery_item(
    State(state): State<AdminState>,
    Json(request): Json<CreateGroceryItemRequest>,
) -> Result<(StatusCode, Json<AdminMessageResponse>), (StatusCode, Json<Value>)> {
    let item = NewGroceryItem {
        title: request.title,
        description: request.description,
        price: request.price,
    };

    match state
        .admin_service
        .create_grocery_item(&request.password, item)
        .await
    {
        Ok(message) => Ok((
            StatusCode::CREATED,
            Json(AdminMessageResponse {
                message: message.to_string(),
            }),
        )),
        Err(err) => {
            warn!("Grocery item not created: {}", err);
            Err(service_error_to_response(err))
        }
    }
}

/// Move an order to a new status
#[instrument(name = "admin_update_order_status", skip_all, fields(
    order_id = %order_id,
    status = %request.status,
))]
pub async fn update_order_status(
    State(state): State<AdminState>,
    Path(order_id): Path<String>,
    Json(request): Json<UpdateOrderStatusRequest>,
) -> Result<Json<AdminMessageResponse>, (StatusCode, Json<Value>)> {
    match state
        .admin_service
        .update_order_status(&request.password, &order_id, request.status)
        .await
    {
        Ok(message) => Ok(Json(AdminMessageResponse {
            message: message.to_string(),
        })),
        Err(err) => {
            warn!("Order status not updated: {}", err);
            Err(service_error_to_response(err))
        }
    }
}
