use async_trait::async_trait;
use serde::Serialize;
use tracing::{info, instrument};

use super::HttpBackend;
use crate::models::{ClientResult, Order, OrderReceipt, OrderStatus, OrderSubmission};

pub const ORDERS_PATH: &str = "/api/orders";
pub const ADMIN_ORDERS_PATH: &str = "/api/admin/orders";

/// Access to the order backend
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait OrderClient: Send + Sync {
    /// Create an order. Sent exactly once per checkout attempt.
    async fn submit_order(&self, submission: &OrderSubmission) -> ClientResult<OrderReceipt>;

    /// List every order; the backend checks `password`
    async fn list_orders(&self, password: &str) -> ClientResult<Vec<Order>>;

    /// Move an order to `status`; the backend checks `password`
    async fn update_order_status(
        &self,
        password: &str,
        order_id: &str,
        status: OrderStatus,
    ) -> ClientResult<()>;
}

#[derive(Debug, Serialize)]
struct UpdateStatusBody<'a> {
    password: &'a str,
    status: OrderStatus,
}

/// Path segments of an order's status endpoint. `order_id` is one segment
/// and gets percent-encoded as such.
pub fn order_status_segments(order_id: &str) -> [&str; 5] {
    ["api", "admin", "orders", order_id, "status"]
}

#[async_trait]
impl OrderClient for HttpBackend {
    #[instrument(skip(self, submission), fields(
        line_count = submission.items.len(),
        total = %submission.total,
        payment_method = %submission.payment_method,
    ))]
    async fn submit_order(&self, submission: &OrderSubmission) -> ClientResult<OrderReceipt> {
        let receipt: OrderReceipt = self
            .post_json("submit_order", ORDERS_PATH, submission)
            .await?;
        info!(order_id = %receipt.id, "Order accepted by backend");
        Ok(receipt)
    }

    #[instrument(skip(self, password))]
    async fn list_orders(&self, password: &str) -> ClientResult<Vec<Order>> {
        let orders: Vec<Order> = self
            .get_json(
                "list_orders",
                ADMIN_ORDERS_PATH,
                &[("auth_password", password)],
            )
            .await?;
        info!(count = orders.len(), "Fetched orders");
        Ok(orders)
    }

    #[instrument(skip(self, password), fields(order_id = %order_id, status = %status))]
    async fn update_order_status(
        &self,
        password: &str,
        order_id: &str,
        status: OrderStatus,
    ) -> ClientResult<()> {
        let body = UpdateStatusBody { password, status };
        self.post_unit_to_segments(
            "update_order_status",
            &order_status_segments(order_id),
            &body,
        )
        .await
    }
}
