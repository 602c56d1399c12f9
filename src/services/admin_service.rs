use std::sync::Arc;
use tracing::{info, instrument};

use crate::clients::{CatalogClient, OrderClient};
use crate::models::{
    NewButcherItem, NewGroceryItem, Order, OrderStatus, ServiceError, ServiceResult, Validate,
};

pub const AUTH_FAILED_MESSAGE: &str = "Auth failed";
pub const ADMIN_FAILED_MESSAGE: &str = "Failed";
pub const BUTCHER_ITEM_ADDED_MESSAGE: &str = "Butcher item added";
pub const GROCERY_ITEM_ADDED_MESSAGE: &str = "Grocery item added";
pub const STATUS_UPDATED_MESSAGE: &str = "Status updated";

/// Password-gated pass-through to the backend's admin endpoints.
///
/// The password is forwarded as given and checked only by the backend.
/// Nothing here hardens that scheme; it is a known weakness of the admin
/// panel.
pub struct AdminService {
    catalog: Arc<dyn CatalogClient>,
    orders: Arc<dyn OrderClient>,
}

impl AdminService {
    /// Create a new AdminService
    pub fn new(catalog: Arc<dyn CatalogClient>, orders: Arc<dyn OrderClient>) -> Self {
        Self { catalog, orders }
    }

    #[instrument(skip_all)]
    pub async fn list_orders(&self, password: &str) -> ServiceResult<Vec<Order>> {
        let orders = self
            .orders
            .list_orders(password)
            .await
            .map_err(|err| ServiceError::from_client(err, AUTH_FAILED_MESSAGE))?;

        crate::info_with_trace!(count = orders.len(), "Orders listed for admin");
        Ok(orders)
    }

    #[instrument(skip(self, password, item), fields(title = %item.title))]
    pub async fn create_butcher_item(
        &self,
        password: &str,
        item: NewButcherItem,
    ) -> ServiceResult<&'static str> {
        item.validate()?;

        self.catalog
            .create_butcher_item(password, &item)
            .await
            .map_err(|err| ServiceError::from_client(err, ADMIN_FAILED_MESSAGE))?;

        info!("Butcher item created");
        Ok(BUTCHER_ITEM_ADDED_MESSAGE)
    }

    #[instrument(skip(self, password, item), fields(title = %item.title))]
    pub async fn create_grocery_item(
        &self,
        password: &str,
        item: NewGroceryItem,
    ) -> ServiceResult<&'static str> {
        item.validate()?;

        self.catalog
            .create_grocery_item(password, &item)
            .await
            .map_err(|err| ServiceError::from_client(err, ADMIN_FAILED_MESSAGE))?;

        info!("Grocery item created");
        Ok(GROCERY_ITEM_ADDED_MESSAGE)
    }

    #[instrument(skip(self, password), fields(order_id = %order_id, status = %status))]
    pub async fn update_order_status(
        &self,
        password: &str,
        order_id: &str,
        status: OrderStatus,
    ) -> ServiceResult<&'static str> {
        if order_id.trim().is_empty() {
            return Err(ServiceError::ValidationError {
                message: "Order ID cannot be empty".to_string(),
            });
        }

        // Dot segments would be resolved away by the URL and hit a different endpoint
        if order_id == "." || order_id == ".." {
            return Err(ServiceError::ValidationError {
                message: format!("Invalid order ID: {}", order_id),
            });
        }

        self.orders
            .update_order_status(password, order_id, status)
            .await
            .map_err(|err| ServiceError::from_client(err, ADMIN_FAILED_MESSAGE))?;

        info!("Order status updated");
        Ok(STATUS_UPDATED_MESSAGE)
    }
}
