use chrono::Duration;
use serde_json::Value;
use std::sync::Arc;
use tracing::{info, instrument, warn};
use uuid::Uuid;

use crate::clients::OrderClient;
use crate::models::money::parse_amount;
use crate::models::{
    CartLine, CheckoutRequest, LineRequest, OrderReceipt, RepositoryError, ServiceError,
    ServiceResult, Session,
};
use crate::observability::{BusinessTracingMiddleware, Metrics};
use crate::repositories::SessionRepository;
use crate::services::CatalogService;

/// Message shown when the order backend refuses an order without saying why
pub const ORDER_FAILED_MESSAGE: &str = "Failed to place order";

/// Service for session carts and checkout
pub struct CartService {
    sessions: Arc<dyn SessionRepository>,
    catalog: Arc<CatalogService>,
    orders: Arc<dyn OrderClient>,
    metrics: Arc<Metrics>,
    tracing: BusinessTracingMiddleware,
}

impl CartService {
    /// Create a new CartService
    pub fn new(
        sessions: Arc<dyn SessionRepository>,
        catalog: Arc<CatalogService>,
        orders: Arc<dyn OrderClient>,
        metrics: Arc<Metrics>,
    ) -> Self {
        Self {
            sessions,
            catalog,
            orders,
            tracing: BusinessTracingMiddleware::new(metrics.clone()),
            metrics,
        }
    }

    /// Start a session with an empty cart
    #[instrument(skip(self))]
    pub async fn create_session(&self) -> ServiceResult<Session> {
        let session = self.sessions.create(Session::new()).await?;
        self.refresh_session_gauge().await;

        crate::info_with_trace!(session_id = %session.id, "Session created");
        Ok(session)
    }

    /// Fetch a session, marking it active
    #[instrument(skip(self), fields(session_id = %session_id))]
    pub async fn get_session(&self, session_id: Uuid) -> ServiceResult<Session> {
        let mut session = self
            .sessions
            .find(session_id)
            .await?
            .ok_or_else(|| session_not_found(session_id))?;

        session.touch();
        self.sessions
            .update(session)
            .await
            .map_err(|err| map_repository_error(err, session_id))
    }

    /// Discard a session and its cart
    #[instrument(skip(self), fields(session_id = %session_id))]
    pub async fn end_session(&self, session_id: Uuid) -> ServiceResult<()> {
        if !self.sessions.delete(session_id).await? {
            return Err(session_not_found(session_id));
        }
        self.refresh_session_gauge().await;

        info!("Session ended");
        Ok(())
    }

    /// Add a butcher item by weight. `raw_weight_kg` is whatever the client
    /// sent; unreadable values fall back to the minimum weight.
    #[instrument(skip(self, raw_weight_kg), fields(session_id = %session_id, item_id = %item_id))]
    pub async fn add_butcher_line(
        &self,
        session_id: Uuid,
        item_id: &str,
        raw_weight_kg: &Value,
    ) -> ServiceResult<CartLine> {
        let session_label = session_id.to_string();
        self.tracing
            .trace_cart_operation("add_butcher_line", Some(&session_label), async {
                self.ensure_session(session_id).await?;
                let item = self.catalog.find_butcher_item(item_id).await?;
                let request = LineRequest::Butcher {
                    item,
                    weight_kg: parse_amount(raw_weight_kg),
                };
                self.append(session_id, request).await
            })
            .await
    }

    /// Add a grocery item by count. `raw_quantity` is whatever the client
    /// sent; unreadable values fall back to one.
    #[instrument(skip(self, raw_quantity), fields(session_id = %session_id, item_id = %item_id))]
    pub async fn add_grocery_line(
        &self,
        session_id: Uuid,
        item_id: &str,
        raw_quantity: &Value,
    ) -> ServiceResult<CartLine> {
        let session_label = session_id.to_string();
        self.tracing
            .trace_cart_operation("add_grocery_line", Some(&session_label), async {
                self.ensure_session(session_id).await?;
                let item = self.catalog.find_grocery_item(item_id).await?;
                let request = LineRequest::Grocery {
                    item,
                    quantity: parse_amount(raw_quantity),
                };
                self.append(session_id, request).await
            })
            .await
    }

    /// Submit the cart as one order.
    ///
    /// The cart is snapshotted before the call and the session lock is not
    /// held while the order is in flight. On success the whole cart is
    /// cleared, including lines added after the snapshot, which are dropped
    /// without being ordered. On failure the cart is left exactly as it was.
    #[instrument(skip(self, request), fields(
        session_id = %session_id,
        payment_method = %request.payment_method,
    ))]
    pub async fn checkout(
        &self,
        session_id: Uuid,
        request: CheckoutRequest,
    ) -> ServiceResult<OrderReceipt> {
        let session = self
            .sessions
            .find(session_id)
            .await?
            .ok_or_else(|| session_not_found(session_id))?;

        let submission = match session
            .cart
            .to_order_submission(&request.contact, request.payment_method)
        {
            Some(submission) => submission,
            None => {
                self.metrics.record_cart_operation("checkout", false);
                warn!("Checkout refused for empty cart");
                return Err(ServiceError::EmptyCart);
            }
        };

        let payment_method = request.payment_method.to_string();
        let receipt = self
            .tracing
            .trace_checkout(&payment_method, async {
                self.orders
                    .submit_order(&submission)
                    .await
                    .map_err(|err| ServiceError::from_client(err, ORDER_FAILED_MESSAGE))
            })
            .await?;

        // Lines added while the order was in flight are not in this order
        // and are dropped with the rest
        match self.sessions.clear_cart(session_id).await {
            Ok(dropped) if dropped > submission.items.len() => {
                warn!(
                    order_id = %receipt.id,
                    dropped_lines = dropped - submission.items.len(),
                    "Lines added during checkout were cleared without being ordered"
                );
            }
            Ok(_) => {}
            Err(RepositoryError::NotFound) => {
                warn!(order_id = %receipt.id, "Session ended while order was in flight");
            }
            Err(err) => return Err(err.into()),
        }

        crate::info_with_trace!(
            order_id = %receipt.id,
            line_count = submission.items.len(),
            total = %submission.total,
            "Order placed"
        );
        self.metrics.record_cart_operation("checkout", true);

        Ok(receipt)
    }

    /// Drop sessions idle longer than `max_idle`
    pub async fn purge_idle_sessions(&self, max_idle: Duration) -> ServiceResult<usize> {
        let purged = self.sessions.purge_idle(max_idle).await?;
        self.refresh_session_gauge().await;
        Ok(purged)
    }

    async fn ensure_session(&self, session_id: Uuid) -> ServiceResult<()> {
        match self.sessions.find(session_id).await? {
            Some(_) => Ok(()),
            None => Err(session_not_found(session_id)),
        }
    }

    async fn append(&self, session_id: Uuid, request: LineRequest) -> ServiceResult<CartLine> {
        let (line, session) = self
            .sessions
            .add_line(session_id, request)
            .await
            .map_err(|err| map_repository_error(err, session_id))?;

        info!(
            line_count = session.cart.len(),
            subtotal = %line.subtotal(),
            total = %session.cart.compute_total(),
            "Line added to cart"
        );
        Ok(line)
    }

    /// Recount live sessions into the `active_sessions` gauge
    pub async fn refresh_session_gauge(&self) {
        match self.sessions.count().await {
            Ok(count) => self.metrics.set_active_sessions(count),
            Err(err) => warn!(error = %err, "Failed to count sessions"),
        }
    }
}

fn session_not_found(session_id: Uuid) -> ServiceError {
    ServiceError::SessionNotFound {
        session_id: session_id.to_string(),
    }
}

fn map_repository_error(err: RepositoryError, session_id: Uuid) -> ServiceError {
    match err {
        RepositoryError::NotFound => session_not_found(session_id),
        other => other.into(),
    }
}
