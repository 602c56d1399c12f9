use chrono::{DateTime, Duration, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::{Cart, CartLine};

/// A browsing session and the cart it owns
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Session {
    pub id: Uuid,
    pub cart: Cart,
    pub created_at: DateTime<Utc>,
    pub last_active_at: DateTime<Utc>,
}

impl Session {
    /// Start a new session with an empty cart
    pub fn new() -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            cart: Cart::new(),
            created_at: now,
            last_active_at: now,
        }
    }

    /// Mark the session as used just now
    pub fn touch(&mut self) {
        self.last_active_at = Utc::now();
    }

    /// Whether the session has been idle for longer than `max_idle`
    pub fn is_idle(&self, now: DateTime<Utc>, max_idle: Duration) -> bool {
        now - self.last_active_at > max_idle
    }

    pub fn to_cart_response(&self) -> CartResponse {
        CartResponse {
            session_id: self.id,
            lines: self.cart.lines().to_vec(),
            line_count: self.cart.len(),
            total: self.cart.compute_total(),
        }
    }
}

impl Default for Session {
    fn default() -> Self {
        Self::new()
    }
}

/// Cart contents as returned by the storefront API
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CartResponse {
    pub session_id: Uuid,
    pub lines: Vec<CartLine>,
    pub line_count: usize,
    #[serde(serialize_with = "rust_decimal::serde::float::serialize")]
    pub total: Decimal,
}

/// Answer to session creation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionResponse {
    pub session_id: Uuid,
    pub cart: CartResponse,
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_new_session_has_empty_cart() {
        let session = Session::new();
        let response = session.to_cart_response();

        assert_eq!(response.session_id, session.id);
        assert_eq!(response.line_count, 0);
        assert_eq!(response.total, dec!(0.00));
    }

    #[test]
    fn test_idle_detection() {
        let mut session = Session::new();
        session.last_active_at = Utc::now() - Duration::minutes(90);

        assert!(session.is_idle(Utc::now(), Duration::minutes(60)));
        session.touch();
        assert!(!session.is_idle(Utc::now(), Duration::minutes(60)));
    }
}
