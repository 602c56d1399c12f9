use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::{CartLine, OrderStatus, PaymentMethod};

/// Checkout form fields
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ContactDetails {
    #[serde(default)]
    pub customer_name: String,
    #[serde(default)]
    pub phone: String,
    #[serde(default)]
    pub address: String,
}

/// Payload sent once to the order backend to create an order
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderSubmission {
    pub customer_name: String,
    pub phone: String,
    pub address: String,
    pub payment_method: PaymentMethod,
    pub items: Vec<CartLine>,
    #[serde(serialize_with = "rust_decimal::serde::float::serialize")]
    pub total: Decimal,
}

/// Order backend's answer to a successful submission
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderReceipt {
    #[serde(rename = "_id", alias = "id")]
    pub id: String,
}

/// A persisted order as listed in the admin panel
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Order {
    #[serde(rename = "_id", alias = "id")]
    pub id: String,
    #[serde(default)]
    pub customer_name: String,
    #[serde(default)]
    pub phone: String,
    #[serde(default)]
    pub address: String,
    #[serde(default)]
    pub payment_method: PaymentMethod,
    #[serde(default)]
    pub items: Vec<CartLine>,
    #[serde(serialize_with = "rust_decimal::serde::float::serialize")]
    pub total: Decimal,
    #[serde(default)]
    pub status: OrderStatus,
}

/// Checkout request accepted from the storefront
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CheckoutRequest {
    #[serde(flatten)]
    pub contact: ContactDetails,
    #[serde(default)]
    pub payment_method: PaymentMethod,
}

/// Checkout answer returned to the storefront
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CheckoutResponse {
    pub order_id: String,
    pub message: String,
}

impl CheckoutResponse {
    pub fn from_receipt(receipt: OrderReceipt) -> Self {
        Self {
            message: format!("Order placed! ID {}", receipt.id),
            order_id: receipt.id,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_checkout_request_defaults() {
        let request: CheckoutRequest = serde_json::from_str("{}").unwrap();

        assert_eq!(request.contact, ContactDetails::default());
        assert_eq!(request.payment_method, PaymentMethod::CashOnDelivery);
    }

    #[test]
    fn test_checkout_request_flattened_contact() {
        let json = r#"{"customer_name":"Elif","phone":"555","address":"Main 1","payment_method":"Card on Delivery"}"#;
        let request: CheckoutRequest = serde_json::from_str(json).unwrap();

        assert_eq!(request.contact.customer_name, "Elif");
        assert_eq!(request.contact.address, "Main 1");
        assert_eq!(request.payment_method, PaymentMethod::CardOnDelivery);
    }

    #[test]
    fn test_order_deserializes_admin_listing() {
        let json = r#"{
            "_id": "o-17",
            "customer_name": "Guest",
            "phone": "",
            "address": "Piata Mare 2",
            "payment_method": "Cash on Delivery",
            "items": [
                {"type": "butcher", "item_id": "b1", "title": "Mince", "unit_price": 11.0, "weight_kg": 0.5, "subtotal": 5.5},
                {"type": "grocery", "item_id": "g1", "title": "Lavash", "unit_price": 1.5, "quantity": 2, "subtotal": 3.0}
            ],
            "total": 8.5,
            "status": "Ready for Pickup"
        }"#;
        let order: Order = serde_json::from_str(json).unwrap();

        assert_eq!(order.id, "o-17");
        assert_eq!(order.items.len(), 2);
        assert_eq!(order.total, dec!(8.5));
        assert_eq!(order.status, OrderStatus::ReadyForPickup);
    }

    #[test]
    fn test_checkout_response_message() {
        let response = CheckoutResponse::from_receipt(OrderReceipt {
            id: "66f1c0".to_string(),
        });

        assert_eq!(response.order_id, "66f1c0");
        assert_eq!(response.message, "Order placed! ID 66f1c0");
    }
}
