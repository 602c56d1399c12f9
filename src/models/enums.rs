use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// How a catalog entry is priced
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PricingUnit {
    /// Priced per kilogram (butcher counter)
    Kilogram,
    /// Priced per discrete unit (grocery shelf)
    Unit,
}

impl fmt::Display for PricingUnit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PricingUnit::Kilogram => write!(f, "kg"),
            PricingUnit::Unit => write!(f, "unit"),
        }
    }
}

/// Payment methods accepted at delivery
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum PaymentMethod {
    #[default]
    #[serde(rename = "Cash on Delivery")]
    CashOnDelivery,
    #[serde(rename = "Card on Delivery")]
    CardOnDelivery,
}

impl fmt::Display for PaymentMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PaymentMethod::CashOnDelivery => write!(f, "Cash on Delivery"),
            PaymentMethod::CardOnDelivery => write!(f, "Card on Delivery"),
        }
    }
}

impl FromStr for PaymentMethod {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "cash on delivery" => Ok(PaymentMethod::CashOnDelivery),
            "card on delivery" => Ok(PaymentMethod::CardOnDelivery),
            _ => Err(format!("Invalid payment method: {}", s)),
        }
    }
}

/// Lifecycle status of a placed order, as managed from the admin panel
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum OrderStatus {
    #[default]
    Pending,
    Confirmed,
    #[serde(rename = "Ready for Pickup")]
    ReadyForPickup,
    Delivered,
}

impl OrderStatus {
    /// All statuses in the order the admin panel offers them
    pub const ALL: [OrderStatus; 4] = [
        OrderStatus::Pending,
        OrderStatus::Confirmed,
        OrderStatus::ReadyForPickup,
        OrderStatus::Delivered,
    ];
}

impl fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OrderStatus::Pending => write!(f, "Pending"),
            OrderStatus::Confirmed => write!(f, "Confirmed"),
            OrderStatus::ReadyForPickup => write!(f, "Ready for Pickup"),
            OrderStatus::Delivered => write!(f, "Delivered"),
        }
    }
}

impl FromStr for OrderStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "pending" => Ok(OrderStatus::Pending),
            "confirmed" => Ok(OrderStatus::Confirmed),
            "ready for pickup" => Ok(OrderStatus::ReadyForPickup),
            "delivered" => Ok(OrderStatus::Delivered),
            _ => Err(format!("Invalid order status: {}", s)),
        }
    }
}
