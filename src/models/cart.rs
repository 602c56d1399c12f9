use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::warn;

use super::money::{line_subtotal, saturating_u32, sum_rounded};
use super::{ButcherItem, ContactDetails, GroceryItem, OrderSubmission, PaymentMethod};

/// Smallest weight that can be put in the cart, in kilograms (0.1)
pub const MIN_WEIGHT_KG: Decimal = Decimal::from_parts(1, 0, 0, false, 1);

/// Largest weight a single line can carry, in kilograms
pub const MAX_WEIGHT_KG: Decimal = Decimal::from_parts(1000, 0, 0, false, 0);

/// Smallest grocery quantity that can be put in the cart
pub const MIN_QUANTITY: u32 = 1;

/// Largest count a single grocery line can carry
pub const MAX_QUANTITY: u32 = 10_000;

/// Name used on an order when the customer leaves the name blank
pub const GUEST_CUSTOMER_NAME: &str = "Guest";

/// One catalog item added to the cart
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum CartLine {
    Butcher(ButcherLine),
    Grocery(GroceryLine),
}

/// Weight-priced line
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ButcherLine {
    pub item_id: String,
    pub title: String,
    #[serde(serialize_with = "rust_decimal::serde::float::serialize")]
    pub unit_price: Decimal,
    #[serde(serialize_with = "rust_decimal::serde::float::serialize")]
    pub weight_kg: Decimal,
    #[serde(serialize_with = "rust_decimal::serde::float::serialize")]
    pub subtotal: Decimal,
}

/// Quantity-priced line
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GroceryLine {
    pub item_id: String,
    pub title: String,
    #[serde(serialize_with = "rust_decimal::serde::float::serialize")]
    pub unit_price: Decimal,
    pub quantity: u32,
    #[serde(serialize_with = "rust_decimal::serde::float::serialize")]
    pub subtotal: Decimal,
}

impl CartLine {
    /// Price a butcher item at the clamped weight
    pub fn butcher(item: &ButcherItem, requested_weight_kg: Option<Decimal>) -> Self {
        let weight_kg = clamp_weight(requested_weight_kg);
        CartLine::Butcher(ButcherLine {
            item_id: item.id.clone(),
            title: item.title.clone(),
            unit_price: item.price_per_kg,
            weight_kg,
            subtotal: line_subtotal(weight_kg, item.price_per_kg),
        })
    }

    /// Price a grocery item at the clamped quantity
    pub fn grocery(item: &GroceryItem, requested_quantity: Option<Decimal>) -> Self {
        let quantity = clamp_quantity(requested_quantity);
        CartLine::Grocery(GroceryLine {
            item_id: item.id.clone(),
            title: item.title.clone(),
            unit_price: item.price,
            quantity,
            subtotal: line_subtotal(Decimal::from(quantity), item.price),
        })
    }

    pub fn item_id(&self) -> &str {
        match self {
            CartLine::Butcher(line) => &line.item_id,
            CartLine::Grocery(line) => &line.item_id,
        }
    }

    pub fn title(&self) -> &str {
        match self {
            CartLine::Butcher(line) => &line.title,
            CartLine::Grocery(line) => &line.title,
        }
    }

    pub fn unit_price(&self) -> Decimal {
        match self {
            CartLine::Butcher(line) => line.unit_price,
            CartLine::Grocery(line) => line.unit_price,
        }
    }

    pub fn subtotal(&self) -> Decimal {
        match self {
            CartLine::Butcher(line) => line.subtotal,
            CartLine::Grocery(line) => line.subtotal,
        }
    }
}

/// A catalog item together with the amount the shopper asked for, before
/// clamping and pricing.
#[derive(Debug, Clone, PartialEq)]
pub enum LineRequest {
    Butcher {
        item: ButcherItem,
        weight_kg: Option<Decimal>,
    },
    Grocery {
        item: GroceryItem,
        quantity: Option<Decimal>,
    },
}

impl LineRequest {
    pub fn item_id(&self) -> &str {
        match self {
            LineRequest::Butcher { item, .. } => &item.id,
            LineRequest::Grocery { item, .. } => &item.id,
        }
    }
}

/// Clamp a requested weight: missing or invalid input counts as zero, and
/// anything below [`MIN_WEIGHT_KG`] is raised to it. Weights above
/// [`MAX_WEIGHT_KG`] are capped with a warning.
pub fn clamp_weight(requested_kg: Option<Decimal>) -> Decimal {
    let weight_kg = requested_kg.unwrap_or(Decimal::ZERO).max(MIN_WEIGHT_KG);
    if weight_kg > MAX_WEIGHT_KG {
        warn!(requested_kg = %weight_kg, max_kg = %MAX_WEIGHT_KG, "Requested weight capped");
        return MAX_WEIGHT_KG;
    }
    weight_kg
}

/// Clamp a requested quantity: missing or invalid input defaults to one,
/// fractions are truncated, and anything below [`MIN_QUANTITY`] is raised.
/// Counts above [`MAX_QUANTITY`] are capped with a warning.
pub fn clamp_quantity(requested: Option<Decimal>) -> u32 {
    let quantity = match requested {
        Some(quantity) => saturating_u32(quantity.trunc()).max(MIN_QUANTITY),
        None => MIN_QUANTITY,
    };
    if quantity > MAX_QUANTITY {
        warn!(requested = quantity, max = MAX_QUANTITY, "Requested quantity capped");
        return MAX_QUANTITY;
    }
    quantity
}

/// Shopping cart owned by one browsing session.
///
/// Lines are append-only; the only removal is [`Cart::clear`] after an
/// order has been accepted. Adding never fails: bad amounts degrade to the
/// minimum weight or quantity.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Cart {
    lines: Vec<CartLine>,
}

impl Cart {
    /// Create an empty cart
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a weight-priced line for a butcher item
    pub fn add_butcher_line(
        &mut self,
        item: &ButcherItem,
        requested_weight_kg: Option<Decimal>,
    ) -> CartLine {
        let line = CartLine::butcher(item, requested_weight_kg);
        self.lines.push(line.clone());
        line
    }

    /// Append a quantity-priced line for a grocery item
    pub fn add_grocery_line(
        &mut self,
        item: &GroceryItem,
        requested_quantity: Option<Decimal>,
    ) -> CartLine {
        let line = CartLine::grocery(item, requested_quantity);
        self.lines.push(line.clone());
        line
    }

    /// Price and append whichever kind of line `request` asks for
    pub fn add_line(&mut self, request: &LineRequest) -> CartLine {
        match request {
            LineRequest::Butcher { item, weight_kg } => self.add_butcher_line(item, *weight_kg),
            LineRequest::Grocery { item, quantity } => self.add_grocery_line(item, *quantity),
        }
    }

    /// Total of all line subtotals, rounded to cents. Recomputed on every call.
    pub fn compute_total(&self) -> Decimal {
        sum_rounded(self.lines.iter().map(CartLine::subtotal))
    }

    /// Build the order payload for the current contents.
    ///
    /// Returns `None` for an empty cart: nothing is submitted.
    pub fn to_order_submission(
        &self,
        contact: &ContactDetails,
        payment_method: PaymentMethod,
    ) -> Option<OrderSubmission> {
        if self.lines.is_empty() {
            return None;
        }

        let customer_name = if contact.customer_name.trim().is_empty() {
            GUEST_CUSTOMER_NAME.to_string()
        } else {
            contact.customer_name.clone()
        };

        Some(OrderSubmission {
            customer_name,
            phone: contact.phone.clone(),
            address: contact.address.clone(),
            payment_method,
            items: self.lines.clone(),
            total: self.compute_total(),
        })
    }

    /// Drop every line
    pub fn clear(&mut self) {
        self.lines.clear();
    }

    pub fn lines(&self) -> &[CartLine] {
        &self.lines
    }

    pub fn len(&self) -> usize {
        self.lines.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }
}
