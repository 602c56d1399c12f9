use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::PricingUnit;

/// Butcher counter entry as served by the catalog backend, priced per kilogram
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ButcherItem {
    #[serde(rename = "_id", alias = "id")]
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(serialize_with = "rust_decimal::serde::float::serialize")]
    pub price_per_kg: Decimal,
    #[serde(default)]
    pub available: bool,
    #[serde(default)]
    pub image: Option<String>,
}

/// Grocery shelf entry as served by the catalog backend, priced per unit
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GroceryItem {
    #[serde(rename = "_id", alias = "id")]
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(serialize_with = "rust_decimal::serde::float::serialize")]
    pub price: Decimal,
    #[serde(default)]
    pub available: bool,
    #[serde(default)]
    pub image: Option<String>,
}

/// Unified read view of a catalog entry regardless of pricing unit
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CatalogItem {
    pub id: String,
    pub title: String,
    pub description: Option<String>,
    #[serde(serialize_with = "rust_decimal::serde::float::serialize")]
    pub unit_price: Decimal,
    pub pricing_unit: PricingUnit,
    pub available: bool,
    pub image: Option<String>,
}

/// Available catalog entries, split by counter
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Catalog {
    pub butcher: Vec<CatalogItem>,
    pub grocery: Vec<CatalogItem>,
}

/// Admin form for a new butcher item
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewButcherItem {
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(serialize_with = "rust_decimal::serde::float::serialize")]
    pub price_per_kg: Decimal,
}

/// Admin form for a new grocery item
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewGroceryItem {
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(serialize_with = "rust_decimal::serde::float::serialize")]
    pub price: Decimal,
}

impl From<&ButcherItem> for CatalogItem {
    fn from(item: &ButcherItem) -> Self {
        Self {
            id: item.id.clone(),
            title: item.title.clone(),
            description: item.description.clone(),
            unit_price: item.price_per_kg,
            pricing_unit: PricingUnit::Kilogram,
            available: item.available,
            image: item.image.clone(),
        }
    }
}

impl From<&GroceryItem> for CatalogItem {
    fn from(item: &GroceryItem) -> Self {
        Self {
            id: item.id.clone(),
            title: item.title.clone(),
            description: item.description.clone(),
            unit_price: item.price,
            pricing_unit: PricingUnit::Unit,
            available: item.available,
            image: item.image.clone(),
        }
    }
}

impl Catalog {
    /// Build the storefront view, keeping only available entries
    pub fn from_raw(butcher: &[ButcherItem], grocery: &[GroceryItem]) -> Self {
        Self {
            butcher: butcher
                .iter()
                .filter(|item| item.available)
                .map(CatalogItem::from)
                .collect(),
            grocery: grocery
                .iter()
                .filter(|item| item.available)
                .map(CatalogItem::from)
                .collect(),
        }
    }

    pub fn len(&self) -> usize {
        self.butcher.len() + self.grocery.len()
    }

    pub fn is_empty(&self) -> bool {
        self.butcher.is_empty() && self.grocery.is_empty()
    }
}
