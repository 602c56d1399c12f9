use async_trait::async_trait;
use rust_decimal::Decimal;
use serde::Serialize;
use tracing::{info, instrument};

use super::HttpBackend;
use crate::models::{ButcherItem, ClientResult, GroceryItem, NewButcherItem, NewGroceryItem};

pub const BUTCHER_LIST_PATH: &str = "/api/butcher/raw";
pub const GROCERY_LIST_PATH: &str = "/api/grocery/raw";
pub const ADMIN_BUTCHER_PATH: &str = "/api/admin/butcher";
pub const ADMIN_GROCERY_PATH: &str = "/api/admin/grocery";

/// Read access to the catalog backend, plus the admin calls that add to it
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait CatalogClient: Send + Sync {
    /// All butcher items, available or not
    async fn list_butcher_items(&self) -> ClientResult<Vec<ButcherItem>>;

    /// All grocery items, available or not
    async fn list_grocery_items(&self) -> ClientResult<Vec<GroceryItem>>;

    /// Add a butcher item; the backend checks `password`
    async fn create_butcher_item(&self, password: &str, item: &NewButcherItem)
        -> ClientResult<()>;

    /// Add a grocery item; the backend checks `password`
    async fn create_grocery_item(&self, password: &str, item: &NewGroceryItem)
        -> ClientResult<()>;
}

/// Wire body for admin item creation. New items are always listed as
/// available and start without an image.
#[derive(Debug, Serialize)]
struct CreateButcherItemBody<'a> {
    title: &'a str,
    description: &'a str,
    #[serde(serialize_with = "rust_decimal::serde::float::serialize")]
    price_per_kg: Decimal,
    available: bool,
    image: Option<&'a str>,
    password: &'a str,
}

#[derive(Debug, Serialize)]
struct CreateGroceryItemBody<'a> {
    title: &'a str,
    description: &'a str,
    #[serde(serialize_with = "rust_decimal::serde::float::serialize")]
    price: Decimal,
    available: bool,
    image: Option<&'a str>,
    password: &'a str,
}

#[async_trait]
impl CatalogClient for HttpBackend {
    #[instrument(skip(self))]
    async fn list_butcher_items(&self) -> ClientResult<Vec<ButcherItem>> {
        let items: Vec<ButcherItem> = self
            .get_json("list_butcher_items", BUTCHER_LIST_PATH, &[])
            .await?;
        info!(count = items.len(), "Fetched butcher items");
        Ok(items)
    }

    #[instrument(skip(self))]
    async fn list_grocery_items(&self) -> ClientResult<Vec<GroceryItem>> {
        let items: Vec<GroceryItem> = self
            .get_json("list_grocery_items", GROCERY_LIST_PATH, &[])
            .await?;
        info!(count = items.len(), "Fetched grocery items");
        Ok(items)
    }

    #[instrument(skip(self, password, item), fields(title = %item.title))]
    async fn create_butcher_item(
        &self,
        password: &str,
        item: &NewButcherItem,
    ) -> ClientResult<()> {
        let body = CreateButcherItemBody {
            title: &item.title,
            description: &item.description,
            price_per_kg: item.price_per_kg,
            available: true,
            image: None,
            password,
        };
        self.post_unit("create_butcher_item", ADMIN_BUTCHER_PATH, &body)
            .await
    }

    #[instrument(skip(self, password, item), fields(title = %item.title))]
    async fn create_grocery_item(
        &self,
        password: &str,
        item: &NewGroceryItem,
    ) -> ClientResult<()> {
        let body = CreateGroceryItemBody {
            title: &item.title,
            description: &item.description,
            price: item.price,
            available: true,
            image: None,
            password,
        };
        self.post_unit("create_grocery_item", ADMIN_GROCERY_PATH, &body)
            .await
    }
}
