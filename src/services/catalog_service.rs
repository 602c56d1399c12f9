use std::sync::Arc;
use tracing::{info, instrument};

use crate::clients::CatalogClient;
use crate::models::{ButcherItem, Catalog, GroceryItem, ServiceError, ServiceResult};

/// Message shown when the backend refuses a catalog request without saying why
pub const CATALOG_FAILED_MESSAGE: &str = "Failed to load catalog";

/// Service for browsing the butcher and grocery catalogs
pub struct CatalogService {
    client: Arc<dyn CatalogClient>,
}

impl CatalogService {
    /// Create a new CatalogService
    pub fn new(client: Arc<dyn CatalogClient>) -> Self {
        Self { client }
    }

    /// Fetch both catalogs concurrently, keeping only available items
    #[instrument(skip(self))]
    pub async fn load_catalog(&self) -> ServiceResult<Catalog> {
        let (butcher, grocery) = tokio::try_join!(
            self.client.list_butcher_items(),
            self.client.list_grocery_items()
        )
        .map_err(|err| ServiceError::from_client(err, CATALOG_FAILED_MESSAGE))?;

        let catalog = Catalog::from_raw(&butcher, &grocery);

        crate::info_with_trace!(
            butcher_items = catalog.butcher.len(),
            grocery_items = catalog.grocery.len(),
            hidden = butcher.len() + grocery.len() - catalog.len(),
            "Catalog loaded"
        );

        Ok(catalog)
    }

    /// Look up a butcher item that can be put in a cart
    #[instrument(skip(self), fields(item_id = %item_id))]
    pub async fn find_butcher_item(&self, item_id: &str) -> ServiceResult<ButcherItem> {
        let items = self
            .client
            .list_butcher_items()
            .await
            .map_err(|err| ServiceError::from_client(err, CATALOG_FAILED_MESSAGE))?;

        let item = items
            .into_iter()
            .find(|item| item.id == item_id)
            .ok_or_else(|| ServiceError::ItemNotFound {
                item_id: item_id.to_string(),
            })?;

        if !item.available {
            return Err(ServiceError::ItemUnavailable {
                item_id: item.id,
            });
        }

        info!(title = %item.title, "Butcher item found");
        Ok(item)
    }

    /// Look up a grocery item that can be put in a cart
    #[instrument(skip(self), fields(item_id = %item_id))]
    pub async fn find_grocery_item(&self, item_id: &str) -> ServiceResult<GroceryItem> {
        let items = self
            .client
            .list_grocery_items()
            .await
            .map_err(|err| ServiceError::from_client(err, CATALOG_FAILED_MESSAGE))?;

        let item = items
            .into_iter()
            .find(|item| item.id == item_id)
            .ok_or_else(|| ServiceError::ItemNotFound {
                item_id: item_id.to_string(),
            })?;

        if !item.available {
            return Err(ServiceError::ItemUnavailable {
                item_id: item.id,
            });
        }

        info!(title = %item.title, "Grocery item found");
        Ok(item)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clients::MockCatalogClient;
    use crate::models::ClientError;
    use rust_decimal_macros::dec;

    fn butcher(id: &str, available: bool) -> ButcherItem {
        ButcherItem {
            id: id.to_string(),
            title: format!("Cut {}", id),
            description: None,
            price_per_kg: dec!(12.50),
            available,
            image: None,
        }
    }

    fn grocery(id: &str, available: bool) -> GroceryItem {
        GroceryItem {
            id: id.to_string(),
            title: format!("Jar {}", id),
            description: Some("Homemade".to_string()),
            price: dec!(4.00),
            available,
            image: None,
        }
    }

    #[tokio::test]
    async fn test_load_catalog_filters_unavailable() {
        let mut client = MockCatalogClient::new();
        client
            .expect_list_butcher_items()
            .times(1)
            .returning(|| Ok(vec![butcher("b1", true), butcher("b2", false)]));
        client
            .expect_list_grocery_items()
            .times(1)
            .returning(|| Ok(vec![grocery("g1", false), grocery("g2", true)]));

        let service = CatalogService::new(Arc::new(client));
        let catalog = service.load_catalog().await.unwrap();

        assert_eq!(catalog.butcher.len(), 1);
        assert_eq!(catalog.butcher[0].id, "b1");
        assert_eq!(catalog.grocery.len(), 1);
        assert_eq!(catalog.grocery[0].id, "g2");
    }

    #[tokio::test]
    async fn test_load_catalog_network_failure() {
        let mut client = MockCatalogClient::new();
        client.expect_list_butcher_items().returning(|| {
            Err(ClientError::Network {
                message: "connection refused".to_string(),
            })
        });
        client
            .expect_list_grocery_items()
            .returning(|| Ok(vec![grocery("g1", true)]));

        let service = CatalogService::new(Arc::new(client));
        let result = service.load_catalog().await;

        assert!(matches!(result, Err(ServiceError::Network { .. })));
    }

    #[tokio::test]
    async fn test_find_butcher_item() {
        let mut client = MockCatalogClient::new();
        client
            .expect_list_butcher_items()
            .returning(|| Ok(vec![butcher("b1", true), butcher("b2", false)]));

        let service = CatalogService::new(Arc::new(client));

        let item = service.find_butcher_item("b1").await.unwrap();
        assert_eq!(item.price_per_kg, dec!(12.50));

        assert!(matches!(
            service.find_butcher_item("b2").await,
            Err(ServiceError::ItemUnavailable { .. })
        ));
        assert!(matches!(
            service.find_butcher_item("missing").await,
            Err(ServiceError::ItemNotFound { .. })
        ));
    }

    #[tokio::test]
    async fn test_find_grocery_item_does_not_cross_catalogs() {
        let mut client = MockCatalogClient::new();
        client
            .expect_list_grocery_items()
            .returning(|| Ok(vec![grocery("g1", true)]));

        let service = CatalogService::new(Arc::new(client));

        // A butcher id is not a grocery item
        let result = service.find_grocery_item("b1").await;
        assert!(matches!(result, Err(ServiceError::ItemNotFound { .. })));
    }

    #[tokio::test]
    async fn test_backend_refusal_without_detail_uses_fallback() {
        let mut client = MockCatalogClient::new();
        client.expect_list_grocery_items().returning(|| {
            Err(ClientError::Application {
                status: 500,
                detail: None,
            })
        });

        let service = CatalogService::new(Arc::new(client));

        match service.find_grocery_item("g1").await {
            Err(ServiceError::Application { status, detail }) => {
                assert_eq!(status, 500);
                assert_eq!(detail, CATALOG_FAILED_MESSAGE);
            }
            other => panic!("Expected application error, got {:?}", other),
        }
    }
}
