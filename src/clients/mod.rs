// Clients module - HTTP access to the catalog and order backend

pub mod catalog_client;
pub mod http_backend;
pub mod order_client;

pub use catalog_client::CatalogClient;
pub use http_backend::HttpBackend;
pub use order_client::OrderClient;

#[cfg(test)]
pub use catalog_client::MockCatalogClient;
#[cfg(test)]
pub use order_client::MockOrderClient;
