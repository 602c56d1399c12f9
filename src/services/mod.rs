// Services module - business logic layer

pub mod admin_service;
pub mod cart_service;
pub mod catalog_service;

pub use admin_service::AdminService;
pub use cart_service::CartService;
pub use catalog_service::CatalogService;
