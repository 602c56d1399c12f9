pub mod admin;
pub mod api;
pub mod health;
pub mod metrics;
pub mod middleware;

pub use admin::*;
pub use api::*;
pub use health::*;
pub use metrics::*;
pub use middleware::*;
