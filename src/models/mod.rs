// Re-export all model types
pub use self::cart::*;
pub use self::catalog::*;
pub use self::enums::*;
pub use self::errors::*;
pub use self::order::*;
pub use self::session::*;
pub use self::validation::*;

mod cart;
mod catalog;
mod enums;
mod errors;
pub mod money;
mod order;
mod session;
mod validation;
