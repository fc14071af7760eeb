//! ProductService: validation and lifecycle transitions over a `ProductStore`.

mod crud;
mod validation;
pub use crud::ProductService;
pub use validation::{parse_price, ProductValidator};
