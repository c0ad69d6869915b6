//! Request validation shared by the item handlers.

mod validation;
pub use validation::{RequestValidator, ValidationRule};
